#![allow(dead_code)]

use matrix_ad::prelude::*;
use rand::rngs::StdRng;
use rand::Rng;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Uniform entries in `[-scale, scale)`.
pub fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize, scale: f64) -> Matrix {
    Matrix::from_shape_fn((rows, cols), |_| rng.gen_range(-scale..scale))
}

pub fn max_abs_diff(a: &Matrix, b: &Matrix) -> f64 {
    assert_eq!(a.dim(), b.dim());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

fn probe(f: Expr<'_>, x: Expr<'_>, value: Matrix) -> f64 {
    x.set_value(value).unwrap();
    f.reset();
    f.forward().unwrap()[[0, 0]]
}

/// Central-difference gradient of the 1x1 node `f` with respect to the leaf `x`.
pub fn finite_difference(f: Expr<'_>, x: Expr<'_>, h: f64) -> Matrix {
    let base = x.value().unwrap();
    let mut grad = Matrix::zeros(base.dim());
    for ((i, j), g) in grad.indexed_iter_mut() {
        let mut plus = base.clone();
        plus[[i, j]] += h;
        let mut minus = base.clone();
        minus[[i, j]] -= h;
        *g = (probe(f, x, plus) - probe(f, x, minus)) / (2.0 * h);
    }
    x.set_value(base).unwrap();
    f.reset();
    grad
}

/// Analytic gradient of the 1x1 node `f` with respect to the variable `x`.
pub fn analytic_gradient(f: Expr<'_>, x: Expr<'_>) -> Matrix {
    x.graph().reset_gradients();
    f.reset();
    f.forward().unwrap();
    f.backward().unwrap();
    x.gradient().unwrap()
}
