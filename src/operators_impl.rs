use ndarray::Axis;

use crate::errors::{ADError, Result};
use crate::numeric::{ones, ones_like, scalar, Matrix, Shape};

use super::{BinOp, UnOp};

/// Slope of the leaky rectifier for negative inputs.
pub const LEAK: f64 = 0.01;

fn same_shape(op: &'static str, a: Shape, b: Shape) -> Result<()> {
    if a == b {
        Ok(())
    } else {
        Err(ADError::ShapeMismatch { op, lhs: a, rhs: b })
    }
}

fn non_empty(op: &'static str, s: Shape) -> Result<()> {
    if s.is_empty() {
        Err(ADError::InvalidShape {
            op,
            shape: s,
            expected: "non-empty",
        })
    } else {
        Ok(())
    }
}

/// Shifts by the maximum element before exponentiating.
fn shifted_exp(x: &Matrix) -> Matrix {
    let max = x.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
    x.mapv(|v| (v - max).exp())
}

#[derive(Clone, Copy, Debug)]
/// Elementwise addition.
pub struct AddOp;
impl BinOp for AddOp {
    const NAME: &'static str = "add";

    fn check(a: Shape, b: Shape) -> Result<()> {
        same_shape(Self::NAME, a, b)
    }
    #[inline]
    fn eval(a: &Matrix, b: &Matrix) -> Matrix {
        a + b
    }
}

#[derive(Clone, Copy, Debug)]
/// Elementwise subtraction.
pub struct SubOp;
impl BinOp for SubOp {
    const NAME: &'static str = "sub";

    fn check(a: Shape, b: Shape) -> Result<()> {
        same_shape(Self::NAME, a, b)
    }
    #[inline]
    fn eval(a: &Matrix, b: &Matrix) -> Matrix {
        a - b
    }
    #[inline]
    fn d_b(_: &Matrix, b: &Matrix) -> Matrix {
        -ones_like(b)
    }
}

#[derive(Clone, Copy, Debug)]
/// Elementwise (Hadamard) product.
pub struct MulOp;
impl BinOp for MulOp {
    const NAME: &'static str = "mul";

    fn check(a: Shape, b: Shape) -> Result<()> {
        same_shape(Self::NAME, a, b)
    }
    #[inline]
    fn eval(a: &Matrix, b: &Matrix) -> Matrix {
        a * b
    }
    #[inline]
    fn d_a(_: &Matrix, b: &Matrix) -> Matrix {
        b.clone()
    }
    #[inline]
    fn d_b(a: &Matrix, _: &Matrix) -> Matrix {
        a.clone()
    }
}

#[derive(Clone, Copy, Debug)]
/// Elementwise division.
pub struct DivOp;
impl BinOp for DivOp {
    const NAME: &'static str = "div";

    fn check(a: Shape, b: Shape) -> Result<()> {
        same_shape(Self::NAME, a, b)
    }
    #[inline]
    fn eval(a: &Matrix, b: &Matrix) -> Matrix {
        a / b
    }
    #[inline]
    fn d_a(_: &Matrix, b: &Matrix) -> Matrix {
        b.mapv(|v| 1.0 / v)
    }
    #[inline]
    fn d_b(a: &Matrix, b: &Matrix) -> Matrix {
        -(a / &(b * b))
    }
}

#[derive(Clone, Copy, Debug)]
/// Natural logarithm.
pub struct LogOp;
impl UnOp for LogOp {
    const NAME: &'static str = "log";

    #[inline]
    fn eval(x: &Matrix) -> Matrix {
        x.mapv(f64::ln)
    }
    #[inline]
    fn deriv(x: &Matrix) -> Matrix {
        x.mapv(|v| 1.0 / v)
    }
}

#[derive(Clone, Copy, Debug)]
/// Exponential.
pub struct ExpOp;
impl UnOp for ExpOp {
    const NAME: &'static str = "exp";

    #[inline]
    fn eval(x: &Matrix) -> Matrix {
        x.mapv(f64::exp)
    }
    #[inline]
    fn deriv(x: &Matrix) -> Matrix {
        x.mapv(f64::exp)
    }
}

#[derive(Clone, Copy, Debug)]
/// Exponential of `x - max(x)`.
///
/// The maximum is treated as a constant when differentiating. Any normalisation by the sum of
/// the result cancels the shift, so softmax built from this operator has the same value and
/// gradient as one built from [`ExpOp`] while never overflowing.
pub struct NormExpOp;
impl UnOp for NormExpOp {
    const NAME: &'static str = "norm_exp";

    #[inline]
    fn eval(x: &Matrix) -> Matrix {
        shifted_exp(x)
    }
    #[inline]
    fn deriv(x: &Matrix) -> Matrix {
        shifted_exp(x)
    }
}

#[derive(Clone, Copy, Debug)]
/// Leaky rectifier, `max(x, LEAK * x)`.
pub struct ReluOp;
impl UnOp for ReluOp {
    const NAME: &'static str = "relu";

    #[inline]
    fn eval(x: &Matrix) -> Matrix {
        x.mapv(|v| v.max(LEAK * v))
    }
    #[inline]
    fn deriv(x: &Matrix) -> Matrix {
        x.mapv(|v| (if v > 0.0 { 1.0 - LEAK } else { 0.0 }) + LEAK)
    }
}

#[derive(Clone, Copy, Debug)]
/// Softmax over a single column.
///
/// Only the diagonal of the softmax Jacobian is used, `s_i (1 - s_i)`, so the gradient is
/// exact only when the upstream gradient is already reduced to one term per output unit, as
/// with cross-entropy style losses. Compose [`NormExpOp`], reductions and division for the full
/// Jacobian-vector product.
pub struct SoftmaxOp;
impl UnOp for SoftmaxOp {
    const NAME: &'static str = "softmax";

    fn check(x: Shape) -> Result<()> {
        if x.cols != 1 || x.rows == 0 {
            return Err(ADError::InvalidShape {
                op: Self::NAME,
                shape: x,
                expected: "a single non-empty column",
            });
        }
        Ok(())
    }
    fn eval(x: &Matrix) -> Matrix {
        let e = shifted_exp(x);
        let sum = e.sum();
        e / sum
    }
    fn deriv(x: &Matrix) -> Matrix {
        let e = shifted_exp(x);
        let sum = e.sum();
        e.mapv(|v| (sum - v) * v / (sum * sum))
    }
}

#[derive(Clone, Copy, Debug)]
/// Outer product `a * b^T` of an `n x 1` column and a `1 x m` row.
pub struct OuterOp;
impl BinOp for OuterOp {
    const NAME: &'static str = "outer";

    fn check(a: Shape, b: Shape) -> Result<()> {
        non_empty(Self::NAME, a)?;
        non_empty(Self::NAME, b)?;
        if a.cols != 1 || b.rows != 1 {
            return Err(ADError::ShapeMismatch {
                op: Self::NAME,
                lhs: a,
                rhs: b,
            });
        }
        Ok(())
    }
    #[inline]
    fn eval(a: &Matrix, b: &Matrix) -> Matrix {
        a.dot(b)
    }
    fn d_a(a: &Matrix, b: &Matrix) -> Matrix {
        ones(Shape::new(a.nrows(), 1)).dot(b)
    }
    fn d_b(a: &Matrix, b: &Matrix) -> Matrix {
        a.dot(&ones(Shape::new(1, b.ncols())))
    }
    /// Collapses the `n x m` product back onto the column.
    fn chain_a(up: &Matrix, d_a: &Matrix) -> Matrix {
        (up * d_a).sum_axis(Axis(1)).insert_axis(Axis(1))
    }
    /// Collapses the `n x m` product back onto the row.
    fn chain_b(up: &Matrix, d_b: &Matrix) -> Matrix {
        (up * d_b).sum_axis(Axis(0)).insert_axis(Axis(0))
    }
}

#[derive(Clone, Copy, Debug)]
/// Matrix product.
pub struct MatmulOp;
impl BinOp for MatmulOp {
    const NAME: &'static str = "matmul";

    fn check(a: Shape, b: Shape) -> Result<()> {
        non_empty(Self::NAME, a)?;
        non_empty(Self::NAME, b)?;
        if a.cols != b.rows {
            return Err(ADError::ShapeMismatch {
                op: Self::NAME,
                lhs: a,
                rhs: b,
            });
        }
        Ok(())
    }
    #[inline]
    fn eval(a: &Matrix, b: &Matrix) -> Matrix {
        a.dot(b)
    }
    #[inline]
    fn d_a(_: &Matrix, b: &Matrix) -> Matrix {
        b.clone()
    }
    #[inline]
    fn d_b(a: &Matrix, _: &Matrix) -> Matrix {
        a.clone()
    }
    #[inline]
    fn chain_a(up: &Matrix, d_a: &Matrix) -> Matrix {
        up.dot(&d_a.t())
    }
    #[inline]
    fn chain_b(up: &Matrix, d_b: &Matrix) -> Matrix {
        d_b.t().dot(up)
    }
}

#[derive(Clone, Copy, Debug)]
/// Sum of all elements as a 1x1 matrix.
pub struct ReduceSumOp;
impl UnOp for ReduceSumOp {
    const NAME: &'static str = "reduce_sum";

    #[inline]
    fn eval(x: &Matrix) -> Matrix {
        scalar(x.sum())
    }
    #[inline]
    fn deriv(x: &Matrix) -> Matrix {
        ones_like(x)
    }
    /// Broadcasts the 1x1 upstream gradient over every element.
    #[inline]
    fn chain(up: &Matrix, d: &Matrix) -> Matrix {
        d * up[[0, 0]]
    }
    #[inline]
    fn out_size(_: Shape) -> Shape {
        Shape::scalar()
    }
}

#[derive(Clone, Copy, Debug)]
/// Product of all elements as a 1x1 matrix.
pub struct ReduceProdOp;
impl UnOp for ReduceProdOp {
    const NAME: &'static str = "reduce_prod";

    #[inline]
    fn eval(x: &Matrix) -> Matrix {
        scalar(x.product())
    }
    /// Product of every other element, `prod(x) / x_i` without the division, so zeros in `x`
    /// still give finite derivatives.
    fn deriv(x: &Matrix) -> Matrix {
        let vals: Vec<f64> = x.iter().copied().collect();
        let mut excl = vec![1.0; vals.len()];
        let mut acc = 1.0;
        for (e, &v) in excl.iter_mut().zip(&vals) {
            *e = acc;
            acc *= v;
        }
        acc = 1.0;
        for (e, &v) in excl.iter_mut().zip(&vals).rev() {
            *e *= acc;
            acc *= v;
        }
        let cols = x.ncols();
        Matrix::from_shape_fn(x.dim(), |(i, j)| excl[i * cols + j])
    }
    #[inline]
    fn chain(up: &Matrix, d: &Matrix) -> Matrix {
        d * up[[0, 0]]
    }
    #[inline]
    fn out_size(_: Shape) -> Shape {
        Shape::scalar()
    }
}
