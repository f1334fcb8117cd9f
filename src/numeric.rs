//! Dense matrix helpers shared by the operator and graph layers.

use core::fmt;

use ndarray::Array2;

/// The dense 2-D array type every node evaluates to.
pub type Matrix = Array2<f64>;

/// Row and column count of a node's value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    #[inline]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Shape { rows, cols }
    }

    /// The 1x1 shape produced by reductions.
    #[inline]
    pub const fn scalar() -> Self {
        Shape { rows: 1, cols: 1 }
    }

    #[inline]
    /// Reads the shape of an existing matrix.
    pub fn of(m: &Matrix) -> Self {
        let (rows, cols) = m.dim();
        Shape { rows, cols }
    }

    #[inline]
    /// Returns true if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

impl From<(usize, usize)> for Shape {
    fn from((rows, cols): (usize, usize)) -> Self {
        Shape { rows, cols }
    }
}

impl From<Shape> for (usize, usize) {
    fn from(s: Shape) -> Self {
        (s.rows, s.cols)
    }
}

/// Matrix of the given shape with every element set to `v`.
pub fn filled(shape: Shape, v: f64) -> Matrix {
    Matrix::from_elem((shape.rows, shape.cols), v)
}

pub fn ones(shape: Shape) -> Matrix {
    filled(shape, 1.0)
}

pub fn zeros(shape: Shape) -> Matrix {
    filled(shape, 0.0)
}

/// Square identity matrix.
pub fn identity(n: usize) -> Matrix {
    Matrix::eye(n)
}

/// Ones with the same shape as `m`.
pub fn ones_like(m: &Matrix) -> Matrix {
    ones(Shape::of(m))
}

pub fn zeros_like(m: &Matrix) -> Matrix {
    zeros(Shape::of(m))
}

/// Wraps a single value into a 1x1 matrix.
pub fn scalar(v: f64) -> Matrix {
    filled(Shape::scalar(), v)
}

/// Returns false if any element is NaN or infinite.
pub fn all_finite(m: &Matrix) -> bool {
    m.iter().all(|v| v.is_finite())
}
