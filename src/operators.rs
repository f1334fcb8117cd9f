//! Operator strategies: forward evaluation, local partial derivatives, gradient chaining and
//! shape inference for every primitive the graph can hold.
//!
//! Each primitive is a zero-sized type implementing [`BinOp`] (or [`UnOp`] for operators of a
//! single operand, lifted into [`BinOp`] through [`Unary`]). Graph nodes refer to them through
//! the closed [`Op`] enum.

use std::marker::PhantomData;

use crate::errors::Result;
use crate::numeric::{ones_like, Matrix, Shape};

#[path = "operators_impl.rs"]
mod operators_impl;
pub use operators_impl::*;

/// A binary operation over dense matrices.
///
/// Local derivatives are evaluated at the current operand values. `chain_*` maps the gradient
/// flowing into the node and a local derivative to the gradient of the matching operand, which
/// must have that operand's shape.
pub trait BinOp {
    /// Name used in diagnostics.
    const NAME: &'static str;

    #[inline]
    fn name() -> &'static str {
        Self::NAME
    }

    /// Validates operand shapes when the node is built.
    fn check(_a: Shape, _b: Shape) -> Result<()> {
        Ok(())
    }

    /// Evaluates the operator on the input values.
    fn eval(a: &Matrix, b: &Matrix) -> Matrix;

    /// Derivative with respect to the left operand.
    fn d_a(a: &Matrix, _b: &Matrix) -> Matrix {
        ones_like(a)
    }

    /// Derivative with respect to the right operand.
    fn d_b(_a: &Matrix, b: &Matrix) -> Matrix {
        ones_like(b)
    }

    fn chain_a(up: &Matrix, d_a: &Matrix) -> Matrix {
        up * d_a
    }

    fn chain_b(up: &Matrix, d_b: &Matrix) -> Matrix {
        up * d_b
    }

    /// Output shape from the operand shapes.
    fn out_size(a: Shape, b: Shape) -> Shape {
        Shape::new(a.rows, b.cols)
    }
}

/// An operation of a single operand.
pub trait UnOp {
    const NAME: &'static str;

    fn check(_x: Shape) -> Result<()> {
        Ok(())
    }

    fn eval(x: &Matrix) -> Matrix;

    /// Local derivative at `x`.
    fn deriv(x: &Matrix) -> Matrix;

    fn chain(up: &Matrix, d: &Matrix) -> Matrix {
        up * d
    }

    fn out_size(x: Shape) -> Shape {
        x
    }
}

/// Lifts a [`UnOp`] into a [`BinOp`] whose right operand is an inert placeholder.
///
/// The right-hand derivative is ones and its chain passes the gradient through unchanged;
/// the graph never routes that gradient anywhere since the placeholder is not differentiable.
pub struct Unary<O>(PhantomData<O>);

impl<O: UnOp> BinOp for Unary<O> {
    const NAME: &'static str = O::NAME;

    fn check(a: Shape, _b: Shape) -> Result<()> {
        O::check(a)
    }
    #[inline]
    fn eval(a: &Matrix, _b: &Matrix) -> Matrix {
        O::eval(a)
    }
    #[inline]
    fn d_a(a: &Matrix, _b: &Matrix) -> Matrix {
        O::deriv(a)
    }
    #[inline]
    fn chain_a(up: &Matrix, d_a: &Matrix) -> Matrix {
        O::chain(up, d_a)
    }
    #[inline]
    fn chain_b(up: &Matrix, _d_b: &Matrix) -> Matrix {
        up.clone()
    }
    #[inline]
    fn out_size(a: Shape, _b: Shape) -> Shape {
        O::out_size(a)
    }
}

/// The closed set of operators a graph node can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Log,
    Exp,
    /// Exponential shifted by the operand's maximum.
    NormExp,
    /// Leaky rectifier.
    Relu,
    Softmax,
    /// Outer product of a column and a row.
    Outer,
    Matmul,
    ReduceSum,
    ReduceProd,
}

macro_rules! dispatch {
    ($op:expr, $f:ident($($arg:expr),*)) => {
        match $op {
            Op::Add => <AddOp as BinOp>::$f($($arg),*),
            Op::Sub => <SubOp as BinOp>::$f($($arg),*),
            Op::Mul => <MulOp as BinOp>::$f($($arg),*),
            Op::Div => <DivOp as BinOp>::$f($($arg),*),
            Op::Log => <Unary<LogOp> as BinOp>::$f($($arg),*),
            Op::Exp => <Unary<ExpOp> as BinOp>::$f($($arg),*),
            Op::NormExp => <Unary<NormExpOp> as BinOp>::$f($($arg),*),
            Op::Relu => <Unary<ReluOp> as BinOp>::$f($($arg),*),
            Op::Softmax => <Unary<SoftmaxOp> as BinOp>::$f($($arg),*),
            Op::Outer => <OuterOp as BinOp>::$f($($arg),*),
            Op::Matmul => <MatmulOp as BinOp>::$f($($arg),*),
            Op::ReduceSum => <Unary<ReduceSumOp> as BinOp>::$f($($arg),*),
            Op::ReduceProd => <Unary<ReduceProdOp> as BinOp>::$f($($arg),*),
        }
    };
}

impl Op {
    pub fn name(self) -> &'static str {
        dispatch!(self, name())
    }

    /// True for operators whose right operand is the inert placeholder.
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            Op::Log
                | Op::Exp
                | Op::NormExp
                | Op::Relu
                | Op::Softmax
                | Op::ReduceSum
                | Op::ReduceProd
        )
    }

    pub fn check(self, a: Shape, b: Shape) -> Result<()> {
        dispatch!(self, check(a, b))
    }

    #[inline]
    pub fn eval(self, a: &Matrix, b: &Matrix) -> Matrix {
        dispatch!(self, eval(a, b))
    }

    #[inline]
    pub fn d_a(self, a: &Matrix, b: &Matrix) -> Matrix {
        dispatch!(self, d_a(a, b))
    }

    #[inline]
    pub fn d_b(self, a: &Matrix, b: &Matrix) -> Matrix {
        dispatch!(self, d_b(a, b))
    }

    #[inline]
    pub fn chain_a(self, up: &Matrix, d_a: &Matrix) -> Matrix {
        dispatch!(self, chain_a(up, d_a))
    }

    #[inline]
    pub fn chain_b(self, up: &Matrix, d_b: &Matrix) -> Matrix {
        dispatch!(self, chain_b(up, d_b))
    }

    #[inline]
    pub fn out_size(self, a: Shape, b: Shape) -> Shape {
        dispatch!(self, out_size(a, b))
    }
}
