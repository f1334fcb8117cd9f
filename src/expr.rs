//! Node handles and the functions that combine them into expressions.

use core::fmt;

use crate::errors::{ADError, Result};
use crate::graph::Graph;
use crate::node::{NodeId, NodeState};
use crate::numeric::{ones, Matrix, Shape};
use crate::operators::Op;

/// A lightweight handle to a node of a [`Graph`].
///
/// Handles are `Copy`; combining them records new nodes in the graph they came from.
#[derive(Clone, Copy)]
pub struct Expr<'g> {
    graph: &'g Graph,
    id: NodeId,
}

impl<'g> Expr<'g> {
    #[inline]
    pub(crate) fn new(graph: &'g Graph, id: NodeId) -> Self {
        Expr { graph, id }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Shape of the node's value, fixed when the node was built.
    #[inline]
    pub fn shape(&self) -> Shape {
        self.graph.shape_of(self.id)
    }

    /// `(rows, cols)` of the node's value.
    #[inline]
    pub fn size(&self) -> (usize, usize) {
        self.shape().into()
    }

    pub fn state(&self) -> NodeState {
        self.graph.state_of(self.id)
    }

    pub fn is_variable(&self) -> bool {
        self.graph.is_variable(self.id)
    }

    pub fn is_constant(&self) -> bool {
        self.graph.is_constant(self.id)
    }

    /// Evaluates the node, reusing every cached value below it.
    pub fn forward(&self) -> Result<Matrix> {
        self.graph.forward(self.id)
    }

    /// Runs a backward pass seeded with ones, i.e. the gradient of the sum of this node.
    pub fn backward(&self) -> Result<()> {
        self.backward_with(&ones(self.shape()))
    }

    /// Runs a backward pass seeded with `upstream`, which must have this node's shape.
    ///
    /// The node and everything below it must have been evaluated since the last reset;
    /// otherwise [`ADError::NotEvaluated`] is returned.
    pub fn backward_with(&self, upstream: &Matrix) -> Result<()> {
        self.graph.backward(self.id, upstream)
    }

    /// Invalidates cached forward values of this node and everything below it.
    pub fn reset(&self) {
        self.graph.reset(self.id)
    }

    /// Current value of a leaf.
    pub fn value(&self) -> Result<Matrix> {
        self.graph.leaf_value(self.id)
    }

    /// Overwrites the value of a leaf. The shape must not change.
    ///
    /// Expressions that depend on this leaf keep their cached value until reset.
    pub fn set_value(&self, value: Matrix) -> Result<()> {
        self.graph.set_leaf_value(self.id, value)
    }

    /// Accumulated gradient of a variable.
    pub fn gradient(&self) -> Result<Matrix> {
        self.graph.gradient(self.id)
    }

    pub fn reset_gradient(&self) -> Result<()> {
        self.graph.reset_gradient(self.id)
    }

    pub fn ln(self) -> Self {
        log(self)
    }

    pub fn exp(self) -> Self {
        exp(self)
    }

    pub fn norm_exp(self) -> Self {
        norm_exp(self)
    }

    pub fn relu(self) -> Self {
        relu(self)
    }

    pub fn softmax(self) -> Result<Self> {
        softmax(self)
    }

    pub fn reduce_sum(self) -> Self {
        reduce_sum(self)
    }

    pub fn reduce_prod(self) -> Self {
        reduce_prod(self)
    }

    pub fn matmul(self, rhs: Self) -> Result<Self> {
        matmul(self, rhs)
    }

    pub fn outer(self, rhs: Self) -> Result<Self> {
        outer(self, rhs)
    }
}

impl fmt::Debug for Expr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Expr({}, {}, {:?})",
            self.id,
            self.shape(),
            self.state()
        )
    }
}

impl fmt::Display for Expr<'_> {
    /// Prints the cached value without evaluating anything.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.graph.peek(self.id) {
            Some(v) => write!(f, "{}", v),
            None => write!(f, "<unevaluated {}>", self.shape()),
        }
    }
}

fn binary<'g>(op: Op, a: Expr<'g>, b: Expr<'g>) -> Result<Expr<'g>> {
    if !std::ptr::eq(a.graph, b.graph) {
        return Err(ADError::GraphMismatch);
    }
    let id = a.graph.binary(op, a.id, b.id)?;
    Ok(Expr::new(a.graph, id))
}

#[inline]
fn unary(op: Op, a: Expr<'_>) -> Expr<'_> {
    Expr::new(a.graph, a.graph.unary_unchecked(op, a.id))
}

/// Elementwise sum of two operands of the same shape.
pub fn add<'g>(a: Expr<'g>, b: Expr<'g>) -> Result<Expr<'g>> {
    binary(Op::Add, a, b)
}

pub fn sub<'g>(a: Expr<'g>, b: Expr<'g>) -> Result<Expr<'g>> {
    binary(Op::Sub, a, b)
}

/// Elementwise product of two operands of the same shape.
pub fn mul<'g>(a: Expr<'g>, b: Expr<'g>) -> Result<Expr<'g>> {
    binary(Op::Mul, a, b)
}

/// Elementwise quotient of two operands of the same shape.
pub fn div<'g>(a: Expr<'g>, b: Expr<'g>) -> Result<Expr<'g>> {
    binary(Op::Div, a, b)
}

/// Matrix product; `a.cols` must equal `b.rows` and no dimension may be zero.
pub fn matmul<'g>(a: Expr<'g>, b: Expr<'g>) -> Result<Expr<'g>> {
    binary(Op::Matmul, a, b)
}

/// Outer product of an `n x 1` column `a` and a `1 x m` row `b`.
pub fn outer<'g>(a: Expr<'g>, b: Expr<'g>) -> Result<Expr<'g>> {
    binary(Op::Outer, a, b)
}

pub fn log(a: Expr<'_>) -> Expr<'_> {
    unary(Op::Log, a)
}

pub fn exp(a: Expr<'_>) -> Expr<'_> {
    unary(Op::Exp, a)
}

/// `exp(a - max(a))`, the overflow-free building block of softmax.
pub fn norm_exp(a: Expr<'_>) -> Expr<'_> {
    unary(Op::NormExp, a)
}

/// Leaky rectifier with slope [`LEAK`](crate::operators::LEAK) for negative inputs.
pub fn relu(a: Expr<'_>) -> Expr<'_> {
    unary(Op::Relu, a)
}

/// Softmax of a single column, differentiated through the Jacobian diagonal only
/// (see [`SoftmaxOp`](crate::operators::SoftmaxOp)).
pub fn softmax(a: Expr<'_>) -> Result<Expr<'_>> {
    let id = a.graph.unary(Op::Softmax, a.id)?;
    Ok(Expr::new(a.graph, id))
}

/// Sum of all elements, as a 1x1 node.
pub fn reduce_sum(a: Expr<'_>) -> Expr<'_> {
    unary(Op::ReduceSum, a)
}

/// Product of all elements, as a 1x1 node.
pub fn reduce_prod(a: Expr<'_>) -> Expr<'_> {
    unary(Op::ReduceProd, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn matmul_validates_eagerly() {
        let g = Graph::new();
        let a = g.variable_zeros(2, 3);
        let b = g.variable_zeros(2, 3);
        let before = g.len();
        assert_eq!(
            matmul(a, b).unwrap_err(),
            ADError::ShapeMismatch {
                op: "matmul",
                lhs: Shape::new(2, 3),
                rhs: Shape::new(2, 3)
            }
        );
        assert_eq!(g.len(), before);
        assert_eq!(matmul(a, g.variable_zeros(3, 4)).unwrap().size(), (2, 4));
    }

    #[test]
    fn matmul_rejects_empty_operands() {
        let g = Graph::new();
        let a = g.variable_zeros(0, 3);
        let b = g.variable_zeros(3, 2);
        assert!(matches!(
            matmul(a, b),
            Err(ADError::InvalidShape { op: "matmul", .. })
        ));
    }

    #[test]
    fn outer_requires_column_and_row() {
        let g = Graph::new();
        let col = g.variable_zeros(3, 1);
        let row = g.variable_zeros(1, 4);
        assert_eq!(outer(col, row).unwrap().size(), (3, 4));
        assert!(outer(row, col).is_err());
        assert!(outer(col, col).is_err());
    }

    #[test]
    fn softmax_requires_single_column() {
        let g = Graph::new();
        assert!(softmax(g.variable_zeros(2, 2)).is_err());
        assert_eq!(g.variable_zeros(5, 1).softmax().unwrap().size(), (5, 1));
    }

    #[test]
    fn unary_shapes() {
        let g = Graph::new();
        let x = g.variable_zeros(4, 3);
        assert_eq!(log(x).size(), (4, 3));
        assert_eq!(x.relu().size(), (4, 3));
        assert_eq!(reduce_sum(x).size(), (1, 1));
        assert_eq!(x.reduce_prod().size(), (1, 1));
    }

    #[test]
    fn handles_from_different_graphs_do_not_mix() {
        let g1 = Graph::new();
        let g2 = Graph::new();
        let a = g1.variable_zeros(1, 1);
        let b = g2.variable_zeros(1, 1);
        assert_eq!(add(a, b).unwrap_err(), ADError::GraphMismatch);
    }

    #[test]
    fn display_shows_cached_value_only() {
        let g = Graph::new();
        let x = g.variable(array![[1.0, 2.0]]);
        let f = x.exp();
        assert_eq!(f.to_string(), "<unevaluated 1x2>");
        f.forward().unwrap();
        assert_eq!(f.to_string(), f.forward().unwrap().to_string());
        assert_eq!(x.to_string(), array![[1.0, 2.0]].to_string());
    }

    #[test]
    fn functions_and_methods_agree() {
        let g = Graph::new();
        let x = g.variable(array![[0.5], [1.5]]);
        let a = log(exp(x)).forward().unwrap();
        let b = x.exp().ln().forward().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn leaf_kinds() {
        let g = Graph::new();
        let x = g.variable_zeros(1, 1);
        let c = g.constant_filled(1, 1, 2.0);
        assert!(x.is_variable() && !x.is_constant());
        assert!(c.is_constant() && !c.is_variable());
        let f = add(x, c).unwrap();
        assert!(!f.is_variable() && !f.is_constant());
        assert_eq!(c.value().unwrap(), array![[2.0]]);
    }
}
