//! Graph node definitions.

use std::fmt;

use crate::numeric::{Matrix, Shape};
use crate::operators::Op;

/// Stable index of a node inside its [`Graph`](crate::graph::Graph).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of an expression's forward cache.
///
/// `reset` moves any state back to `Uninitialized`. Leaves report `Evaluated` at all times.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
    Uninitialized,
    Evaluated,
    /// Evaluated, and at least one backward pass went through the node.
    Differentiated,
}

/// A node stored in the graph arena.
pub(crate) enum Node {
    /// Leaf with a value and an additive gradient accumulator of the same shape.
    Variable { value: Matrix, gradient: Matrix },
    /// Leaf that absorbs every gradient it receives.
    Constant { value: Matrix },
    /// The 1x1 zero right operand of unary operators. Like a constant it takes no gradient;
    /// the backward pass does not even compute one for it.
    Placeholder { value: Matrix },
    /// An operator applied to two children.
    Expression {
        op: Op,
        a: NodeId,
        b: NodeId,
        shape: Shape,
        cache: Option<Matrix>,
        state: NodeState,
    },
}

impl Node {
    /// Current forward value, or `None` for an expression whose cache is cold.
    #[inline]
    pub(crate) fn value(&self) -> Option<&Matrix> {
        match self {
            Node::Variable { value, .. }
            | Node::Constant { value }
            | Node::Placeholder { value } => Some(value),
            Node::Expression { cache, state, .. } => match state {
                NodeState::Uninitialized => None,
                _ => cache.as_ref(),
            },
        }
    }

    #[inline]
    pub(crate) fn shape(&self) -> Shape {
        match self {
            Node::Variable { value, .. }
            | Node::Constant { value }
            | Node::Placeholder { value } => Shape::of(value),
            Node::Expression { shape, .. } => *shape,
        }
    }

    #[inline]
    pub(crate) fn state(&self) -> NodeState {
        match self {
            Node::Expression { state, .. } => *state,
            _ => NodeState::Evaluated,
        }
    }

    /// Whether gradients reaching this node have anywhere to go.
    #[inline]
    pub(crate) fn is_differentiable(&self) -> bool {
        matches!(self, Node::Variable { .. } | Node::Expression { .. })
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Node::Variable { .. } => "variable",
            Node::Constant { .. } => "constant",
            Node::Placeholder { .. } => "placeholder",
            Node::Expression { op, .. } => op.name(),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Expression {
                op, a, shape, state, ..
            } if op.is_unary() => write!(
                f,
                "Expression {{ op: {:?}, a: {}, shape: {}, state: {:?} }}",
                op, a, shape, state
            ),
            Node::Expression {
                op, a, b, shape, state, ..
            } => write!(
                f,
                "Expression {{ op: {:?}, a: {}, b: {}, shape: {}, state: {:?} }}",
                op, a, b, shape, state
            ),
            _ => write!(f, "{} {{ shape: {} }}", self.kind(), self.shape()),
        }
    }
}
