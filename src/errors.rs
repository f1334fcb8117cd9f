//! Error types for the automatic differentiation crate.

use std::fmt;

use thiserror::Error;

use crate::node::NodeId;
use crate::numeric::Shape;

/// The point of a pass at which a non-finite value was observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// A node's forward value.
    Forward,
    /// A local partial derivative computed during the backward pass.
    LocalDerivative,
    /// An upstream or chained gradient flowing through the backward pass.
    Gradient,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Forward => write!(f, "forward value"),
            Stage::LocalDerivative => write!(f, "local derivative"),
            Stage::Gradient => write!(f, "gradient"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
/// Error variants for graph construction and evaluation.
pub enum ADError {
    #[error("{op}: incompatible operand shapes {lhs} and {rhs}")]
    /// Two operands cannot be combined by the operator.
    ShapeMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },
    #[error("{op}: operand of shape {shape} must be {expected}")]
    /// A single operand violates the operator's shape requirement.
    InvalidShape {
        op: &'static str,
        shape: Shape,
        expected: &'static str,
    },
    #[error("Gradient shape {found} does not match node {node} of shape {expected}")]
    /// An incoming gradient does not fit the node.
    GradientShape {
        node: NodeId,
        expected: Shape,
        found: Shape,
    },
    #[error("Non-finite {stage} at node {node}")]
    /// NaN or infinity reached a node while the graph runs in strict mode.
    NonFinite { node: NodeId, stage: Stage },
    #[error("Node {0} was differentiated before being evaluated")]
    /// Backward pass requested on an expression whose forward cache is cold.
    NotEvaluated(NodeId),
    #[error("Value shape {found} does not match node {node} of shape {expected}")]
    /// A replacement leaf value would change the node's shape.
    ValueShape {
        node: NodeId,
        expected: Shape,
        found: Shape,
    },
    #[error("Node {0} is not a leaf")]
    /// A value accessor was used on an expression.
    NotALeaf(NodeId),
    #[error("Node {0} is not a variable")]
    /// A gradient accessor was used on a node without an accumulator.
    NotAVariable(NodeId),
    #[error("Operands belong to different graphs")]
    /// Handles from two different graphs were combined.
    GraphMismatch,
}

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, ADError>;
