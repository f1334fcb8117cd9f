pub use crate::config::{GraphConfig, Mode};
pub use crate::errors::{ADError, Result, Stage};
pub use crate::expr::{
    add, div, exp, log, matmul, mul, norm_exp, outer, reduce_prod, reduce_sum, relu, softmax,
    sub, Expr,
};
pub use crate::graph::Graph;
pub use crate::node::{NodeId, NodeState};
pub use crate::numeric::{Matrix, Shape};
pub use crate::operators::Op;
