//! Reverse-mode automatic differentiation over small dense 2-D arrays.
//!
//! Leaves ([`Graph::variable`], [`Graph::constant`]) and operator nodes live in a [`Graph`]
//! arena. Evaluating a node caches its value and the values below it; a backward pass then
//! chains gradients from the evaluated node down to the variables, which accumulate them.
//!
//! ```
//! use matrix_ad::prelude::*;
//! use ndarray::array;
//!
//! let g = Graph::new();
//! let x = g.variable(array![[1.0], [2.0]]);
//! let f = reduce_sum(x * x);
//! assert_eq!(f.forward().unwrap(), array![[5.0]]);
//! f.backward().unwrap();
//! assert_eq!(x.gradient().unwrap(), array![[2.0], [4.0]]);
//! ```

pub mod config;
pub mod errors;
pub mod expr;
pub mod graph;
pub mod node;
pub mod numeric;
pub mod operators;
pub mod prelude;
mod overloads;

pub use graph::Graph;
