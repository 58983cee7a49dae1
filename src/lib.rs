//! Reverse-mode automatic differentiation over scalar values.
//!
//! Arithmetic on [`Value`] handles records a DAG inside a [`Graph`] arena.
//! Calling [`Value::backward`] on any node fills in the gradient of that node
//! with respect to each of its ancestors.
//!
//! ```
//! use scalargrad::Graph;
//!
//! let graph = Graph::new();
//! let a = graph.leaf_labeled(2.0, "a");
//! let b = graph.leaf_labeled(-3.0, "b");
//! let c = graph.leaf_labeled(10.0, "c");
//! let f = graph.leaf_labeled(-2.0, "f");
//!
//! let l = (a * b + c) * f;
//! assert_eq!(l.value(), -8.0);
//!
//! l.backward();
//! assert_eq!(a.grad(), 6.0);
//! assert_eq!(b.grad(), -4.0);
//! assert_eq!(c.grad(), -2.0);
//! assert_eq!(f.grad(), 4.0);
//! ```
//!
//! Gradients accumulate across passes. Call [`Graph::reset_gradients`]
//! before an unrelated pass, or build the graph with
//! `zero_grad_on_backward` set in its [`GraphConfig`].

mod backwards;
pub mod config;
pub mod error;
pub mod finite_diff;
pub mod graph;
pub mod ops;
pub mod value;

pub use config::GraphConfig;
pub use error::{EngineError, Result};
pub use graph::{Graph, NodeId};
pub use ops::Op;
pub use value::{Operand, Value};
