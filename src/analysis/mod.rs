//! Request-level facade over bounds and the optimizer.
pub mod batch;
pub mod request;

pub use batch::{compute_bounds, BoundJob};
pub use request::{analyze, compute_bound, BoundReport, BoundRequest};
