//! Arrival/service envelopes, their factories, and the composition operators.
pub mod compose;
pub mod factory;
pub mod flow;

pub use compose::{convolve, leftover, multiplex, net_envelope, output};
pub use factory::{ArrivalFactory, ServiceFactory};
pub use flow::{Arrival, Dependencies, FlowId, Service, VertexId};
