//! Moment-generating-function bounds for stochastic network calculus.
//!
//! Arrivals and services are described by `(sigma(θ), rho(θ))` pairs built
//! from an immutable [`Function`] tree. Composing them (multiplexing, output,
//! leftover service, concatenation) tracks flow and vertex dependencies and
//! introduces Hölder pairs where correlated operands meet. A [`Bound`] turns
//! the resulting arrival into a performance number, and [`SimpleGradient`]
//! searches theta and the free Hölder exponents for the tightest value.

pub mod analysis;
pub mod bound;
pub mod config;
pub mod error;
pub mod function;
pub mod holder;
pub mod model;
pub mod solver;

pub use analysis::{analyze, compute_bound, compute_bounds, BoundJob, BoundReport, BoundRequest};
pub use bound::{Bound, BoundFactory, BoundKind, BoundType, Optimizable};
pub use config::SearchConfig;
pub use error::{AnalysisError, Infeasibility, Result};
pub use function::Function;
pub use holder::{Holder, HolderId, HolderMap, HolderRegistry};
pub use model::{
    convolve, leftover, multiplex, net_envelope, output, Arrival, ArrivalFactory, Service, ServiceFactory,
};
pub use solver::{Optimum, SimpleGradient};
