//! Bound objectives: turn an arrival expression plus a request into a scalar
//! function of theta that the optimizer can minimize.
pub mod factory;
pub mod kinds;

pub use factory::BoundFactory;
pub use kinds::{Bound, BoundKind};

use crate::error::Result;
use crate::holder::HolderMap;
use serde::{Deserialize, Serialize};

/// The analysis requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoundType {
    Backlog,
    Delay,
    InverseBacklog,
    InverseDelay,
    /// The departure process itself; there is no scalar objective to optimize.
    Output,
}

/// An objective the optimizer can search over.
pub trait Optimizable {
    /// One-time normalization before the search (e.g. pinning the bound's own
    /// free parameter). Calling it again is a no-op.
    fn prepare(&mut self) -> Result<()>;

    /// Objective value at `theta` under the nuisance parameters `params`.
    fn evaluate(&self, theta: f64, params: &HolderMap) -> Result<f64>;

    /// The Hölder pairs free for optimization.
    fn holder_parameters(&self) -> &HolderMap;

    /// Theta must stay strictly below this value.
    fn maximum_theta(&self) -> f64;
}
