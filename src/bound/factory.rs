use super::kinds::{Bound, BoundKind};
use super::BoundType;
use crate::error::{AnalysisError, Result};
use crate::holder::HolderRegistry;
use crate::model::Arrival;

pub struct BoundFactory;

impl BoundFactory {
    /// Builds the bound objective for `bound_type`.
    ///
    /// `target` is a violation probability in `(0, 1]` for backlog, delay and
    /// inverse backlog, and a delay bound for inverse delay. `Output` has no
    /// scalar objective and is rejected here.
    pub fn create(
        bound_type: BoundType,
        arrival: Arrival,
        target: f64,
        registry: &HolderRegistry,
    ) -> Result<Bound> {
        let kind = match bound_type {
            BoundType::Backlog => BoundKind::Backlog,
            BoundType::Delay => BoundKind::Delay,
            BoundType::InverseBacklog => BoundKind::InverseBacklog,
            BoundType::InverseDelay => BoundKind::InverseDelay,
            BoundType::Output => {
                return Err(AnalysisError::InvalidArgument(
                    "OUTPUT requests have no bound objective".into(),
                ))
            }
        };

        match kind {
            BoundKind::InverseDelay => {
                if !target.is_finite() || target < 0.0 {
                    return Err(AnalysisError::InvalidArgument(format!(
                        "delay bound must be a non-negative number, got {}", target
                    )));
                }
            }
            _ => {
                if !(target > 0.0 && target <= 1.0) {
                    return Err(AnalysisError::InvalidArgument(format!(
                        "violation probability must lie in (0, 1], got {}", target
                    )));
                }
            }
        }

        Bound::new(kind, arrival, target, registry)
    }
}
