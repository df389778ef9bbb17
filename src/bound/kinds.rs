//! kinds.rs
//! Theta-parameterized bound objectives built on a single arrival expression.

use super::Optimizable;
use crate::error::{AnalysisError, Infeasibility, Result};
use crate::holder::{Holder, HolderId, HolderMap, HolderRegistry};
use crate::model::Arrival;
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    /// Backlog value at violation probability `target`, including one slot of arrivals.
    ///
    /// `target` is the violation probability, not a backlog size; the
    /// backlog size is the result.
    Backlog,
    /// Delay value at violation probability `target`. The arrival must be a
    /// net envelope (see [`net_envelope`](crate::model::net_envelope)) whose
    /// rate is negative on a stable system.
    Delay,
    /// Smallest backlog whose violation probability stays below `target`.
    InverseBacklog,
    /// Violation probability of the delay bound `target` (rounded to whole
    /// slots), over a net envelope like `Delay`. Capped at 1.
    InverseDelay,
}

/// A bound objective: one arrival expression, a target, and the Hölder pairs
/// the optimizer may move.
#[derive(Debug, Clone)]
pub struct Bound {
    kind: BoundKind,
    arrival: Arrival,
    target: f64,
    params: HolderMap,
    bound_parameter: Option<HolderId>,
    pinned: Option<Holder>,
    prepared: bool,
}

impl Bound {
    /// Snapshots every pair referenced by `arrival` from `registry`.
    pub fn new(kind: BoundKind, arrival: Arrival, target: f64, registry: &HolderRegistry) -> Result<Self> {
        let params = registry.snapshot(&arrival.parameters())?;
        Ok(Self { kind, arrival, target, params, bound_parameter: None, pinned: None, prepared: false })
    }

    /// Tags the pair injected through a `NewParameter` leaf as the bound's own
    /// variable. It is held at its registry value and never searched over.
    pub fn with_bound_parameter(mut self, id: HolderId) -> Self {
        self.bound_parameter = Some(id);
        self
    }

    pub fn kind(&self) -> BoundKind { self.kind }
    pub fn target(&self) -> f64 { self.target }
    pub fn arrival(&self) -> &Arrival { &self.arrival }
    pub fn bound_parameter(&self) -> Option<&Holder> { self.pinned.as_ref() }

    /// Evaluates at `theta` with the bound's current parameter values.
    pub fn evaluate_at(&self, theta: f64) -> Result<f64> {
        self.evaluate(theta, &self.params)
    }

    fn with_pinned<'a>(&self, nuisance: &'a HolderMap) -> Cow<'a, HolderMap> {
        match self.pinned {
            Some(pinned) => {
                let mut full = nuisance.clone();
                full.insert(pinned.id(), pinned);
                Cow::Owned(full)
            }
            None => Cow::Borrowed(nuisance),
        }
    }
}

impl Optimizable for Bound {
    fn prepare(&mut self) -> Result<()> {
        if self.prepared {
            return Ok(());
        }
        if let Some(id) = self.bound_parameter {
            let holder = self.params.remove(&id).ok_or_else(|| {
                AnalysisError::InvalidArgument(format!(
                    "bound parameter {} does not occur in the arrival expression", id
                ))
            })?;
            self.pinned = Some(holder);
        }
        self.prepared = true;
        Ok(())
    }

    fn evaluate(&self, theta: f64, params: &HolderMap) -> Result<f64> {
        if theta.is_nan() || theta <= 0.0 {
            return Err(AnalysisError::InvalidArgument(format!("theta must be positive, got {}", theta)));
        }
        let full = self.with_pinned(params);
        let (sigma, rho) = self.arrival.sigma_rho(theta, &full)?;
        // ln(mgf(θ, m, n))/θ == σ + ρ(n - m), taken in log space to avoid overflow
        let log_violation = -self.target.ln() / theta;

        match self.kind {
            BoundKind::Backlog => Ok(log_violation + sigma + rho),
            BoundKind::Delay => {
                if rho.is_nan() || rho >= 0.0 {
                    return Err(Infeasibility::ServerOverload { theta }.into());
                }
                Ok(-(log_violation + sigma) / rho)
            }
            BoundKind::InverseBacklog => Ok(log_violation + sigma),
            BoundKind::InverseDelay => {
                if rho.is_nan() || rho >= 0.0 {
                    return Err(Infeasibility::ServerOverload { theta }.into());
                }
                let slots = self.target.round();
                Ok((theta * (sigma + rho * slots)).exp().min(1.0))
            }
        }
    }

    fn holder_parameters(&self) -> &HolderMap {
        &self.params
    }

    fn maximum_theta(&self) -> f64 {
        self.arrival.max_theta()
    }
}
