//! request.rs
//! Entry point: one arrival expression, one request, one number.

use crate::bound::{BoundFactory, BoundType};
use crate::config::SearchConfig;
use crate::error::Result;
use crate::holder::{HolderId, HolderRegistry};
use crate::model::Arrival;
use crate::solver::SimpleGradient;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundRequest {
    pub bound_type: BoundType,
    /// Violation probability, or the delay bound for `INVERSE_DELAY`.
    pub target: f64,
    /// Pair injected through a `NewParameter` leaf that carries the bound's
    /// own variable; it is held fixed rather than optimized.
    #[serde(default)]
    pub bound_parameter: Option<HolderId>,
}

impl BoundRequest {
    pub fn new(bound_type: BoundType, target: f64) -> Self {
        Self { bound_type, target, bound_parameter: None }
    }

    pub fn with_bound_parameter(mut self, id: HolderId) -> Self {
        self.bound_parameter = Some(id);
        self
    }
}

/// The outcome of a request, including where the optimum was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundReport {
    pub bound_type: BoundType,
    pub target: f64,
    /// `NaN` for `OUTPUT` requests.
    pub value: f64,
    pub theta: Option<f64>,
    /// Optimal `p` of each nuisance pair.
    pub holders: BTreeMap<HolderId, f64>,
    pub iterations: usize,
}

/// Runs one request against `arrival` and returns the full report.
pub fn analyze(
    arrival: &Arrival,
    registry: &HolderRegistry,
    request: &BoundRequest,
    config: &SearchConfig,
) -> Result<BoundReport> {
    let solver = SimpleGradient::new(*config)?;

    if request.bound_type == BoundType::Output {
        return Ok(BoundReport {
            bound_type: request.bound_type,
            target: request.target,
            value: f64::NAN,
            theta: None,
            holders: BTreeMap::new(),
            iterations: 0,
        });
    }

    let mut bound = BoundFactory::create(request.bound_type, arrival.clone(), request.target, registry)?;
    if let Some(id) = request.bound_parameter {
        bound = bound.with_bound_parameter(id);
    }

    let optimum = solver.minimize(&mut bound)?;
    info!(
        bound_type = ?request.bound_type,
        target = request.target,
        value = optimum.value,
        "bound computed"
    );

    Ok(BoundReport {
        bound_type: request.bound_type,
        target: request.target,
        value: optimum.value,
        theta: Some(optimum.theta),
        holders: optimum.holders.iter().map(|(id, h)| (*id, h.p())).collect(),
        iterations: optimum.iterations,
    })
}

/// Runs one request and returns only the bound value.
pub fn compute_bound(
    arrival: &Arrival,
    registry: &HolderRegistry,
    request: &BoundRequest,
    config: &SearchConfig,
) -> Result<f64> {
    analyze(arrival, registry, request, config).map(|report| report.value)
}
