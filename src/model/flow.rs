//! flow.rs
//! Arrival and service envelopes with their dependency bookkeeping.

use crate::error::Result;
use crate::function::eval::check_parameters;
use crate::function::Function;
use crate::holder::{HolderId, HolderMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifies a flow in the (external) network layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlowId(pub u32);

/// Identifies a server (vertex) in the (external) network layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub u32);

/// The flows and servers a quantity is stochastically entangled with.
///
/// Sets only ever grow: composition unions them and nothing removes entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependencies {
    pub arrivals: BTreeSet<FlowId>,
    pub services: BTreeSet<VertexId>,
}

impl Dependencies {
    pub fn new() -> Self { Self::default() }

    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty() && self.services.is_empty()
    }

    /// True when the two quantities share a flow or a server.
    pub fn overlaps(&self, other: &Dependencies) -> bool {
        !self.services.is_disjoint(&other.services) || !self.arrivals.is_disjoint(&other.arrivals)
    }

    pub fn union(&self, other: &Dependencies) -> Dependencies {
        Dependencies {
            arrivals: self.arrivals.union(&other.arrivals).copied().collect(),
            services: self.services.union(&other.services).copied().collect(),
        }
    }

    pub fn is_superset(&self, other: &Dependencies) -> bool {
        self.arrivals.is_superset(&other.arrivals) && self.services.is_superset(&other.services)
    }
}

/// An arrival process bounded by `E[e^{θA(m,n)}] <= e^{θ(ρ(θ)(n-m) + σ(θ))}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrival {
    sigma: Function,
    rho: Function,
    deps: Dependencies,
}

/// A service process in the same (σ, ρ) form. Service rates enter `ρ`
/// negated, so a stable server pushes `ρ_A + ρ_S` below zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    sigma: Function,
    rho: Function,
    deps: Dependencies,
}

impl Arrival {
    pub fn new(sigma: Function, rho: Function) -> Self {
        Self { sigma, rho, deps: Dependencies::new() }
    }

    pub(crate) fn with_dependencies(sigma: Function, rho: Function, deps: Dependencies) -> Self {
        Self { sigma, rho, deps }
    }

    pub fn sigma(&self) -> &Function { &self.sigma }
    pub fn rho(&self) -> &Function { &self.rho }
    pub fn dependencies(&self) -> &Dependencies { &self.deps }
    pub fn arrival_deps(&self) -> &BTreeSet<FlowId> { &self.deps.arrivals }
    pub fn service_deps(&self) -> &BTreeSet<VertexId> { &self.deps.services }

    pub fn add_arrival_dependencies(&mut self, flows: impl IntoIterator<Item = FlowId>) {
        self.deps.arrivals.extend(flows);
    }

    pub fn add_service_dependencies(&mut self, vertices: impl IntoIterator<Item = VertexId>) {
        self.deps.services.extend(vertices);
    }

    /// Union of the Hölder ids used by sigma and rho.
    pub fn parameters(&self) -> BTreeSet<HolderId> {
        self.sigma.parameters().union(self.rho.parameters()).copied().collect()
    }

    /// The θ* of the arrival: the tighter of the sigma and rho bounds.
    pub fn max_theta(&self) -> f64 {
        self.sigma.max_theta().min(self.rho.max_theta())
    }

    /// `(σ(θ), ρ(θ))` under one parameter map covering both trees.
    pub fn sigma_rho(&self, theta: f64, params: &HolderMap) -> Result<(f64, f64)> {
        check_parameters(self.parameters().into_iter(), params)?;
        Ok((self.sigma.value_at(theta, params)?, self.rho.value_at(theta, params)?))
    }

    /// The MGF bound over the interval `(m, n]`.
    pub fn mgf(&self, theta: f64, m: f64, n: f64, params: &HolderMap) -> Result<f64> {
        let (sigma, rho) = self.sigma_rho(theta, params)?;
        Ok((theta * (rho * (n - m) + sigma)).exp())
    }
}

impl Service {
    pub fn new(sigma: Function, rho: Function) -> Self {
        Self { sigma, rho, deps: Dependencies::new() }
    }

    pub(crate) fn with_dependencies(sigma: Function, rho: Function, deps: Dependencies) -> Self {
        Self { sigma, rho, deps }
    }

    pub fn sigma(&self) -> &Function { &self.sigma }
    pub fn rho(&self) -> &Function { &self.rho }
    pub fn dependencies(&self) -> &Dependencies { &self.deps }
    pub fn arrival_deps(&self) -> &BTreeSet<FlowId> { &self.deps.arrivals }
    pub fn service_deps(&self) -> &BTreeSet<VertexId> { &self.deps.services }

    pub fn add_arrival_dependencies(&mut self, flows: impl IntoIterator<Item = FlowId>) {
        self.deps.arrivals.extend(flows);
    }

    pub fn add_service_dependencies(&mut self, vertices: impl IntoIterator<Item = VertexId>) {
        self.deps.services.extend(vertices);
    }

    pub fn parameters(&self) -> BTreeSet<HolderId> {
        self.sigma.parameters().union(self.rho.parameters()).copied().collect()
    }

    pub fn max_theta(&self) -> f64 {
        self.sigma.max_theta().min(self.rho.max_theta())
    }
}
