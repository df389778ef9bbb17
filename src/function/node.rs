//! node.rs
//! Immutable expression nodes with cached validity bound and parameter set.

use crate::error::{AnalysisError, Result};
use crate::holder::HolderId;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Which side of a Hölder pair a scaled term is divided by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exponent {
    P,
    Q,
}

/// Defines the calculation performed by a node.
///
/// Leaves are the closed-form sigma/rho terms of the traffic and service
/// models; the remaining variants combine other nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionKind {
    Constant(f64),
    /// Log-MGF of an exponentially distributed increment, divided by theta.
    ExponentialSigma { lambda: f64 },
    /// Exponentially bounded burstiness.
    EbbSigma { decay: f64, prefactor: f64 },
    /// Stationary token bucket with bucket size `bucket`.
    StationaryTbSigma { bucket: f64, max_theta: f64 },
    /// Compound Poisson rate; `packet` is the per-packet log-MGF over theta.
    PoissonRho { packet: Function, mu: f64 },
    /// Sum, or the Hölder-weighted sum `f/p + g/q` when `holder` is set.
    Additive { left: Function, right: Function, holder: Option<HolderId> },
    Maximum { left: Function, right: Function, holder: Option<HolderId> },
    /// `-(1/theta) ln(1 - e^{theta f})`, the geometric-sum term of a stable queue.
    B { inner: Function },
    Scaled { inner: Function, holder: HolderId, exponent: Exponent },
    Minus { inner: Function },
    /// Free variable whose value is the `p` of the referenced pair.
    NewParameter { holder: HolderId },
}

#[derive(Debug, PartialEq)]
pub struct FunctionNode {
    pub(crate) kind: FunctionKind,
    pub(crate) max_theta: f64,
    pub(crate) params: BTreeSet<HolderId>,
}

/// Shared handle to an immutable node. Cloning is cheap; subtrees are shared
/// between the expressions that reference them.
#[derive(Debug, Clone, PartialEq)]
pub struct Function(Arc<FunctionNode>);

impl Function {
    fn build(kind: FunctionKind) -> Self {
        let (max_theta, params) = derive_bounds(&kind);
        Self(Arc::new(FunctionNode { kind, max_theta, params }))
    }

    // --- Leaves ---

    pub fn constant(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(bad_init(format!("constant must be finite, got {}", value)));
        }
        Ok(Self::build(FunctionKind::Constant(value)))
    }

    /// The zero constant, used for deterministic sigma terms.
    pub fn zero() -> Self {
        Self::build(FunctionKind::Constant(0.0))
    }

    pub fn exponential_sigma(lambda: f64) -> Result<Self> {
        require_positive("lambda", lambda)?;
        Ok(Self::build(FunctionKind::ExponentialSigma { lambda }))
    }

    pub fn ebb_sigma(decay: f64, prefactor: f64) -> Result<Self> {
        require_positive("decay", decay)?;
        require_positive("prefactor", prefactor)?;
        Ok(Self::build(FunctionKind::EbbSigma { decay, prefactor }))
    }

    pub fn stationary_tb_sigma(bucket: f64) -> Result<Self> {
        Self::stationary_tb_sigma_bounded(bucket, f64::INFINITY)
    }

    pub fn stationary_tb_sigma_bounded(bucket: f64, max_theta: f64) -> Result<Self> {
        require_positive("bucket", bucket)?;
        if max_theta.is_nan() || max_theta <= 0.0 {
            return Err(bad_init(format!("max_theta must be positive, got {}", max_theta)));
        }
        Ok(Self::build(FunctionKind::StationaryTbSigma { bucket, max_theta }))
    }

    pub fn poisson_rho(packet: Function, mu: f64) -> Result<Self> {
        require_positive("mu", mu)?;
        Ok(Self::build(FunctionKind::PoissonRho { packet, mu }))
    }

    pub fn new_parameter(holder: HolderId) -> Self {
        Self::build(FunctionKind::NewParameter { holder })
    }

    // --- Combinators ---

    pub fn add(left: Function, right: Function) -> Self {
        Self::build(FunctionKind::Additive { left, right, holder: None })
    }

    pub fn add_dependent(left: Function, right: Function, holder: HolderId) -> Self {
        Self::build(FunctionKind::Additive { left, right, holder: Some(holder) })
    }

    pub fn max(left: Function, right: Function) -> Self {
        Self::build(FunctionKind::Maximum { left, right, holder: None })
    }

    pub fn max_dependent(left: Function, right: Function, holder: HolderId) -> Self {
        Self::build(FunctionKind::Maximum { left, right, holder: Some(holder) })
    }

    pub fn b(inner: Function) -> Self {
        Self::build(FunctionKind::B { inner })
    }

    pub fn scaled(inner: Function, holder: HolderId, exponent: Exponent) -> Self {
        Self::build(FunctionKind::Scaled { inner, holder, exponent })
    }

    pub fn minus(inner: Function) -> Self {
        Self::build(FunctionKind::Minus { inner })
    }

    // --- Accessors ---

    pub fn kind(&self) -> &FunctionKind { &self.0.kind }

    /// Upper bound on theta; evaluation past it is undefined.
    pub fn max_theta(&self) -> f64 { self.0.max_theta }

    /// Every Hölder id referenced anywhere in this expression.
    pub fn parameters(&self) -> &BTreeSet<HolderId> { &self.0.params }

    /// True when both handles point at the same node.
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

fn derive_bounds(kind: &FunctionKind) -> (f64, BTreeSet<HolderId>) {
    match kind {
        FunctionKind::Constant(_) => (f64::INFINITY, BTreeSet::new()),
        FunctionKind::ExponentialSigma { lambda } => (*lambda, BTreeSet::new()),
        FunctionKind::EbbSigma { decay, .. } => (*decay, BTreeSet::new()),
        FunctionKind::StationaryTbSigma { max_theta, .. } => (*max_theta, BTreeSet::new()),
        FunctionKind::PoissonRho { packet, .. } => (packet.max_theta(), packet.parameters().clone()),
        FunctionKind::Additive { left, right, holder }
        | FunctionKind::Maximum { left, right, holder } => {
            let mut params: BTreeSet<HolderId> = left.parameters().union(right.parameters()).copied().collect();
            params.extend(*holder);
            (left.max_theta().min(right.max_theta()), params)
        }
        FunctionKind::B { inner } | FunctionKind::Minus { inner } => {
            (inner.max_theta(), inner.parameters().clone())
        }
        FunctionKind::Scaled { inner, holder, .. } => {
            let mut params = inner.parameters().clone();
            params.insert(*holder);
            (inner.max_theta(), params)
        }
        FunctionKind::NewParameter { holder } => (f64::INFINITY, BTreeSet::from([*holder])),
    }
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(bad_init(format!("{} must be positive and finite, got {}", name, value)))
    }
}

fn bad_init(msg: String) -> AnalysisError {
    AnalysisError::BadInitialization(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::NAN)]
    fn test_exponential_rejects_non_positive_rate(#[case] lambda: f64) {
        let err = Function::exponential_sigma(lambda).unwrap_err();
        assert!(matches!(err, AnalysisError::BadInitialization(_)));
    }

    #[rstest]
    #[case(0.0, 1.0)]
    #[case(-0.5, 1.0)]
    #[case(1.0, 0.0)]
    fn test_ebb_rejects_bad_parameters(#[case] decay: f64, #[case] prefactor: f64) {
        assert!(Function::ebb_sigma(decay, prefactor).is_err());
    }

    #[test]
    fn test_bucket_must_be_positive() {
        assert!(Function::stationary_tb_sigma(0.0).is_err());
        assert!(Function::stationary_tb_sigma(2.0).is_ok());
    }

    #[test]
    fn test_max_theta_is_min_over_operands() {
        let f = Function::exponential_sigma(3.0).unwrap();
        let g = Function::ebb_sigma(1.5, 2.0).unwrap();
        let sum = Function::add(f.clone(), Function::b(g.clone()));
        assert_eq!(sum.max_theta(), 1.5);
        assert_eq!(Function::minus(f).max_theta(), 3.0);
        assert_eq!(Function::zero().max_theta(), f64::INFINITY);
    }

    #[test]
    fn test_parameters_collect_every_holder_in_the_tree() {
        let f = Function::zero();
        let g = Function::new_parameter(HolderId(4));
        let inner = Function::add_dependent(f, g, HolderId(1));
        let outer = Function::scaled(inner, HolderId(2), Exponent::Q);
        let ids: Vec<_> = outer.parameters().iter().copied().collect();
        assert_eq!(ids, vec![HolderId(1), HolderId(2), HolderId(4)]);
    }

    #[test]
    fn test_subtrees_are_shared() {
        let f = Function::exponential_sigma(2.0).unwrap();
        let sum = Function::add(f.clone(), f.clone());
        match sum.kind() {
            FunctionKind::Additive { left, right, .. } => {
                assert!(left.ptr_eq(&f));
                assert!(right.ptr_eq(&f));
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }
}
