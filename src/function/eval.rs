//! eval.rs
//! Recursive evaluation of a function tree at a given theta.

use super::node::{Exponent, Function, FunctionKind};
use crate::error::{AnalysisError, Infeasibility, Result};
use crate::holder::{Holder, HolderId, HolderMap};

impl Function {
    /// Evaluates the expression at `theta`.
    ///
    /// The key set of `params` must equal [`Function::parameters`] exactly;
    /// extra or missing pairs are a `ParameterMismatch`.
    pub fn evaluate(&self, theta: f64, params: &HolderMap) -> Result<f64> {
        check_parameters(self.parameters().iter().copied(), params)?;
        self.value_at(theta, params)
    }

    /// Evaluation without the entry check. Lookups still fail cleanly if a
    /// referenced pair is absent.
    pub(crate) fn value_at(&self, theta: f64, params: &HolderMap) -> Result<f64> {
        match self.kind() {
            FunctionKind::Constant(c) => Ok(*c),

            FunctionKind::ExponentialSigma { lambda } => {
                if theta >= *lambda {
                    return Err(out_of_bound(theta, *lambda));
                }
                Ok((lambda / (lambda - theta)).ln() / theta)
            }

            FunctionKind::EbbSigma { decay, prefactor } => {
                // ln(1 - θ/d) diverges at the endpoint
                if theta >= *decay {
                    return Err(out_of_bound(theta, *decay));
                }
                Ok(prefactor.ln() / decay - (1.0 - theta / decay).ln() / theta)
            }

            FunctionKind::StationaryTbSigma { bucket, max_theta } => {
                if theta > *max_theta {
                    return Err(out_of_bound(theta, *max_theta));
                }
                // ln(cosh(theta*B))/theta, rewritten so e^{theta*B} never overflows
                let x = theta * bucket;
                Ok((x.abs() + (0.5 * (1.0 + (-2.0 * x.abs()).exp())).ln()) / theta)
            }

            FunctionKind::PoissonRho { packet, mu } => {
                let rho = packet.value_at(theta, params)?;
                Ok(mu / theta * ((theta * rho).exp() - 1.0))
            }

            FunctionKind::Additive { left, right, holder } => {
                let (l, r) = weighted(left, right, *holder, theta, params)?;
                Ok(l + r)
            }

            FunctionKind::Maximum { left, right, holder } => {
                let (l, r) = weighted(left, right, *holder, theta, params)?;
                Ok(l.max(r))
            }

            FunctionKind::B { inner } => {
                let rate = inner.value_at(theta, params)?;
                let arg = 1.0 - (theta * rate).exp();
                if arg.is_nan() || arg <= 0.0 {
                    return Err(Infeasibility::ServerOverload { theta }.into());
                }
                Ok(-arg.ln() / theta)
            }

            FunctionKind::Scaled { inner, holder, exponent } => {
                let h = lookup(*holder, params)?;
                let value = inner.value_at(theta, params)?;
                Ok(match exponent {
                    Exponent::P => value / h.p(),
                    Exponent::Q => value / h.q(),
                })
            }

            FunctionKind::Minus { inner } => Ok(-inner.value_at(theta, params)?),

            FunctionKind::NewParameter { holder } => Ok(lookup(*holder, params)?.p()),
        }
    }
}

fn weighted(
    left: &Function,
    right: &Function,
    holder: Option<HolderId>,
    theta: f64,
    params: &HolderMap,
) -> Result<(f64, f64)> {
    let l = left.value_at(theta, params)?;
    let r = right.value_at(theta, params)?;
    match holder {
        None => Ok((l, r)),
        Some(id) => {
            let h = lookup(id, params)?;
            Ok((l / h.p(), r / h.q()))
        }
    }
}

fn lookup(id: HolderId, params: &HolderMap) -> Result<&Holder> {
    params.get(&id).ok_or_else(|| AnalysisError::ParameterMismatch {
        expected: vec![id],
        actual: params.keys().copied().collect(),
    })
}

fn out_of_bound(theta: f64, max_theta: f64) -> AnalysisError {
    Infeasibility::ThetaOutOfBound { theta, max_theta }.into()
}

/// Fails unless `params` carries exactly the ids in `expected`.
pub(crate) fn check_parameters(
    expected: impl Iterator<Item = HolderId>,
    params: &HolderMap,
) -> Result<()> {
    let expected: Vec<HolderId> = expected.collect();
    if expected.len() != params.len() || expected.iter().any(|id| !params.contains_key(id)) {
        return Err(AnalysisError::ParameterMismatch {
            expected,
            actual: params.keys().copied().collect(),
        });
    }
    Ok(())
}
