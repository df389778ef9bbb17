use crate::error::{AnalysisError, Infeasibility, Result};
use crate::holder::{HolderId, HolderMap};
use serde::Serialize;

/// One committed move of the search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchStep {
    pub iteration: usize,
    pub theta: f64,
    pub value: f64,
}

/// The best point found by a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Optimum {
    pub value: f64,
    pub theta: f64,
    pub holders: HolderMap,
    pub iterations: usize,
    pub trace: Vec<SearchStep>,
}

/// A candidate point. Trials are built as fresh copies, so a rejected
/// neighbor never leaks into the current point.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SearchPoint {
    pub theta: f64,
    pub params: HolderMap,
}

/// Single-coordinate moves, in scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Move {
    ThetaDown,
    ThetaUp,
    TowardSmallerP(HolderId),
    TowardLargerP(HolderId),
}

/// Folds evaluation outcomes into a search score, remembering the most
/// specific infeasibility seen.
#[derive(Debug, Default)]
pub(crate) struct Scorer {
    pub worst: Option<Infeasibility>,
}

impl Scorer {
    /// `Infeasible` and undefined values score `+inf`; hard errors propagate.
    pub fn score(&mut self, outcome: Result<f64>) -> Result<f64> {
        match outcome {
            Ok(v) if v.is_nan() => Ok(f64::INFINITY),
            Ok(v) => Ok(v),
            Err(AnalysisError::Infeasible(kind)) => {
                let replace = self.worst.map_or(true, |w| kind.specificity() >= w.specificity());
                if replace {
                    self.worst = Some(kind);
                }
                Ok(f64::INFINITY)
            }
            Err(e) => Err(e),
        }
    }

    /// The failure reported when no visited point was feasible.
    pub fn exhausted(&self) -> AnalysisError {
        match self.worst {
            Some(kind) => AnalysisError::Infeasible(kind),
            None => AnalysisError::InvalidArgument("bound is undefined at every visited point".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scorer_maps_infeasible_to_infinity() {
        let mut s = Scorer::default();
        let out = s.score(Err(Infeasibility::ThetaOutOfBound { theta: 2.0, max_theta: 1.0 }.into()));
        assert_eq!(out.unwrap(), f64::INFINITY);
        assert_eq!(s.score(Ok(f64::NAN)).unwrap(), f64::INFINITY);
        assert_eq!(s.score(Ok(3.0)).unwrap(), 3.0);
    }

    #[test]
    fn test_scorer_prefers_overload_over_theta_bound() {
        let mut s = Scorer::default();
        s.score(Err(Infeasibility::ServerOverload { theta: 0.1 }.into())).unwrap();
        s.score(Err(Infeasibility::ThetaOutOfBound { theta: 3.0, max_theta: 2.0 }.into())).unwrap();
        assert_eq!(s.exhausted(), AnalysisError::Infeasible(Infeasibility::ServerOverload { theta: 0.1 }));
    }

    #[test]
    fn test_scorer_propagates_hard_errors() {
        let mut s = Scorer::default();
        let err = s.score(Err(AnalysisError::ParameterMismatch { expected: vec![], actual: vec![] }));
        assert!(err.is_err());
        assert!(matches!(s.exhausted(), AnalysisError::InvalidArgument(_)));
    }
}
