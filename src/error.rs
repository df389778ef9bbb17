//! error.rs
//! Hard failures vs. infeasible operating points.

use crate::holder::HolderId;
use thiserror::Error;

/// A point in the search space where a bound is undefined.
///
/// The optimizer treats these as `+inf` and keeps searching; a direct evaluation
/// surfaces them as [`AnalysisError::Infeasible`].
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Infeasibility {
    #[error("theta {theta} exceeds the validity bound {max_theta}")]
    ThetaOutOfBound { theta: f64, max_theta: f64 },
    #[error("server overload at theta {theta}: arrival rate is not below the service rate")]
    ServerOverload { theta: f64 },
}

impl Infeasibility {
    /// Rank used to report the most specific kind after an exhausted search.
    pub(crate) fn specificity(&self) -> u8 {
        match self {
            Infeasibility::ThetaOutOfBound { .. } => 0,
            Infeasibility::ServerOverload { .. } => 1,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Bad initialization: {0}")]
    BadInitialization(String),
    #[error("Parameter mismatch: expected {expected:?}, got {actual:?}")]
    ParameterMismatch { expected: Vec<HolderId>, actual: Vec<HolderId> },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Infeasible: {0}")]
    Infeasible(#[from] Infeasibility),
    #[error("Config error: {0}")]
    Config(String),
}

impl AnalysisError {
    pub fn is_infeasible(&self) -> bool {
        matches!(self, AnalysisError::Infeasible(_))
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
