//! Search configuration for the bound optimizer.
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Step sizes and budget of a `SimpleGradient` run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Step along theta; also the starting theta.
    #[serde(default = "default_theta_granularity")]
    pub theta_granularity: f64,

    /// Step along each Hölder exponent.
    #[serde(default = "default_holder_granularity")]
    pub holder_granularity: f64,

    /// Upper bound on committed moves. The search stops early once no
    /// neighbor improves.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_theta_granularity() -> f64 { 0.01 }
fn default_holder_granularity() -> f64 { 0.1 }
fn default_max_iterations() -> usize { 100_000 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            theta_granularity: default_theta_granularity(),
            holder_granularity: default_holder_granularity(),
            max_iterations: default_max_iterations(),
        }
    }
}

impl SearchConfig {
    pub fn new(theta_granularity: f64, holder_granularity: f64) -> Result<Self> {
        let config = Self { theta_granularity, holder_granularity, ..Self::default() };
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, step) in [
            ("theta_granularity", self.theta_granularity),
            ("holder_granularity", self.holder_granularity),
        ] {
            if !step.is_finite() || step <= 0.0 {
                return Err(AnalysisError::InvalidArgument(format!(
                    "{} must be a positive number, got {}", name, step
                )));
            }
        }
        if self.max_iterations == 0 {
            return Err(AnalysisError::InvalidArgument("max_iterations must be at least 1".into()));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| AnalysisError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AnalysisError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&raw)
    }
}
