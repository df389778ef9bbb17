use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct HolderId(pub u32);

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Hölder conjugate pair: `1/p + 1/q = 1` with `p, q > 1`.
///
/// Setting either side recomputes the other, so the pair can never drift
/// out of conjugacy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Holder {
    id: HolderId,
    p: f64,
    q: f64,
}

impl Holder {
    pub fn new(id: HolderId, p: f64) -> Result<Self> {
        let mut holder = Self::symmetric(id);
        holder.set_p(p)?;
        Ok(holder)
    }

    /// The `p = q = 2` starting point.
    pub fn symmetric(id: HolderId) -> Self {
        Self { id, p: 2.0, q: 2.0 }
    }

    pub fn id(&self) -> HolderId { self.id }
    pub fn p(&self) -> f64 { self.p }
    pub fn q(&self) -> f64 { self.q }

    pub fn set_p(&mut self, p: f64) -> Result<()> {
        self.q = conjugate(p)?;
        self.p = p;
        Ok(())
    }

    pub fn set_q(&mut self, q: f64) -> Result<()> {
        self.p = conjugate(q)?;
        self.q = q;
        Ok(())
    }

    /// Copy with a new `p`, leaving `self` untouched.
    pub fn with_p(&self, p: f64) -> Result<Self> {
        let mut next = *self;
        next.set_p(p)?;
        Ok(next)
    }

    pub fn with_q(&self, q: f64) -> Result<Self> {
        let mut next = *self;
        next.set_q(q)?;
        Ok(next)
    }
}

fn conjugate(x: f64) -> Result<f64> {
    if !x.is_finite() || x <= 1.0 {
        return Err(AnalysisError::BadInitialization(format!(
            "Hölder exponent must be a finite value above 1, got {}", x
        )));
    }
    let other = x / (x - 1.0);
    if !other.is_finite() || other <= 1.0 {
        return Err(AnalysisError::BadInitialization(format!(
            "Hölder exponent {} has no usable conjugate", x
        )));
    }
    Ok(other)
}

/// Parameter values supplied to an evaluation, keyed (and iterated) by id.
pub type HolderMap = BTreeMap<HolderId, Holder>;
