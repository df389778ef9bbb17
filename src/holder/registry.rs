use super::types::*;
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Owns the Hölder pairs of one analysis context.
///
/// Ids are allocated from a per-registry counter, so two networks analysed
/// side by side never collide.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RegistryRecord")]
pub struct HolderRegistry {
    next_id: u32,
    holders: HolderMap,
}

/// Unchecked wire form of a registry.
#[derive(Deserialize)]
struct RegistryRecord {
    next_id: u32,
    holders: HolderMap,
}

impl TryFrom<RegistryRecord> for HolderRegistry {
    type Error = AnalysisError;

    /// Rebuilds every pair from its `p` and requires the counter to lie past
    /// every stored id, so `allocate` never reuses a live id.
    fn try_from(record: RegistryRecord) -> Result<Self> {
        let mut holders = HolderMap::new();
        for (id, stored) in record.holders {
            if stored.id() != id {
                return Err(AnalysisError::InvalidArgument(format!(
                    "Hölder stored under id {} carries id {}", id, stored.id()
                )));
            }
            if id.0 >= record.next_id {
                return Err(AnalysisError::InvalidArgument(format!(
                    "Hölder id {} is not below the next id {}", id, record.next_id
                )));
            }
            holders.insert(id, Holder::new(id, stored.p())?);
        }
        Ok(Self { next_id: record.next_id, holders })
    }
}

impl HolderRegistry {
    pub fn new() -> Self { Self::default() }
    pub fn count(&self) -> usize { self.holders.len() }

    /// Allocates a fresh conjugate pair, starting at `p = q = 2`.
    pub fn allocate(&mut self) -> HolderId {
        let id = HolderId(self.next_id);
        self.next_id += 1;
        self.holders.insert(id, Holder::symmetric(id));
        id
    }

    /// Allocates a pair used as a free variable holder: its `p` carries `value`.
    pub fn new_parameter(&mut self, value: f64) -> Result<HolderId> {
        let id = HolderId(self.next_id);
        let holder = Holder::new(id, value)?;
        self.next_id += 1;
        self.holders.insert(id, holder);
        Ok(id)
    }

    pub fn get(&self, id: HolderId) -> Option<&Holder> {
        self.holders.get(&id)
    }

    pub fn set_p(&mut self, id: HolderId, p: f64) -> Result<()> {
        self.holders
            .get_mut(&id)
            .ok_or_else(|| AnalysisError::InvalidArgument(format!("Unknown Hölder id {}", id)))?
            .set_p(p)
    }

    /// Copies the requested pairs into an evaluation map.
    pub fn snapshot(&self, ids: &BTreeSet<HolderId>) -> Result<HolderMap> {
        ids.iter()
            .map(|id| {
                self.holders
                    .get(id)
                    .map(|h| (*id, *h))
                    .ok_or_else(|| AnalysisError::InvalidArgument(format!(
                        "Hölder id {} was not allocated by this registry", id
                    )))
            })
            .collect()
    }
}
