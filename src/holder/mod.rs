//! Hölder conjugate pairs and the per-context registry that allocates them.
pub mod registry;
pub mod types;

pub use registry::HolderRegistry;
pub use types::{Holder, HolderId, HolderMap};
