// ── Device store ──
//
// Durable keyed storage with per-record version stamps. Every backend must
// make the version check and the write a single atomic step per identifier;
// the coordinator relies on that and holds no locks of its own.

mod memory;
mod snapshot;

use std::future::Future;

use thiserror::Error;

use crate::model::{Device, DeviceId, DeviceState, NewDevice};

pub use memory::InMemoryDeviceStore;
pub use snapshot::{SnapshotGuard, SnapshotLock};

/// Failure of a single store operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("version conflict: expected {expected}, stored {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    #[error("{0}")]
    Fault(String),
}

/// Predicate for [`DeviceStore::scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceFilter {
    All,
    /// Exact, case-sensitive brand match.
    Brand(String),
    State(DeviceState),
}

impl DeviceFilter {
    pub fn matches(&self, device: &Device) -> bool {
        match self {
            Self::All => true,
            Self::Brand(brand) => device.brand == *brand,
            Self::State(state) => device.state == *state,
        }
    }
}

/// Storage backend contract.
///
/// Methods return `Send` futures so registries can be driven from
/// multi-threaded runtimes.
pub trait DeviceStore: Send + Sync {
    /// Persist a new device. The store assigns `id`, `creation_time` and
    /// `version = 0`.
    fn insert(
        &self,
        device: NewDevice,
    ) -> impl Future<Output = Result<Device, StoreError>> + Send;

    fn get(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, StoreError>> + Send;

    /// All devices matching `filter`. Order is unspecified.
    fn scan(
        &self,
        filter: &DeviceFilter,
    ) -> impl Future<Output = Result<Vec<Device>, StoreError>> + Send;

    /// Apply `mutator` to the stored record only if its version equals
    /// `expected_version`, persisting the result with the version bumped
    /// by one. `id` and `creation_time` survive the mutator untouched.
    fn conditional_update<F>(
        &self,
        id: &DeviceId,
        expected_version: u64,
        mutator: F,
    ) -> impl Future<Output = Result<Device, StoreError>> + Send
    where
        F: FnOnce(&mut Device) + Send;

    /// Remove the record only if its version equals `expected_version`.
    fn conditional_delete(
        &self,
        id: &DeviceId,
        expected_version: u64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
