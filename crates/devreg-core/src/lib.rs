//! Device lifecycle and concurrency-safe mutation engine.
//!
//! This crate owns the domain model, the rules, and the storage contract
//! for the devreg workspace:
//!
//! - **[`DeviceRegistry`]**: the façade boundary layers call. Writes go
//!   through the [`MutationCoordinator`], reads through the
//!   [`DeviceQuery`] façade.
//!
//! - **[`LifecyclePolicy`]**: pure rules tying field mutability to
//!   [`DeviceState`]. While a device is `IN_USE`, its name and brand are
//!   locked and it cannot be deleted.
//!
//! - **[`DeviceStore`]**: keyed storage with per-record versions and
//!   atomic compare-and-swap. [`InMemoryDeviceStore`] implements it on a
//!   `DashMap` and persists to JSON snapshots; a [`SnapshotLock`]
//!   serializes writers across processes.
//!
//! - **[`CoreError`]**: `DeviceNotFound`, `IllegalOperation`,
//!   `VersionConflict`, `Validation` and `StorageFault`, each classified by
//!   an [`ErrorKind`] that boundary layers map to their own status codes.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod policy;
pub mod query;
pub mod registry;
pub mod request;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::RegistryConfig;
pub use coordinator::MutationCoordinator;
pub use error::{CoreError, ErrorKind};
pub use policy::{Decision, Denial, LifecyclePolicy};
pub use query::DeviceQuery;
pub use registry::DeviceRegistry;
pub use request::{CreateDeviceRequest, FieldViolation, UpdateDeviceRequest};
pub use store::{
    DeviceFilter, DeviceStore, InMemoryDeviceStore, SnapshotGuard, SnapshotLock, StoreError,
};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    BRAND_MAX_CHARS, Device, DeviceChanges, DeviceId, DeviceState, NAME_MAX_CHARS, NewDevice,
    ParseDeviceIdError, ParseDeviceStateError, RestrictedField,
};
