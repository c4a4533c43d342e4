//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use devreg_core::{
    CoreError, DeviceRegistry, InMemoryDeviceStore, SnapshotGuard, SnapshotLock,
    UpdateDeviceRequest,
};

use crate::config::Settings;
use crate::error::CliError;

pub type Registry = DeviceRegistry<InMemoryDeviceStore>;

fn wrap(store: InMemoryDeviceStore, settings: &Settings) -> Registry {
    debug!(
        path = %settings.store_path.display(),
        devices = store.len(),
        retries = settings.registry.max_conflict_retries,
        "opened registry"
    );
    DeviceRegistry::new(Arc::new(store), settings.registry)
}

/// Load the snapshot for reading only.
pub fn open_registry(settings: &Settings) -> Result<Registry, CliError> {
    let store = InMemoryDeviceStore::load(&settings.store_path).map_err(CoreError::from)?;
    Ok(wrap(store, settings))
}

/// Open the writer lock for the configured snapshot.
pub fn lock_store(settings: &Settings) -> Result<SnapshotLock, CliError> {
    SnapshotLock::open(&settings.store_path).map_err(|e| CoreError::from(e).into())
}

/// Take the writer lock, blocking while another process holds it.
pub fn acquire(lock: &mut SnapshotLock) -> Result<SnapshotGuard<'_>, CliError> {
    lock.acquire().map_err(|e| CoreError::from(e).into())
}

/// Load the snapshot under a held writer lock.
pub fn open_locked(
    snapshot: &SnapshotGuard<'_>,
    settings: &Settings,
) -> Result<Registry, CliError> {
    let store = snapshot.load().map_err(CoreError::from)?;
    Ok(wrap(store, settings))
}

/// Write the registry's contents back while the lock is still held.
pub fn persist(registry: &Registry, snapshot: &SnapshotGuard<'_>) -> Result<(), CliError> {
    snapshot.save(registry.store()).map_err(CoreError::from)?;
    Ok(())
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, `--yes` is required.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON update patch for `--from-file`.
///
/// Keys other than `name`, `brand` and `state` are rejected.
pub fn read_update_file(path: &Path) -> Result<UpdateDeviceRequest, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("cannot read {}: {e}", path.display()),
    })?;
    Ok(serde_json::from_str(&contents)?)
}
