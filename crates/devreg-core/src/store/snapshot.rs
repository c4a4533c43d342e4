// ── JSON snapshot persistence ──
//
// Whole-store snapshots for processes that live shorter than the data.
// Writers hold an exclusive advisory lock on a `<snapshot>.lock` sibling
// from load to save, so overlapping processes apply their changes one after
// another against the latest file. Each save goes to a uniquely named temp
// file in the same directory and is renamed into place; readers never see a
// partial snapshot and need no lock.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fd_lock::{RwLock, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use super::StoreError;
use super::memory::InMemoryDeviceStore;
use crate::model::Device;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    devices: Vec<Device>,
}

fn fault(action: &str, path: &Path, err: impl std::fmt::Display) -> StoreError {
    StoreError::Fault(format!("failed to {action} {}: {err}", path.display()))
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

// ── Writer lock ─────────────────────────────────────────────────────

/// Cross-process write lock for one snapshot path.
pub struct SnapshotLock {
    path: PathBuf,
    file: RwLock<File>,
}

impl SnapshotLock {
    /// Open the lock file next to `path`, creating it and its directory if
    /// needed. Does not lock yet.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let lock_path = lock_path_for(path);
        fs::create_dir_all(parent_dir(path))
            .map_err(|e| fault("create directory for", path, e))?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| fault("open", &lock_path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            file: RwLock::new(file),
        })
    }

    /// Block until no other writer holds the snapshot.
    pub fn acquire(&mut self) -> Result<SnapshotGuard<'_>, StoreError> {
        let path = self.path.as_path();
        let guard = self.file.write().map_err(|e| fault("lock", path, e))?;
        debug!(path = %path.display(), "snapshot locked");
        Ok(SnapshotGuard {
            path,
            _guard: guard,
        })
    }
}

/// Exclusive access to a snapshot. Released on drop.
pub struct SnapshotGuard<'a> {
    path: &'a Path,
    _guard: RwLockWriteGuard<'a, File>,
}

impl SnapshotGuard<'_> {
    /// Read the snapshot as it stands now that no other writer can move it.
    pub fn load(&self) -> Result<InMemoryDeviceStore, StoreError> {
        InMemoryDeviceStore::load(self.path)
    }

    /// Replace the snapshot with the contents of `store`.
    pub fn save(&self, store: &InMemoryDeviceStore) -> Result<(), StoreError> {
        store.write_snapshot(self.path)
    }
}

// ── Load / save ─────────────────────────────────────────────────────

impl InMemoryDeviceStore {
    /// Load a snapshot. A missing file is an empty store; an unreadable or
    /// corrupt one is a fault.
    ///
    /// Safe without a lock for read-only use. Anything that will be saved
    /// back must come from [`SnapshotGuard::load`].
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no snapshot yet, starting empty");
                return Ok(Self::new());
            }
            Err(e) => return Err(fault("read", path, e)),
        };
        let file: SnapshotFile =
            serde_json::from_str(&raw).map_err(|e| fault("parse", path, e))?;
        debug!(path = %path.display(), count = file.devices.len(), "loaded snapshot");
        Ok(Self::from_devices(file.devices))
    }

    fn write_snapshot(&self, path: &Path) -> Result<(), StoreError> {
        let mut devices = self.devices();
        devices.sort_by(|a, b| {
            a.creation_time
                .cmp(&b.creation_time)
                .then_with(|| a.id.cmp(&b.id))
        });
        let body = serde_json::to_string_pretty(&SnapshotFile { devices })
            .map_err(|e| fault("encode snapshot for", path, e))?;

        let dir = parent_dir(path);
        fs::create_dir_all(dir).map_err(|e| fault("create directory for", path, e))?;
        let mut tmp =
            NamedTempFile::new_in(dir).map_err(|e| fault("create temp file for", path, e))?;
        tmp.write_all(body.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| fault("write", tmp.path(), e))?;
        tmp.persist(path)
            .map_err(|e| fault("replace", path, e.error))?;
        debug!(path = %path.display(), count = self.len(), "saved snapshot");
        Ok(())
    }
}
