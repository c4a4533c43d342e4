// ── Registry configuration ──

use serde::{Deserialize, Serialize};

/// Tunables for a [`DeviceRegistry`](crate::DeviceRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// How many times a write that lost a version race is re-read,
    /// re-authorized and re-attempted before `VersionConflict` is surfaced.
    /// Zero means the first conflict goes straight back to the caller.
    pub max_conflict_retries: u32,
}

impl RegistryConfig {
    pub fn with_conflict_retries(mut self, retries: u32) -> Self {
        self.max_conflict_retries = retries;
        self
    }
}
