// ── Core error types ──
//
// Every failure the registry can report. Store-level errors are folded in
// through `From<StoreError>`; the boundary layer never sees a raw
// `StoreError` and never has to guess which variant it is dealing with.

use thiserror::Error;

use crate::model::DeviceId;
use crate::policy::Denial;
use crate::request::FieldViolation;
use crate::store::StoreError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lookup ───────────────────────────────────────────────────────
    #[error("Device not found: {id}")]
    DeviceNotFound { id: DeviceId },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Illegal operation on device {id}: {denial}")]
    IllegalOperation { id: DeviceId, denial: Denial },

    // ── Concurrency ──────────────────────────────────────────────────
    #[error("Device {id} was modified concurrently (expected version {expected})")]
    VersionConflict { id: DeviceId, expected: u64 },

    // ── Input ────────────────────────────────────────────────────────
    #[error("Validation failed: {}", summarize(.violations))]
    Validation { violations: Vec<FieldViolation> },

    // ── Storage ──────────────────────────────────────────────────────
    #[error("Storage fault: {message}")]
    StorageFault { message: String },
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Transport-neutral classification of a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    IllegalOperation,
    VersionConflict,
    InvalidInput,
    StorageFault,
}

impl ErrorKind {
    /// HTTP-style status a request/response boundary should use.
    pub fn status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::IllegalOperation | Self::VersionConflict => 409,
            Self::InvalidInput => 400,
            Self::StorageFault => 500,
        }
    }
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DeviceNotFound { .. } => ErrorKind::NotFound,
            Self::IllegalOperation { .. } => ErrorKind::IllegalOperation,
            Self::VersionConflict { .. } => ErrorKind::VersionConflict,
            Self::Validation { .. } => ErrorKind::InvalidInput,
            Self::StorageFault { .. } => ErrorKind::StorageFault,
        }
    }

    /// Only a lost race is worth retrying; everything else is deterministic
    /// given the current stored state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }

    pub(crate) fn from_store(id: DeviceId, expected: u64, err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::DeviceNotFound { id },
            StoreError::VersionConflict { .. } => Self::VersionConflict { id, expected },
            StoreError::Fault(message) => Self::StorageFault { message },
        }
    }
}

// ── Conversion from store-layer errors ───────────────────────────────
//
// Only faults can surface from paths that carry no identifier context
// (insert, scan); conditioned operations go through `from_store`.

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Fault(message) => Self::StorageFault { message },
            other => Self::StorageFault {
                message: format!("unexpected store outcome: {other}"),
            },
        }
    }
}
