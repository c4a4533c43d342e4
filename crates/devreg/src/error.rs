//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text, exit codes and a machine-readable report.

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use devreg_config::ConfigError;
use devreg_core::{CoreError, ErrorKind};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Resources ────────────────────────────────────────────────────

    #[error("device '{id}' not found")]
    #[diagnostic(
        code(devreg::not_found),
        help("Run: devreg devices list to see registered devices")
    )]
    NotFound { id: String },

    // ── Lifecycle ────────────────────────────────────────────────────

    #[error("{reason} (device '{id}')")]
    #[diagnostic(
        code(devreg::illegal_operation),
        help(
            "Move the device out of IN_USE first:\n\
             devreg devices update {id} --state available"
        )
    )]
    IllegalOperation { id: String, reason: String },

    #[error("device '{id}' was modified concurrently (expected version {expected})")]
    #[diagnostic(
        code(devreg::version_conflict),
        help(
            "Another writer changed the device first. Re-run the command,\n\
             or allow automatic re-attempts with --retries <N>."
        )
    )]
    VersionConflict { id: String, expected: u64 },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(devreg::validation))]
    Validation { field: String, reason: String },

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(
        code(devreg::json),
        help("Allowed keys are name, brand and state. Check the file contents and try again.")
    )]
    Json(#[from] serde_json::Error),

    // ── Storage ──────────────────────────────────────────────────────

    #[error("storage fault: {message}")]
    #[diagnostic(
        code(devreg::storage),
        help("Check the store path (--store or DEVREG_STORE) and its permissions.")
    )]
    Storage { message: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(devreg::config),
        help("Fix the config file (devreg config path) or the DEVREG_* environment.")
    )]
    Config(Box<figment::Error>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(devreg::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to render output: {message}")]
    #[diagnostic(code(devreg::render))]
    Render { message: String },
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::IllegalOperation { .. } | Self::VersionConflict { .. } => exit_code::CONFLICT,
            Self::Validation { .. } | Self::Json(_) | Self::NonInteractiveRequiresYes { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }

    /// Classification shared with the core crate. Configuration and local
    /// I/O failures fold into the nearest core kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::IllegalOperation { .. } => ErrorKind::IllegalOperation,
            Self::VersionConflict { .. } => ErrorKind::VersionConflict,
            Self::Validation { .. }
            | Self::Json(_)
            | Self::Config(_)
            | Self::NonInteractiveRequiresYes { .. } => ErrorKind::InvalidInput,
            Self::Storage { .. } | Self::Io(_) | Self::Render { .. } => ErrorKind::StorageFault,
        }
    }

    /// Structured form of this error for JSON consumers. `path` is the
    /// subcommand that failed, e.g. `devices delete`.
    pub fn report(&self, path: &str) -> ErrorReport {
        let details = match self {
            Self::Validation { reason, .. } => reason.split("; ").map(str::to_owned).collect(),
            _ => self.help().map(|h| vec![h.to_string()]).unwrap_or_default(),
        };
        let kind = self.kind();
        ErrorReport {
            timestamp: Utc::now(),
            status: kind.status(),
            kind: kind.to_string(),
            message: self.to_string(),
            path: path.to_owned(),
            details,
        }
    }
}

/// Machine-readable error body emitted on stderr for JSON output formats.
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub kind: String,
    pub message: String,
    pub path: String,
    pub details: Vec<String>,
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::DeviceNotFound { id } => CliError::NotFound { id: id.to_string() },

            CoreError::IllegalOperation { id, denial } => CliError::IllegalOperation {
                id: id.to_string(),
                reason: denial.to_string(),
            },

            CoreError::VersionConflict { id, expected } => CliError::VersionConflict {
                id: id.to_string(),
                expected,
            },

            CoreError::Validation { violations } => CliError::Validation {
                field: violations
                    .iter()
                    .map(|v| v.field.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                reason: violations
                    .iter()
                    .map(|v| v.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            },

            CoreError::StorageFault { message } => CliError::Storage { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Figment(inner) => CliError::Config(inner),
            ConfigError::Serialization(e) => CliError::Render {
                message: e.to_string(),
            },
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use devreg_core::{CreateDeviceRequest, Denial, DeviceId, DeviceState};
    use pretty_assertions::assert_eq;

    fn some_id() -> DeviceId {
        "0b8e6f6a-3c1a-4a39-9b7e-1d2c3e4f5a6b".parse().unwrap()
    }

    #[test]
    fn core_outcomes_map_to_exit_codes() {
        let cases = [
            (CoreError::DeviceNotFound { id: some_id() }, 4),
            (
                CoreError::IllegalOperation {
                    id: some_id(),
                    denial: Denial::DeleteWhileInUse,
                },
                6,
            ),
            (
                CoreError::VersionConflict {
                    id: some_id(),
                    expected: 3,
                },
                6,
            ),
            (
                CoreError::StorageFault {
                    message: "disk full".into(),
                },
                1,
            ),
        ];
        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn validation_report_lists_each_violation() {
        let core = CreateDeviceRequest {
            name: " ".into(),
            brand: String::new(),
            state: DeviceState::Available,
        }
        .validate()
        .unwrap_err();

        let cli = CliError::from(core);
        assert_eq!(cli.exit_code(), exit_code::USAGE);

        let report = cli.report("devices create");
        assert_eq!(report.status, 400);
        assert_eq!(report.kind, "invalid_input");
        assert_eq!(
            report.details,
            vec!["name must not be blank", "brand must not be blank"]
        );
    }

    #[test]
    fn conflict_report_carries_status_and_help() {
        let report = CliError::from(CoreError::IllegalOperation {
            id: some_id(),
            denial: Denial::DeleteWhileInUse,
        })
        .report("devices delete");

        assert_eq!(report.status, 409);
        assert_eq!(report.kind, "illegal_operation");
        assert_eq!(report.path, "devices delete");
        assert!(report.message.contains("cannot delete devices in use"));
        assert_eq!(report.details.len(), 1);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("timestamp").is_some());
        assert_eq!(json["path"], "devices delete");
    }

    #[test]
    fn report_status_follows_core_error_kind() {
        let cases = [
            CoreError::DeviceNotFound { id: some_id() },
            CoreError::VersionConflict {
                id: some_id(),
                expected: 1,
            },
            CoreError::StorageFault {
                message: "disk full".into(),
            },
        ];
        for core in cases {
            let kind = core.kind();
            let report = CliError::from(core).report("devices update");
            assert_eq!(report.kind, kind.to_string());
            assert_eq!(report.status, kind.status());
        }
    }

    #[test]
    fn local_failures_fold_into_core_kinds() {
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(CliError::from(json).kind(), ErrorKind::InvalidInput);

        let render = CliError::Render {
            message: "broken pipe".into(),
        };
        assert_eq!(render.kind(), ErrorKind::StorageFault);
        assert_eq!(render.report("devices list").status, 500);
    }
}
