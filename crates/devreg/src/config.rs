//! CLI configuration: thin wrapper around `devreg_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--store, --output, --color, --retries).

use std::path::PathBuf;

use clap::ValueEnum;

use devreg_core::RegistryConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use devreg_config::{
    Config, Defaults, RegistrySettings, StoreSettings, config_path, default_store_path,
    load_config, load_config_or_default, save_config,
};

// ── Resolved settings ───────────────────────────────────────────────

/// Effective settings for one invocation: flag > env > config file > default.
#[derive(Debug, Clone)]
pub struct Settings {
    pub store_path: PathBuf,
    pub output: OutputFormat,
    pub color: ColorMode,
    pub registry: RegistryConfig,
}

impl Settings {
    pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<Self, CliError> {
        let output = match global.output {
            Some(format) => format,
            None => parse_choice("defaults.output", &cfg.defaults.output)?,
        };
        let color = match global.color {
            Some(mode) => mode,
            None => parse_choice("defaults.color", &cfg.defaults.color)?,
        };

        let mut registry = cfg.registry_config();
        if let Some(retries) = global.retries {
            devreg_config::validate_retries(retries)?;
            registry = registry.with_conflict_retries(retries);
        }

        let store_path = global.store.clone().unwrap_or_else(|| cfg.store_path());

        Ok(Self {
            store_path,
            output,
            color,
            registry,
        })
    }
}

/// Output format for error reporting, resolved before any command runs.
///
/// Never fails: an unreadable config falls back to the defaults.
pub fn error_output_format(flag: Option<OutputFormat>) -> OutputFormat {
    flag.unwrap_or_else(|| {
        let cfg = load_config_or_default();
        OutputFormat::from_str(&cfg.defaults.output, true).unwrap_or(OutputFormat::Table)
    })
}

fn parse_choice<T: ValueEnum>(field: &str, raw: &str) -> Result<T, CliError> {
    T::from_str(raw, true).map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!(
            "unknown value '{raw}', expected one of: {}",
            T::value_variants()
                .iter()
                .filter_map(|v| v.to_possible_value())
                .map(|p| p.get_name().to_owned())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    })
}
