//! Config subcommand handlers.

use std::io::IsTerminal;
use std::path::PathBuf;

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Defaults, RegistrySettings, Settings, StoreSettings};
use crate::error::CliError;
use crate::output;

use super::util;

const OUTPUT_CHOICES: &[&str] = &["table", "json", "json-compact", "yaml", "plain"];

// ── Helpers ─────────────────────────────────────────────────────────

/// Format the config as TOML-like text, with the effective store path.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out);
    let _ = writeln!(out, "[store]");
    match cfg.store.path {
        Some(ref path) => {
            let _ = writeln!(out, "path = \"{}\"", path.display());
        }
        None => {
            let _ = writeln!(
                out,
                "# path = \"{}\" (default)",
                config::default_store_path().display()
            );
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[registry]");
    let _ = write!(
        out,
        "max_conflict_retries = {}",
        cfg.registry.max_conflict_retries
    );

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Walk the user through each setting, seeded from `base`.
fn prompt_config(base: &Config) -> Result<Config, CliError> {
    let default_store = config::default_store_path();
    let store: String = Input::new()
        .with_prompt("Device snapshot file")
        .default(base.store_path().display().to_string())
        .interact_text()
        .map_err(prompt_err)?;
    let store = PathBuf::from(store);

    let current_output = OUTPUT_CHOICES
        .iter()
        .position(|c| *c == base.defaults.output)
        .unwrap_or(0);
    let output_idx = Select::new()
        .with_prompt("Default output format")
        .items(OUTPUT_CHOICES)
        .default(current_output)
        .interact()
        .map_err(prompt_err)?;

    let retries: u32 = Input::new()
        .with_prompt("Re-attempts after a concurrent modification (0-10)")
        .default(base.registry.max_conflict_retries)
        .validate_with(|n: &u32| {
            devreg_config::validate_retries(*n).map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    Ok(Config {
        defaults: Defaults {
            output: OUTPUT_CHOICES
                .get(output_idx)
                .map_or_else(|| base.defaults.output.clone(), |s| (*s).to_owned()),
            color: base.defaults.color.clone(),
        },
        store: StoreSettings {
            path: (store != default_store).then_some(store),
        },
        registry: RegistrySettings {
            max_conflict_retries: retries,
        },
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let settings = Settings::resolve(global, &cfg)?;
            let out = output::render_single(settings.output, &cfg, format_config, |c| {
                c.store_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let path = config::config_path();
            if path.exists()
                && !util::confirm(
                    &format!("Overwrite existing config at {}?", path.display()),
                    "config init",
                    global.yes,
                )?
            {
                return Ok(());
            }

            let base = config::load_config_or_default();
            let cfg = if global.yes {
                base
            } else if std::io::stdin().is_terminal() {
                prompt_config(&base)?
            } else {
                return Err(CliError::NonInteractiveRequiresYes {
                    action: "config init".into(),
                });
            };

            let written = config::save_config(&cfg)?;
            let color = global.color.is_some_and(output::should_color);
            output::print_note(
                &format!("Wrote {}", written.display()),
                global.quiet,
                color,
            );
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn formatted_config_marks_default_store_path() {
        let text = format_config(&Config::default());
        assert!(text.contains("[defaults]"));
        assert!(text.contains("output = \"table\""));
        assert!(text.contains("(default)"));
        assert!(text.contains("max_conflict_retries = 0"));
    }

    #[test]
    fn formatted_config_shows_explicit_store_path() {
        let cfg = Config {
            store: StoreSettings {
                path: Some("/srv/devreg/devices.json".into()),
            },
            ..Config::default()
        };
        let text = format_config(&cfg);
        assert!(text.contains("path = \"/srv/devreg/devices.json\""));
        assert!(!text.contains("(default)"));
    }
}
