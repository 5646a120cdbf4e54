//! Config subcommand handlers.

use serde::Serialize;
use tabled::Tabled;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct ProfileEntry {
    name: String,
    drone_model: String,
    default: bool,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Drone")]
    drone_model: String,
    #[tabled(rename = "Default")]
    default: &'static str,
}

fn profile_entries(cfg: &Config) -> Vec<ProfileEntry> {
    let default = cfg
        .default_profile
        .as_deref()
        .unwrap_or(skyhook_config::DEFAULT_PROFILE);
    cfg.profiles
        .iter()
        .map(|(name, profile)| ProfileEntry {
            name: name.clone(),
            drone_model: profile
                .drone_model
                .clone()
                .unwrap_or_else(|| "explorer".into()),
            default: name == default,
        })
        .collect()
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path(global);

    match args.command {
        // ── Init ────────────────────────────────────────────────────
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            config::save_config_to(&config::starter_config(), &path)?;
            if !global.quiet {
                eprintln!("✓ Configuration written to {}", path.display());
                eprintln!("  Try: skyhook run hello-drone --steps take-off-land");
            }
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let toml = toml::to_string_pretty(&cfg).map_err(|e| CliError::Render(e.to_string()))?;
            let out = output::render_single(
                global.output,
                &cfg,
                |_| toml.trim_end().to_owned(),
                |c| c.default_profile.clone().unwrap_or_default(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load(global)?;
            let entries = profile_entries(&cfg);
            if entries.is_empty() {
                eprintln!("No profiles configured. Run: skyhook config init");
                return Ok(());
            }
            let out = output::render_list(
                global.output,
                &entries,
                |e| ProfileRow {
                    name: e.name.clone(),
                    drone_model: e.drone_model.clone(),
                    default: if e.default { "*" } else { "" },
                },
                |e| {
                    if e.default {
                        format!("{} *", e.name)
                    } else {
                        e.name.clone()
                    }
                },
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load(global)?;
            if !cfg.profiles.contains_key(&name) {
                let available: Vec<_> = cfg.profiles.keys().cloned().collect();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config_to(&cfg, &path)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }
    }
}
