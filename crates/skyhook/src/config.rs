//! CLI configuration: thin wrapper around `skyhook_config` that honors the
//! `--config` and `--profile` flags.

use std::path::PathBuf;

use skyhook_core::ScreenConfig;
use skyhook_sdk::SimConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use skyhook_config::{Config, Profile, save_config_to, starter_config};

/// Config file in use: `--config` when given, else the platform path.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(skyhook_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(skyhook_config::load_config_from(&config_path(global))?)
}

/// Resolve the active profile into simulator and screen settings.
pub fn resolve(global: &GlobalOpts) -> Result<(String, SimConfig, ScreenConfig), CliError> {
    let cfg = load(global)?;
    let (name, profile) = cfg.profile(global.profile.as_deref())?;
    let sim = skyhook_config::profile_to_sim_config(&profile)?;
    let screen = skyhook_config::profile_to_screen_config(&profile)?;
    tracing::debug!(profile = %name, model = %sim.drone_model, "profile resolved");
    Ok((name, sim, screen))
}
