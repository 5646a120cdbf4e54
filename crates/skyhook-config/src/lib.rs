//! Shared configuration for the skyhook CLI and TUI.
//!
//! TOML profiles, merged with `SKYHOOK_` environment variables, and their
//! translation into `skyhook_sdk::SimConfig` and `skyhook_core::ScreenConfig`.
//! Both binaries depend on this crate; the CLI layers its global flags on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use skyhook_core::{PalettePreset, ScreenConfig, ThermalSetup};
use skyhook_sdk::model::{RenderingMode, ThermalMode, ThermalRendering};
use skyhook_sdk::{DroneModel, SimConfig};

/// Profile used when neither a flag nor `default_profile` names one.
pub const DEFAULT_PROFILE: &str = "default";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String, available: Vec<String> },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named simulator profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// A named profile: the simulated fleet plus screen behavior.
///
/// Every field is optional; unset fields fall back to the simulator and
/// screen defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// "explorer", "explorer_thermal" or "voyager".
    pub drone_model: Option<String>,
    pub drone_uid: Option<String>,
    pub drone_name: Option<String>,
    /// Initial drone battery level, percent.
    pub drone_battery: Option<u8>,
    pub remote_uid: Option<String>,
    pub remote_name: Option<String>,
    pub remote_battery: Option<u8>,
    /// Connect the drone and remote as soon as auto connection starts.
    pub connect_on_start: Option<bool>,
    /// Length of opened replays (e.g., "90s", "2m").
    pub replay_duration: Option<String>,
    pub playback_tick: Option<String>,

    pub auto_activate_piloting: Option<bool>,
    pub auto_start_connection: Option<bool>,
    pub seek_step: Option<String>,

    pub thermal_mode: Option<String>,
    pub emissivity: Option<f64>,
    /// Kelvin.
    pub background_temperature: Option<f64>,
    /// Share of thermal imagery in blended rendering, `[0, 1]`.
    pub blending_rate: Option<f64>,
    /// "relative", "absolute" or "spot".
    pub palette: Option<String>,
}

impl Config {
    /// Pick a profile by name, falling back to `default_profile`.
    ///
    /// The default profile resolves to an empty one when it is not
    /// declared; any other missing name is an error.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or(DEFAULT_PROFILE);

        match self.profiles.get(name) {
            Some(profile) => Ok((name.to_owned(), profile.clone())),
            None if name == DEFAULT_PROFILE => Ok((name.to_owned(), Profile::default())),
            None => Err(ConfigError::UnknownProfile {
                name: name.to_owned(),
                available: self.profiles.keys().cloned().collect(),
            }),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "skyhook", "skyhook").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("skyhook");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment. A missing file is fine.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SKYHOOK_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile translation ─────────────────────────────────────────────

fn parse_enum<T: FromStr>(field: &str, value: &str, expected: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| invalid(field, format!("expected {expected}, got '{value}'")))
}

fn parse_duration(field: &str, value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value).map_err(|e| invalid(field, format!("'{value}': {e}")))
}

fn check_battery(field: &str, level: u8) -> Result<u8, ConfigError> {
    if level > 100 {
        return Err(invalid(field, format!("{level} is above 100%")));
    }
    Ok(level)
}

/// Build the simulated fleet described by a profile.
pub fn profile_to_sim_config(profile: &Profile) -> Result<SimConfig, ConfigError> {
    let mut sim = SimConfig::default();

    if let Some(ref model) = profile.drone_model {
        sim.drone_model = parse_enum(
            "drone_model",
            model,
            "'explorer', 'explorer_thermal' or 'voyager'",
        )?;
    }
    if let Some(ref uid) = profile.drone_uid {
        sim.drone_uid.clone_from(uid);
    }
    if let Some(ref name) = profile.drone_name {
        sim.drone_name.clone_from(name);
    }
    if let Some(level) = profile.drone_battery {
        sim.drone_battery = check_battery("drone_battery", level)?;
    }
    if let Some(ref uid) = profile.remote_uid {
        sim.remote_uid.clone_from(uid);
    }
    if let Some(ref name) = profile.remote_name {
        sim.remote_name.clone_from(name);
    }
    if let Some(level) = profile.remote_battery {
        sim.remote_battery = check_battery("remote_battery", level)?;
    }
    if let Some(connect) = profile.connect_on_start {
        sim.connect_on_start = connect;
    }
    if let Some(ref duration) = profile.replay_duration {
        sim.replay_duration = parse_duration("replay_duration", duration)?;
    }
    if let Some(ref tick) = profile.playback_tick {
        let tick = parse_duration("playback_tick", tick)?;
        if tick.is_zero() {
            return Err(invalid("playback_tick", "must be positive"));
        }
        sim.playback_tick = tick;
    }

    Ok(sim)
}

/// Build screen behavior from a profile.
pub fn profile_to_screen_config(profile: &Profile) -> Result<ScreenConfig, ConfigError> {
    let mut screen = ScreenConfig::default();

    if let Some(activate) = profile.auto_activate_piloting {
        screen.auto_activate_piloting = activate;
    }
    if let Some(start) = profile.auto_start_connection {
        screen.auto_start_connection = start;
    }
    if let Some(ref step) = profile.seek_step {
        let step = parse_duration("seek_step", step)?;
        if step < Duration::from_secs(1) {
            return Err(invalid("seek_step", "must be at least one second"));
        }
        screen.seek_step = step;
    }
    screen.thermal = thermal_setup(profile)?;

    Ok(screen)
}

fn thermal_setup(profile: &Profile) -> Result<ThermalSetup, ConfigError> {
    let mut setup = ThermalSetup::default();

    if let Some(ref mode) = profile.thermal_mode {
        setup.mode = parse_enum::<ThermalMode>(
            "thermal_mode",
            mode,
            "'disabled', 'standard', 'blended' or 'embedded'",
        )?;
    }
    if let Some(emissivity) = profile.emissivity {
        if emissivity.is_nan() || emissivity <= 0.0 || emissivity > 1.0 {
            return Err(invalid("emissivity", format!("{emissivity} is outside (0, 1]")));
        }
        setup.emissivity = emissivity;
    }
    if let Some(kelvin) = profile.background_temperature {
        if kelvin.is_nan() || kelvin <= 0.0 {
            return Err(invalid(
                "background_temperature",
                format!("{kelvin} K is not above absolute zero"),
            ));
        }
        setup.background_temperature = kelvin;
    }
    if let Some(rate) = profile.blending_rate {
        if !(0.0..=1.0).contains(&rate) {
            return Err(invalid("blending_rate", format!("{rate} is outside [0, 1]")));
        }
        setup.rendering = ThermalRendering {
            mode: RenderingMode::Blended,
            blending_rate: rate,
        };
    }
    if let Some(ref palette) = profile.palette {
        setup.palette = parse_enum::<PalettePreset>(
            "palette",
            palette,
            "'relative', 'absolute' or 'spot'",
        )?;
    }

    Ok(setup)
}

// ── Starter file ────────────────────────────────────────────────────

/// Config written by `config init`: one default profile, one thermal.
pub fn starter_config() -> Config {
    let mut config = Config::default();
    config
        .profiles
        .insert(DEFAULT_PROFILE.into(), Profile::default());
    config.profiles.insert(
        "thermal".into(),
        Profile {
            drone_model: Some(DroneModel::ExplorerThermal.to_string()),
            drone_name: Some("Explorer Thermal".into()),
            palette: Some(PalettePreset::Relative.to_string()),
            blending_rate: Some(0.5),
            ..Profile::default()
        },
    );
    config
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.defaults, Defaults::default());
        assert_eq!(config.default_profile.as_deref(), Some(DEFAULT_PROFILE));
    }

    #[test]
    fn profiles_load_and_translate() {
        let (_dir, path) = write(
            r#"
default_profile = "field"

[defaults]
output = "json"

[profiles.field]
drone_model = "voyager"
drone_battery = 42
replay_duration = "2m"
seek_step = "10s"
palette = "spot"
"#,
        );
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.defaults.output, "json");

        let (name, profile) = config.profile(None).unwrap();
        assert_eq!(name, "field");

        let sim = profile_to_sim_config(&profile).unwrap();
        assert_eq!(sim.drone_model, DroneModel::Voyager);
        assert_eq!(sim.drone_uid, "drone-1");
        assert_eq!(sim.drone_battery, 42);
        assert_eq!(sim.replay_duration, Duration::from_secs(120));

        let screen = profile_to_screen_config(&profile).unwrap();
        assert_eq!(screen.seek_step_secs(), 10);
        assert_eq!(screen.thermal.palette, PalettePreset::Spot);
    }

    #[test]
    fn unknown_profile_lists_available_ones() {
        let config = starter_config();
        let err = config.profile(Some("lab")).unwrap_err();
        match err {
            ConfigError::UnknownProfile { name, available } => {
                assert_eq!(name, "lab");
                assert_eq!(available, vec!["default".to_owned(), "thermal".to_owned()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn undeclared_default_profile_is_empty() {
        let (name, profile) = Config::default().profile(None).unwrap();
        assert_eq!(name, DEFAULT_PROFILE);
        assert_eq!(profile, Profile::default());
        assert_eq!(profile_to_sim_config(&profile).unwrap(), SimConfig::default());
    }

    #[test]
    fn invalid_values_name_the_field() {
        let cases = [
            Profile {
                drone_model: Some("blimp".into()),
                ..Profile::default()
            },
            Profile {
                drone_battery: Some(101),
                ..Profile::default()
            },
            Profile {
                replay_duration: Some("soon".into()),
                ..Profile::default()
            },
        ];
        let fields = ["drone_model", "drone_battery", "replay_duration"];
        for (profile, expected) in cases.iter().zip(fields) {
            match profile_to_sim_config(profile).unwrap_err() {
                ConfigError::Validation { field, .. } => assert_eq!(field, expected),
                other => panic!("unexpected error: {other}"),
            }
        }

        let thermal = Profile {
            emissivity: Some(0.0),
            ..Profile::default()
        };
        assert!(matches!(
            profile_to_screen_config(&thermal),
            Err(ConfigError::Validation { ref field, .. }) if field == "emissivity"
        ));
    }

    #[test]
    fn starter_config_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = starter_config();

        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.profiles, config.profiles);
        let (_, thermal) = loaded.profile(Some("thermal")).unwrap();
        let sim = profile_to_sim_config(&thermal).unwrap();
        assert_eq!(sim.drone_model, DroneModel::ExplorerThermal);
    }
}
