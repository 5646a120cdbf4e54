//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use skyhook_config::ConfigError;
use skyhook_core::CoreError;
use skyhook_sdk::SdkError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const UNSUPPORTED: i32 = 5;
    pub const CONFLICT: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Steps ────────────────────────────────────────────────────────

    #[error("Invalid step '{step}': {reason}")]
    #[diagnostic(
        code(skyhook::invalid_step),
        help("Run: skyhook screens to see the steps each screen accepts")
    )]
    InvalidStep { step: String, reason: String },

    #[error("Step '{action}' is not available on the {screen} screen")]
    #[diagnostic(
        code(skyhook::unsupported_step),
        help("Run: skyhook screens to see the steps each screen accepts")
    )]
    UnsupportedStep { screen: String, action: String },

    // ── SDK ──────────────────────────────────────────────────────────

    #[error("The simulator rejected a request: {0}")]
    #[diagnostic(code(skyhook::rejected))]
    Rejected(#[source] SdkError),

    #[error("The screen closed before the run finished")]
    #[diagnostic(code(skyhook::screen_closed))]
    ScreenClosed,

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(skyhook::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(skyhook::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create some with: skyhook config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(skyhook::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(skyhook::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(skyhook::render))]
    Render(String),
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
            Self::InvalidStep { .. } | Self::Validation { .. } => exit_code::USAGE,
            Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::UnsupportedStep { .. } => exit_code::UNSUPPORTED,
            Self::ConfigExists { .. } => exit_code::CONFLICT,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Library errors → CliError ────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnsupportedAction { screen, action } => {
                CliError::UnsupportedStep { screen, action }
            }
            CoreError::Sdk(err) => CliError::Rejected(err),
            CoreError::QueueClosed | CoreError::ScreenClosed => CliError::ScreenClosed,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name, available } => CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            },
            ConfigError::Figment(err) => CliError::Config(err),
            ConfigError::Io(err) => CliError::Io(err),
            ConfigError::Serialization(err) => CliError::Render(err.to_string()),
        }
    }
}
