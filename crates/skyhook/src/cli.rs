//! Clap derive structures for the `skyhook` CLI.
//!
//! Kept free of workspace types: `build.rs` includes this file to render
//! man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// skyhook -- drive sample drone screens against a simulated SDK
#[derive(Debug, Parser)]
#[command(
    name = "skyhook",
    version,
    about = "Run drone screens headless against the simulated SDK",
    long_about = "Opens one of the sample screens (hello-drone, camera, thermal, replay)\n\
        against a simulated drone fleet, applies a scripted list of steps and\n\
        prints every projected view.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Profile to use
    #[arg(long, short = 'p', env = "SKYHOOK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "SKYHOOK_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SKYHOOK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open a screen, apply steps, print each view
    #[command(alias = "r")]
    Run(RunArgs),

    /// List screens and the steps each one accepts
    Screens,

    /// Manage configuration profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Run ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScreenArg {
    /// Connection state, batteries, take off / land
    HelloDrone,
    /// Capture button, camera mode and white balance
    Camera,
    /// Thermal mode, palette, live stream
    Thermal,
    /// Local media file playback
    Replay,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Screen to open
    pub screen: ScreenArg,

    /// Comma-separated steps, applied in order (see `skyhook screens`)
    #[arg(long, short = 's', value_delimiter = ',', value_name = "STEP")]
    pub steps: Vec<String>,

    /// Time given to the simulator after each step before the view is read
    #[arg(long, default_value = "50ms", value_name = "DURATION")]
    pub settle: String,

    /// Print only the view after the last step
    #[arg(long)]
    pub last: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a starter config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the merged configuration
    Show,

    /// Print the config file path
    Path,

    /// List profiles (default marked with *)
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
