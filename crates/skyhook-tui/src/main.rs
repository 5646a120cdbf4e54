//! `skyhook-tui`: live terminal front-end for the skyhook sample screens.
//!
//! Runs one screen at a time against the simulated drone SDK. Number keys
//! switch screens; upper-case keys drive the simulator (connect, remove and
//! swap drones, change battery levels) so every absent and present state
//! of a screen can be exercised by hand.
//!
//! Logs go to a file (default `/tmp/skyhook-tui.log`) to keep the terminal
//! clean.

mod action;
mod app;
mod component;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use skyhook_core::ScreenKind;
use skyhook_sdk::GroundSdk;

use crate::app::App;
use crate::screens::ScreenOptions;

/// Live terminal view of the skyhook sample screens.
#[derive(Parser, Debug)]
#[command(name = "skyhook-tui", version, about)]
struct Cli {
    /// Profile to use (defaults to the config's default profile)
    #[arg(short, long, env = "SKYHOOK_PROFILE")]
    profile: Option<String>,

    /// Config file (defaults to the platform config path)
    #[arg(long, env = "SKYHOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Screen shown first
    #[arg(short, long, default_value = "hello-drone")]
    screen: ScreenKind,

    /// File opened by the replay screen
    #[arg(long, default_value = "flight.mp4")]
    media: String,

    #[arg(long, default_value = "/tmp/skyhook-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing; stdout and stderr belong to the terminal UI. Hold the
/// guard for the lifetime of the app so logs flush.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "skyhook_tui={level},skyhook_core={level},skyhook_sdk={level}"
        ))
    });

    let dir = cli
        .log_file
        .parent()
        .unwrap_or_else(|| std::path::Path::new("/tmp"));
    let file = cli
        .log_file
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("skyhook-tui.log"));
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tui::install_hooks()?;
    let _log_guard = setup_tracing(&cli);

    let config_path = cli.config.clone().unwrap_or_else(skyhook_config::config_path);
    let cfg = skyhook_config::load_config_from(&config_path)?;
    let (profile_name, profile) = cfg.profile(cli.profile.as_deref())?;
    let sim_config = skyhook_config::profile_to_sim_config(&profile)?;
    let screen_config = skyhook_config::profile_to_screen_config(&profile)?;

    info!(
        profile = %profile_name,
        model = %sim_config.drone_model,
        screen = %cli.screen,
        "starting skyhook-tui"
    );

    let options = ScreenOptions {
        replay_source: cli.media,
        seek_step: screen_config.seek_step_secs(),
    };
    let (sdk, sim) = GroundSdk::simulated(sim_config);
    let mut app = App::start(sdk, sim, screen_config, options, cli.screen).await?;
    app.run().await
}
