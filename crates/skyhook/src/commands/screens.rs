//! `skyhook screens`: what each screen shows and which steps it accepts.

use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;

use skyhook_core::ScreenKind;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;
use crate::steps::{SIM_STEPS, StepHelp, screen_steps};

#[derive(Serialize)]
struct StepEntry {
    screen: String,
    step: &'static str,
    about: &'static str,
}

#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "Screen")]
    screen: String,
    #[tabled(rename = "Step")]
    step: &'static str,
    #[tabled(rename = "Description")]
    about: &'static str,
}

fn entries(screen: String, steps: &'static [StepHelp]) -> impl Iterator<Item = StepEntry> {
    steps.iter().map(move |help| StepEntry {
        screen: screen.clone(),
        step: help.syntax,
        about: help.about,
    })
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let mut all: Vec<StepEntry> = ScreenKind::iter()
        .flat_map(|kind| entries(kind.to_string(), screen_steps(kind)))
        .collect();
    all.extend(entries("any".to_owned(), SIM_STEPS));

    let out = output::render_list(
        global.output,
        &all,
        |e| StepRow {
            screen: e.screen.clone(),
            step: e.step,
            about: e.about,
        },
        |e| format!("{} {}", e.screen, e.step),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
