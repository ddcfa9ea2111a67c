//! Ensure command implementation.
//!
//! The `conduit-deps ensure` command downloads modules and their declared
//! dependencies, then shows the resulting load path.

use std::sync::Arc;

use crate::cli::args::EnsureArgs;
use crate::config::Settings;
use crate::context::ResolutionContext;
use crate::coordinate::Coordinate;
use crate::download::{EnsureOutcome, RecordingListener};
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The ensure command implementation.
pub struct EnsureCommand {
    settings: Settings,
    args: EnsureArgs,
}

impl EnsureCommand {
    pub fn new(settings: Settings, args: EnsureArgs) -> Self {
        Self { settings, args }
    }

    /// Run against an existing context.
    pub fn run(&self, ctx: &ResolutionContext, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let recorder = Arc::new(RecordingListener::new());
        ctx.add_listener(recorder.clone());

        let coordinates: Vec<Coordinate> =
            self.args.references.iter().map(|r| ctx.parse(r)).collect();

        let mut spinner = ui.start_spinner(&format!(
            "Resolving {}",
            plural(coordinates.len(), "module")
        ));
        let outcomes = match ctx
            .coordinator()
            .ensure_all(&coordinates, !self.args.no_transitive)
        {
            Ok(outcomes) => outcomes,
            Err(e) => {
                spinner.finish_error("Resolution failed");
                return Err(e);
            }
        };

        let downloaded = recorder.downloaded();
        let available = recorder.already_available();
        spinner.finish_success(&format!(
            "{} added, {} already available",
            plural(downloaded.len(), "module"),
            available.len()
        ));

        for (coordinate, outcome) in coordinates.iter().zip(&outcomes) {
            if matches!(outcome, EnsureOutcome::Unversioned) {
                ui.warning(&format!(
                    "{} has no version; add one or set engine_version",
                    coordinate
                ));
            }
        }

        if ui.output_mode().shows_detail() {
            for c in &downloaded {
                ui.message(&format!("  + {}", c));
            }
            for c in &available {
                ui.message(&format!("  = {}", c));
            }
        }

        let entries = ctx.load_path().entries();
        if !entries.is_empty() {
            ui.show_header("Load path");
            for entry in entries {
                ui.message(&format!("  {}", entry.display()));
            }
        }

        ui.show_header("Requested");
        for coordinate in recorder.requested() {
            ui.message(&format!("  {}", coordinate));
        }

        let extras = recorder.extra_repositories();
        if !extras.is_empty() {
            ui.show_header("Extra repositories");
            for url in extras {
                ui.message(&format!("  {}", url));
            }
        }

        Ok(CommandResult::success())
    }
}

impl Command for EnsureCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ctx = ResolutionContext::new(self.settings.clone())?;
        self.run(&ctx, ui)
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
