//! Lookup command implementation.
//!
//! `conduit-deps lookup <kind> <name>` shows the module providing a
//! capability, suggesting a close name on a miss.

use crate::catalog::CapabilityCatalog;
use crate::cli::args::LookupArgs;
use crate::config::Settings;
use crate::coordinate::Coordinate;
use crate::demand::{suggest, CapabilityKind, TemplateSource};
use crate::error::{DepsError, Result};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The lookup command implementation.
pub struct LookupCommand {
    settings: Settings,
    args: LookupArgs,
}

impl LookupCommand {
    pub fn new(settings: Settings, args: LookupArgs) -> Self {
        Self { settings, args }
    }

    fn templates(&self) -> TemplateSource {
        self.settings
            .template_dirs
            .iter()
            .fold(TemplateSource::bundled(), |source, dir| {
                source.with_directory(dir)
            })
    }

    fn lookup_template(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let source = self.templates();
        if source.load(&self.args.name)?.is_some() {
            ui.success(&format!("route template '{}'", self.args.name));
            return Ok(CommandResult::success());
        }
        let names = source.names();
        Err(DepsError::UnknownCapability {
            kind: CapabilityKind::RouteTemplate,
            name: self.args.name.clone(),
            suggestion: suggest::suggest(&self.args.name, names.iter().map(String::as_str)),
        })
    }
}

impl Command for LookupCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let kind = self.args.kind;
        if kind == CapabilityKind::RouteTemplate {
            return self.lookup_template(ui);
        }

        let catalog = CapabilityCatalog::bundled()?;
        let name = self.args.name.as_str();

        match catalog.lookup(kind, name) {
            Some(reference) => {
                let coordinate = Coordinate::parse(reference, Some(&self.settings.engine_version));
                ui.success(&format!("{} '{}' is provided by {}", kind, name, coordinate));
                if kind == CapabilityKind::Component && catalog.is_listening(name) {
                    ui.message("  opens a listening service (stubbed with --silent)");
                }
                Ok(CommandResult::success())
            }
            None => Err(DepsError::UnknownCapability {
                kind,
                name: name.to_string(),
                suggestion: suggest::suggest(name, catalog.names(kind)),
            }),
        }
    }
}
