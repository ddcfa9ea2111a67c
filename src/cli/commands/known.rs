//! Known command implementation.
//!
//! `conduit-deps known <key>` finds the module providing a class name or a
//! configuration key.

use crate::cli::args::KnownArgs;
use crate::config::Settings;
use crate::error::Result;
use crate::known::{KnownDependencies, VersionProperties};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The known command implementation.
pub struct KnownCommand {
    settings: Settings,
    args: KnownArgs,
}

impl KnownCommand {
    pub fn new(settings: Settings, args: KnownArgs) -> Self {
        Self { settings, args }
    }
}

impl Command for KnownCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let versions = VersionProperties::bundled()?
            .with_overrides(self.settings.companion_versions.clone());
        let known = KnownDependencies::bundled(versions)?
            .with_default_version(&self.settings.engine_version);

        let key = self.args.key.as_str();
        let found = match &self.args.value {
            Some(value) => known.resolve_config_line(key, value),
            None => known.resolve(key),
        };

        match found {
            Some(coordinate) => {
                ui.message(&coordinate.to_string());
                Ok(CommandResult::success())
            }
            None => {
                ui.warning(&format!("No known module provides '{}'", key));
                Ok(CommandResult::failure(1))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;

    fn run(key: &str, value: Option<&str>) -> (CommandResult, MockUI) {
        let settings = Settings {
            engine_version: "4.2.0".into(),
            ..Settings::default()
        };
        let cmd = KnownCommand::new(
            settings,
            KnownArgs {
                key: key.to_string(),
                value: value.map(str::to_string),
            },
        );
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();
        (result, ui)
    }

    #[test]
    fn resolves_class_name_by_prefix() {
        let (result, ui) = run("dev.conduit.component.kafka.KafkaComponent", None);
        assert!(result.success);
        assert_eq!(ui.messages(), ["dev.conduit:conduit-kafka:4.2.0"]);
    }

    #[test]
    fn resolves_config_line() {
        let (result, ui) = run("conduit.main.tracing", Some("true"));
        assert!(result.success);
        assert_eq!(ui.messages(), ["dev.conduit:conduit-tracing:4.2.0"]);
    }

    #[test]
    fn companion_version_override() {
        let settings = Settings {
            companion_versions: [("pooled-jms.version".to_string(), "9.9.9".to_string())]
                .into_iter()
                .collect(),
            ..Settings::default()
        };
        let cmd = KnownCommand::new(
            settings,
            KnownArgs {
                key: "org.messaginghub.pooled.jms.JmsPoolConnectionFactory".into(),
                value: None,
            },
        );
        let mut ui = MockUI::new();
        cmd.execute(&mut ui).unwrap();
        assert_eq!(ui.messages(), ["org.messaginghub:pooled-jms:9.9.9"]);
    }

    #[test]
    fn unknown_key_fails() {
        let (result, ui) = run("org.nowhere.Thing", None);
        assert_eq!(result.exit_code, 1);
        assert!(ui.has_warning("org.nowhere.Thing"));
    }
}
