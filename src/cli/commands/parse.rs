//! Parse command implementation.

use crate::cli::args::ParseArgs;
use crate::config::Settings;
use crate::coordinate::Coordinate;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Shows the fields of a parsed module reference.
pub struct ParseCommand {
    settings: Settings,
    args: ParseArgs,
}

impl ParseCommand {
    pub fn new(settings: Settings, args: ParseArgs) -> Self {
        Self { settings, args }
    }
}

impl Command for ParseCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let c = Coordinate::parse(&self.args.reference, Some(&self.settings.engine_version));

        ui.show_header(&c.to_string());
        if c.is_literal() {
            ui.warning("Not a recognised reference; kept as a literal name");
        }
        ui.show_field("group", c.group());
        ui.show_field("name", c.name());
        ui.show_field("version", c.version().unwrap_or("-"));
        ui.show_field("packaging", c.packaging());
        if !c.classifier().is_empty() {
            ui.show_field("classifier", c.classifier());
        }
        ui.show_field("file", &c.file_name());
        ui.show_field("engine", if c.is_engine() { "yes" } else { "no" });
        ui.show_field("snapshot", if c.is_snapshot() { "yes" } else { "no" });

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;

    fn parse(reference: &str) -> MockUI {
        let settings = Settings {
            engine_version: "4.2.0".into(),
            ..Settings::default()
        };
        let cmd = ParseCommand::new(
            settings,
            ParseArgs {
                reference: reference.to_string(),
            },
        );
        let mut ui = MockUI::new();
        cmd.execute(&mut ui).unwrap();
        ui
    }

    fn render(ui: &MockUI) -> String {
        ui.fields()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn engine_shorthand() {
        let ui = parse("conduit:kafka");
        assert_eq!(ui.headers(), ["dev.conduit:conduit-kafka:4.2.0"]);
        insta::assert_snapshot!(render(&ui), @r"
        group=dev.conduit
        name=conduit-kafka
        version=4.2.0
        packaging=library
        file=conduit-kafka-4.2.0.jar
        engine=yes
        snapshot=no
        ");
    }

    #[test]
    fn classifier_is_shown() {
        let ui = parse("mvn:org.example:widget:jar:linux:1.0-SNAPSHOT");
        assert_eq!(ui.field("classifier"), Some("linux"));
        assert_eq!(ui.field("snapshot"), Some("yes"));
        assert_eq!(ui.field("file"), Some("widget-1.0-SNAPSHOT-linux.jar"));
    }
}
