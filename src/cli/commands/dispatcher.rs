//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli::args::{Cli, Commands};
use crate::config::{find_project_root, load_settings, Settings, SettingsOverrides};
use crate::error::Result;
use crate::ui::UserInterface;

use super::cache::CacheCommand;
use super::completions::CompletionsCommand;
use super::ensure::EnsureCommand;
use super::known::KnownCommand;
use super::lookup::LookupCommand;
use super::parse::ParseCommand;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command, reporting through `ui`.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
    overrides: SettingsOverrides,
}

impl CommandDispatcher {
    /// Create a dispatcher for the given directory and global flags.
    pub fn new(project_root: PathBuf, overrides: SettingsOverrides) -> Self {
        Self {
            project_root,
            overrides,
        }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Layered settings for the project, with the global flags applied.
    pub fn settings(&self) -> Result<Settings> {
        let root = find_project_root(&self.project_root).unwrap_or_else(|| self.project_root.clone());
        debug!("Loading settings for {}", root.display());
        let mut settings = load_settings(&root)?;
        settings.apply_overrides(&self.overrides);
        Ok(settings)
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Commands::Ensure(args) => {
                let cmd = EnsureCommand::new(self.settings()?, args.clone());
                cmd.execute(ui)
            }
            Commands::Lookup(args) => {
                let cmd = LookupCommand::new(self.settings()?, args.clone());
                cmd.execute(ui)
            }
            Commands::Known(args) => {
                let cmd = KnownCommand::new(self.settings()?, args.clone());
                cmd.execute(ui)
            }
            Commands::Parse(args) => {
                let cmd = ParseCommand::new(self.settings()?, args.clone());
                cmd.execute(ui)
            }
            Commands::Cache(args) => {
                let cmd = CacheCommand::new(self.settings()?, args.clone());
                cmd.execute(ui)
            }
            Commands::Completions(args) => {
                let cmd = CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
        }
    }
}
