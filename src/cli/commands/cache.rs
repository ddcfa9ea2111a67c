//! Cache command implementation.
//!
//! Provides `conduit-deps cache path` and `conduit-deps cache clear`.

use clap::{Args, Subcommand};

use crate::config::Settings;
use crate::error::Result;
use crate::repository::LocalRepository;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Arguments for the cache command.
#[derive(Debug, Clone, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

/// Cache subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum CacheSubcommand {
    /// Show the local artifact cache directory.
    Path,
    /// Remove every cached artifact.
    Clear,
}

/// The cache command implementation.
pub struct CacheCommand {
    settings: Settings,
    args: CacheArgs,
}

impl CacheCommand {
    pub fn new(settings: Settings, args: CacheArgs) -> Self {
        Self { settings, args }
    }
}

impl Command for CacheCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let cache = LocalRepository::new(self.settings.cache_root());

        match &self.args.command {
            CacheSubcommand::Path => ui.message(&cache.root().display().to_string()),
            CacheSubcommand::Clear => {
                if !cache.root().exists() {
                    ui.message("Cache is empty");
                    return Ok(CommandResult::success());
                }
                cache.clear()?;
                ui.success(&format!("Cleared {}", cache.root().display()));
            }
        }

        Ok(CommandResult::success())
    }
}
