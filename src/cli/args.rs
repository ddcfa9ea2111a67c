//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use super::commands::cache::CacheArgs;
use crate::config::SettingsOverrides;
use crate::demand::CapabilityKind;

/// conduit-deps - Resolve routing engine modules on demand.
#[derive(Debug, Parser)]
#[command(name = "conduit-deps")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Extra repositories (comma-separated URLs)
    #[arg(long, global = true, value_name = "URLS")]
    pub repos: Option<String>,

    /// Revalidate cached files against their repository
    #[arg(long, global = true)]
    pub fresh: bool,

    /// Resolve from the local cache only
    #[arg(long, global = true)]
    pub offline: bool,

    /// Local cache directory (default ~/.conduit/repository)
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Replace matching capabilities with stubs (comma-separated, `*` for all)
    #[arg(long, global = true, value_name = "PATTERN")]
    pub stub: Option<String>,

    /// Stub components that would open listening services
    #[arg(long, global = true)]
    pub silent: bool,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show per-artifact detail
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Settings given as global flags.
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            repositories: self.repos.clone(),
            fresh: self.fresh,
            offline: self.offline,
            cache_dir: self.cache_dir.clone(),
            stub_pattern: self.stub.clone(),
            silent: self.silent,
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download modules and add them to the load path
    Ensure(EnsureArgs),

    /// Look up the module providing a capability
    Lookup(LookupArgs),

    /// Find the module providing a class name or configuration key
    Known(KnownArgs),

    /// Show how a module reference is parsed
    Parse(ParseArgs),

    /// Manage the local artifact cache
    Cache(CacheArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `ensure` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct EnsureArgs {
    /// Module references (`conduit:kafka`, `mvn:g:a:v`, `g:a:v`)
    #[arg(required = true, value_name = "REF")]
    pub references: Vec<String>,

    /// Skip declared dependencies
    #[arg(long)]
    pub no_transitive: bool,
}

/// Arguments for the `lookup` command.
#[derive(Debug, Clone, clap::Args)]
pub struct LookupArgs {
    /// Capability kind (component, dataformat, language, transformer,
    /// template, periodic-task, uri-factory)
    pub kind: CapabilityKind,

    /// Capability name
    pub name: String,
}

/// Arguments for the `known` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct KnownArgs {
    /// Class name or configuration key
    pub key: String,

    /// Configuration value, for `key=value` hints
    #[arg(long)]
    pub value: Option<String>,
}

/// Arguments for the `parse` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ParseArgs {
    /// Module reference
    pub reference: String,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "conduit-deps",
            "ensure",
            "conduit:kafka",
            "--offline",
            "--repos",
            "https://a.example",
        ]);
        let overrides = cli.overrides();
        assert!(overrides.offline);
        assert_eq!(overrides.repositories.as_deref(), Some("https://a.example"));
        match cli.command {
            Commands::Ensure(args) => {
                assert_eq!(args.references, vec!["conduit:kafka"]);
                assert!(!args.no_transitive);
            }
            other => panic!("expected ensure, got {:?}", other),
        }
    }

    #[test]
    fn lookup_parses_kind() {
        let cli = Cli::parse_from(["conduit-deps", "lookup", "dataformat", "csv"]);
        match cli.command {
            Commands::Lookup(args) => assert_eq!(args.kind, CapabilityKind::DataFormat),
            other => panic!("expected lookup, got {:?}", other),
        }
    }

    #[test]
    fn ensure_requires_a_reference() {
        assert!(Cli::try_parse_from(["conduit-deps", "ensure"]).is_err());
    }
}
