//! Command-line interface for conduit-deps.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    Cli, Commands, CompletionsArgs, EnsureArgs, KnownArgs, LookupArgs, ParseArgs,
};
pub use commands::cache::{CacheArgs, CacheSubcommand};
pub use commands::{Command, CommandDispatcher, CommandResult};
