//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands are
//! routed by [`CommandDispatcher`], which also loads the layered settings
//! the resolving commands share.

pub mod cache;
pub mod completions;
pub mod dispatcher;
pub mod ensure;
pub mod known;
pub mod lookup;
pub mod parse;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
