//! Error types for dependency resolution.
//!
//! This module defines [`DepsError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `DepsError` for failures callers need to tell apart
//! - Use `anyhow::Error` (via `DepsError::Other`) for unexpected plumbing errors
//! - Resolution failures are fatal and never retried automatically

use std::path::PathBuf;
use thiserror::Error;

use crate::demand::CapabilityKind;

/// Core error type for dependency resolution.
#[derive(Debug, Error)]
pub enum DepsError {
    /// No repository could supply a required coordinate.
    #[error("Cannot resolve {coordinate} in {}: {message}", .repositories.join(", "))]
    ResolutionFailure {
        coordinate: String,
        repositories: Vec<String>,
        message: String,
    },

    /// A capability name is neither in the catalog nor known to the engine.
    #[error("Unknown {kind} '{name}'{}", did_you_mean(.suggestion))]
    UnknownCapability {
        kind: CapabilityKind,
        name: String,
        suggestion: Option<String>,
    },

    /// The waiting caller was cancelled while a download was still running.
    #[error("Interrupted while waiting for {coordinate}")]
    Interrupted { coordinate: String },

    /// A bundled catalog could not be read.
    #[error("Invalid catalog {name}: {message}")]
    CatalogError { name: String, message: String },

    /// Failed to parse a settings file.
    #[error("Failed to parse settings at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// A route template could not be loaded or parsed.
    #[error("Route template '{name}': {message}")]
    TemplateError { name: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(". Did you mean '{}'?", name),
        None => String::new(),
    }
}

/// Result type alias for resolution operations.
pub type Result<T> = std::result::Result<T, DepsError>;
