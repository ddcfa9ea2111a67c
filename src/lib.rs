//! conduit-deps - On-demand dependency resolution for the Conduit routing
//! engine.
//!
//! When a route references a building block whose code is not yet loaded,
//! the engine asks this crate to find the module that provides it, download
//! it with its declared dependencies from artifact repositories, and add the
//! files to the running load path before construction continues.
//!
//! # Modules
//!
//! - [`coordinate`] - Parsing module references into coordinates
//! - [`repository`] - Repository layout, local cache and the resolver
//! - [`loadpath`] - The runtime load path and its startup snapshot
//! - [`download`] - Download coordinator, worker pool and listeners
//! - [`demand`] - Resolver decorators that download, stub or suggest
//! - [`known`] - Class-name and configuration-key index
//! - [`catalog`] - Bundled capability catalog and route templates
//! - [`context`] - Per-engine owner of all resolution state
//! - [`config`] - Settings files and environment overrides
//! - [`cli`] - Command-line interface
//! - [`ui`] - Terminal output
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```
//! use conduit_deps::coordinate::Coordinate;
//!
//! let c = Coordinate::parse("conduit:kafka", Some("4.2.0"));
//! assert_eq!(c.to_string(), "dev.conduit:conduit-kafka:4.2.0");
//! assert_eq!(c.file_name(), "conduit-kafka-4.2.0.jar");
//! ```
//!
//! For resolution against live repositories, see the integration tests.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod context;
pub mod coordinate;
pub mod demand;
pub mod download;
pub mod error;
pub mod known;
pub mod loadpath;
pub mod repository;
pub mod ui;

pub use context::ResolutionContext;
pub use error::{DepsError, Result};
