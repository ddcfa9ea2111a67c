//! Settings loading.
//!
//! - The settings schema in [`settings`]
//! - File discovery and layering in [`loader`]
//! - Environment variable overrides in [`env`]
//!
//! # Example
//!
//! ```
//! use conduit_deps::config::load_settings;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::create_dir_all(temp.path().join(".conduit")).unwrap();
//! fs::write(temp.path().join(".conduit/deps.yml"), "workers: 2").unwrap();
//!
//! let settings = load_settings(temp.path()).unwrap();
//! assert_eq!(settings.workers, 2);
//! ```

pub mod env;
pub mod loader;
pub mod settings;

pub use loader::{find_project_root, load_files, load_settings, ConfigPaths, CONFIG_DIR};
pub use settings::{Settings, SettingsOverrides};
