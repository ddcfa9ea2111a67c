//! Bundled catalogs embedded at compile time.
//!
//! The `catalog/` directory ships with the crate and holds read-only data:
//! - `capabilities.yml` - logical capability names and their coordinates
//! - `known/*.yml` - class-name and config-key prefixes ([`crate::known`])
//! - `known-repos.yml` - groups that need an extra repository
//! - `versions.yml` - values for `${token}` placeholders
//! - `templates/` - built-in route templates

pub mod capabilities;

pub use capabilities::CapabilityCatalog;

use crate::error::{DepsError, Result};
use include_dir::{include_dir, Dir};
use serde::de::DeserializeOwned;

/// Embedded catalog directory.
static CATALOG_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/catalog");

/// Suffix of bundled route template files.
pub const TEMPLATE_SUFFIX: &str = ".template.yaml";

/// Read a bundled file as UTF-8.
pub fn bundled_file(path: &str) -> Result<&'static str> {
    let file = CATALOG_DIR
        .get_file(path)
        .ok_or_else(|| DepsError::CatalogError {
            name: path.to_string(),
            message: "not bundled".to_string(),
        })?;

    file.contents_utf8().ok_or_else(|| DepsError::CatalogError {
        name: path.to_string(),
        message: "Invalid UTF-8".to_string(),
    })
}

/// Parse a bundled YAML file.
pub fn load_yaml<T: DeserializeOwned>(path: &str) -> Result<T> {
    let content = bundled_file(path)?;
    serde_yaml::from_str(content).map_err(|e| DepsError::CatalogError {
        name: path.to_string(),
        message: e.to_string(),
    })
}

/// Parse every bundled YAML file in `dir`, in file-name order.
pub fn load_yaml_dir<T: DeserializeOwned>(dir: &str) -> Result<Vec<T>> {
    let Some(entries) = CATALOG_DIR.get_dir(dir) else {
        return Ok(Vec::new());
    };

    let mut paths: Vec<_> = entries
        .files()
        .map(|f| f.path())
        .filter(|p| p.extension().is_some_and(|e| e == "yml" || e == "yaml"))
        .collect();
    paths.sort();

    paths
        .into_iter()
        .map(|p| load_yaml(&p.to_string_lossy()))
        .collect()
}

/// Built-in route templates as `(name, content)` pairs.
pub fn bundled_templates() -> Vec<(String, &'static str)> {
    let Some(dir) = CATALOG_DIR.get_dir("templates") else {
        return Vec::new();
    };

    dir.files()
        .filter_map(|file| {
            let file_name = file.path().file_name()?.to_str()?;
            let name = file_name.strip_suffix(TEMPLATE_SUFFIX)?;
            Some((name.to_string(), file.contents_utf8()?))
        })
        .collect()
}
