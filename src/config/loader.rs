//! Settings file discovery and layering.
//!
//! Settings are merged in this order, later layers winning:
//! 1. Built-in defaults
//! 2. User config (`~/.conduit/deps.yml`)
//! 3. Project config (`.conduit/deps.yml`)
//! 4. Local overrides (`.conduit/deps.local.yml`)
//! 5. Environment variables (see [`super::env`])
//! 6. Command-line flags

use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::env::apply_env;
use super::settings::Settings;
use crate::error::{DepsError, Result};

/// Directory holding configuration, in the home and project directories.
pub const CONFIG_DIR: &str = ".conduit";

const CONFIG_FILE: &str = "deps.yml";
const LOCAL_CONFIG_FILE: &str = "deps.local.yml";

/// Settings files that exist, in merge order.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    pub user_global: Option<PathBuf>,
    pub project: Option<PathBuf>,
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover settings files for a project.
    pub fn discover(project_root: &Path) -> Self {
        Self::discover_with_home(project_root, dirs::home_dir().as_deref())
    }

    /// Discover settings files using an explicit home directory.
    pub fn discover_with_home(project_root: &Path, home: Option<&Path>) -> Self {
        let existing = |path: PathBuf| path.is_file().then_some(path);
        Self {
            user_global: home.and_then(|h| existing(h.join(CONFIG_DIR).join(CONFIG_FILE))),
            project: existing(project_root.join(CONFIG_DIR).join(CONFIG_FILE)),
            project_local: existing(project_root.join(CONFIG_DIR).join(LOCAL_CONFIG_FILE)),
        }
    }

    pub fn all_existing(&self) -> Vec<&PathBuf> {
        [&self.user_global, &self.project, &self.project_local]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Walk up from `start` to the nearest directory with `.conduit` or `.git`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_DIR).is_dir() || current.join(".git").exists() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

fn load_value(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Value::Mapping(Default::default()));
    }
    let value: Value = serde_yaml::from_str(&content).map_err(|e| DepsError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    // A file holding only comments parses as null.
    if value.is_null() {
        return Ok(Value::Mapping(Default::default()));
    }
    Ok(value)
}

/// Merge `overlay` into `base`; mappings merge key by key, anything else
/// is replaced.
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Load and merge the given files over the defaults, without the
/// environment.
pub fn load_files(paths: &ConfigPaths) -> Result<Settings> {
    let mut merged = Value::Mapping(Default::default());
    let mut last = None;

    for path in paths.all_existing() {
        let value = load_value(path)?;
        // A file must itself be a mapping of settings.
        if !value.is_mapping() {
            return Err(DepsError::ConfigParseError {
                path: path.clone(),
                message: "expected a mapping of settings".to_string(),
            });
        }
        serde_yaml::from_value::<Settings>(value.clone()).map_err(|e| {
            DepsError::ConfigParseError {
                path: path.clone(),
                message: e.to_string(),
            }
        })?;
        merge(&mut merged, value);
        last = Some(path.clone());
    }

    serde_yaml::from_value(merged).map_err(|e| DepsError::ConfigParseError {
        path: last.unwrap_or_default(),
        message: format!("Failed to merge settings: {}", e),
    })
}

/// Load settings for a project: files, then the process environment.
pub fn load_settings(project_root: &Path) -> Result<Settings> {
    let mut settings = load_files(&ConfigPaths::discover(project_root))?;
    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, file: &str, content: &str) {
        let dir = root.join(CONFIG_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), content).unwrap();
    }

    #[test]
    fn discovers_existing_files_only() {
        let project = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        write(project.path(), CONFIG_FILE, "offline: true\n");

        let paths = ConfigPaths::discover_with_home(project.path(), Some(home.path()));
        assert!(paths.project.is_some());
        assert!(paths.user_global.is_none());
        assert!(paths.project_local.is_none());
        assert_eq!(paths.all_existing().len(), 1);
    }

    #[test]
    fn later_files_win() {
        let project = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        write(home.path(), CONFIG_FILE, "workers: 8\nsilent: true\n");
        write(project.path(), CONFIG_FILE, "workers: 2\n");
        write(project.path(), LOCAL_CONFIG_FILE, "offline: true\n");

        let paths = ConfigPaths::discover_with_home(project.path(), Some(home.path()));
        let settings = load_files(&paths).unwrap();

        assert_eq!(settings.workers, 2);
        assert!(settings.silent);
        assert!(settings.offline);
    }

    #[test]
    fn nested_maps_merge() {
        let project = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        write(home.path(), CONFIG_FILE, "companion_versions:\n  a: \"1\"\n");
        write(project.path(), CONFIG_FILE, "companion_versions:\n  b: \"2\"\n");

        let paths = ConfigPaths::discover_with_home(project.path(), Some(home.path()));
        let settings = load_files(&paths).unwrap();
        assert_eq!(settings.companion_versions.len(), 2);
    }

    #[test]
    fn parse_error_names_file() {
        let project = TempDir::new().unwrap();
        write(project.path(), CONFIG_FILE, "workers: [not a number\n");

        let paths = ConfigPaths::discover_with_home(project.path(), None);
        match load_files(&paths).unwrap_err() {
            DepsError::ConfigParseError { path, .. } => {
                assert!(path.ends_with(".conduit/deps.yml"));
            }
            other => panic!("expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn wrong_type_names_file() {
        let project = TempDir::new().unwrap();
        write(project.path(), LOCAL_CONFIG_FILE, "workers: many\n");

        let paths = ConfigPaths::discover_with_home(project.path(), None);
        match load_files(&paths).unwrap_err() {
            DepsError::ConfigParseError { path, .. } => {
                assert!(path.ends_with(".conduit/deps.local.yml"));
            }
            other => panic!("expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn empty_file_is_defaults() {
        let project = TempDir::new().unwrap();
        write(project.path(), CONFIG_FILE, "");

        let paths = ConfigPaths::discover_with_home(project.path(), None);
        assert_eq!(load_files(&paths).unwrap(), Settings::default());
    }

    #[test]
    fn no_files_is_defaults() {
        let project = TempDir::new().unwrap();
        let paths = ConfigPaths::discover_with_home(project.path(), None);
        assert_eq!(load_files(&paths).unwrap(), Settings::default());
    }

    #[test]
    fn finds_project_root() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir_all(temp.path().join(CONFIG_DIR)).unwrap();

        assert_eq!(find_project_root(&nested), Some(temp.path().to_path_buf()));
    }
}
