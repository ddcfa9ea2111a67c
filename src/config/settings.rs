//! Resolution settings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::demand::StubPattern;
use crate::repository::{Repository, SNAPSHOT_REPOSITORY};

/// Settings controlling how dependencies are resolved.
///
/// Every field has a default, so an empty file is valid:
///
/// ```yaml
/// repositories:
///   - https://packages.confluent.io/maven/
/// offline: false
/// stub_pattern: "jms,kafka"
/// workers: 4
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Repositories searched after the default public one.
    pub repositories: Vec<String>,

    /// Revalidate cached files against their repository.
    pub fresh: bool,

    /// Resolve from the local cache only.
    pub offline: bool,

    /// Local cache directory (default `~/.conduit/repository`).
    pub cache_dir: Option<PathBuf>,

    /// Names replaced by no-op stubs.
    pub stub_pattern: Option<String>,

    /// Stub components that would open listening services.
    pub silent: bool,

    /// Download worker threads.
    pub workers: usize,

    /// Seconds between progress messages while waiting on a download.
    pub poll_interval_secs: u64,

    /// Version used for engine coordinates without one.
    pub engine_version: String,

    /// Versions of companion runtimes, substituted into catalog templates.
    pub companion_versions: BTreeMap<String, String>,

    /// Consult the default public repository.
    pub central: bool,

    /// Repository for pre-release engine builds; empty disables it.
    pub snapshot_repository: String,

    /// Extra directories holding route templates.
    pub template_dirs: Vec<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            repositories: Vec::new(),
            fresh: false,
            offline: false,
            cache_dir: None,
            stub_pattern: None,
            silent: false,
            workers: 4,
            poll_interval_secs: 5,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            companion_versions: BTreeMap::new(),
            central: true,
            snapshot_repository: SNAPSHOT_REPOSITORY.to_string(),
            template_dirs: Vec::new(),
        }
    }
}

impl Settings {
    /// The local cache root.
    pub fn cache_root(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".conduit")
                .join("repository")
        })
    }

    /// User repositories in search order.
    pub fn repository_list(&self) -> Vec<Repository> {
        Repository::parse_list(&self.repositories.join(","))
    }

    /// Add repositories from a comma-separated list, skipping duplicates.
    pub fn add_repositories(&mut self, urls: &str) {
        for url in urls.split(',').map(str::trim).filter(|u| !u.is_empty()) {
            if !self.repositories.iter().any(|r| r == url) {
                self.repositories.push(url.to_string());
            }
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn stub(&self) -> Option<StubPattern> {
        self.stub_pattern
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(StubPattern::new)
    }

    pub fn snapshot_repository(&self) -> Option<Repository> {
        let url = self.snapshot_repository.trim();
        (!url.is_empty()).then(|| Repository::snapshots(url))
    }
}

/// Values given on the command line, applied last.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub repositories: Option<String>,
    pub fresh: bool,
    pub offline: bool,
    pub cache_dir: Option<PathBuf>,
    pub stub_pattern: Option<String>,
    pub silent: bool,
}

impl Settings {
    /// Apply command-line values. Flags only ever turn options on.
    pub fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(repos) = &overrides.repositories {
            self.add_repositories(repos);
        }
        self.fresh |= overrides.fresh;
        self.offline |= overrides.offline;
        self.silent |= overrides.silent;
        if let Some(dir) = &overrides.cache_dir {
            self.cache_dir = Some(dir.clone());
        }
        if let Some(pattern) = &overrides.stub_pattern {
            self.stub_pattern = Some(pattern.clone());
        }
    }
}
