//! Environment variable overrides.

use std::path::PathBuf;
use tracing::warn;

use super::settings::Settings;

/// Comma-separated extra repositories.
pub const REPOS_ENV: &str = "CONDUIT_REPOS";
/// Revalidate cached files.
pub const FRESH_ENV: &str = "CONDUIT_FRESH";
/// Resolve from the local cache only.
pub const OFFLINE_ENV: &str = "CONDUIT_OFFLINE";
/// Local cache directory.
pub const CACHE_DIR_ENV: &str = "CONDUIT_CACHE_DIR";
/// Stub pattern.
pub const STUB_ENV: &str = "CONDUIT_STUB";

fn parse_bool(key: &str, value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        other => {
            warn!("Ignoring {}={}: expected true or false", key, other);
            None
        }
    }
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(repos) = lookup(REPOS_ENV) {
        settings.add_repositories(&repos);
    }
    if let Some(fresh) = lookup(FRESH_ENV).and_then(|v| parse_bool(FRESH_ENV, &v)) {
        settings.fresh = fresh;
    }
    if let Some(offline) = lookup(OFFLINE_ENV).and_then(|v| parse_bool(OFFLINE_ENV, &v)) {
        settings.offline = offline;
    }
    if let Some(dir) = lookup(CACHE_DIR_ENV).filter(|d| !d.is_empty()) {
        settings.cache_dir = Some(PathBuf::from(dir));
    }
    if let Some(pattern) = lookup(STUB_ENV) {
        settings.stub_pattern = Some(pattern);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn apply(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut settings = Settings::default();
        apply_env(&mut settings, |key| vars.get(key).cloned());
        settings
    }

    #[test]
    fn no_variables_changes_nothing() {
        assert_eq!(apply(&[]), Settings::default());
    }

    #[test]
    fn reads_every_variable() {
        let settings = apply(&[
            (REPOS_ENV, "https://a.example,https://b.example"),
            (FRESH_ENV, "true"),
            (OFFLINE_ENV, "1"),
            (CACHE_DIR_ENV, "/var/cache/conduit"),
            (STUB_ENV, "kafka"),
        ]);
        assert_eq!(settings.repositories.len(), 2);
        assert!(settings.fresh);
        assert!(settings.offline);
        assert_eq!(settings.cache_root(), PathBuf::from("/var/cache/conduit"));
        assert_eq!(settings.stub_pattern.as_deref(), Some("kafka"));
    }

    #[test]
    fn invalid_bool_is_ignored() {
        let settings = apply(&[(OFFLINE_ENV, "maybe")]);
        assert!(!settings.offline);
    }

    #[test]
    fn false_values() {
        for value in ["0", "false", "NO", "off"] {
            assert_eq!(parse_bool("X", value), Some(false));
        }
    }
}
