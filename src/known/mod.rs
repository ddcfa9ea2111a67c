//! Known dependencies and repositories.
//!
//! Maps class names and configuration keys to the coordinate that provides
//! them, using longest-prefix matching over dotted namespaces:
//!
//! ```
//! use conduit_deps::known::KnownDependencies;
//!
//! let known = KnownDependencies::from_tables([[
//!     ("com.foo", "org.example:foo:1.0"),
//!     ("com.foo.bar", "org.example:foo-bar:1.0"),
//! ]]);
//!
//! assert_eq!(known.resolve("com.foo.bar.Baz").unwrap().name(), "foo-bar");
//! assert_eq!(known.resolve("com.foo.Qux").unwrap().name(), "foo");
//! ```

pub mod versions;

pub use versions::VersionProperties;

use std::collections::HashMap;

use crate::coordinate::Coordinate;
use crate::error::Result;

/// Strip the last dotted segment of `key`, if any.
fn parent_namespace(key: &str) -> Option<&str> {
    key.rfind('.').map(|i| &key[..i])
}

/// Walk `key` and its dotted parents until `lookup` hits.
fn longest_prefix<'a, T>(
    mut key: &str,
    lookup: impl Fn(&str) -> Option<&'a T>,
) -> Option<&'a T> {
    loop {
        if let Some(found) = lookup(key) {
            return Some(found);
        }
        key = parent_namespace(key)?;
    }
}

/// Index of class/config name prefixes to coordinate templates.
#[derive(Debug, Clone, Default)]
pub struct KnownDependencies {
    entries: HashMap<String, String>,
    versions: VersionProperties,
    default_version: Option<String>,
}

impl KnownDependencies {
    /// Load every bundled table under `catalog/known/`.
    pub fn bundled(versions: VersionProperties) -> Result<Self> {
        let tables: Vec<HashMap<String, String>> = crate::catalog::load_yaml_dir("known")?;
        let mut known = Self {
            versions,
            ..Self::default()
        };
        for table in tables {
            known.merge(table);
        }
        Ok(known)
    }

    /// Build an index from in-memory tables (later tables win).
    pub fn from_tables<T, K, V>(tables: impl IntoIterator<Item = T>) -> Self
    where
        T: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut known = Self::default();
        for table in tables {
            known.merge(table);
        }
        known
    }

    /// Version used for templates that do not carry one.
    pub fn with_default_version(mut self, version: impl Into<String>) -> Self {
        self.default_version = Some(version.into());
        self
    }

    /// Additively merge a table; duplicate keys take the new value.
    pub fn merge<K, V>(&mut self, table: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in table {
            self.entries.insert(key.into(), value.into());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a class name or configuration key to a coordinate.
    ///
    /// Tries the exact key, then strips trailing dotted segments one at a
    /// time until an entry matches.
    pub fn resolve(&self, key: &str) -> Option<Coordinate> {
        let template = longest_prefix(key, |k| self.entries.get(k))?;
        Some(self.instantiate(template))
    }

    /// Resolve a `key=value` configuration line.
    ///
    /// An entry for the exact line wins over any entry for the key, so
    /// hints carried by the value (`enablePrometheus=true`) are not hidden
    /// by a shorter namespace.
    pub fn resolve_config_line(&self, key: &str, value: &str) -> Option<Coordinate> {
        let line = format!("{}={}", key, value);
        if let Some(template) = self.entries.get(&line) {
            return Some(self.instantiate(template));
        }
        self.resolve(key).or_else(|| self.resolve(&line))
    }

    /// Expand a template; a version placeholder with no known value leaves
    /// the coordinate unversioned.
    fn instantiate(&self, template: &str) -> Coordinate {
        let expanded = self.versions.expand(template);
        let coordinate = Coordinate::parse(&expanded, self.default_version.as_deref());
        match coordinate.version() {
            Some(v) if VersionProperties::has_placeholder(v) => coordinate.with_version(""),
            _ => coordinate,
        }
    }
}

/// Groups whose artifacts live in a non-default repository.
#[derive(Debug, Clone, Default)]
pub struct KnownRepositories {
    entries: HashMap<String, String>,
}

impl KnownRepositories {
    /// Load the bundled `known-repos.yml`.
    pub fn bundled() -> Result<Self> {
        Ok(Self {
            entries: crate::catalog::load_yaml("known-repos.yml")?,
        })
    }

    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Repository URL needed by `group`, by longest dotted prefix.
    pub fn resolve(&self, group: &str) -> Option<&str> {
        longest_prefix(group, |k| self.entries.get(k)).map(String::as_str)
    }
}
