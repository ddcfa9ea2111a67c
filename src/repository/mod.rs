//! Artifact repositories and resolution.
//!
//! An [`ArtifactResolver`] turns coordinates into local files. The
//! [`RepositoryResolver`] implementation fetches from an ordered list of
//! remote repositories into a shared [`LocalRepository`] cache, following
//! module descriptors for transitive resolution.

pub mod cache;
pub mod descriptor;
pub mod fetch;
pub mod resolver;

pub use cache::{CacheMetadata, LocalRepository};
pub use descriptor::{DeclaredDependency, DependencyScope, ModuleDescriptor};
pub use fetch::{FetchOutcome, FetchResponse, HttpFetcher};
pub use resolver::RepositoryResolver;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::coordinate::Coordinate;
use crate::error::Result;

/// The default public repository.
pub const MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2";

/// Repository hosting pre-release builds of the engine.
pub const SNAPSHOT_REPOSITORY: &str = "https://repository.conduit.dev/snapshots";

/// How long a cached snapshot is trusted before revalidation.
const SNAPSHOT_TTL_HOURS: i64 = 24;

/// When cached files are checked against the repository again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdatePolicy {
    /// Cached files are used as-is.
    Never,
    /// Cached snapshots older than a day are revalidated.
    Daily,
    /// Every cached file is revalidated.
    Always,
}

impl UpdatePolicy {
    /// Whether a file cached at `cached_at` must be checked again.
    pub fn requires_check(&self, cached_at: DateTime<Utc>, snapshot: bool) -> bool {
        match self {
            Self::Never => false,
            Self::Daily => {
                snapshot && Utc::now().signed_duration_since(cached_at) > Duration::hours(SNAPSHOT_TTL_HOURS)
            }
            Self::Always => true,
        }
    }
}

/// Which versions a repository serves and how its files are refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryPolicy {
    pub releases: bool,
    pub snapshots: bool,
    pub update: UpdatePolicy,
}

impl RepositoryPolicy {
    /// Releases only, cached forever.
    pub fn releases() -> Self {
        Self {
            releases: true,
            snapshots: false,
            update: UpdatePolicy::Never,
        }
    }

    /// Snapshots only, revalidated daily.
    pub fn snapshots() -> Self {
        Self {
            releases: false,
            snapshots: true,
            update: UpdatePolicy::Daily,
        }
    }

    /// Both kinds of version.
    pub fn any() -> Self {
        Self {
            releases: true,
            snapshots: true,
            update: UpdatePolicy::Daily,
        }
    }
}

/// A remote (or `file://`) repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: String,
    pub url: String,
    pub policy: RepositoryPolicy,
}

impl Repository {
    pub fn new(id: impl Into<String>, url: impl Into<String>, policy: RepositoryPolicy) -> Self {
        let url: String = url.into();
        Self {
            id: id.into(),
            url: url.trim_end_matches('/').to_string(),
            policy,
        }
    }

    /// The default public repository.
    pub fn central() -> Self {
        Self::new("central", MAVEN_CENTRAL, RepositoryPolicy::releases())
    }

    /// The engine's pre-release repository.
    pub fn snapshots(url: &str) -> Self {
        Self::new("conduit-snapshots", url, RepositoryPolicy::snapshots())
    }

    /// A user-supplied repository; `index` numbers it among its peers.
    pub fn custom(index: usize, url: &str) -> Self {
        Self::new(format!("custom{}", index + 1), url, RepositoryPolicy::any())
    }

    /// Parse a comma-separated list of repository URLs.
    pub fn parse_list(urls: &str) -> Vec<Self> {
        urls.split(',')
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .enumerate()
            .map(|(i, url)| Self::custom(i, url))
            .collect()
    }

    /// Force revalidation of every cached file.
    pub fn always_update(mut self) -> Self {
        self.policy.update = UpdatePolicy::Always;
        self
    }

    /// Whether this repository serves the coordinate's kind of version.
    pub fn accepts(&self, coordinate: &Coordinate) -> bool {
        if coordinate.is_snapshot() {
            self.policy.snapshots
        } else {
            self.policy.releases
        }
    }

    /// URL of a file in this repository's directory for `coordinate`.
    pub fn file_url(&self, coordinate: &Coordinate, file_name: &str) -> String {
        format!("{}/{}/{}", self.url, coordinate.url_directory(), file_name)
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.url)
    }
}

/// Where a resolved artifact came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    /// Served from the local cache without contacting a repository.
    Cache,
    /// Downloaded from (or revalidated against) a remote repository.
    Remote { id: String, url: String },
}

impl ArtifactSource {
    pub fn is_cache(&self) -> bool {
        matches!(self, Self::Cache)
    }
}

impl fmt::Display for ArtifactSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache => write!(f, "local cache"),
            Self::Remote { id, url } => write!(f, "{} ({})", id, url),
        }
    }
}

/// A coordinate materialized as a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub coordinate: Coordinate,
    pub file: PathBuf,
    pub source: ArtifactSource,
}

/// Parameters of one resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolveRequest {
    pub coordinates: Vec<Coordinate>,
    /// Repositories searched after the default one.
    pub repositories: Vec<Repository>,
    pub offline: bool,
    pub bypass_cache: bool,
    pub transitive: bool,
}

impl ResolveRequest {
    pub fn new(coordinates: impl IntoIterator<Item = Coordinate>) -> Self {
        Self {
            coordinates: coordinates.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_repositories(mut self, repositories: impl IntoIterator<Item = Repository>) -> Self {
        self.repositories.extend(repositories);
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn bypass_cache(mut self, bypass_cache: bool) -> Self {
        self.bypass_cache = bypass_cache;
        self
    }

    pub fn transitive(mut self, transitive: bool) -> Self {
        self.transitive = transitive;
        self
    }
}

/// Resolves coordinates to local files.
pub trait ArtifactResolver: Send + Sync {
    /// Resolve every requested coordinate (and its closure when
    /// transitive). A batch either fully succeeds or fails.
    fn resolve(&self, request: &ResolveRequest) -> Result<Vec<ResolvedArtifact>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn central_serves_releases_only() {
        let central = Repository::central();
        assert!(central.accepts(&Coordinate::parse("a.b:c:1.0", None)));
        assert!(!central.accepts(&Coordinate::parse("a.b:c:1.0-SNAPSHOT", None)));
    }

    #[test]
    fn parse_list_numbers_custom_repositories() {
        let repos = Repository::parse_list("https://one.example/, ,https://two.example");
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].id, "custom1");
        assert_eq!(repos[0].url, "https://one.example");
        assert_eq!(repos[1].id, "custom2");
    }

    #[test]
    fn file_url_uses_layout() {
        let repo = Repository::new("r", "https://repo.example/", RepositoryPolicy::any());
        let c = Coordinate::parse("org.example:widget:1.0", None);
        assert_eq!(
            repo.file_url(&c, &c.file_name()),
            "https://repo.example/org/example/widget/1.0/widget-1.0.jar"
        );
    }

    #[test]
    fn update_policies() {
        let old = Utc::now() - Duration::days(2);
        let fresh = Utc::now();
        assert!(!UpdatePolicy::Never.requires_check(old, true));
        assert!(UpdatePolicy::Daily.requires_check(old, true));
        assert!(!UpdatePolicy::Daily.requires_check(fresh, true));
        assert!(!UpdatePolicy::Daily.requires_check(old, false));
        assert!(UpdatePolicy::Always.requires_check(fresh, false));
    }

    #[test]
    fn always_update_overrides_policy() {
        let repo = Repository::central().always_update();
        assert_eq!(repo.policy.update, UpdatePolicy::Always);
        assert!(repo.policy.releases);
    }

    #[test]
    fn source_display() {
        assert_eq!(ArtifactSource::Cache.to_string(), "local cache");
        let remote = ArtifactSource::Remote {
            id: "central".into(),
            url: MAVEN_CENTRAL.into(),
        };
        assert_eq!(remote.to_string(), "central (https://repo1.maven.org/maven2)");
    }
}
