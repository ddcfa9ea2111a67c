//! Resolution against remote repositories through the local cache.

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use tracing::{debug, warn};

use super::{
    ArtifactResolver, ArtifactSource, CacheMetadata, FetchOutcome, HttpFetcher, LocalRepository,
    ModuleDescriptor, Repository, ResolveRequest, ResolvedArtifact, UpdatePolicy,
    SNAPSHOT_REPOSITORY,
};
use crate::coordinate::Coordinate;
use crate::error::{DepsError, Result};

/// Result of looking a single file up across repositories.
enum Lookup {
    Found { path: PathBuf, source: ArtifactSource },
    Missing { failures: Vec<String>, errored: bool },
}

/// Resolves coordinates from ordered repositories into a [`LocalRepository`].
#[derive(Debug, Clone)]
pub struct RepositoryResolver {
    cache: LocalRepository,
    fetcher: HttpFetcher,
    central: Option<Repository>,
    snapshots: Option<Repository>,
}

impl RepositoryResolver {
    pub fn new(cache: LocalRepository) -> Self {
        Self {
            cache,
            fetcher: HttpFetcher::new(),
            central: Some(Repository::central()),
            snapshots: Some(Repository::snapshots(SNAPSHOT_REPOSITORY)),
        }
    }

    /// Replace the default public repository (mirrors, tests).
    pub fn with_central(mut self, central: Repository) -> Self {
        self.central = Some(central);
        self
    }

    /// Only consult the repositories named in each request.
    pub fn without_central(mut self) -> Self {
        self.central = None;
        self
    }

    /// Replace the engine's pre-release repository.
    pub fn with_snapshot_repository(mut self, snapshots: Repository) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    /// Never add the pre-release repository for engine snapshots.
    pub fn without_snapshot_repository(mut self) -> Self {
        self.snapshots = None;
        self
    }

    pub fn with_fetcher(mut self, fetcher: HttpFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn cache(&self) -> &LocalRepository {
        &self.cache
    }

    /// Repositories consulted for `coordinate`, in order.
    pub fn repositories_for(&self, request: &ResolveRequest, coordinate: &Coordinate) -> Vec<Repository> {
        let mut repos: Vec<Repository> = self.central.iter().cloned().collect();
        for repo in &request.repositories {
            if !repos.iter().any(|r| r.url == repo.url) {
                repos.push(repo.clone());
            }
        }
        if let Some(snapshots) = &self.snapshots {
            if coordinate.is_engine()
                && coordinate.is_snapshot()
                && !repos.iter().any(|r| r.url == snapshots.url)
            {
                repos.push(snapshots.clone());
            }
        }
        if request.bypass_cache {
            repos = repos.into_iter().map(Repository::always_update).collect();
        }
        repos
    }

    fn failure(coordinate: &Coordinate, repos: &[Repository], message: impl Into<String>) -> DepsError {
        DepsError::ResolutionFailure {
            coordinate: coordinate.to_string(),
            repositories: repos.iter().map(|r| r.url.clone()).collect(),
            message: message.into(),
        }
    }

    fn resolve_artifact(
        &self,
        coordinate: &Coordinate,
        repos: &[Repository],
        request: &ResolveRequest,
    ) -> Result<ResolvedArtifact> {
        if coordinate.is_literal() || !coordinate.is_path_safe() {
            return Err(Self::failure(coordinate, repos, "not a valid coordinate"));
        }
        if coordinate.version().is_none() {
            return Err(Self::failure(coordinate, repos, "no version given"));
        }

        match self.lookup(coordinate, &coordinate.file_name(), repos, request)? {
            Lookup::Found { path, source } => Ok(ResolvedArtifact {
                coordinate: coordinate.clone(),
                file: path,
                source,
            }),
            Lookup::Missing { failures, .. } => Err(Self::failure(coordinate, repos, failures.join("; "))),
        }
    }

    fn resolve_descriptor(
        &self,
        coordinate: &Coordinate,
        repos: &[Repository],
        request: &ResolveRequest,
    ) -> Result<ModuleDescriptor> {
        match self.lookup(coordinate, &coordinate.descriptor_name(), repos, request)? {
            Lookup::Found { path, .. } => {
                let bytes = std::fs::read(&path)?;
                ModuleDescriptor::from_slice(&bytes).map_err(|e| {
                    Self::failure(coordinate, repos, format!("invalid descriptor {}: {}", path.display(), e))
                })
            }
            Lookup::Missing { failures, errored } => {
                if errored {
                    return Err(Self::failure(coordinate, repos, failures.join("; ")));
                }
                debug!("No descriptor for {}, assuming no dependencies", coordinate);
                Ok(ModuleDescriptor::default())
            }
        }
    }

    /// Find `file_name` for `coordinate` in the cache or the repositories.
    fn lookup(
        &self,
        coordinate: &Coordinate,
        file_name: &str,
        repos: &[Repository],
        request: &ResolveRequest,
    ) -> Result<Lookup> {
        let path = self.cache.root().join(coordinate.directory()).join(file_name);
        let metadata = self.cache.metadata(&path);
        let cached = path.is_file();
        let accepting: Vec<&Repository> = repos.iter().filter(|r| r.accepts(coordinate)).collect();

        if cached {
            let stale = match &metadata {
                Some(meta) => accepting
                    .iter()
                    .any(|r| r.policy.update.requires_check(meta.cached_at, coordinate.is_snapshot())),
                None => accepting.iter().any(|r| r.policy.update == UpdatePolicy::Always),
            };
            if request.offline || !stale {
                debug!("Using cached {}", path.display());
                return Ok(Lookup::Found {
                    path,
                    source: ArtifactSource::Cache,
                });
            }
        }

        if request.offline {
            return Ok(Lookup::Missing {
                failures: vec![format!(
                    "{} is not in the local cache {} (offline)",
                    file_name,
                    self.cache.root().display()
                )],
                errored: false,
            });
        }

        if accepting.is_empty() {
            let kind = if coordinate.is_snapshot() { "snapshot" } else { "release" };
            return Ok(Lookup::Missing {
                failures: vec![format!("no repository serves {} versions", kind)],
                errored: false,
            });
        }

        let etag = if cached {
            metadata.as_ref().and_then(|m| m.etag.as_deref())
        } else {
            None
        };

        let mut failures = Vec::new();
        let mut errored = false;
        for repo in accepting {
            let url = repo.file_url(coordinate, file_name);
            let source = ArtifactSource::Remote {
                id: repo.id.clone(),
                url: repo.url.clone(),
            };

            match self.fetcher.fetch(&url, etag) {
                Ok(FetchOutcome::Fetched(response)) => {
                    let sha256 = self.verify_checksum(&url, &response.bytes);
                    let meta = CacheMetadata {
                        repository_id: repo.id.clone(),
                        repository_url: repo.url.clone(),
                        cached_at: Utc::now(),
                        etag: response.etag,
                        sha256,
                        size_bytes: response.bytes.len() as u64,
                    };
                    self.cache.store(&path, &response.bytes, &meta)?;
                    debug!("Downloaded {} from {}", url, repo.id);
                    return Ok(Lookup::Found { path, source });
                }
                Ok(FetchOutcome::NotModified) => {
                    if let Some(meta) = &metadata {
                        let meta = CacheMetadata {
                            cached_at: Utc::now(),
                            ..meta.clone()
                        };
                        self.cache.save_metadata(&path, &meta)?;
                    }
                    debug!("{} not modified in {}", file_name, repo.id);
                    return Ok(Lookup::Found { path, source });
                }
                Ok(FetchOutcome::NotFound) => {
                    debug!("{} not found in {}", file_name, repo.id);
                    failures.push(format!("{} not found in {}", file_name, repo.id));
                }
                Err(e) => {
                    debug!("Failed to fetch {}: {:#}", url, e);
                    failures.push(format!("{}: {:#}", repo.id, e));
                    errored = true;
                }
            }
        }

        if cached {
            warn!(
                "Could not revalidate {}, using cached copy",
                path.display()
            );
            return Ok(Lookup::Found {
                path,
                source: ArtifactSource::Cache,
            });
        }

        Ok(Lookup::Missing { failures, errored })
    }

    /// Compare content against a published `.sha256` sidecar.
    ///
    /// Mismatches are reported but do not fail resolution.
    fn verify_checksum(&self, url: &str, content: &[u8]) -> String {
        let actual = hex::encode(Sha256::digest(content));
        match self.fetcher.fetch(&format!("{}.sha256", url), None) {
            Ok(FetchOutcome::Fetched(response)) => {
                let published = String::from_utf8_lossy(&response.bytes);
                let expected = published
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_lowercase();
                if expected != actual {
                    warn!(
                        "Checksum mismatch for {}: expected {}, got {}",
                        url, expected, actual
                    );
                }
            }
            Ok(_) => debug!("No checksum published for {}", url),
            Err(e) => debug!("Could not fetch checksum for {}: {:#}", url, e),
        }
        actual
    }
}

impl ArtifactResolver for RepositoryResolver {
    fn resolve(&self, request: &ResolveRequest) -> Result<Vec<ResolvedArtifact>> {
        let mut queue: VecDeque<Coordinate> = request.coordinates.iter().cloned().collect();
        let mut selected = HashSet::new();
        let mut resolved = Vec::new();

        // Breadth-first, so the first version seen for a key is the nearest.
        while let Some(coordinate) = queue.pop_front() {
            if !selected.insert(coordinate.key()) {
                debug!("Skipping {}, another version is nearer", coordinate);
                continue;
            }

            let repos = self.repositories_for(request, &coordinate);
            let artifact = self.resolve_artifact(&coordinate, &repos, request)?;

            if request.transitive {
                let descriptor = self.resolve_descriptor(&coordinate, &repos, request)?;
                queue.extend(descriptor.runtime_dependencies());
            }
            resolved.push(artifact);
        }

        Ok(resolved)
    }
}
