//! Schedules resolutions and blocks callers until they finish.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::listener::Listeners;
use super::pool::{CancelToken, DownloadPool, DownloadTask};
use crate::coordinate::Coordinate;
use crate::error::{DepsError, Result};
use crate::known::KnownRepositories;
use crate::loadpath::LoadPath;
use crate::repository::{
    ArtifactResolver, Repository, RepositoryPolicy, ResolveRequest, ResolvedArtifact,
};

/// Default interval between progress messages while waiting.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Granularity at which a waiting caller notices cancellation.
const CANCEL_CHECK: Duration = Duration::from_millis(100);

/// What [`DownloadCoordinator::ensure`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// The coordinate had no version; nothing was done.
    Unversioned,
    /// The coordinate was already on the load path.
    AlreadyAvailable,
    /// The coordinate (and its closure) was resolved.
    Resolved(Vec<ResolvedArtifact>),
}

impl EnsureOutcome {
    pub fn artifacts(&self) -> &[ResolvedArtifact] {
        match self {
            Self::Resolved(artifacts) => artifacts,
            _ => &[],
        }
    }
}

enum Pending {
    Done(EnsureOutcome),
    Waiting(DownloadTask),
}

/// Makes coordinates available on a [`LoadPath`], resolving them on a
/// worker pool.
pub struct DownloadCoordinator {
    pool: DownloadPool,
    resolver: Arc<dyn ArtifactResolver>,
    load_path: Arc<LoadPath>,
    listeners: Arc<Listeners>,
    known_repositories: KnownRepositories,
    repositories: Vec<Repository>,
    extra_repositories: Mutex<Vec<String>>,
    offline: bool,
    fresh: bool,
    poll_interval: Duration,
}

impl DownloadCoordinator {
    pub fn new(
        resolver: Arc<dyn ArtifactResolver>,
        load_path: Arc<LoadPath>,
        listeners: Arc<Listeners>,
        workers: usize,
    ) -> Self {
        Self {
            pool: DownloadPool::new(workers),
            resolver,
            load_path,
            listeners,
            known_repositories: KnownRepositories::default(),
            repositories: Vec::new(),
            extra_repositories: Mutex::new(Vec::new()),
            offline: false,
            fresh: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Repositories searched after the default one.
    pub fn with_repositories(mut self, repositories: Vec<Repository>) -> Self {
        self.repositories = repositories;
        self
    }

    pub fn with_known_repositories(mut self, known: KnownRepositories) -> Self {
        self.known_repositories = known;
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Revalidate cached files on every resolution.
    pub fn fresh(mut self, fresh: bool) -> Self {
        self.fresh = fresh;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn load_path(&self) -> &Arc<LoadPath> {
        &self.load_path
    }

    pub fn listeners(&self) -> &Arc<Listeners> {
        &self.listeners
    }

    /// Repositories added because a requested group needed them.
    pub fn extra_repositories(&self) -> Vec<String> {
        self.extra_repositories
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Make `coordinate` available, blocking until it is.
    pub fn ensure(&self, coordinate: &Coordinate, transitive: bool) -> Result<EnsureOutcome> {
        self.ensure_cancellable(coordinate, transitive, &CancelToken::new())
    }

    /// Like [`ensure`](Self::ensure), giving up the wait when `cancel` fires.
    pub fn ensure_cancellable(
        &self,
        coordinate: &Coordinate,
        transitive: bool,
        cancel: &CancelToken,
    ) -> Result<EnsureOutcome> {
        let mut outcomes =
            self.ensure_all_cancellable(std::slice::from_ref(coordinate), transitive, cancel)?;
        Ok(outcomes.remove(0))
    }

    /// Submit every coordinate, then wait for each in request order.
    pub fn ensure_all(
        &self,
        coordinates: &[Coordinate],
        transitive: bool,
    ) -> Result<Vec<EnsureOutcome>> {
        self.ensure_all_cancellable(coordinates, transitive, &CancelToken::new())
    }

    pub fn ensure_all_cancellable(
        &self,
        coordinates: &[Coordinate],
        transitive: bool,
        cancel: &CancelToken,
    ) -> Result<Vec<EnsureOutcome>> {
        let mut pending = Vec::with_capacity(coordinates.len());
        for coordinate in coordinates {
            pending.push(self.begin(coordinate, transitive)?);
        }

        pending
            .into_iter()
            .map(|p| match p {
                Pending::Done(outcome) => Ok(outcome),
                Pending::Waiting(task) => self.wait(task, cancel).map(EnsureOutcome::Resolved),
            })
            .collect()
    }

    fn begin(&self, coordinate: &Coordinate, transitive: bool) -> Result<Pending> {
        self.listeners.download_requested(coordinate);

        if coordinate.version().is_none() {
            debug!("Cannot download {} without a version", coordinate);
            return Ok(Pending::Done(EnsureOutcome::Unversioned));
        }

        if self.load_path.is_available(coordinate, &self.listeners) {
            debug!("{} is already available", coordinate);
            return Ok(Pending::Done(EnsureOutcome::AlreadyAvailable));
        }

        let request = ResolveRequest::new([coordinate.clone()])
            .with_repositories(self.repositories_for(coordinate))
            .offline(self.offline)
            .bypass_cache(self.fresh)
            .transitive(transitive);

        Ok(Pending::Waiting(self.submit(coordinate, request)?))
    }

    fn repositories_for(&self, coordinate: &Coordinate) -> Vec<Repository> {
        let mut newly_needed = None;
        let extras = {
            let mut extras = self
                .extra_repositories
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            if let Some(url) = self.known_repositories.resolve(coordinate.group()) {
                if !extras.iter().any(|u| u == url) {
                    extras.push(url.to_string());
                    newly_needed = Some(url.to_string());
                }
            }
            extras.clone()
        };

        if let Some(url) = newly_needed {
            info!("Adding repository {} needed by {}", url, coordinate);
            self.listeners.extra_repository_needed(&url);
        }

        let mut repos = self.repositories.clone();
        for (i, url) in extras.iter().enumerate() {
            if !repos.iter().any(|r| r.url == url.trim_end_matches('/')) {
                repos.push(Repository::new(
                    format!("extra{}", i + 1),
                    url.as_str(),
                    RepositoryPolicy::any(),
                ));
            }
        }
        repos
    }

    fn submit(&self, coordinate: &Coordinate, request: ResolveRequest) -> Result<DownloadTask> {
        let (sender, receiver) = mpsc::channel();
        let resolver = Arc::clone(&self.resolver);
        let load_path = Arc::clone(&self.load_path);
        let listeners = Arc::clone(&self.listeners);

        let task = DownloadTask {
            coordinate: coordinate.clone(),
            transitive: request.transitive,
            submitted_at: Instant::now(),
            receiver,
        };

        self.pool.submit(move || {
            let result = run_task(resolver.as_ref(), &load_path, &listeners, &request);
            // The waiter may have been cancelled and gone.
            let _ = sender.send(result);
        })?;

        Ok(task)
    }

    fn wait(&self, task: DownloadTask, cancel: &CancelToken) -> Result<Vec<ResolvedArtifact>> {
        let coordinate = &task.coordinate;
        let mut last_report = Instant::now();

        loop {
            if cancel.is_cancelled() {
                warn!("Interrupted while waiting for {}", coordinate);
                return Err(DepsError::Interrupted {
                    coordinate: coordinate.to_string(),
                });
            }

            match task.receiver.recv_timeout(CANCEL_CHECK.min(self.poll_interval)) {
                Ok(Ok(artifacts)) => {
                    log_completion(coordinate, &artifacts, task.submitted_at.elapsed());
                    return Ok(artifacts);
                }
                Ok(Err(e)) => return Err(e),
                Err(RecvTimeoutError::Timeout) => {
                    if last_report.elapsed() >= self.poll_interval {
                        info!(
                            "Downloading {} ({}s elapsed)",
                            coordinate,
                            task.submitted_at.elapsed().as_secs()
                        );
                        last_report = Instant::now();
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(anyhow::anyhow!("Download of {} was abandoned", coordinate).into());
                }
            }
        }
    }
}

fn run_task(
    resolver: &dyn ArtifactResolver,
    load_path: &LoadPath,
    listeners: &Listeners,
    request: &ResolveRequest,
) -> Result<Vec<ResolvedArtifact>> {
    let artifacts = resolver.resolve(request)?;
    for artifact in &artifacts {
        if load_path.contains(&artifact.coordinate) {
            listeners.already_available(&artifact.coordinate);
        } else if load_path.extend(&artifact.file)? {
            listeners.downloaded(&artifact.coordinate, &artifact.file);
        } else {
            listeners.already_available(&artifact.coordinate);
        }
    }
    Ok(artifacts)
}

fn log_completion(coordinate: &Coordinate, artifacts: &[ResolvedArtifact], elapsed: Duration) {
    let source = artifacts
        .iter()
        .find(|a| &a.coordinate == coordinate)
        .or_else(|| artifacts.first())
        .map(|a| &a.source);

    match source {
        Some(source) if !source.is_cache() => info!(
            "Resolved {} from {} in {}ms",
            coordinate,
            source,
            elapsed.as_millis()
        ),
        _ => debug!(
            "Resolved {} from local cache in {}ms",
            coordinate,
            elapsed.as_millis()
        ),
    }
}

impl std::fmt::Debug for DownloadCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadCoordinator")
            .field("pool", &self.pool)
            .field("repositories", &self.repositories)
            .field("offline", &self.offline)
            .field("fresh", &self.fresh)
            .finish()
    }
}
