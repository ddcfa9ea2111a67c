//! The per-engine owner of resolution state.
//!
//! A [`ResolutionContext`] holds everything one engine instance needs to
//! resolve dependencies on demand: the download coordinator and its worker
//! pool, the load path, the bundled catalogs and the settings they were
//! built from. Several contexts can live in one process.
//!
//! ```no_run
//! use conduit_deps::config::Settings;
//! use conduit_deps::context::ResolutionContext;
//!
//! let ctx = ResolutionContext::new(Settings::default()).unwrap();
//! ctx.ensure_reference("conduit:kafka", true).unwrap();
//! ```

use std::sync::Arc;
use tracing::debug;

use crate::catalog::CapabilityCatalog;
use crate::config::Settings;
use crate::coordinate::Coordinate;
use crate::demand::{
    CapabilityKind, CapabilityResolver, Delegating, DemandResolver, StubPattern,
    TemplateDemandResolver, TemplateSource,
};
use crate::download::{DownloadCoordinator, DownloadListener, EnsureOutcome, Listeners};
use crate::error::Result;
use crate::known::{KnownDependencies, KnownRepositories, VersionProperties};
use crate::loadpath::LoadPath;
use crate::repository::{ArtifactResolver, LocalRepository, RepositoryResolver};

/// Resolution state for one engine instance.
pub struct ResolutionContext {
    settings: Settings,
    coordinator: Arc<DownloadCoordinator>,
    catalog: Arc<CapabilityCatalog>,
    known: Arc<KnownDependencies>,
    stub_pattern: Option<StubPattern>,
}

impl ResolutionContext {
    /// Build a context resolving from repositories into the local cache,
    /// with the load path taken from the environment.
    pub fn new(settings: Settings) -> Result<Self> {
        let resolver = Arc::new(Self::repository_resolver(&settings));
        Self::with_resolver(settings, resolver, LoadPath::from_env())
    }

    /// The repository resolver described by `settings`.
    pub fn repository_resolver(settings: &Settings) -> RepositoryResolver {
        let mut resolver = RepositoryResolver::new(LocalRepository::new(settings.cache_root()));
        if !settings.central {
            resolver = resolver.without_central();
        }
        match settings.snapshot_repository() {
            Some(snapshots) => resolver.with_snapshot_repository(snapshots),
            None => resolver.without_snapshot_repository(),
        }
    }

    /// Build a context around a specific resolver and load path.
    pub fn with_resolver(
        settings: Settings,
        resolver: Arc<dyn ArtifactResolver>,
        load_path: LoadPath,
    ) -> Result<Self> {
        let versions = VersionProperties::bundled()?.with_overrides(settings.companion_versions.clone());
        let known = KnownDependencies::bundled(versions)?.with_default_version(&settings.engine_version);
        let catalog = CapabilityCatalog::bundled()?;

        let coordinator = DownloadCoordinator::new(
            resolver,
            Arc::new(load_path),
            Arc::new(Listeners::new()),
            settings.workers,
        )
        .with_repositories(settings.repository_list())
        .with_known_repositories(KnownRepositories::bundled()?)
        .offline(settings.offline)
        .fresh(settings.fresh)
        .with_poll_interval(settings.poll_interval());

        debug!(
            "Resolution context ready: {} workers, {} repositories, {} catalog entries",
            settings.workers,
            settings.repositories.len(),
            catalog.len()
        );

        Ok(Self {
            stub_pattern: settings.stub(),
            settings,
            coordinator: Arc::new(coordinator),
            catalog: Arc::new(catalog),
            known: Arc::new(known),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn engine_version(&self) -> &str {
        &self.settings.engine_version
    }

    pub fn coordinator(&self) -> &Arc<DownloadCoordinator> {
        &self.coordinator
    }

    pub fn catalog(&self) -> &Arc<CapabilityCatalog> {
        &self.catalog
    }

    pub fn known(&self) -> &Arc<KnownDependencies> {
        &self.known
    }

    pub fn load_path(&self) -> &Arc<LoadPath> {
        self.coordinator.load_path()
    }

    pub fn stub_pattern(&self) -> Option<&StubPattern> {
        self.stub_pattern.as_ref()
    }

    /// Parse a reference using the engine version as the default.
    pub fn parse(&self, reference: &str) -> Coordinate {
        Coordinate::parse(reference, Some(self.engine_version()))
    }

    /// Make a coordinate available on the load path.
    pub fn ensure(&self, coordinate: &Coordinate, transitive: bool) -> Result<EnsureOutcome> {
        self.coordinator.ensure(coordinate, transitive)
    }

    /// Parse and ensure a reference string.
    pub fn ensure_reference(&self, reference: &str, transitive: bool) -> Result<EnsureOutcome> {
        self.ensure(&self.parse(reference), transitive)
    }

    pub fn add_listener(&self, listener: Arc<dyn DownloadListener>) {
        self.coordinator.listeners().add(listener);
    }

    /// Decorate the host's resolver for `kind`.
    pub fn demand_resolver(
        &self,
        kind: CapabilityKind,
        real: Arc<dyn CapabilityResolver>,
    ) -> DemandResolver {
        DemandResolver::new(kind, real, self)
    }

    /// Decorate the host's route template resolver.
    pub fn template_resolver(
        &self,
        real: Arc<dyn CapabilityResolver>,
        source: TemplateSource,
    ) -> TemplateDemandResolver {
        let source = self
            .settings
            .template_dirs
            .iter()
            .fold(source, |source, dir| source.with_directory(dir));
        let delegating = Delegating::new(CapabilityKind::RouteTemplate, real, source.names());
        TemplateDemandResolver::new(
            Box::new(delegating),
            source,
            Arc::clone(&self.coordinator),
            self.engine_version(),
        )
    }

    /// Coordinate providing a class name or configuration key.
    pub fn lookup_known(&self, key: &str) -> Option<Coordinate> {
        self.known.resolve(key)
    }
}

impl std::fmt::Debug for ResolutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionContext")
            .field("settings", &self.settings)
            .field("coordinator", &self.coordinator)
            .finish()
    }
}
