//! Composable resolution strategies.
//!
//! Each strategy is itself a [`CapabilityResolver`] wrapping another one:
//!
//! - [`Downloading`] ensures the catalog coordinate before delegating
//! - [`Stubbing`] short-circuits with a no-op stub for matching names
//! - [`Delegating`] turns "not found" into an error with a suggestion

use std::sync::Arc;
use tracing::debug;

use super::pattern::StubPattern;
use super::{rules, suggest, Capability, CapabilityKind, CapabilityResolver};
use crate::catalog::CapabilityCatalog;
use crate::coordinate::Coordinate;
use crate::download::DownloadCoordinator;
use crate::error::{DepsError, Result};
use crate::known::KnownDependencies;

/// Calls the real resolver and reports unknown names.
pub struct Delegating {
    kind: CapabilityKind,
    real: Arc<dyn CapabilityResolver>,
    candidates: Vec<String>,
}

impl Delegating {
    /// `candidates` are the names offered as suggestions.
    pub fn new(kind: CapabilityKind, real: Arc<dyn CapabilityResolver>, candidates: Vec<String>) -> Self {
        Self {
            kind,
            real,
            candidates,
        }
    }
}

impl CapabilityResolver for Delegating {
    fn resolve(&self, name: &str) -> Result<Option<Capability>> {
        match self.real.resolve(name)? {
            Some(capability) => Ok(Some(capability)),
            None => Err(DepsError::UnknownCapability {
                kind: self.kind,
                name: name.to_string(),
                suggestion: suggest::suggest(name, self.candidates.iter().map(String::as_str)),
            }),
        }
    }
}

/// Ensures the coordinate behind a catalog name is loaded.
pub struct Downloading {
    kind: CapabilityKind,
    inner: Box<dyn CapabilityResolver>,
    coordinator: Arc<DownloadCoordinator>,
    catalog: Arc<CapabilityCatalog>,
    known: Arc<KnownDependencies>,
    engine_version: String,
}

impl Downloading {
    pub fn new(
        kind: CapabilityKind,
        inner: Box<dyn CapabilityResolver>,
        coordinator: Arc<DownloadCoordinator>,
        catalog: Arc<CapabilityCatalog>,
        known: Arc<KnownDependencies>,
        engine_version: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            inner,
            coordinator,
            catalog,
            known,
            engine_version: engine_version.into(),
        }
    }
}

impl CapabilityResolver for Downloading {
    fn resolve(&self, name: &str) -> Result<Option<Capability>> {
        match self.catalog.lookup(self.kind, name) {
            Some(reference) => {
                let coordinate = Coordinate::parse(reference, Some(&self.engine_version));
                debug!("{} '{}' is provided by {}", self.kind, name, coordinate);
                self.coordinator.ensure(&coordinate, true)?;

                for companion in rules::companions(
                    self.kind,
                    name,
                    &self.catalog,
                    &self.known,
                    &self.engine_version,
                ) {
                    debug!("{} '{}' also needs {}", self.kind, name, companion);
                    self.coordinator.ensure(&companion, true)?;
                }
            }
            None => debug!("No catalog entry for {} '{}'", self.kind, name),
        }

        self.inner.resolve(name)
    }
}

/// Replaces matching names with no-op stubs.
pub struct Stubbing {
    kind: CapabilityKind,
    inner: Box<dyn CapabilityResolver>,
    pattern: Option<StubPattern>,
    silent: bool,
    catalog: Arc<CapabilityCatalog>,
}

impl Stubbing {
    pub fn new(
        kind: CapabilityKind,
        inner: Box<dyn CapabilityResolver>,
        pattern: Option<StubPattern>,
        silent: bool,
        catalog: Arc<CapabilityCatalog>,
    ) -> Self {
        Self {
            kind,
            inner,
            pattern,
            silent,
            catalog,
        }
    }

    fn should_stub(&self, name: &str) -> bool {
        if self.pattern.as_ref().is_some_and(|p| p.matches(name)) {
            return true;
        }
        // Silent runs must not open listening ports.
        self.silent
            && matches!(self.kind, CapabilityKind::Component | CapabilityKind::UriFactory)
            && self.catalog.is_listening(name)
    }
}

impl CapabilityResolver for Stubbing {
    fn resolve(&self, name: &str) -> Result<Option<Capability>> {
        if self.should_stub(name) {
            debug!("Stubbing {} '{}'", self.kind, name);
            return Ok(Some(Capability::stub(self.kind, name)));
        }
        self.inner.resolve(name)
    }
}
