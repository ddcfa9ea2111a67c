//! Demand-driven capability resolution.
//!
//! The host engine resolves building blocks (components, data formats,
//! languages, ...) by name through a [`CapabilityResolver`] per kind. A
//! [`DemandResolver`] decorates that resolver so the code behind a name is
//! downloaded and put on the load path first, substituted by a stub, or
//! reported with a suggestion when the name is unknown.

pub mod pattern;
pub mod rules;
pub mod strategy;
pub mod suggest;
pub mod template;

pub use pattern::StubPattern;
pub use strategy::{Delegating, Downloading, Stubbing};
pub use template::{TemplateDemandResolver, TemplateSource};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::context::ResolutionContext;
use crate::error::Result;

/// The kinds of building block resolved by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapabilityKind {
    /// Connector to an external system.
    Component,
    DataFormat,
    Language,
    Transformer,
    RouteTemplate,
    PeriodicTask,
    UriFactory,
}

impl CapabilityKind {
    pub const ALL: [CapabilityKind; 7] = [
        Self::Component,
        Self::DataFormat,
        Self::Language,
        Self::Transformer,
        Self::RouteTemplate,
        Self::PeriodicTask,
        Self::UriFactory,
    ];

    /// Identifier used on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::DataFormat => "dataformat",
            Self::Language => "language",
            Self::Transformer => "transformer",
            Self::RouteTemplate => "template",
            Self::PeriodicTask => "periodic-task",
            Self::UriFactory => "uri-factory",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Component => "component",
            Self::DataFormat => "data format",
            Self::Language => "language",
            Self::Transformer => "transformer",
            Self::RouteTemplate => "route template",
            Self::PeriodicTask => "periodic task",
            Self::UriFactory => "URI factory",
        };
        f.write_str(label)
    }
}

impl FromStr for CapabilityKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.id() == s)
            .ok_or_else(|| {
                let ids: Vec<&str> = Self::ALL.iter().map(|k| k.id()).collect();
                format!("unknown kind '{}' (expected one of: {})", s, ids.join(", "))
            })
    }
}

/// A resolved building block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    pub kind: CapabilityKind,
    pub name: String,
    /// Host-defined description of the implementation.
    pub provider: Option<String>,
    stub: bool,
}

impl Capability {
    pub fn new(kind: CapabilityKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            provider: None,
            stub: false,
        }
    }

    /// A no-op placeholder that accepts and discards everything.
    pub fn stub(kind: CapabilityKind, name: impl Into<String>) -> Self {
        Self {
            stub: true,
            ..Self::new(kind, name)
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn is_stub(&self) -> bool {
        self.stub
    }
}

/// Resolves a building block by name.
///
/// `Ok(None)` means the name is unknown to this resolver.
pub trait CapabilityResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<Option<Capability>>;
}

/// The full decorator chain for one capability kind:
/// downloading, then stubbing, then delegating to the host.
///
/// Stubbed names are still ensured, so listeners see every requirement of
/// a dry run.
pub struct DemandResolver {
    kind: CapabilityKind,
    chain: Box<dyn CapabilityResolver>,
}

impl DemandResolver {
    pub fn new(kind: CapabilityKind, real: Arc<dyn CapabilityResolver>, ctx: &ResolutionContext) -> Self {
        let candidates = ctx
            .catalog()
            .names(kind)
            .into_iter()
            .map(String::from)
            .collect();

        let delegating = Delegating::new(kind, real, candidates);
        let stubbing = Stubbing::new(
            kind,
            Box::new(delegating),
            ctx.stub_pattern().cloned(),
            ctx.settings().silent,
            Arc::clone(ctx.catalog()),
        );
        let downloading = Downloading::new(
            kind,
            Box::new(stubbing),
            Arc::clone(ctx.coordinator()),
            Arc::clone(ctx.catalog()),
            Arc::clone(ctx.known()),
            ctx.engine_version(),
        );

        Self {
            kind,
            chain: Box::new(downloading),
        }
    }

    pub fn kind(&self) -> CapabilityKind {
        self.kind
    }
}

impl CapabilityResolver for DemandResolver {
    fn resolve(&self, name: &str) -> Result<Option<Capability>> {
        self.chain.resolve(name)
    }
}
