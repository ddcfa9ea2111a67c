//! Capability catalog: logical names mapped to coordinates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::demand::CapabilityKind;
use crate::error::Result;

/// The bundled catalog of logical capability names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilityCatalog {
    /// Catalog format version.
    #[serde(default = "default_catalog_version")]
    pub version: u32,

    /// Connectors, also used for URI factories.
    #[serde(default)]
    pub components: BTreeMap<String, String>,

    /// Components that start listening services when created.
    #[serde(default)]
    pub listening: Vec<String>,

    #[serde(default)]
    pub dataformats: BTreeMap<String, String>,

    #[serde(default)]
    pub languages: BTreeMap<String, String>,

    #[serde(default)]
    pub transformers: BTreeMap<String, String>,

    #[serde(default, rename = "periodic-tasks")]
    pub periodic_tasks: BTreeMap<String, String>,

    /// Coordinates (or class names) used by cross-capability rules.
    #[serde(default)]
    pub support: BTreeMap<String, String>,
}

fn default_catalog_version() -> u32 {
    1
}

impl CapabilityCatalog {
    /// Load the catalog embedded in the binary.
    pub fn bundled() -> Result<Self> {
        super::load_yaml("capabilities.yml")
    }

    /// Entries for a capability kind.
    ///
    /// Route templates are not listed here; their names come from a
    /// template source.
    pub fn entries(&self, kind: CapabilityKind) -> Option<&BTreeMap<String, String>> {
        match kind {
            CapabilityKind::Component | CapabilityKind::UriFactory => Some(&self.components),
            CapabilityKind::DataFormat => Some(&self.dataformats),
            CapabilityKind::Language => Some(&self.languages),
            CapabilityKind::Transformer => Some(&self.transformers),
            CapabilityKind::PeriodicTask => Some(&self.periodic_tasks),
            CapabilityKind::RouteTemplate => None,
        }
    }

    /// Look up the coordinate reference for a name.
    pub fn lookup(&self, kind: CapabilityKind, name: &str) -> Option<&str> {
        self.entries(kind)?.get(name).map(String::as_str)
    }

    /// All names known for a kind, sorted.
    pub fn names(&self, kind: CapabilityKind) -> Vec<&str> {
        self.entries(kind)
            .map(|e| e.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Whether creating this component starts a listening service.
    pub fn is_listening(&self, name: &str) -> bool {
        self.listening.iter().any(|n| n == name)
    }

    /// Look up a support entry used by cross-capability rules.
    pub fn support(&self, key: &str) -> Option<&str> {
        self.support.get(key).map(String::as_str)
    }

    /// Total number of named capabilities.
    pub fn len(&self) -> usize {
        self.components.len()
            + self.dataformats.len()
            + self.languages.len()
            + self.transformers.len()
            + self.periodic_tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
