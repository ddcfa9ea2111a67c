//! Module descriptors listing an artifact's own dependencies.

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;

/// Scope of a declared dependency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyScope {
    #[default]
    Runtime,
    Compile,
    Test,
    Provided,
}

impl DependencyScope {
    /// Whether dependencies in this scope are needed at runtime.
    pub fn is_runtime(&self) -> bool {
        matches!(self, Self::Runtime | Self::Compile)
    }
}

/// One dependency declared by a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredDependency {
    pub coordinate: String,
    #[serde(default)]
    pub scope: DependencyScope,
    #[serde(default)]
    pub optional: bool,
}

/// Contents of a `<name>-<version>.deps.json` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    #[serde(default)]
    pub dependencies: Vec<DeclaredDependency>,
}

impl ModuleDescriptor {
    /// Parse a descriptor from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Dependencies to follow during transitive resolution.
    pub fn runtime_dependencies(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.dependencies
            .iter()
            .filter(|d| d.scope.is_runtime() && !d.optional)
            .map(|d| Coordinate::parse(&d.coordinate, None))
    }
}
