//! Route templates and the dependencies they declare.
//!
//! A template is a YAML document whose `spec.dependencies` list names the
//! coordinates its routes need:
//!
//! ```yaml
//! metadata:
//!   name: kafka-sink
//! spec:
//!   dependencies:
//!     - "conduit:kafka"
//!     - "mvn:org.messaginghub:pooled-jms:3.1.7"
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::{Capability, CapabilityResolver};
use crate::catalog::{self, TEMPLATE_SUFFIX};
use crate::coordinate::{Coordinate, ENGINE_GROUP};
use crate::download::{DownloadCoordinator, Listeners};
use crate::error::{DepsError, Result};

/// Engine modules that are always present when templates run.
const CORE_MODULES: &[&str] = &["conduit-core", "conduit-kamelet", "conduit-yaml-dsl"];

/// Where template text comes from.
///
/// Directories are searched in order before the bundled templates, so a
/// project can override a built-in template by name.
#[derive(Debug, Clone)]
pub struct TemplateSource {
    directories: Vec<PathBuf>,
    include_bundled: bool,
}

impl TemplateSource {
    /// Only the templates shipped with the crate.
    pub fn bundled() -> Self {
        Self {
            directories: Vec::new(),
            include_bundled: true,
        }
    }

    /// Only templates found in directories.
    pub fn empty() -> Self {
        Self {
            directories: Vec::new(),
            include_bundled: false,
        }
    }

    pub fn with_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directories.push(dir.into());
        self
    }

    /// Load a template's text by name.
    pub fn load(&self, name: &str) -> Result<Option<String>> {
        let file_name = format!("{}{}", name, TEMPLATE_SUFFIX);
        for dir in &self.directories {
            let path = dir.join(&file_name);
            if path.is_file() {
                debug!("Loading template '{}' from {}", name, path.display());
                return Ok(Some(fs::read_to_string(&path)?));
            }
        }

        if self.include_bundled {
            let bundled = catalog::bundled_templates()
                .into_iter()
                .find(|(n, _)| n == name)
                .map(|(_, content)| content.to_string());
            return Ok(bundled);
        }

        Ok(None)
    }

    /// Every template name available, sorted and deduplicated.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for dir in &self.directories {
            let Ok(entries) = fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let file_name = entry.file_name();
                if let Some(name) = file_name.to_str().and_then(|f| f.strip_suffix(TEMPLATE_SUFFIX)) {
                    names.push(name.to_string());
                }
            }
        }
        if self.include_bundled {
            names.extend(catalog::bundled_templates().into_iter().map(|(n, _)| n));
        }
        names.sort();
        names.dedup();
        names
    }
}

impl Default for TemplateSource {
    fn default() -> Self {
        Self::bundled()
    }
}

/// Read the `spec.dependencies` list of a template.
pub fn template_dependencies(name: &str, content: &str) -> Result<Vec<String>> {
    let document: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| DepsError::TemplateError {
            name: name.to_string(),
            message: e.to_string(),
        })?;

    let Some(dependencies) = document.get("spec").and_then(|s| s.get("dependencies")) else {
        return Ok(Vec::new());
    };

    let list = dependencies
        .as_sequence()
        .ok_or_else(|| DepsError::TemplateError {
            name: name.to_string(),
            message: "spec.dependencies must be a list".to_string(),
        })?;

    list.iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| DepsError::TemplateError {
                    name: name.to_string(),
                    message: format!("dependency {:?} is not a string", item),
                })
        })
        .collect()
}

fn is_core_module(coordinate: &Coordinate) -> bool {
    coordinate.group() == ENGINE_GROUP && CORE_MODULES.contains(&coordinate.name())
}

/// Ensures a template's declared dependencies before delegating.
pub struct TemplateDemandResolver {
    inner: Box<dyn CapabilityResolver>,
    source: TemplateSource,
    coordinator: Arc<DownloadCoordinator>,
    listeners: Arc<Listeners>,
    engine_version: String,
    ensured: Mutex<HashSet<String>>,
}

impl TemplateDemandResolver {
    pub fn new(
        inner: Box<dyn CapabilityResolver>,
        source: TemplateSource,
        coordinator: Arc<DownloadCoordinator>,
        engine_version: impl Into<String>,
    ) -> Self {
        let listeners = Arc::clone(coordinator.listeners());
        Self {
            inner,
            source,
            coordinator,
            listeners,
            engine_version: engine_version.into(),
            ensured: Mutex::new(HashSet::new()),
        }
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    fn already_ensured(&self, key: &str) -> bool {
        self.ensured
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(key)
    }

    fn ensure_dependencies(&self, name: &str, content: &str) -> Result<()> {
        for reference in template_dependencies(name, content)? {
            let coordinate = Coordinate::parse(&reference, Some(&self.engine_version));
            if is_core_module(&coordinate) {
                continue;
            }

            let key = coordinate.gav();
            if self.already_ensured(&key) {
                continue;
            }

            debug!("Template '{}' needs {}", name, coordinate);
            self.coordinator.ensure(&coordinate, true)?;
            self.ensured
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .insert(key);
        }
        Ok(())
    }
}

impl CapabilityResolver for TemplateDemandResolver {
    fn resolve(&self, name: &str) -> Result<Option<Capability>> {
        match self.source.load(name)? {
            Some(content) => {
                self.listeners.template_loaded(name, &content);
                self.ensure_dependencies(name, &content)?;
            }
            None => debug!("Template '{}' not found in any source", name),
        }
        self.inner.resolve(name)
    }
}
