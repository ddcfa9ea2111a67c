//! Dependency coordinates.
//!
//! A [`Coordinate`] identifies a downloadable code unit by group, name,
//! version, packaging and classifier. Coordinates are built by parsing one
//! of several shorthand reference syntaxes:
//!
//! - `conduit:kafka` - the engine's own connectors
//! - `mvn:org.example:widget:1.0` - a locator-prefixed coordinate
//! - `org.example:widget[:packaging[:classifier]]:1.0` - positional form
//!
//! # Example
//!
//! ```
//! use conduit_deps::coordinate::Coordinate;
//!
//! let c = Coordinate::parse("conduit:quarkus-kafka", Some("4.2.0"));
//! assert_eq!(c.to_string(), "dev.conduit:conduit-kafka:4.2.0");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Group id of the engine's own artifacts.
pub const ENGINE_GROUP: &str = "dev.conduit";

/// Scheme used by engine shorthand references (`conduit:kafka`).
pub const ENGINE_SCHEME: &str = "conduit:";

/// Artifact name prefix of engine connectors.
pub const ENGINE_PREFIX: &str = "conduit-";

/// Alternate spelling used by the companion runtime's artifacts.
const COMPANION_PREFIX: &str = "quarkus-";

/// Locator prefix stripped before positional parsing.
const LOCATOR_PREFIX: &str = "mvn:";

/// Packaging assumed when a reference does not name one.
pub const DEFAULT_PACKAGING: &str = "library";

const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// A structured, immutable dependency coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    group: String,
    name: String,
    version: Option<String>,
    packaging: String,
    classifier: String,
}

impl Coordinate {
    /// Create a coordinate with default packaging and no classifier.
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: Option<impl Into<String>>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            version: version.map(Into::into).filter(|v: &String| !v.is_empty()),
            packaging: DEFAULT_PACKAGING.to_string(),
            classifier: String::new(),
        }
    }

    /// Create one of the engine's own coordinates from a short name (`kafka`).
    pub fn engine(short_name: &str, version: Option<&str>) -> Self {
        Self::new(ENGINE_GROUP, engine_artifact_name(short_name), version)
    }

    /// Parse a reference string into a coordinate.
    ///
    /// Never fails: missing fields fall back to `default_version`, and a
    /// reference matching no known syntax is kept as a literal coordinate so
    /// the real error surfaces at resolution time. Fields that would escape
    /// the repository layout (`/`, `\`, `..`) also make the reference
    /// literal.
    pub fn parse(reference: &str, default_version: Option<&str>) -> Self {
        let parsed = Self::parse_fields(reference, default_version);
        if parsed.is_path_safe() {
            parsed
        } else {
            Self::literal(reference.trim(), default_version)
        }
    }

    fn parse_fields(reference: &str, default_version: Option<&str>) -> Self {
        let reference = reference.trim();
        let reference = reference.strip_prefix(LOCATOR_PREFIX).unwrap_or(reference);

        if let Some(rest) = reference.strip_prefix(ENGINE_SCHEME) {
            let (name, version) = match rest.split_once(':') {
                Some((name, version)) => (name, Some(version)),
                None => (rest, None),
            };
            return Self::engine(name, version.or(default_version));
        }

        let parts: Vec<&str> = reference.split(':').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Self::literal(reference, default_version);
        }

        match parts.as_slice() {
            [name] if name.starts_with(ENGINE_PREFIX) => Self::engine(name, default_version),
            [group, name] => Self::new(*group, *name, default_version),
            [group, name, version] => Self::new(*group, *name, Some(*version)),
            [group, name, packaging, version] => {
                Self::new(*group, *name, Some(*version)).with_packaging(*packaging)
            }
            [group, name, packaging, classifier, version] => Self::new(*group, *name, Some(*version))
                .with_packaging(*packaging)
                .with_classifier(*classifier),
            _ => Self::literal(reference, default_version),
        }
    }

    fn literal(reference: &str, default_version: Option<&str>) -> Self {
        Self::new("", reference, default_version)
    }

    /// Set the packaging.
    pub fn with_packaging(mut self, packaging: impl Into<String>) -> Self {
        self.packaging = packaging.into();
        self
    }

    /// Set the classifier.
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = classifier.into();
        self
    }

    /// Return a copy carrying `version`.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        self.version = (!version.is_empty()).then_some(version);
        self
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn packaging(&self) -> &str {
        &self.packaging
    }

    pub fn classifier(&self) -> &str {
        &self.classifier
    }

    /// Whether this coordinate belongs to the engine itself.
    pub fn is_engine(&self) -> bool {
        self.group == ENGINE_GROUP
    }

    /// Whether the version is a pre-release snapshot.
    pub fn is_snapshot(&self) -> bool {
        self.version
            .as_deref()
            .is_some_and(|v| v.ends_with(SNAPSHOT_SUFFIX))
    }

    /// Whether the reference could not be parsed into a group and name.
    pub fn is_literal(&self) -> bool {
        self.group.is_empty()
    }

    /// Whether every field maps to a plain repository path segment.
    pub fn is_path_safe(&self) -> bool {
        let plain = |field: &str| !field.contains(['/', '\\']) && field != "." && field != "..";
        self.group.split('.').all(plain)
            && plain(&self.name)
            && self.version.as_deref().is_none_or(plain)
            && plain(&self.packaging)
            && plain(&self.classifier)
    }

    /// Mediation key: coordinates with the same key are alternatives of
    /// each other and only one may be selected.
    pub fn key(&self) -> String {
        if self.classifier.is_empty() {
            format!("{}:{}", self.group, self.name)
        } else {
            format!("{}:{}:{}", self.group, self.name, self.classifier)
        }
    }

    /// The `name-version` token used to detect an artifact on the load path.
    pub fn target(&self) -> String {
        match &self.version {
            Some(version) => format!("{}-{}", self.name, version),
            None => self.name.clone(),
        }
    }

    /// Full coordinate including non-default packaging and classifier.
    pub fn gav(&self) -> String {
        let mut out = format!("{}:{}", self.group, self.name);
        if self.packaging != DEFAULT_PACKAGING || !self.classifier.is_empty() {
            out.push(':');
            out.push_str(&self.packaging);
        }
        if !self.classifier.is_empty() {
            out.push(':');
            out.push_str(&self.classifier);
        }
        if let Some(version) = &self.version {
            out.push(':');
            out.push_str(version);
        }
        out
    }

    /// File extension used in repositories.
    ///
    /// The default "library" packaging is published as `jar` so that public
    /// repositories can serve it unchanged.
    pub fn extension(&self) -> &str {
        if self.packaging == DEFAULT_PACKAGING {
            "jar"
        } else {
            &self.packaging
        }
    }

    /// Artifact file name (`name-version[-classifier].ext`).
    pub fn file_name(&self) -> String {
        let mut out = self.target();
        if !self.classifier.is_empty() {
            out.push('-');
            out.push_str(&self.classifier);
        }
        out.push('.');
        out.push_str(self.extension());
        out
    }

    /// Module descriptor file name (`name-version.deps.json`).
    pub fn descriptor_name(&self) -> String {
        format!("{}.deps.json", self.target())
    }

    /// Directory of this coordinate within a repository layout.
    pub fn directory(&self) -> PathBuf {
        let mut path: PathBuf = self.group.split('.').collect();
        path.push(&self.name);
        if let Some(version) = &self.version {
            path.push(version);
        }
        path
    }

    /// URL path of the directory (always `/`-separated).
    pub fn url_directory(&self) -> String {
        let mut out = self.group.replace('.', "/");
        out.push('/');
        out.push_str(&self.name);
        if let Some(version) = &self.version {
            out.push('/');
            out.push_str(version);
        }
        out
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}:{}:{}", self.group, self.name, version),
            None => write!(f, "{}:{}", self.group, self.name),
        }
    }
}

/// Normalize a short or prefixed name to the engine's artifact name.
///
/// `kafka`, `conduit-kafka`, `quarkus-kafka` and `conduit-quarkus-kafka`
/// all become `conduit-kafka`.
pub fn engine_artifact_name(name: &str) -> String {
    let short = name.strip_prefix(ENGINE_PREFIX).unwrap_or(name);
    let short = short.strip_prefix(COMPANION_PREFIX).unwrap_or(short);
    format!("{}{}", ENGINE_PREFIX, short)
}
