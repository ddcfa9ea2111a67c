//! Version properties for `${token}` placeholders.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::Result;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid placeholder regex"))
}

/// Values substituted into coordinate templates.
#[derive(Debug, Clone, Default)]
pub struct VersionProperties {
    values: HashMap<String, String>,
}

impl VersionProperties {
    /// Create an empty set of properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the bundled `versions.yml`.
    pub fn bundled() -> Result<Self> {
        Ok(Self {
            values: crate::catalog::load_yaml("versions.yml")?,
        })
    }

    /// Overlay externally supplied values (e.g. the companion runtime's
    /// actual versions). Supplied values win.
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in overrides {
            self.values.insert(key.into(), value.into());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Replace every known `${token}`; unknown tokens are left in place.
    pub fn expand(&self, template: &str) -> String {
        placeholder_re()
            .replace_all(template, |caps: &regex::Captures| {
                self.values
                    .get(&caps[1])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    /// Whether a string still carries an unresolved placeholder.
    pub fn has_placeholder(value: &str) -> bool {
        placeholder_re().is_match(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_known_tokens() {
        let props = VersionProperties::new().with_overrides([("quarkus.version", "3.2.0")]);
        assert_eq!(
            props.expand("mvn:io.quarkus:quarkus-core:${quarkus.version}"),
            "mvn:io.quarkus:quarkus-core:3.2.0"
        );
    }

    #[test]
    fn leaves_unknown_tokens() {
        let props = VersionProperties::new();
        let expanded = props.expand("g:n:${missing.version}");
        assert_eq!(expanded, "g:n:${missing.version}");
        assert!(VersionProperties::has_placeholder(&expanded));
    }

    #[test]
    fn overrides_win_over_bundled() {
        let props = VersionProperties::bundled()
            .unwrap()
            .with_overrides([("quarkus.version", "9.9.9")]);
        assert_eq!(props.get("quarkus.version"), Some("9.9.9"));
        assert!(props.get("kamelets.version").is_some());
    }
}
