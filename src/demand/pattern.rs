//! Stub pattern matching.
//!
//! A pattern is a comma-separated list. Each element matches a name
//! exactly, as a `*` wildcard, or as a regular expression over the whole
//! name. A lone `*` matches everything.

use regex::Regex;

#[derive(Debug, Clone)]
enum Matcher {
    Any,
    Exact(String),
    Wildcard(Regex),
    Regex(Regex),
}

impl Matcher {
    fn parse(element: &str) -> Self {
        if element == "*" {
            return Self::Any;
        }
        if element.contains('*') {
            let escaped: Vec<String> = element.split('*').map(regex::escape).collect();
            if let Ok(re) = Regex::new(&format!("^{}$", escaped.join(".*"))) {
                return Self::Wildcard(re);
            }
        }
        match Regex::new(&format!("^(?:{})$", element)) {
            Ok(re) => Self::Regex(re),
            Err(_) => Self::Exact(element.to_string()),
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(exact) => exact == name,
            Self::Wildcard(re) | Self::Regex(re) => re.is_match(name),
        }
    }
}

/// Names to replace with no-op stubs.
#[derive(Debug, Clone)]
pub struct StubPattern {
    source: String,
    matchers: Vec<Matcher>,
}

impl StubPattern {
    pub fn new(pattern: &str) -> Self {
        Self {
            source: pattern.to_string(),
            matchers: pattern
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(Matcher::parse)
                .collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, name: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(name))
    }
}
