//! # Origin allow-list.
//!
//! The sole authorization check for inbound messages. Each entry is either an
//! exact origin or a prefix; in config a prefix is written with a trailing `*`:
//!
//! ```text
//! "https://player.example.com"   exact
//! "http://localhost*"            prefix: http://localhost, http://localhost:8080, ...
//! ```
//!
//! Prefixes must be explicit: a bare `https://example.com` prefix would also
//! accept `https://example.com.attacker.net`.

use serde::{Deserialize, Serialize};

/// One allow-list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OriginRule {
    Exact(String),
    Prefix(String),
}

impl OriginRule {
    pub fn matches(&self, origin: &str) -> bool {
        match self {
            OriginRule::Exact(o) => origin == o,
            OriginRule::Prefix(p) => origin.starts_with(p.as_str()),
        }
    }
}

impl From<String> for OriginRule {
    fn from(s: String) -> Self {
        match s.strip_suffix('*') {
            Some(prefix) => OriginRule::Prefix(prefix.to_string()),
            None => OriginRule::Exact(s),
        }
    }
}

impl From<&str> for OriginRule {
    fn from(s: &str) -> Self {
        OriginRule::from(s.to_string())
    }
}

impl From<OriginRule> for String {
    fn from(rule: OriginRule) -> Self {
        match rule {
            OriginRule::Exact(o) => o,
            OriginRule::Prefix(p) => format!("{p}*"),
        }
    }
}

/// Set of trusted origins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginAllowList {
    rules: Vec<OriginRule>,
}

impl OriginAllowList {
    pub fn new<I, R>(rules: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<OriginRule>,
    {
        Self {
            rules: rules.into_iter().map(Into::into).collect(),
        }
    }

    /// Origins trusted out of the box: local development only.
    pub fn local_development() -> Self {
        Self::new(["http://localhost*", "https://localhost*", "file://*"])
    }

    pub fn allows(&self, origin: &str) -> bool {
        self.rules.iter().any(|r| r.matches(origin))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[OriginRule] {
        &self.rules
    }
}
