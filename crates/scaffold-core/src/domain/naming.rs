//! Project names and the placeholder variables derived from them.

use std::fmt;

use crate::domain::error::DomainError;

/// A validated project (or vendor alias) name.
///
/// Invariant: non-empty, no leading `.`, no path separators, only ASCII
/// alphanumerics plus `-`, `_` and `.`. The name becomes a directory under a
/// kind's output dir and the manifest `id`, so it must be a single path
/// segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectName(String);

impl ProjectName {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let invalid = |reason: &str| DomainError::InvalidProjectName {
            name: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("name cannot be empty"));
        }
        if raw.starts_with('.') {
            return Err(invalid("name cannot start with '.'"));
        }
        if raw.contains('/') || raw.contains('\\') {
            return Err(invalid("name cannot contain path separators"));
        }
        if raw.contains("..") {
            return Err(invalid("name cannot contain '..'"));
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(invalid(&format!("character '{bad}' is not allowed")));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `billing-api` → `billing_api`.
    pub fn snake(&self) -> String {
        snake_case(&self.0)
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lowercase, with every non-alphanumeric character mapped to `_`.
pub fn snake_case(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
