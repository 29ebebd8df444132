//! Canonical repository identifiers.

use serde::{Deserialize, Serialize};

/// Prefixes accepted in front of an `owner/name` reference.
const HOST_PREFIXES: &[&str] = &["https://github.com/", "http://github.com/", "github.com/"];

/// A reference that cannot be turned into a canonical `owner/name` id.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// The reference is empty after trimming.
    #[error("Empty repository reference")]
    Empty,

    /// The reference does not have exactly two non-empty `owner/name` segments.
    #[error("Invalid repository reference: expected 'owner/name', got '{0}'")]
    Malformed(String),

    /// A segment contains characters a repository host would reject.
    #[error("Invalid character in repository reference '{0}'")]
    InvalidCharacter(String),
}

/// A validated repository reference in `owner/name` format.
///
/// # Example
///
/// ```
/// use depset_schema::repo::RepoId;
///
/// let repo = RepoId::parse("https://github.com/microsoft/BCApps.git").unwrap();
/// assert_eq!(repo.owner(), "microsoft");
/// assert_eq!(repo.name(), "BCApps");
/// assert_eq!(repo.as_str(), "microsoft/BCApps");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoId(String);

impl RepoId {
    /// Parse and normalize a repository reference.
    ///
    /// Accepts `owner/name`, a `github.com` URL, a trailing slash and a
    /// trailing `.git`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] if the reference does not reduce to two
    /// non-empty segments made of ASCII alphanumerics, `-`, `_` or `.`.
    pub fn parse(reference: &str) -> Result<Self, IdentifierError> {
        let trimmed = reference.trim();
        if trimmed.is_empty() {
            return Err(IdentifierError::Empty);
        }

        let mut rest = trimmed;
        for prefix in HOST_PREFIXES {
            if let Some(stripped) = rest.strip_prefix(prefix) {
                rest = stripped;
                break;
            }
        }
        let rest = rest.trim_end_matches('/');
        let rest = rest.strip_suffix(".git").unwrap_or(rest);

        let mut parts = rest.split('/');
        let (Some(owner), Some(name), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(IdentifierError::Malformed(reference.to_string()));
        };
        if owner.is_empty() || name.is_empty() {
            return Err(IdentifierError::Malformed(reference.to_string()));
        }

        let valid = |segment: &str| {
            segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        };
        if !valid(owner) || !valid(name) {
            return Err(IdentifierError::InvalidCharacter(reference.to_string()));
        }

        Ok(Self(format!("{owner}/{name}")))
    }

    /// Get the owner part.
    pub fn owner(&self) -> &str {
        self.0.split('/').next().unwrap_or("")
    }

    /// Get the repository name part.
    pub fn name(&self) -> &str {
        self.0.split('/').nth(1).unwrap_or("")
    }

    /// Return the canonical `owner/name` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for RepoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RepoId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RepoId> for String {
    fn from(id: RepoId) -> Self {
        id.0
    }
}

impl std::str::FromStr for RepoId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Canonical identity for a repository reference.
///
/// Parseable references collapse to their `owner/name` form so that
/// `https://github.com/a/b` and `a/b` are the same dependency. References that
/// cannot be parsed keep their trimmed text as identity.
pub fn canonical_id(reference: &str) -> String {
    RepoId::parse(reference).map_or_else(|_| reference.trim().to_string(), String::from)
}
