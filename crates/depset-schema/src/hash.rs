//! Content hashes for file dependencies.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Marker used on the wire for a hash that has not been computed yet.
pub const PENDING: &str = "pending";

/// Content hash of a file dependency.
///
/// Files declared by a repository descriptor have not been downloaded, so
/// their hash is [`ContentHash::Pending`]. Files added from bytes carry the
/// SHA256 of those bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ContentHash {
    /// Hash not yet known.
    #[default]
    Pending,
    /// Lowercase hex SHA256 digest (64 characters).
    Sha256(String),
}

impl ContentHash {
    /// Compute the SHA256 of `data`.
    pub fn compute(data: &[u8]) -> Self {
        Self::Sha256(hex::encode(Sha256::digest(data)))
    }

    /// Parse a wire value: either `pending` or 64 hex characters.
    ///
    /// # Errors
    ///
    /// Returns an error string if `s` is neither `pending` nor a valid digest.
    pub fn parse(s: &str) -> Result<Self, String> {
        if s == PENDING {
            return Ok(Self::Pending);
        }
        let hex = s.strip_prefix("sha256:").unwrap_or(s);
        if hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self::Sha256(hex.to_lowercase()))
        } else {
            Err(format!(
                "Invalid content hash: expected 'pending' or 64 hex chars, got '{s}'"
            ))
        }
    }

    /// Whether the hash is still pending.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Return the wire form as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => PENDING,
            Self::Sha256(hex) => hex,
        }
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ContentHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_is_sha256_hex() {
        let hash = ContentHash::compute(b"hello world");
        assert_eq!(
            hash.as_str(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        assert!(!hash.is_pending());
    }

    #[test]
    fn parse_accepts_pending_and_prefixed_digests() {
        assert_eq!(ContentHash::parse("pending").unwrap(), ContentHash::Pending);
        let upper = "B94D27B9934D3E08A52E52D7DA7DABFAC484EFE37A5380EE9088F7ACE2EFCDE9";
        let parsed = ContentHash::parse(&format!("sha256:{upper}")).unwrap();
        assert_eq!(parsed, ContentHash::compute(b"hello world"));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(ContentHash::parse("abc").is_err());
        assert!(ContentHash::parse(&"z".repeat(64)).is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&ContentHash::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert!(back.is_pending());
    }
}
