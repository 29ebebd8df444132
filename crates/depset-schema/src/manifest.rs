//! Metadata read from binary packages.

use serde::{Deserialize, Serialize};

/// Metadata extracted from one binary package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppFileManifest {
    /// Name of the package itself.
    #[serde(default)]
    pub name: String,

    /// Publisher of the package.
    pub publisher: String,

    /// Version of the package (four-part, e.g. `18.0.0.0`).
    pub version: String,

    /// Packages this one requires at install time.
    #[serde(default)]
    pub dependencies: Vec<ManifestDependency>,
}

/// One dependency declared inside a binary package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestDependency {
    /// Name of the required package.
    pub name: String,

    /// Publisher of the required package.
    #[serde(default)]
    pub publisher: String,

    /// Lowest acceptable version.
    #[serde(default)]
    pub min_version: String,
}

impl ManifestDependency {
    /// Create a manifest dependency.
    pub fn new(
        name: impl Into<String>,
        publisher: impl Into<String>,
        min_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            publisher: publisher.into(),
            min_version: min_version.into(),
        }
    }
}

impl std::fmt::Display for ManifestDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.publisher.is_empty() {
            write!(f, " by {}", self.publisher)?;
        }
        if !self.min_version.is_empty() {
            write!(f, " (>= {})", self.min_version)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_known_parts() {
        let dep = ManifestDependency::new("Base Application", "Microsoft", "18.0.0.0");
        assert_eq!(dep.to_string(), "Base Application by Microsoft (>= 18.0.0.0)");
        assert_eq!(ManifestDependency::new("Lib", "", "").to_string(), "Lib");
    }
}
