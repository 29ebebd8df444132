//! Manifest-based missing-dependency analysis for binary packages.
//!
//! Package manifests name their dependencies by display name (`Base
//! Application`), while the working set holds file names
//! (`Microsoft_Base Application_18.0.0.0.app`). The two are related with an
//! approximate, symmetric substring rule; see [`file_satisfies`].

use crate::cache::ManifestCache;
use crate::working_set::WorkingSet;
use depset_schema::{ManifestDependency, MissingFileDependencyInfo};
use indexmap::IndexMap;

/// File-missing reports by file name, in working-set order.
pub type FileMissingMap = IndexMap<String, MissingFileDependencyInfo>;

/// Whether a file named `file_name` plausibly provides `dependency_name`.
///
/// Case-insensitive. True when the file name contains the dependency name,
/// or the dependency name contains the file name without its extension.
/// Empty names never match.
pub fn file_satisfies(file_name: &str, dependency_name: &str) -> bool {
    let file = file_name.trim().to_lowercase();
    let dependency = dependency_name.trim().to_lowercase();
    if file.is_empty() || dependency.is_empty() {
        return false;
    }
    if file.contains(&dependency) {
        return true;
    }
    let stem = strip_extension(&file);
    !stem.is_empty() && dependency.contains(stem)
}

fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.contains(['/', '\\']) => stem,
        _ => name,
    }
}

/// Diff every parsed manifest's dependencies against the current file names.
///
/// Files whose manifest failed to parse, and files never parsed, are left
/// out. Files with nothing missing are omitted.
pub fn compute(working_set: &WorkingSet, manifests: &ManifestCache) -> FileMissingMap {
    let names: Vec<&str> = working_set.files().map(|f| f.name.as_str()).collect();
    let mut missing = FileMissingMap::new();

    for file in working_set.files() {
        let Some(manifest) = manifests.get(&file.name).and_then(|s| s.manifest()) else {
            continue;
        };

        let mut absent: Vec<ManifestDependency> = Vec::new();
        for dep in &manifest.dependencies {
            let present = names.iter().any(|name| file_satisfies(name, &dep.name));
            if !present && !absent.contains(dep) {
                absent.push(dep.clone());
            }
        }

        if !absent.is_empty() {
            missing.insert(
                file.name.clone(),
                MissingFileDependencyInfo {
                    file_name: file.name.clone(),
                    missing_manifest_deps: absent,
                },
            );
        }
    }

    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManifestState;
    use crate::error::ParseError;
    use depset_schema::{AppFileManifest, FileDependency};

    fn manifest(deps: &[&str]) -> AppFileManifest {
        AppFileManifest {
            name: "Ext".into(),
            publisher: "Contoso".into(),
            version: "1.0.0.0".into(),
            dependencies: deps
                .iter()
                .map(|d| ManifestDependency::new(*d, "Microsoft", "18.0.0.0"))
                .collect(),
        }
    }

    #[test]
    fn test_file_contains_dependency_name() {
        assert!(file_satisfies("BaseApp_18.0.0.0.app", "BaseApp"));
        assert!(file_satisfies("Microsoft_Base Application_18.0.app", "base application"));
    }

    #[test]
    fn test_dependency_contains_file_stem() {
        assert!(file_satisfies("Library.app", "Contoso Library"));
        assert!(!file_satisfies("Library_1.0.app", "Contoso Library"));
    }

    #[test]
    fn test_unrelated_and_empty_names() {
        assert!(!file_satisfies("Sales.app", "Purchasing"));
        assert!(!file_satisfies("", "Anything"));
        assert!(!file_satisfies("Sales.app", "  "));
        assert!(!file_satisfies(".app", "My app"));
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("a_1.0.0.0.app"), "a_1.0.0.0");
        assert_eq!(strip_extension("noext"), "noext");
        assert_eq!(strip_extension(".hidden"), ".hidden");
    }

    #[test]
    fn test_substring_match_satisfies_dependency() {
        let mut set = WorkingSet::new();
        set.insert_file(FileDependency::pending("BaseApp_18.0.0.0.app", "x"));
        set.insert_file(FileDependency::pending("Sales.app", "y"));
        let mut manifests = ManifestCache::new();
        manifests.insert("Sales.app".into(), ManifestState::Parsed(manifest(&["BaseApp"])));

        assert!(compute(&set, &manifests).is_empty());
    }

    #[test]
    fn test_reports_unmatched_dependencies() {
        let mut set = WorkingSet::new();
        set.insert_file(FileDependency::pending("Sales.app", "y"));
        let mut manifests = ManifestCache::new();
        manifests.insert(
            "Sales.app".into(),
            ManifestState::Parsed(manifest(&["System Application", "System Application"])),
        );

        let missing = compute(&set, &manifests);
        let info = &missing["Sales.app"];
        assert_eq!(info.file_name, "Sales.app");
        assert_eq!(info.missing_manifest_deps.len(), 1);
        assert_eq!(info.missing_manifest_deps[0].name, "System Application");
    }

    #[test]
    fn test_failed_manifests_are_excluded() {
        let mut set = WorkingSet::new();
        set.insert_file(FileDependency::pending("Broken.app", "b"));
        set.insert_file(FileDependency::pending("Unparsed.app", "u"));
        let mut manifests = ManifestCache::new();
        manifests.insert("Broken.app".into(), ManifestState::Failed(ParseError::MissingApp));

        assert!(compute(&set, &manifests).is_empty());
    }
}
