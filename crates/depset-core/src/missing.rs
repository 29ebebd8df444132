//! Declared-but-absent repository and file dependencies.

use crate::cache::DescriptorCache;
use crate::working_set::WorkingSet;
use depset_schema::MissingDependencyInfo;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Missing-dependency reports by owner id, in working-set order.
pub type MissingMap = IndexMap<String, MissingDependencyInfo>;

/// Diff every resolved node's declared dependencies against the working set.
///
/// Nodes without a cached descriptor are skipped: whether they miss
/// anything is unknown. Nodes missing nothing are omitted.
pub fn compute(working_set: &WorkingSet, cache: &DescriptorCache) -> MissingMap {
    let mut missing = MissingMap::new();

    for repo in working_set.repos() {
        let Some(descriptor) = cache.get(&repo.id) else {
            continue;
        };

        let mut seen = HashSet::new();
        let missing_repo_ids: Vec<String> = descriptor
            .repo_dependencies
            .iter()
            .filter(|d| !working_set.contains_repo(&d.id) && seen.insert(d.id.as_str()))
            .map(|d| d.id.clone())
            .collect();

        let mut seen = HashSet::new();
        let missing_file_names: Vec<String> = descriptor
            .file_dependencies
            .iter()
            .filter(|f| !working_set.contains_file(&f.name) && seen.insert(f.name.as_str()))
            .map(|f| f.name.clone())
            .collect();

        let info = MissingDependencyInfo {
            owner_id: repo.id.clone(),
            missing_repo_ids,
            missing_file_names,
        };
        if !info.is_empty() {
            missing.insert(repo.id.clone(), info);
        }
    }

    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use depset_schema::{FileDependency, RepoDependency, RepoDescriptor};

    #[test]
    fn test_reports_absent_repos_and_files() {
        let mut set = WorkingSet::new();
        set.insert_repo(RepoDependency::new("o/x"));
        set.insert_repo(RepoDependency::new("o/present"));
        set.insert_file(FileDependency::pending("Have.app", "Have.app"));

        let mut descriptor = RepoDescriptor::with_repos("o/x", ["o/present", "o/y", "o/y"]);
        descriptor
            .file_dependencies
            .push(FileDependency::pending("Have.app", "Have.app"));
        descriptor
            .file_dependencies
            .push(FileDependency::pending("Need.app", "Need.app"));
        let mut cache = DescriptorCache::new();
        cache.insert(descriptor);

        let missing = compute(&set, &cache);
        assert_eq!(missing.len(), 1);
        let info = &missing["o/x"];
        assert_eq!(info.owner_id, "o/x");
        assert_eq!(info.missing_repo_ids, vec!["o/y"]);
        assert_eq!(info.missing_file_names, vec!["Need.app"]);
    }

    #[test]
    fn test_complete_nodes_are_omitted() {
        let mut set = WorkingSet::new();
        set.insert_repo(RepoDependency::new("o/x"));
        set.insert_repo(RepoDependency::new("o/y"));
        let mut cache = DescriptorCache::new();
        cache.insert(RepoDescriptor::with_repos("o/x", ["o/y"]));
        cache.insert(RepoDescriptor::leaf("o/y"));

        assert!(compute(&set, &cache).is_empty());
    }

    #[test]
    fn test_unresolved_nodes_are_skipped() {
        let mut set = WorkingSet::new();
        set.insert_repo(RepoDependency::new("o/unknown"));
        assert!(compute(&set, &DescriptorCache::new()).is_empty());
    }

    #[test]
    fn test_missing_set_matches_definition() {
        let mut set = WorkingSet::new();
        for id in ["o/a", "o/b", "o/d"] {
            set.insert_repo(RepoDependency::new(id));
        }
        let descriptor = RepoDescriptor::with_repos("o/a", ["o/b", "o/c", "o/d", "o/e"]);
        let expected: Vec<String> = descriptor
            .repo_dependencies
            .iter()
            .filter(|r| !set.contains_repo(&r.id))
            .map(|r| r.id.clone())
            .collect();
        let mut cache = DescriptorCache::new();
        cache.insert(descriptor);

        assert_eq!(compute(&set, &cache)["o/a"].missing_repo_ids, expected);
    }
}
