//! The caller-visible, insertion-ordered set of configured dependencies.

use depset_schema::{FileDependency, RepoDependency};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Ordered repository and file dependencies, unique by identity.
///
/// Insertion order drives the forest tie-break and the flatten order, so both
/// collections are insertion-ordered maps. Removal keeps the relative order of
/// the remaining entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingSet {
    repos: IndexMap<String, RepoDependency>,
    files: IndexMap<String, FileDependency>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a repository dependency unless its id is already present.
    ///
    /// Returns `false` and leaves the existing entry untouched on a duplicate.
    pub fn insert_repo(&mut self, dep: RepoDependency) -> bool {
        if self.repos.contains_key(&dep.id) {
            return false;
        }
        self.repos.insert(dep.id.clone(), dep);
        true
    }

    /// Insert or replace a repository dependency.
    ///
    /// A replaced entry keeps its position. Returns `true` when the id was new.
    pub fn upsert_repo(&mut self, dep: RepoDependency) -> bool {
        self.repos.insert(dep.id.clone(), dep).is_none()
    }

    pub fn remove_repo(&mut self, id: &str) -> Option<RepoDependency> {
        self.repos.shift_remove(id)
    }

    pub fn contains_repo(&self, id: &str) -> bool {
        self.repos.contains_key(id)
    }

    pub fn repo(&self, id: &str) -> Option<&RepoDependency> {
        self.repos.get(id)
    }

    /// Repository dependencies in insertion order.
    pub fn repos(&self) -> impl Iterator<Item = &RepoDependency> {
        self.repos.values()
    }

    /// Repository ids in insertion order.
    pub fn repo_ids(&self) -> impl Iterator<Item = &str> {
        self.repos.keys().map(String::as_str)
    }

    pub fn repo_count(&self) -> usize {
        self.repos.len()
    }

    /// Append a file dependency unless its name is already present.
    pub fn insert_file(&mut self, file: FileDependency) -> bool {
        if self.files.contains_key(&file.name) {
            return false;
        }
        self.files.insert(file.name.clone(), file);
        true
    }

    pub fn remove_file(&mut self, name: &str) -> Option<FileDependency> {
        self.files.shift_remove(name)
    }

    pub fn contains_file(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn file(&self, name: &str) -> Option<&FileDependency> {
        self.files.get(name)
    }

    /// File dependencies in insertion order.
    pub fn files(&self) -> impl Iterator<Item = &FileDependency> {
        self.files.values()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty() && self.files.is_empty()
    }

    /// Consume the set, returning both lists in order.
    pub fn into_parts(self) -> (Vec<RepoDependency>, Vec<FileDependency>) {
        (
            self.repos.into_values().collect(),
            self.files.into_values().collect(),
        )
    }
}

impl Serialize for WorkingSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("WorkingSet", 2)?;
        state.serialize_field("repos", &self.repos.values().collect::<Vec<_>>())?;
        state.serialize_field("files", &self.files.values().collect::<Vec<_>>())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depset_schema::ReleaseChannel;

    #[test]
    fn insert_rejects_duplicates() {
        let mut set = WorkingSet::new();
        assert!(set.insert_repo(RepoDependency::new("a/x")));
        assert!(!set.insert_repo(RepoDependency::new("a/x").with_version("1.0")));
        assert_eq!(set.repo_count(), 1);
        assert_eq!(set.repo("a/x").unwrap().version_constraint, "latest");
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut set = WorkingSet::new();
        set.insert_repo(RepoDependency::new("a/x"));
        set.insert_repo(RepoDependency::new("a/y"));
        assert!(!set.upsert_repo(
            RepoDependency::new("a/x").with_channel(ReleaseChannel::Prerelease)
        ));

        let ids: Vec<&str> = set.repo_ids().collect();
        assert_eq!(ids, vec!["a/x", "a/y"]);
        assert_eq!(
            set.repo("a/x").unwrap().release_channel,
            ReleaseChannel::Prerelease
        );
    }

    #[test]
    fn removal_preserves_order() {
        let mut set = WorkingSet::new();
        for id in ["a/1", "a/2", "a/3"] {
            set.insert_repo(RepoDependency::new(id));
        }
        assert!(set.remove_repo("a/2").is_some());
        assert!(set.remove_repo("a/2").is_none());
        let ids: Vec<&str> = set.repo_ids().collect();
        assert_eq!(ids, vec!["a/1", "a/3"]);
    }

    #[test]
    fn files_are_unique_by_name() {
        let mut set = WorkingSet::new();
        assert!(set.insert_file(FileDependency::pending("x.app", "one")));
        assert!(!set.insert_file(FileDependency::pending("x.app", "two")));
        assert_eq!(set.file("x.app").unwrap().path, "one");
        assert!(set.remove_file("x.app").is_some());
        assert!(set.is_empty());
    }

    #[test]
    fn serializes_as_ordered_lists() {
        let mut set = WorkingSet::new();
        set.insert_repo(RepoDependency::new("b/b"));
        set.insert_repo(RepoDependency::new("a/a"));
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["repos"][0]["id"], "b/b");
        assert_eq!(json["repos"][1]["id"], "a/a");
        assert!(json["files"].as_array().unwrap().is_empty());
    }
}
