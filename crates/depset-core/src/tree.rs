//! Dependency forest construction and flattening.

use crate::cache::DescriptorCache;
use crate::working_set::WorkingSet;
use depset_schema::{DependencyTreeNode, FlatEntry};
use indexmap::IndexMap;
use std::collections::{HashSet, VecDeque};

/// Forest nodes keyed by repository id, in working-set order.
pub type Forest = IndexMap<String, DependencyTreeNode>;

/// Build the dependency forest over `working_set`.
///
/// Each node is claimed by the first node, in working-set order, whose
/// cached descriptor declares it. A claim that would close a cycle is
/// skipped, so every node stays reachable from a parentless root. Depth is
/// then assigned breadth-first from all roots.
pub fn build_forest(working_set: &WorkingSet, cache: &DescriptorCache) -> Forest {
    let mut forest: Forest = working_set
        .repo_ids()
        .map(|id| (id.to_string(), DependencyTreeNode::root(id)))
        .collect();

    for owner in working_set.repo_ids() {
        let Some(descriptor) = cache.get(owner) else {
            continue;
        };
        for dep in &descriptor.repo_dependencies {
            let child = dep.id.as_str();
            if child == owner {
                continue;
            }
            let unclaimed = forest.get(child).is_some_and(DependencyTreeNode::is_root);
            if !unclaimed || is_ancestor(&forest, child, owner) {
                continue;
            }
            if let Some(node) = forest.get_mut(child) {
                node.parent_id = Some(owner.to_string());
            }
            if let Some(node) = forest.get_mut(owner) {
                node.child_ids.push(child.to_string());
            }
        }
    }

    assign_depths(&mut forest);
    forest
}

/// Whether `candidate` is `node` or lies on `node`'s parent chain.
fn is_ancestor(forest: &Forest, candidate: &str, node: &str) -> bool {
    let mut current = Some(node);
    // The chain is acyclic by construction; the bound is a backstop.
    for _ in 0..=forest.len() {
        match current {
            Some(id) if id == candidate => return true,
            Some(id) => current = forest.get(id).and_then(|n| n.parent_id.as_deref()),
            None => return false,
        }
    }
    false
}

fn assign_depths(forest: &mut Forest) {
    let mut queue: VecDeque<String> = VecDeque::new();
    let mut visited: HashSet<String> = HashSet::new();
    for node in forest.values_mut() {
        if node.is_root() {
            node.depth = 0;
            visited.insert(node.id.clone());
            queue.push_back(node.id.clone());
        }
    }

    while let Some(id) = queue.pop_front() {
        let Some((depth, children)) = forest.get(&id).map(|n| (n.depth, n.child_ids.clone()))
        else {
            continue;
        };
        for child in children {
            if !visited.insert(child.clone()) {
                continue;
            }
            if let Some(node) = forest.get_mut(&child) {
                node.depth = depth + 1;
            }
            queue.push_back(child);
        }
    }
}

/// Flatten the forest into display order.
///
/// Pre-order depth-first from each root in forest order, children in claim
/// order. Nodes the walk cannot reach are appended as parentless rows.
pub fn flatten(forest: &Forest) -> Vec<FlatEntry> {
    let mut rows = Vec::with_capacity(forest.len());
    let mut emitted: HashSet<&str> = HashSet::new();
    let mut stack: Vec<(&str, usize, Option<&str>)> = Vec::new();

    for root in forest.values().filter(|n| n.is_root()) {
        stack.push((root.id.as_str(), 0, None));
        while let Some((id, depth, parent)) = stack.pop() {
            if !emitted.insert(id) {
                continue;
            }
            let Some(node) = forest.get(id) else {
                continue;
            };
            rows.push(FlatEntry {
                id: id.to_string(),
                depth,
                parent_label: parent.map(str::to_string),
            });
            for child in node.child_ids.iter().rev() {
                stack.push((child.as_str(), depth + 1, Some(id)));
            }
        }
    }

    for node in forest.values() {
        if emitted.insert(node.id.as_str()) {
            rows.push(FlatEntry {
                id: node.id.clone(),
                depth: 0,
                parent_label: None,
            });
        }
    }

    rows
}
