use crate::cache::DescriptorCache;
use crate::config::EngineConfig;
use crate::error::{FetchError, SessionError};
use crate::fetcher::DescriptorFetcher;
use crate::working_set::WorkingSet;
use depset_schema::{FileDependency, RepoDependency, RepoDescriptor, RepoId, canonical_id};
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Outcome of one descriptor lookup made during a resolution.
pub type FetchOutcome = Result<RepoDescriptor, FetchError>;

/// What a resolution discovered, staged for the caller to merge.
///
/// Nothing here has been applied to a working set or cache yet, so a
/// resolution that is abandoned leaves no trace.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Newly discovered repository dependencies, in breadth-first order.
    /// Roots are never included.
    pub added_repos: Vec<RepoDependency>,
    /// Newly discovered file dependencies, in discovery order.
    pub added_files: Vec<FileDependency>,
    /// Fresh lookups performed by this run, in visit order. Ids served from
    /// the cache do not appear.
    pub fetched: Vec<(String, FetchOutcome)>,
}

impl Resolution {
    pub fn failures(&self) -> impl Iterator<Item = (&str, &FetchError)> {
        self.fetched
            .iter()
            .filter_map(|(id, outcome)| outcome.as_ref().err().map(|e| (id.as_str(), e)))
    }
}

/// Computes the transitive closure of repository dependencies.
///
/// Expansion is breadth-first over an explicit worklist. The descriptors of
/// one level are fetched concurrently and merged in the level's enqueue
/// order, so the result is identical to a strictly sequential walk no matter
/// which fetch completes first.
pub struct GraphResolver<'a> {
    fetcher: &'a dyn DescriptorFetcher,
    config: &'a EngineConfig,
    cancel: &'a CancellationToken,
}

impl<'a> GraphResolver<'a> {
    pub fn new(
        fetcher: &'a dyn DescriptorFetcher,
        config: &'a EngineConfig,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            fetcher,
            config,
            cancel,
        }
    }

    /// Expand `roots` against `working_set`, consulting `cache` before
    /// fetching.
    ///
    /// Root and discovered ids are brought into canonical `owner/name` form
    /// first, as are the dependency ids of every fetched descriptor.
    ///
    /// A failed or unresolvable lookup turns the node into a leaf and
    /// expansion carries on. Visited-set membership, not descriptor content,
    /// decides whether a node is expanded, so cycles terminate.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Cancelled`] if the cancellation token fires
    /// while fetches are in flight.
    pub async fn resolve(
        &self,
        roots: &[RepoDependency],
        working_set: &WorkingSet,
        cache: &DescriptorCache,
    ) -> Result<Resolution, SessionError> {
        let mut resolution = Resolution::default();
        let mut visited: HashSet<String> = HashSet::new();
        let mut enqueued: HashSet<String> = HashSet::new();
        let mut files_seen: HashSet<String> = HashSet::new();

        let mut level: Vec<RepoDependency> = Vec::new();
        for root in roots.iter().map(canonicalized) {
            if enqueued.insert(root.id.clone()) {
                level.push(root);
            }
        }

        while !level.is_empty() {
            if self.cancel.is_cancelled() {
                return Err(SessionError::Cancelled);
            }

            let deps: Vec<RepoDependency> = level
                .drain(..)
                .filter(|dep| visited.insert(dep.id.clone()))
                .collect();

            let mut unresolvable: HashMap<String, FetchError> = HashMap::new();
            let mut to_fetch: Vec<(String, RepoId)> = Vec::new();
            for dep in &deps {
                if cache.contains(&dep.id) {
                    continue;
                }
                match dep.repo_id() {
                    Ok(repo_id) => to_fetch.push((dep.id.clone(), repo_id)),
                    Err(e) => {
                        unresolvable.insert(dep.id.clone(), FetchError::from(e));
                    }
                }
            }

            let mut fetched = self.fetch_level(to_fetch).await?;

            let mut next: Vec<RepoDependency> = Vec::new();
            for RepoDependency { id, .. } in deps {
                let fresh = match unresolvable.remove(&id) {
                    Some(err) => Some(Err(err)),
                    None => fetched.remove(&id),
                };

                let descriptor = match fresh {
                    Some(Ok(descriptor)) => {
                        resolution.fetched.push((id.clone(), Ok(descriptor)));
                        resolution.fetched.last().and_then(|(_, o)| o.as_ref().ok())
                    }
                    Some(Err(err)) => {
                        warn!(repo = %id, error = %err, "no descriptor, treating as leaf");
                        resolution.fetched.push((id.clone(), Err(err)));
                        None
                    }
                    None => cache.get(&id),
                };

                let Some(descriptor) = descriptor else {
                    continue;
                };
                for dep in descriptor.repo_dependencies.iter().map(canonicalized) {
                    if !working_set.contains_repo(&dep.id) && enqueued.insert(dep.id.clone()) {
                        resolution.added_repos.push(dep.clone());
                        next.push(dep);
                    }
                }
                for file in &descriptor.file_dependencies {
                    if !working_set.contains_file(&file.name) && files_seen.insert(file.name.clone())
                    {
                        resolution.added_files.push(file.clone());
                    }
                }
            }

            level = next;
        }

        debug!(
            visited = visited.len(),
            added = resolution.added_repos.len(),
            fetched = resolution.fetched.len(),
            "resolution finished"
        );
        Ok(resolution)
    }

    /// Fetch one level concurrently, bounded by configuration.
    ///
    /// Outcomes are keyed by the id they were requested under. Timeouts
    /// become [`FetchError::Timeout`] for the affected id only.
    async fn fetch_level(
        &self,
        ids: Vec<(String, RepoId)>,
    ) -> Result<HashMap<String, FetchOutcome>, SessionError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let timeout = self.config.fetch_timeout();
        let fetcher = self.fetcher;
        let fetches = stream::iter(ids)
            .map(|(key, repo_id)| async move {
                debug!(repo = %repo_id, "fetching descriptor");
                let outcome = match tokio::time::timeout(timeout, fetcher.fetch(&repo_id)).await {
                    Ok(Ok(mut descriptor)) => {
                        descriptor.id.clone_from(&key);
                        for dep in &mut descriptor.repo_dependencies {
                            dep.id = canonical_id(&dep.id);
                        }
                        Ok(descriptor)
                    }
                    Ok(Err(err)) => Err(err),
                    Err(_) => Err(FetchError::Timeout {
                        id: key.clone(),
                        secs: timeout.as_secs(),
                    }),
                };
                (key, outcome)
            })
            .buffer_unordered(self.config.fetch_concurrency())
            .collect::<HashMap<_, _>>();

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(SessionError::Cancelled),
            results = fetches => Ok(results),
        }
    }
}

/// `dep` with its id in canonical `owner/name` form where possible.
fn canonicalized(dep: &RepoDependency) -> RepoDependency {
    let mut dep = dep.clone();
    dep.id = canonical_id(&dep.id);
    dep
}
