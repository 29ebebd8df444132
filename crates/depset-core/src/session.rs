//! Editing sessions over one working set.
//!
//! A [`Session`] owns the working set, the descriptor and manifest caches,
//! and every structure derived from them. The four mutation operations keep
//! the derived structures consistent; nothing else can change them.
//!
//! Operations take `&mut self`, so one session never sees concurrent
//! mutation. An operation either completes or, when cancelled through a
//! [`CancelHandle`], returns [`SessionError::Cancelled`] without touching the
//! session.

use crate::cache::{DescriptorCache, ManifestCache, ManifestState};
use crate::config::EngineConfig;
use crate::error::{FetchError, ParseError, SessionError};
use crate::fetcher::DescriptorFetcher;
use crate::file_manifest::{self, FileMissingMap};
use crate::manifest::ManifestParser;
use crate::missing::{self, MissingMap};
use crate::resolver::GraphResolver;
use crate::tree::{self, Forest};
use crate::working_set::WorkingSet;
use depset_schema::{
    AppFileManifest, FileDependency, FlatEntry, ReleaseChannel, RepoDependency, RepoDescriptor,
    canonical_id,
};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// A binary package handed to [`Session::add_file_dependencies`].
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// File name; identity within the working set.
    pub name: String,
    /// Where the file will live once committed.
    pub path: String,
    /// Raw contents.
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            path: name.clone(),
            name,
            bytes,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

/// What an [`Session::add_roots`] call changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Roots that were not yet in the working set.
    pub new_roots: Vec<String>,
    /// Discovered repository ids appended to the working set.
    pub added_repos: Vec<String>,
    /// Discovered file names appended to the working set.
    pub added_files: Vec<String>,
    /// Lookups that failed during this call.
    pub failures: Vec<(String, FetchError)>,
}

/// How one uploaded file was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Added with a parsed manifest.
    Added,
    /// Added, but its manifest could not be read.
    Unreadable(ParseError),
    /// Not added: a file with this name is already present.
    Duplicate,
}

/// Per-file outcomes of an [`Session::add_file_dependencies`] call, in input order.
pub type FileBatchReport = Vec<(String, FileOutcome)>;

/// Aborts the in-flight operation of the session it came from.
///
/// Cancellation is sticky: every later operation also returns
/// [`SessionError::Cancelled`] until [`Session::reset`] is called.
#[derive(Debug, Clone)]
pub struct CancelHandle(CancellationToken);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }
}

/// One editing session: a working set plus everything derived from it.
pub struct Session {
    fetcher: Arc<dyn DescriptorFetcher>,
    parser: Arc<dyn ManifestParser>,
    config: EngineConfig,
    cancel: CancellationToken,

    working_set: WorkingSet,
    descriptors: DescriptorCache,
    fetch_failures: IndexMap<String, FetchError>,
    manifests: ManifestCache,

    forest: Forest,
    missing: MissingMap,
    file_missing: FileMissingMap,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("source", &self.fetcher.key())
            .field("repos", &self.working_set.repo_count())
            .field("files", &self.working_set.file_count())
            .field("descriptors", &self.descriptors.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(
        fetcher: Arc<dyn DescriptorFetcher>,
        parser: Arc<dyn ManifestParser>,
        config: EngineConfig,
    ) -> Self {
        Self {
            fetcher,
            parser,
            config,
            cancel: CancellationToken::new(),
            working_set: WorkingSet::new(),
            descriptors: DescriptorCache::new(),
            fetch_failures: IndexMap::new(),
            manifests: ManifestCache::new(),
            forest: Forest::new(),
            missing: MissingMap::new(),
            file_missing: FileMissingMap::new(),
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(self.cancel.clone())
    }

    /// Discard all state and clear a previous cancellation.
    pub fn reset(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.working_set = WorkingSet::new();
        self.descriptors = DescriptorCache::new();
        self.fetch_failures.clear();
        self.manifests.clear();
        self.forest.clear();
        self.missing.clear();
        self.file_missing.clear();
    }

    fn ensure_live(&self) -> Result<(), SessionError> {
        if self.cancel.is_cancelled() {
            return Err(SessionError::Cancelled);
        }
        Ok(())
    }

    /// Add roots by reference, all with the same version and channel.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Cancelled`] if the session is cancelled
    /// before resolution completes.
    pub async fn add_roots<I, S>(
        &mut self,
        references: I,
        version_constraint: &str,
        release_channel: ReleaseChannel,
    ) -> Result<ResolveReport, SessionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let roots = references
            .into_iter()
            .map(|r| {
                RepoDependency::new(r.as_ref())
                    .with_version(version_constraint)
                    .with_channel(release_channel)
            })
            .collect();
        self.add_root_dependencies(roots).await
    }

    /// Add fully specified roots and resolve their transitive closure.
    ///
    /// Root ids are brought into canonical `owner/name` form. Roots whose id
    /// is blank after trimming name nothing and are skipped without a
    /// recorded failure; any other unparseable id is kept and reported as
    /// [`FetchError::Unresolvable`]. Cached descriptors are reused.
    ///
    /// Root metadata always wins over metadata discovered for the same id; a
    /// root already present keeps its position. Discovered dependencies are appended in breadth-first order.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Cancelled`] if the session is cancelled
    /// before resolution completes. The session is then unchanged.
    pub async fn add_root_dependencies(
        &mut self,
        roots: Vec<RepoDependency>,
    ) -> Result<ResolveReport, SessionError> {
        self.ensure_live()?;

        let mut seen = HashSet::new();
        let roots: Vec<RepoDependency> = roots
            .into_iter()
            .map(|mut root| {
                root.id = canonical_id(&root.id);
                root
            })
            .filter(|r| !r.id.is_empty() && seen.insert(r.id.clone()))
            .collect();

        let resolution = GraphResolver::new(self.fetcher.as_ref(), &self.config, &self.cancel)
            .resolve(&roots, &self.working_set, &self.descriptors)
            .await?;

        let mut report = ResolveReport::default();
        for (id, outcome) in resolution.fetched {
            match outcome {
                Ok(descriptor) => {
                    self.fetch_failures.shift_remove(&id);
                    self.descriptors.insert(descriptor);
                }
                Err(err) => {
                    report.failures.push((id.clone(), err.clone()));
                    self.fetch_failures.insert(id, err);
                }
            }
        }

        for root in roots {
            let id = root.id.clone();
            if self.working_set.upsert_repo(root) {
                report.new_roots.push(id);
            }
        }
        for dep in resolution.added_repos {
            let id = dep.id.clone();
            if self.working_set.insert_repo(dep) {
                report.added_repos.push(id);
            }
        }
        for file in resolution.added_files {
            let name = file.name.clone();
            if self.working_set.insert_file(file) {
                report.added_files.push(name);
            }
        }

        self.rederive();
        info!(
            roots = report.new_roots.len(),
            added = report.added_repos.len(),
            files = report.added_files.len(),
            failures = report.failures.len(),
            "roots added"
        );
        Ok(report)
    }

    /// Remove a repository dependency and re-derive without fetching.
    ///
    /// Returns `false` if no entry had that id.
    pub fn remove_repo_dependency(&mut self, reference: &str) -> bool {
        let id = canonical_id(reference);
        if self.working_set.remove_repo(&id).is_none() {
            return false;
        }
        self.fetch_failures.shift_remove(&id);
        self.rederive();
        info!(repo = %id, "repository dependency removed");
        true
    }

    /// Remove a file dependency together with its manifest state.
    ///
    /// Returns `false` if no file had that name.
    pub fn remove_file_dependency(&mut self, name: &str) -> bool {
        if self.working_set.remove_file(name).is_none() {
            return false;
        }
        self.manifests.shift_remove(name);
        self.rederive();
        info!(file = %name, "file dependency removed");
        true
    }

    /// Add binary packages, reading each one's manifest.
    ///
    /// A file whose manifest cannot be read is still added, with its error
    /// recorded; it takes no part in manifest analysis. Duplicate names are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Cancelled`] if the session is cancelled
    /// before every manifest is read. No file of the batch is added then.
    pub async fn add_file_dependencies(
        &mut self,
        files: Vec<FileUpload>,
    ) -> Result<FileBatchReport, SessionError> {
        self.ensure_live()?;

        let mut report = FileBatchReport::new();
        let mut staged: Vec<(FileDependency, ManifestState)> = Vec::new();
        let mut batch_names = HashSet::new();

        for upload in files {
            if self.working_set.contains_file(&upload.name) || !batch_names.insert(upload.name.clone())
            {
                warn!(file = %upload.name, "file already present, skipping");
                report.push((upload.name, FileOutcome::Duplicate));
                continue;
            }

            let file = FileDependency::from_bytes(&upload.name, &upload.path, &upload.bytes);
            let state = match self.read_manifest(upload.bytes).await? {
                Ok(manifest) => {
                    report.push((upload.name, FileOutcome::Added));
                    ManifestState::Parsed(manifest)
                }
                Err(err) => {
                    warn!(file = %upload.name, error = %err, "unreadable package manifest");
                    report.push((upload.name, FileOutcome::Unreadable(err.clone())));
                    ManifestState::Failed(err)
                }
            };
            staged.push((file, state));
        }

        for (file, state) in staged {
            self.manifests.insert(file.name.clone(), state);
            self.working_set.insert_file(file);
        }

        self.rederive();
        Ok(report)
    }

    /// Run the parser on the blocking pool, bounded by the parse timeout.
    async fn read_manifest(
        &self,
        bytes: Vec<u8>,
    ) -> Result<Result<AppFileManifest, ParseError>, SessionError> {
        let parser = Arc::clone(&self.parser);
        let timeout = self.config.parse_timeout();
        let task = tokio::task::spawn_blocking(move || parser.parse(&bytes));

        let outcome = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(SessionError::Cancelled),
            joined = tokio::time::timeout(timeout, task) => joined,
        };

        Ok(match outcome {
            Ok(Ok(parsed)) => parsed,
            Ok(Err(join_err)) => Err(ParseError::Task(join_err.to_string())),
            Err(_) => Err(ParseError::Timeout(timeout.as_secs())),
        })
    }

    fn rederive(&mut self) {
        self.forest = tree::build_forest(&self.working_set, &self.descriptors);
        self.missing = missing::compute(&self.working_set, &self.descriptors);
        self.file_missing = file_manifest::compute(&self.working_set, &self.manifests);
    }

    pub fn working_set(&self) -> &WorkingSet {
        &self.working_set
    }

    /// Hand the finished working set to whoever commits it.
    pub fn into_working_set(self) -> WorkingSet {
        self.working_set
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// The forest in display order.
    pub fn flatten(&self) -> Vec<FlatEntry> {
        tree::flatten(&self.forest)
    }

    /// Declared repository and file dependencies absent from the working set.
    pub fn missing_dependencies(&self) -> &MissingMap {
        &self.missing
    }

    /// Manifest-declared dependencies no present file satisfies.
    pub fn missing_file_dependencies(&self) -> &FileMissingMap {
        &self.file_missing
    }

    pub fn descriptor(&self, id: &str) -> Option<&RepoDescriptor> {
        self.descriptors.get(id)
    }

    pub fn manifest(&self, name: &str) -> Option<&AppFileManifest> {
        self.manifests.get(name).and_then(ManifestState::manifest)
    }

    /// Files whose manifest could not be read.
    pub fn manifest_errors(&self) -> impl Iterator<Item = (&str, &ParseError)> {
        self.manifests
            .iter()
            .filter_map(|(name, state)| state.error().map(|e| (name.as_str(), e)))
    }

    /// Working-set repositories whose last lookup failed.
    pub fn fetch_failures(&self) -> impl Iterator<Item = (&str, &FetchError)> {
        self.fetch_failures.iter().map(|(id, e)| (id.as_str(), e))
    }
}
