//! Resolve command

use super::{cancel_on_interrupt, read_uploads};
use crate::config::Config;
use crate::ui::report;
use anyhow::{Context, Result, bail};
use depset_core::{
    DescriptorFetcher, DirectoryFetcher, GitHubFetcher, NavxManifestParser, Session,
};
use depset_schema::ReleaseChannel;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Arguments of `depset resolve`.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub roots: Vec<String>,
    pub version: String,
    pub channel: ReleaseChannel,
    pub apps: Vec<PathBuf>,
    pub source: String,
    pub json: bool,
}

/// Build the descriptor source named by `--source`.
pub fn fetcher_for(source: &str, config: &Config) -> Result<Arc<dyn DescriptorFetcher>> {
    if source.eq_ignore_ascii_case("github") {
        let client = reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        let fetcher = GitHubFetcher::new(client)
            .with_api_url(&config.github.api_url)
            .with_settings_path(&config.github.settings_path);
        return Ok(Arc::new(fetcher));
    }

    let root = Path::new(source);
    if !root.is_dir() {
        bail!("Descriptor source '{source}' is neither 'github' nor a directory");
    }
    Ok(Arc::new(DirectoryFetcher::new(root)))
}

/// Resolve roots (and optional packages) and report the resulting set
pub async fn resolve(config: &Config, options: ResolveOptions) -> Result<()> {
    let fetcher = fetcher_for(&options.source, config)?;
    let uploads = read_uploads(&options.apps)?;

    let mut session = Session::new(fetcher, Arc::new(NavxManifestParser), config.engine.clone());
    cancel_on_interrupt(session.cancel_handle());

    session
        .add_roots(&options.roots, &options.version, options.channel)
        .await
        .context("Resolution aborted")?;
    if !uploads.is_empty() {
        session
            .add_file_dependencies(uploads)
            .await
            .context("Reading packages aborted")?;
    }

    if options.json {
        let json = serde_json::to_string_pretty(session.working_set())
            .context("Failed to serialize working set")?;
        println!("{json}");
        return Ok(());
    }

    println!();
    report::print_tree(&session.flatten(), session.working_set());
    report::print_files(session.working_set());

    let problems = session
        .missing_dependencies()
        .values()
        .map(|m| m.missing_repo_ids.len() + m.missing_file_names.len())
        .sum::<usize>()
        + session
            .missing_file_dependencies()
            .values()
            .map(|m| m.missing_manifest_deps.len())
            .sum::<usize>()
        + session.manifest_errors().count()
        + session.fetch_failures().count();

    if problems > 0 {
        println!();
        report::print_fetch_failures(session.fetch_failures());
        report::print_missing(session.missing_dependencies());
        report::print_manifest_errors(session.manifest_errors());
        report::print_file_missing(session.missing_file_dependencies());
    }
    report::print_summary(session.working_set(), problems);

    Ok(())
}
