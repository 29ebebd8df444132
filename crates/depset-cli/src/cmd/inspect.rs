//! Inspect command

use super::{cancel_on_interrupt, read_uploads};
use crate::config::Config;
use crate::ui::report;
use anyhow::{Context, Result};
use depset_core::{NavxManifestParser, Session, StaticFetcher};
use std::path::PathBuf;
use std::sync::Arc;

/// Print the manifests of `files` and what they leave unsatisfied among themselves
pub async fn inspect(config: &Config, files: &[PathBuf]) -> Result<()> {
    let uploads = read_uploads(files)?;

    let mut session = Session::new(
        Arc::new(StaticFetcher::new()),
        Arc::new(NavxManifestParser),
        config.engine.clone(),
    );
    cancel_on_interrupt(session.cancel_handle());

    session
        .add_file_dependencies(uploads)
        .await
        .context("Reading packages aborted")?;

    for file in session.working_set().files() {
        if let Some(manifest) = session.manifest(&file.name) {
            report::print_manifest(&file.name, manifest);
        }
    }

    let errors = session.manifest_errors().count();
    let missing = session.missing_file_dependencies().len();
    if errors + missing > 0 {
        println!();
        report::print_manifest_errors(session.manifest_errors());
        report::print_file_missing(session.missing_file_dependencies());
    }
    report::print_summary(session.working_set(), errors + missing);

    Ok(())
}
