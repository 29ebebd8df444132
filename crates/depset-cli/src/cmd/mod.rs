//! Subcommand implementations.

pub mod inspect;
pub mod resolve;

use anyhow::{Context, Result};
use depset_core::{CancelHandle, FileUpload};
use std::path::Path;

/// Read package files from disk, named after their file name.
pub(crate) fn read_uploads(paths: &[impl AsRef<Path>]) -> Result<Vec<FileUpload>> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .with_context(|| format!("Not a file path: {}", path.display()))?;
            let bytes =
                std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(FileUpload::new(name, bytes).with_path(path.display().to_string()))
        })
        .collect()
}

/// Cancel the session on Ctrl-C.
pub(crate) fn cancel_on_interrupt(handle: CancelHandle) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling");
            handle.cancel();
        }
    });
}
