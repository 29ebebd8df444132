//! depset - resolve repository dependency sets
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Command line front end over `depset-core`.
//!
//! # Configuration
//!
//! ```text
//! ./depset.toml            # project-local, checked first
//! $DEPSET_HOME/config.toml
//! ~/.depset/config.toml
//! ```

pub mod cmd;
pub mod config;
pub mod ui;

pub use depset_core::USER_AGENT;

use clap::{Parser, Subcommand};
use depset_schema::{DEFAULT_VERSION_CONSTRAINT, ReleaseChannel};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "depset")]
#[command(author, version, about = "depset - resolve repository dependency sets")]
pub struct Cli {
    /// Configuration file (defaults to depset.toml, then ~/.depset/config.toml)
    #[arg(long, global = true, env = "DEPSET_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve the transitive dependencies of one or more repositories
    Resolve {
        /// Root repositories: owner/name or a GitHub URL
        #[arg(required = true)]
        roots: Vec<String>,
        /// Version constraint applied to every root
        #[arg(long, default_value = DEFAULT_VERSION_CONSTRAINT)]
        version: String,
        /// Release channel applied to every root
        #[arg(long, default_value_t = ReleaseChannel::Release)]
        channel: ReleaseChannel,
        /// Binary packages to add alongside the repositories
        #[arg(long = "app", value_name = "FILE")]
        apps: Vec<PathBuf>,
        /// Descriptor source: "github" or a mirror directory
        #[arg(long, default_value = "github")]
        source: String,
        /// Print the resulting working set as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read binary packages and check their declared dependencies
    Inspect {
        /// Package files (.app)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}
