//! # course-sync: mirror course resources into cloud storage
//!
//! Library entrypoint shared by the binary and the integration tests.
//!
//! ## Pipeline
//! - [`walker`] drives [`evaluate`] over the course → section → resource
//!   tree, each tier under its own concurrency cap, producing the worklist
//! - [`transfer`] drains the worklist and isolates per-item failures
//! - [`synchronise`] orchestrates a run end to end and returns a
//!   [`synchronise::SyncReport`]
//!
//! ## Collaborators
//! The pipeline only sees the [`source::CourseSource`] and
//! [`storage::Storage`] traits; concrete reqwest-backed clients live next to
//! the traits and are constructed in [`run`]. Both traits are annotated for
//! `mockall`, so tests script them deterministically.
//!
//! ## How To Use
//! `main()` parses [`Cli`] and calls [`run`]; integration tests call [`run`]
//! (or [`synchronise::synchronise`] directly) so exit-code policy stays in
//! the binary alone.

pub mod config;
pub mod evaluate;
pub mod load_config;
pub mod runner;
pub mod source;
pub mod storage;
pub mod synchronise;
pub mod transfer;
pub mod walker;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use load_config::load_config;
use source::HttpCourseSource;
use storage::DropboxStorage;
use synchronise::{synchronise, SyncReport};

/// CLI for course-sync: mirror course resources into cloud storage.
#[derive(Parser)]
#[clap(
    name = "course-sync",
    version,
    about = "Synchronise course resources from a learning-management source into cloud storage"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Synchronise all courses to the storage destination using the given config file
    Sync {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main().
///
/// Per-item transfer failures do not produce an `Err` here; they are surfaced
/// through `SyncReport::failed` and main() maps them to the exit code.
pub async fn run(cli: Cli) -> Result<SyncReport> {
    match cli.command {
        Commands::Sync { config } => {
            let config = load_config(config)?;
            let timeout = Duration::from_secs(config.http_timeout_secs);

            let source = HttpCourseSource::new(&config.base_url, timeout)
                .map_err(|e| anyhow::anyhow!("Failed to construct source client: {e}"))?;
            let storage = DropboxStorage::new(&config.access_token, timeout)
                .map_err(|e| anyhow::anyhow!("Failed to construct storage client: {e}"))?;

            println!("Synchronise starting...");
            match synchronise(&config, &source, &storage).await {
                Ok(report) => {
                    println!("Synchronise complete.\nReport:");
                    println!("{:#?}", report);
                    Ok(report)
                }
                Err(e) => {
                    eprintln!("[ERROR] Synchronisation failed: {}", e);
                    Err(anyhow::anyhow!(e))
                }
            }
        }
    }
}
