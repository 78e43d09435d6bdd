//! Top-level pipeline: login, walk the course tree, transfer what is stale.
//!
//! Orchestrates the three phases against the two collaborator traits:
//!   - login (failure is fatal, nothing is processed)
//!   - walk + evaluate, producing the in-memory worklist
//!   - transfer, draining the worklist under its own cap
//!
//! Returns a [`SyncReport`] for the caller to surface; per-item transfer
//! failures are already logged and only show up in the report counts.

use std::time::Instant;

use tracing::{error, info, warn};

use crate::config::SyncConfig;
use crate::source::{CourseSource, SourceError};
use crate::storage::Storage;
use crate::transfer::transfer_all;
use crate::walker::collect_worklist;

/// Outcome of one synchronisation run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Files downloaded and uploaded successfully.
    pub synced: u64,
    /// Files that needed sync but failed to transfer.
    pub failed: u64,
    /// Worklist size after the walk (synced + failed).
    pub queued: usize,
    pub elapsed_secs: u64,
}

pub async fn synchronise<S, D>(
    config: &SyncConfig,
    source: &S,
    storage: &D,
) -> Result<SyncReport, SourceError>
where
    S: CourseSource,
    D: Storage,
{
    if let Err(e) = source.login(&config.credentials).await {
        error!(username = %config.credentials.username, error = ?e, "Login failed");
        return Err(format!("login failed: {e}").into());
    }
    info!(username = %config.credentials.username, "Successfully logged in");

    let started = Instant::now();

    let courses = source.list_courses().await?;
    info!(
        courses = courses.len(),
        base_url = %config.base_url,
        "Courses fetched"
    );

    let worklist = collect_worklist(
        source,
        storage,
        &courses,
        &config.sync_root,
        &config.concurrency,
    )
    .await?;
    let queued = worklist.len();

    let report = transfer_all(source, storage, worklist, config.concurrency.transfers).await;

    let elapsed_secs = started.elapsed().as_secs();
    if report.synced > 0 {
        info!(
            files = report.synced,
            seconds = elapsed_secs,
            "{} files downloaded in {} seconds",
            report.synced,
            elapsed_secs
        );
    } else {
        info!("Nothing to download. All files are up to date.");
    }
    if report.failed > 0 {
        warn!(failed = report.failed, "Run completed with failed transfers");
    }

    Ok(SyncReport {
        synced: report.synced,
        failed: report.failed,
        queued,
        elapsed_secs,
    })
}
