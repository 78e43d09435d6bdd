//! Drains the worklist: download from the source, upload to the destination.
//!
//! Runs under its own bounded runner, independent of the tree shape that
//! produced the worklist. Failures are isolated per item: a failed download
//! or upload is logged and counted, and the remaining queue keeps going. No
//! retry; failed is terminal for the run.

use tracing::{error, info};

use crate::evaluate::SyncTask;
use crate::runner::run_bounded;
use crate::source::CourseSource;
use crate::storage::Storage;

/// Outcome of the transfer phase, reduced from per-item results rather than
/// accumulated in shared counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransferReport {
    pub synced: u64,
    pub failed: u64,
}

enum Outcome {
    Synced,
    Failed,
}

/// Transfers every task in the worklist with at most `limit` in flight.
pub async fn transfer_all<S, D>(
    source: &S,
    storage: &D,
    worklist: Vec<SyncTask>,
    limit: usize,
) -> TransferReport
where
    S: CourseSource,
    D: Storage,
{
    let outcomes = run_bounded(worklist, limit, |task| async move {
        info!(file = %task.resource.filename, "Downloading");
        let bytes = match source.download(&task.resource).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(
                    file = %task.resource.filename,
                    error = ?e,
                    "Download failed, skipping item"
                );
                return Outcome::Failed;
            }
        };

        info!(file = %task.resource.filename, path = %task.dest_path, "Uploading");
        match storage.upload(&task.dest_path, bytes).await {
            Ok(()) => Outcome::Synced,
            Err(e) => {
                error!(
                    file = %task.resource.filename,
                    path = %task.dest_path,
                    error = ?e,
                    "Upload failed, skipping item"
                );
                Outcome::Failed
            }
        }
    })
    .await;

    let mut report = TransferReport::default();
    for outcome in outcomes {
        match outcome {
            Outcome::Synced => report.synced += 1,
            Outcome::Failed => report.failed += 1,
        }
    }
    report
}
