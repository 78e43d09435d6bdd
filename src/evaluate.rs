//! Decides, per resource, whether a transfer is required.
//!
//! A purely read-only probe: header metadata from the source, a metadata
//! lookup at the destination, and a size comparison. Produces a [`SyncTask`]
//! or nothing; downloads and uploads happen later in
//! [`crate::transfer`].

use tracing::{debug, warn};

use crate::source::{CourseSource, Resource, SourceError};
use crate::storage::{MetadataLookup, Storage};

/// A resource paired with its computed destination path. Created here,
/// consumed exactly once by the transfer executor; lives only for one run.
#[derive(Debug, Clone)]
pub struct SyncTask {
    pub resource: Resource,
    pub dest_path: String,
}

/// Probe the destination for `dest_path` and decide whether `resource` needs
/// transferring.
///
/// A transfer is needed when the destination has no file at the path or its
/// size differs from the source's declared content length. A failed probe is
/// treated as "absent" so a flaky destination re-syncs rather than silently
/// skips; the failure is still logged because it can also mask an outage.
///
/// Header-metadata failures propagate: without a declared length no skip
/// decision is possible.
pub async fn evaluate<S, D>(
    source: &S,
    storage: &D,
    resource: Resource,
    dest_path: String,
) -> Result<Option<SyncTask>, SourceError>
where
    S: CourseSource + ?Sized,
    D: Storage + ?Sized,
{
    let header = source.resource_header(&resource).await?;

    match storage.get_metadata(&dest_path).await {
        Ok(MetadataLookup::Found(meta)) if meta.size == header.content_length => {
            debug!(
                file = %resource.filename,
                path = %dest_path,
                size = meta.size,
                "Destination up to date, skipping"
            );
            Ok(None)
        }
        Ok(MetadataLookup::Found(meta)) => {
            debug!(
                file = %resource.filename,
                path = %dest_path,
                remote_size = meta.size,
                declared_size = header.content_length,
                "Size mismatch, queueing for sync"
            );
            Ok(Some(SyncTask {
                resource,
                dest_path,
            }))
        }
        Ok(MetadataLookup::Absent) => {
            debug!(file = %resource.filename, path = %dest_path, "Absent at destination, queueing for sync");
            Ok(Some(SyncTask {
                resource,
                dest_path,
            }))
        }
        Err(e) => {
            warn!(
                file = %resource.filename,
                path = %dest_path,
                error = ?e,
                "Destination metadata probe failed, treating as absent"
            );
            Ok(Some(SyncTask {
                resource,
                dest_path,
            }))
        }
    }
}
