//! Destination-side collaborator: the cloud file-storage the course tree is
//! mirrored into.
//!
//! The pipeline depends on the [`Storage`] trait only. Metadata lookups
//! return an explicit [`MetadataLookup`] so "file absent" is a value, not an
//! error swallowed somewhere below; transport errors stay in the `Err`
//! channel and the caller decides what they mean.

use std::time::Duration;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde::Deserialize;
use tracing::debug;

/// Error type for storage calls (simple boxed error for now).
pub type StorageError = Box<dyn std::error::Error + Send + Sync>;

/// Metadata for a file that exists at the destination. Queried per run, never
/// cached.
#[derive(Debug, Clone)]
pub struct RemoteMetadata {
    pub size: u64,
}

/// Result of a destination metadata probe.
#[derive(Debug, Clone)]
pub enum MetadataLookup {
    Found(RemoteMetadata),
    Absent,
}

/// Trait for the storage destination.
///
/// `get_metadata` is a read-only probe and must not mutate remote state.
/// `upload` replaces any existing file at the path; auto-rename on conflict
/// is disabled, so duplicate paths collide rather than fork.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Storage: Send + Sync {
    /// Probe the destination for a file at `path`.
    async fn get_metadata(&self, path: &str) -> Result<MetadataLookup, StorageError>;

    /// Upload `bytes` to `path` with overwrite semantics.
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<(), StorageError>;
}

const API_BASE: &str = "https://api.dropboxapi.com/2";
const CONTENT_BASE: &str = "https://content.dropboxapi.com/2";

#[derive(Debug, Deserialize)]
struct MetadataResponse {
    #[serde(default)]
    size: u64,
}

/// Dropbox implementation of [`Storage`].
///
/// Uses the v2 RPC endpoint for metadata and the content endpoint for
/// uploads. A `409 Conflict` from `files/get_metadata` is the API's
/// path-not-found answer and maps to [`MetadataLookup::Absent`]; every other
/// failure is a transport error.
pub struct DropboxStorage {
    client: reqwest::Client,
    access_token: String,
}

impl DropboxStorage {
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            access_token: access_token.into(),
        })
    }
}

#[async_trait]
impl Storage for DropboxStorage {
    async fn get_metadata(&self, path: &str) -> Result<MetadataLookup, StorageError> {
        let response = self
            .client
            .post(format!("{API_BASE}/files/get_metadata"))
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({ "path": path }))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::CONFLICT {
            debug!(path, "No file at destination path");
            return Ok(MetadataLookup::Absent);
        }

        let meta: MetadataResponse = response.error_for_status()?.json().await?;
        debug!(path, size = meta.size, "Destination file found");
        Ok(MetadataLookup::Found(RemoteMetadata { size: meta.size }))
    }

    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        let args = serde_json::json!({
            "path": path,
            "mode": "overwrite",
            "autorename": false,
            "mute": true,
        });

        self.client
            .post(format!("{CONTENT_BASE}/files/upload"))
            .bearer_auth(&self.access_token)
            .header("Dropbox-API-Arg", args.to_string())
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await?
            .error_for_status()?;

        debug!(path, "Upload accepted");
        Ok(())
    }
}
