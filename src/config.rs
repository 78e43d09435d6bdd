//! Resolved runtime configuration for one synchronisation run.
//!
//! All values arrive here already validated and merged (static YAML plus
//! environment secrets, see [`crate::load_config`]); the pipeline itself
//! never touches the environment.

/// Source account credentials, injected from the environment.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Per-tier in-flight caps. The tiers are independent: the effective upper
/// bound during the walk is `sections * resources`, not a single pool.
#[derive(Debug, Clone)]
pub struct ConcurrencyConfig {
    /// Sections fetched concurrently within one course.
    pub sections: usize,
    /// Resources evaluated concurrently within one section.
    pub resources: usize,
    /// Download+upload transfers in flight at once.
    pub transfers: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            sections: 5,
            resources: 20,
            transfers: 3,
        }
    }
}

/// The top-level configuration consumed by [`crate::synchronise::synchronise`].
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the learning-management source.
    pub base_url: String,
    pub credentials: Credentials,
    /// Destination path under which the course/section/filename hierarchy is
    /// mirrored.
    pub sync_root: String,
    /// Access token for the storage destination.
    pub access_token: String,
    pub concurrency: ConcurrencyConfig,
    /// Per-request timeout applied to both HTTP clients.
    pub http_timeout_secs: u64,
}
