//! Remote store client seams
//!
//! The reconciliation core only ever talks to these traits. Production
//! clients (sqlx over the entry database, GitHub GraphQL over the discussion
//! forum) and the in-memory test double all implement them; clients are
//! constructed once at startup and shared immutably across concurrent
//! reconciliations.

pub mod database;
pub mod github;
pub mod memory;

use async_trait::async_trait;

use crate::error::SyncResult;

/// One forum thread mirroring one entry. Remote-owned identity; the sync
/// only ever reads and creates these, never rewrites them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscussionRef {
    pub id: String,
    pub url: String,
}

/// One row of the entry database.
#[derive(Debug, Clone)]
pub struct EntryRow {
    pub guid: String,
    pub title: String,
    pub api: Option<String>,
    pub keywords: Vec<String>,
    pub topics: Vec<String>,
    pub errors: Vec<String>,
    pub checksum: String,
    pub github_id: Option<String>,
    pub github_url: Option<String>,
    pub date_created: String,
    pub date_updated: String,
}

/// Fields for a row that does not exist yet. The store assigns the guid and
/// the update timestamp.
#[derive(Debug, Clone)]
pub struct NewEntryRow {
    pub title: String,
    pub api: Option<String>,
    pub keywords: Vec<String>,
    pub topics: Vec<String>,
    pub errors: Vec<String>,
    pub checksum: String,
    pub github_id: String,
    pub github_url: String,
    pub date_created: String,
}

/// Relational store holding one row per synced entry.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Look up a row by content checksum (the dedup key).
    async fn find_by_checksum(&self, checksum: &str) -> SyncResult<Option<EntryRow>>;

    /// Look up a row by store-assigned id.
    async fn find_by_id(&self, id: &str) -> SyncResult<EntryRow>;

    /// Insert a new row, returning the store-assigned id.
    async fn insert(&self, row: &NewEntryRow) -> SyncResult<String>;

    /// Record a new content checksum for an existing row, touching its
    /// update timestamp.
    async fn update_checksum(&self, id: &str, checksum: &str) -> SyncResult<()>;
}

/// Forum client for the discussion mirror.
#[async_trait]
pub trait DiscussionStore: Send + Sync {
    /// Full discussion list for the configured category, following
    /// pagination cursors until exhausted.
    async fn list_all(&self) -> SyncResult<Vec<DiscussionRef>>;

    /// Create a new discussion, returning its remote identity.
    async fn create(&self, title: &str, body: &str) -> SyncResult<DiscussionRef>;

    /// Replace the body of an existing discussion.
    async fn update(&self, discussion_id: &str, body: &str) -> SyncResult<()>;
}
