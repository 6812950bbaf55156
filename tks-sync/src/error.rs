//! Error types for tks-sync
//!
//! Per-entry failures (malformed content, store errors, unresolved forum
//! references) are isolated at the batch boundary and never abort the run;
//! configuration errors from `tks_common` are fatal before any entry is
//! processed.

use thiserror::Error;

/// Result type for sync operations
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Sync error type
#[derive(Debug, Error)]
pub enum SyncError {
    /// Document body failed markdown/component validation
    #[error("Malformed content: {0}")]
    Malformed(String),

    /// Discussion API call failed or returned an error payload
    #[error("Discussion store error: {0}")]
    Discussion(String),

    /// Frontmatter declares a discussion that is not in the live list
    #[error("Unresolved discussion reference: {url}")]
    UnresolvedReference { url: String },

    /// Frontmatter block missing or unparseable
    #[error("Frontmatter error: {0}")]
    Frontmatter(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// tks-common error
    #[error("Common error: {0}")]
    Common(#[from] tks_common::Error),
}

impl From<sqlx::Error> for SyncError {
    fn from(e: sqlx::Error) -> Self {
        SyncError::Common(tks_common::Error::Database(e))
    }
}
