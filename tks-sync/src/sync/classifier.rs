//! Entry classification
//!
//! Decides which reconciliation path applies to one entry. The content
//! checksum is the dedup key for "is this actually new", not the local
//! pseudo id alone — a pseudo id can be stale when an earlier run created
//! the row but crashed before writing the real id back. This ordering is
//! what guarantees at-most-one discussion and at-most-one row per entry
//! across repeated runs.

use crate::entry::{EntryId, TroubleshootingEntry};
use crate::error::{SyncError, SyncResult};
use crate::store::DiscussionRef;

/// Reconciliation path for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// No row, no thread: create both.
    CreateNew,
    /// No row, but a thread created out-of-band: reuse it.
    LinkExisting(DiscussionRef),
    /// Row exists; act only if the stored checksum differs.
    UpdateIfChanged,
    /// A row with this content already exists (retry after a crash that
    /// lost the id write-back): nothing to do.
    NoOp,
}

/// Classify `entry` against the current remote state.
///
/// `checksum_exists` answers "does a row with this content checksum already
/// exist"; `discussions` is the full remote list, fetched once per run.
pub fn classify(
    entry: &TroubleshootingEntry,
    checksum_exists: bool,
    discussions: &[DiscussionRef],
) -> SyncResult<SyncAction> {
    if let EntryId::Persisted(_) = entry.frontmatter.database_id {
        return Ok(SyncAction::UpdateIfChanged);
    }

    if checksum_exists {
        return Ok(SyncAction::NoOp);
    }

    match &entry.frontmatter.github_url {
        Some(url) => match discussions.iter().find(|d| &d.url == url) {
            Some(discussion) => Ok(SyncAction::LinkExisting(discussion.clone())),
            None => Err(SyncError::UnresolvedReference { url: url.clone() }),
        },
        None => Ok(SyncAction::CreateNew),
    }
}
