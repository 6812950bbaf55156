//! Per-entry reconciliation
//!
//! Drives one entry through classify → remote stores → local write-back.
//! Every step is additive: nothing is ever deleted, and the local file is
//! rewritten at most once, to replace a pseudo id with the store-assigned
//! one. Re-running against unchanged state touches nothing.

use chrono::Utc;
use tracing::{debug, info};

use crate::content;
use crate::entry::{self, EntryId, TroubleshootingEntry};
use crate::error::SyncResult;
use crate::store::{DiscussionRef, DiscussionStore, EntryStore, NewEntryRow};
use crate::sync::classifier::{classify, SyncAction};

/// Outcome of one entry's reconciliation, for run accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// New discussion and new row created
    Created,
    /// Existing discussion linked, new row created
    Linked,
    /// Row and discussion updated with changed content
    Updated,
    /// Row exists and content matches; nothing touched
    Unchanged,
    /// Row for this content already exists under another id; nothing touched
    Skipped,
}

/// Per-entry reconciliation workflow against the two remote stores.
pub struct Orchestrator<'a> {
    entries: &'a dyn EntryStore,
    discussions: &'a dyn DiscussionStore,
    site_base_url: &'a str,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        entries: &'a dyn EntryStore,
        discussions: &'a dyn DiscussionStore,
        site_base_url: &'a str,
    ) -> Self {
        Self {
            entries,
            discussions,
            site_base_url,
        }
    }

    /// Reconcile one entry end to end.
    ///
    /// `remote` is the full discussion list, fetched once per run by the
    /// batch runner and shared across entries.
    pub async fn reconcile(
        &self,
        entry: &TroubleshootingEntry,
        remote: &[DiscussionRef],
    ) -> SyncResult<SyncOutcome> {
        let checksum = content::checksum(&entry.content)?;
        let checksum_exists = self.entries.find_by_checksum(&checksum).await?.is_some();

        let action = classify(entry, checksum_exists, remote)?;
        debug!(file = %entry.file_path.display(), action = ?action, "Classified entry");

        match action {
            SyncAction::CreateNew => {
                let body = self.discussion_body(entry);
                let discussion = self
                    .discussions
                    .create(&entry.frontmatter.title, &body)
                    .await?;
                self.persist_new(entry, &checksum, &discussion).await?;
                Ok(SyncOutcome::Created)
            }
            SyncAction::LinkExisting(discussion) => {
                self.persist_new(entry, &checksum, &discussion).await?;
                Ok(SyncOutcome::Linked)
            }
            SyncAction::UpdateIfChanged => self.update_if_changed(entry, &checksum).await,
            SyncAction::NoOp => {
                debug!(
                    file = %entry.file_path.display(),
                    "Row already exists for this content; nothing to do"
                );
                Ok(SyncOutcome::Skipped)
            }
        }
    }

    /// Insert the database row for a newly synced entry and write the
    /// assigned id back into the local file.
    async fn persist_new(
        &self,
        entry: &TroubleshootingEntry,
        checksum: &str,
        discussion: &DiscussionRef,
    ) -> SyncResult<()> {
        let row = NewEntryRow {
            title: entry.frontmatter.title.clone(),
            api: entry.frontmatter.api.clone(),
            keywords: entry.frontmatter.keywords.clone(),
            topics: entry.frontmatter.topics.clone(),
            errors: entry.frontmatter.errors.clone(),
            checksum: checksum.to_string(),
            github_id: discussion.id.clone(),
            github_url: discussion.url.clone(),
            date_created: entry
                .frontmatter
                .date_created
                .clone()
                .unwrap_or_else(|| Utc::now().to_rfc3339()),
        };

        let guid = self.entries.insert(&row).await?;
        entry::write_back_id(&entry.file_path, &guid)?;

        info!(
            file = %entry.file_path.display(),
            id = %guid,
            discussion = %discussion.url,
            "Entry synced"
        );

        Ok(())
    }

    /// Compare the stored checksum with the fresh one and push the change
    /// to both stores if they differ.
    async fn update_if_changed(
        &self,
        entry: &TroubleshootingEntry,
        checksum: &str,
    ) -> SyncResult<SyncOutcome> {
        let id = match &entry.frontmatter.database_id {
            EntryId::Persisted(id) => id,
            // classify() only routes persisted ids here
            EntryId::Pending(_) => return Ok(SyncOutcome::Unchanged),
        };

        let row = self.entries.find_by_id(id).await?;
        if row.checksum == checksum {
            debug!(file = %entry.file_path.display(), "Content unchanged");
            return Ok(SyncOutcome::Unchanged);
        }

        self.entries.update_checksum(id, checksum).await?;

        if let Some(discussion_id) = &row.github_id {
            self.discussions
                .update(discussion_id, &self.discussion_body(entry))
                .await?;
        }

        info!(file = %entry.file_path.display(), id = %id, "Entry content updated");

        Ok(SyncOutcome::Updated)
    }

    /// Forum copy of the article: body plus canonical-source attribution.
    fn discussion_body(&self, entry: &TroubleshootingEntry) -> String {
        format!(
            "{}\n\n---\n*This discussion mirrors [{}]({}/{}). The article is the canonical, maintained version.*\n",
            entry.content.trim_end(),
            entry.frontmatter.title,
            self.site_base_url.trim_end_matches('/'),
            entry.slug(),
        )
    }
}
