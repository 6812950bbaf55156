//! Batch reconciliation
//!
//! Fans the orchestrator out across the whole corpus concurrently. The
//! remote discussion list is fetched exactly once per run and shared; a
//! failure in one entry never blocks or cancels another, and every entry
//! runs to completion before the run concludes.

use futures::future::join_all;
use tracing::{error, info};

use crate::entry::TroubleshootingEntry;
use crate::error::SyncResult;
use crate::store::{DiscussionStore, EntryStore};
use crate::sync::orchestrator::{Orchestrator, SyncOutcome};

/// Aggregated outcome of one batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub created: usize,
    pub linked: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunReport {
    /// True if any entry failed; drives the process exit status.
    pub fn has_errors(&self) -> bool {
        self.failed > 0
    }

    fn record(&mut self, outcome: SyncOutcome) {
        match outcome {
            SyncOutcome::Created => self.created += 1,
            SyncOutcome::Linked => self.linked += 1,
            SyncOutcome::Updated => self.updated += 1,
            SyncOutcome::Unchanged => self.unchanged += 1,
            SyncOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// Reconcile every entry against the remote stores.
pub async fn run_all(
    entries: &[TroubleshootingEntry],
    entry_store: &dyn EntryStore,
    discussion_store: &dyn DiscussionStore,
    site_base_url: &str,
) -> SyncResult<RunReport> {
    let remote = discussion_store.list_all().await?;
    info!(
        entries = entries.len(),
        discussions = remote.len(),
        "Starting reconciliation run"
    );

    let orchestrator = Orchestrator::new(entry_store, discussion_store, site_base_url);

    let results = join_all(entries.iter().map(|entry| {
        let orchestrator = &orchestrator;
        let remote = remote.as_slice();
        async move { (entry, orchestrator.reconcile(entry, remote).await) }
    }))
    .await;

    let mut report = RunReport::default();
    for (entry, result) in results {
        match result {
            Ok(outcome) => report.record(outcome),
            Err(e) => {
                report.failed += 1;
                error!(
                    file = %entry.file_path.display(),
                    error = %e,
                    "Entry reconciliation failed"
                );
            }
        }
    }

    info!(
        created = report.created,
        linked = report.linked,
        updated = report.updated,
        unchanged = report.unchanged,
        skipped = report.skipped,
        failed = report.failed,
        "Reconciliation run complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_tracks_outcomes_and_errors() {
        let mut report = RunReport::default();
        report.record(SyncOutcome::Created);
        report.record(SyncOutcome::Unchanged);
        assert_eq!(report.created, 1);
        assert_eq!(report.unchanged, 1);
        assert!(!report.has_errors());

        report.failed += 1;
        assert!(report.has_errors());
    }
}
