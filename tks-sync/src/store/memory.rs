//! In-memory discussion store
//!
//! Substitute [`DiscussionStore`] for tests: discussions live in a Vec,
//! create/update are observable through counters, and `fail_create_for`
//! injects a per-title failure for isolation tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{SyncError, SyncResult};
use crate::store::{DiscussionRef, DiscussionStore};

#[derive(Default)]
pub struct MemoryDiscussions {
    discussions: Mutex<Vec<DiscussionRef>>,
    next_number: AtomicUsize,
    updates: AtomicUsize,
    fail_create_for: Mutex<Option<String>>,
}

impl MemoryDiscussions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with pre-existing discussions, as if created out-of-band.
    pub fn seeded(discussions: Vec<DiscussionRef>) -> Self {
        let next_number = discussions.len();
        Self {
            discussions: Mutex::new(discussions),
            next_number: AtomicUsize::new(next_number),
            ..Self::default()
        }
    }

    /// Make `create` fail for this exact title.
    pub fn fail_create_for(&self, title: &str) {
        *self.fail_create_for.lock().unwrap() = Some(title.to_string());
    }

    pub fn discussion_count(&self) -> usize {
        self.discussions.lock().unwrap().len()
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DiscussionStore for MemoryDiscussions {
    async fn list_all(&self) -> SyncResult<Vec<DiscussionRef>> {
        Ok(self.discussions.lock().unwrap().clone())
    }

    async fn create(&self, title: &str, _body: &str) -> SyncResult<DiscussionRef> {
        if let Some(failing) = self.fail_create_for.lock().unwrap().as_deref() {
            if failing == title {
                return Err(SyncError::Discussion(format!(
                    "injected create failure for '{}'",
                    title
                )));
            }
        }

        let n = self.next_number.fetch_add(1, Ordering::SeqCst) + 1;
        let discussion = DiscussionRef {
            id: format!("D_{:04}", n),
            url: format!("https://github.com/example/help/discussions/{}", n),
        };
        self.discussions.lock().unwrap().push(discussion.clone());
        Ok(discussion)
    }

    async fn update(&self, discussion_id: &str, _body: &str) -> SyncResult<()> {
        let known = self
            .discussions
            .lock()
            .unwrap()
            .iter()
            .any(|d| d.id == discussion_id);
        if !known {
            return Err(SyncError::Discussion(format!(
                "unknown discussion {}",
                discussion_id
            )));
        }

        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
