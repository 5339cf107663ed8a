//! History binding: navigation entry points and the sole writer of
//! browser-history state.

use std::sync::Arc;

use async_trait::async_trait;
use shared::domain::SectionId;
use tokio::sync::Mutex;
use tracing::debug;

use crate::ShellController;

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Push a new entry whose visible state is `#<section>`.
    async fn push_fragment(&self, section: &SectionId);
    /// Fragment component of the current entry, if any.
    async fn current_fragment(&self) -> Option<SectionId>;
}

/// In-process history with a cursor, enough to emulate browser traversal
/// from tests and headless drivers.
pub struct MemoryHistory {
    inner: Mutex<MemoryHistoryState>,
}

struct MemoryHistoryState {
    entries: Vec<Option<SectionId>>,
    cursor: usize,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::with_initial_fragment(None)
    }

    /// Start from a page URL that already carries a fragment.
    pub fn with_initial_fragment(fragment: Option<SectionId>) -> Self {
        Self {
            inner: Mutex::new(MemoryHistoryState {
                entries: vec![fragment],
                cursor: 0,
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.entries.is_empty()
    }

    /// Move one entry back, as the browser's back button would. Returns
    /// false when already at the oldest entry.
    pub async fn back(&self) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.cursor == 0 {
            return false;
        }
        inner.cursor -= 1;
        true
    }

    pub async fn forward(&self) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.cursor + 1 >= inner.entries.len() {
            return false;
        }
        inner.cursor += 1;
        true
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn push_fragment(&self, section: &SectionId) {
        let mut inner = self.inner.lock().await;
        let cursor = inner.cursor;
        inner.entries.truncate(cursor + 1);
        inner.entries.push(Some(section.clone()));
        inner.cursor = inner.entries.len() - 1;
    }

    async fn current_fragment(&self) -> Option<SectionId> {
        let inner = self.inner.lock().await;
        inner.entries.get(inner.cursor).cloned().flatten()
    }
}

impl ShellController {
    /// Activation of a declared navigation target: push exactly one history
    /// entry for its bound section, then load it.
    pub async fn activate_nav_target(self: &Arc<Self>, index: usize) {
        let Some(target) = self.config.nav_targets.get(index) else {
            debug!(index, "activation of undeclared nav target ignored");
            return;
        };
        let section = target.section.clone();
        self.history.push_fragment(&section).await;
        self.load(section).await;
    }

    /// Browser back/forward: the entry already exists, so read the current
    /// fragment (default when absent) and load it without pushing.
    pub async fn handle_history_traversal(self: &Arc<Self>) {
        let section = self
            .history
            .current_fragment()
            .await
            .unwrap_or_else(|| self.config.default_section.clone());
        self.load(section).await;
    }

    /// Initial page entry: play the intro once, then load whatever the URL
    /// fragment names, or the default section. Pushes nothing.
    pub async fn start(self: &Arc<Self>) {
        self.run_intro().await;
        let section = self
            .history
            .current_fragment()
            .await
            .unwrap_or_else(|| self.config.default_section.clone());
        self.load(section).await;
    }
}
