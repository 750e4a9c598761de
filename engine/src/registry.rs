//! Registry of background continuations.
//!
//! Work that must outlive the call that started it (such as applying the mode
//! change after a share is accepted) is spawned here. Each entry stays
//! registered until its task has run to completion, then removes itself.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use tokio::sync::Notify;
use uuid::Uuid;

/// Identifier of a registered subscription.
pub type SubscriptionId = Uuid;

/// A live background continuation.
#[derive(Debug)]
pub struct Subscription {
    /// What the continuation is waiting on
    pub label: &'static str,
    /// When it was registered
    pub started_at: Instant,
}

/// Tracks background continuations until they have fired.
///
/// Thread-safe and can be shared between services via `Arc`.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    entries: Arc<DashMap<SubscriptionId, Subscription>>,
    idle: Arc<Notify>,
}

/// Removes a subscription's entry when its task ends, however it ends.
struct EntryGuard {
    id: SubscriptionId,
    entries: Arc<DashMap<SubscriptionId, Subscription>>,
    idle: Arc<Notify>,
}

impl Drop for EntryGuard {
    fn drop(&mut self) {
        if let Some((_, subscription)) = self.entries.remove(&self.id) {
            tracing::debug!(
                subscription = %self.id,
                label = subscription.label,
                elapsed_ms = subscription.started_at.elapsed().as_millis() as u64,
                "Subscription fired"
            );
        }
        if self.entries.is_empty() {
            self.idle.notify_waiters();
        }
    }
}

impl SubscriptionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry wrapped in Arc for sharing.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Spawn a continuation and keep it registered until it completes.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F>(&self, label: &'static str, task: F) -> SubscriptionId
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = Uuid::new_v4();

        // Register before spawning so a task that finishes immediately
        // still finds its own entry to remove.
        self.entries.insert(
            id,
            Subscription {
                label,
                started_at: Instant::now(),
            },
        );

        let guard = EntryGuard {
            id,
            entries: Arc::clone(&self.entries),
            idle: Arc::clone(&self.idle),
        };
        tokio::spawn(async move {
            // Dropped on completion and on unwind alike.
            let _guard = guard;
            task.await;
        });

        tracing::debug!(subscription = %id, label, "Subscription registered");

        id
    }

    /// Whether a subscription is still waiting to fire.
    pub fn contains(&self, id: &SubscriptionId) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels of live subscriptions.
    pub fn labels(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.label).collect()
    }

    /// Wait until every registered subscription has fired.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.entries.is_empty() {
                return;
            }
            notified.await;
        }
    }
}
