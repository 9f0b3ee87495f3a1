//! One-Shot Signals
//!
//! A [`Latch`] settles exactly once and can be observed by any number of
//! waiters, before or after it settles. Walks use latches for per-vertex
//! completion and for "dependencies satisfied" notifications.

use std::sync::Arc;

use tokio::sync::watch;

/// How a vertex's task finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The callback ran and returned success.
    Succeeded,
    /// The callback ran and failed or panicked.
    Failed,
    /// The callback was not run because a dependency failed.
    Skipped,
    /// The vertex was removed from the walk before its callback ran.
    Cancelled,
}

impl Outcome {
    /// True if dependents should treat this as an upstream failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Skipped)
    }
}

/// A value that is set at most once and broadcast to every waiter.
#[derive(Debug)]
pub struct Latch<T> {
    inner: Arc<watch::Sender<Option<T>>>,
}

impl<T> Clone for Latch<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Latch<T> {
    /// True if both handles refer to the same latch.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone + Send + Sync> Latch<T> {
    /// Create an unset latch.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { inner: Arc::new(tx) }
    }

    /// Create a latch that is already set.
    pub fn fired(value: T) -> Self {
        let (tx, _) = watch::channel(Some(value));
        Self { inner: Arc::new(tx) }
    }

    /// Set the latch. Returns `false` if it was already set, in which case
    /// the original value is kept.
    pub fn fire(&self, value: T) -> bool {
        self.inner.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(value);
            true
        })
    }

    /// True once the latch has been set.
    pub fn is_fired(&self) -> bool {
        self.inner.borrow().is_some()
    }

    /// The value, if set.
    pub fn peek(&self) -> Option<T> {
        self.inner.borrow().clone()
    }

    /// Wait for the latch to be set and return its value.
    pub async fn wait(&self) -> T {
        let mut rx = self.inner.subscribe();
        loop {
            let current = rx.borrow_and_update().clone();
            if let Some(value) = current {
                return value;
            }
            // The sender lives in `self`
            let _ = rx.changed().await;
        }
    }
}

impl<T: Clone + Send + Sync> Default for Latch<T> {
    fn default() -> Self {
        Self::new()
    }
}
