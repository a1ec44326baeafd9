//! Change notification for netcrowd
//!
//! Observers register a callback and get a [`Subscription`] guard back.
//! Dropping the guard unregisters the callback. Notifications are delivered
//! synchronously, in registration order, after the change is persisted.

use serde::Serialize;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// What happened to the report collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    Created { id: String },
    Updated { id: String },
    Deleted { id: String },
    Reset,
    Cleared,
    Imported { count: usize },
    /// Snapshot replaced by a write from another process
    Synced,
}

impl Change {
    pub fn kind(&self) -> &'static str {
        match self {
            Change::Created { .. } => "created",
            Change::Updated { .. } => "updated",
            Change::Deleted { .. } => "deleted",
            Change::Reset => "reset",
            Change::Cleared => "cleared",
            Change::Imported { .. } => "imported",
            Change::Synced => "synced",
        }
    }
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Change::Created { id } | Change::Updated { id } | Change::Deleted { id } => {
                write!(f, "{} {}", self.kind(), id)
            }
            Change::Imported { count } => write!(f, "imported {} reports", count),
            _ => write!(f, "{}", self.kind()),
        }
    }
}

type Listener = Arc<dyn Fn(&Change) -> anyhow::Result<()> + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Publish/subscribe hub for store changes
///
/// Cloning yields another handle to the same set of observers.
#[derive(Clone, Default)]
pub struct ChangeBus {
    registry: Arc<Mutex<Registry>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer
    ///
    /// The callback runs while the store is being mutated and must not call
    /// back into the store.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Change) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        registry.listeners.push((id, Arc::new(callback)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
            armed: true,
        }
    }

    /// Notify every registered observer
    ///
    /// Returns how many observers handled the change without error. A
    /// failing or panicking observer is logged and skipped.
    pub fn publish(&self, change: &Change) -> usize {
        let listeners: Vec<(u64, Listener)> = lock(&self.registry).listeners.clone();
        let mut delivered = 0;

        for (id, listener) in listeners {
            match catch_unwind(AssertUnwindSafe(|| listener(change))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    tracing::warn!(subscription = id, change = %change, error = %e, "Observer failed");
                }
                Err(_) => {
                    tracing::error!(subscription = id, change = %change, "Observer panicked");
                }
            }
        }

        delivered
    }

    /// Number of registered observers
    pub fn len(&self) -> usize {
        lock(&self.registry).listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeBus")
            .field("observers", &self.len())
            .finish()
    }
}

/// Registration guard; the observer stays registered while this lives
#[must_use = "dropping a Subscription unregisters the observer immediately"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
    armed: bool,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Unregister now
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Keep the observer registered for as long as the bus lives
    pub fn detach(mut self) {
        self.armed = false;
    }

    fn remove(&self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.armed {
            self.remove();
        }
    }
}
