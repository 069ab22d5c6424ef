//! Observer registry for store changes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Callback<S> = Arc<dyn Fn(&S) + Send + Sync>;

/// Registered change callbacks, in registration order.
pub(crate) struct Registry<S> {
    next_id: AtomicU64,
    callbacks: Mutex<Vec<(u64, Callback<S>)>>,
}

impl<S> Default for Registry<S> {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            callbacks: Mutex::new(Vec::new()),
        }
    }
}

impl<S> Registry<S> {
    pub(crate) fn insert(&self, callback: Callback<S>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().push((id, callback));
        id
    }

    pub(crate) fn remove(&self, id: u64) {
        self.lock().retain(|(existing, _)| *existing != id);
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Invoke every callback with `state`.
    ///
    /// The list is copied first, so callbacks may subscribe or unsubscribe.
    pub(crate) fn notify(&self, state: &S) {
        let callbacks: Vec<Callback<S>> = self.lock().iter().map(|(_, cb)| Arc::clone(cb)).collect();
        for callback in callbacks {
            callback(state);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(u64, Callback<S>)>> {
        self.callbacks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to a store subscription.
///
/// The callback stays registered until the handle is dropped or
/// [`unsubscribe`](Subscription::unsubscribe) is called.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription<S> {
    id: u64,
    registry: Weak<Registry<S>>,
}

impl<S> Subscription<S> {
    pub(crate) fn new(id: u64, registry: &Arc<Registry<S>>) -> Self {
        Self {
            id,
            registry: Arc::downgrade(registry),
        }
    }

    /// Stop receiving change notifications.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl<S> Drop for Subscription<S> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl<S> std::fmt::Debug for Subscription<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
