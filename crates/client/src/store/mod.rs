//! Reactive store engine with persisted state.
//!
//! A [`Store`] owns one value of a [`StoreState`] type. State only changes
//! through commands; each command runs to completion on the calling thread,
//! swaps in the new state, notifies subscribers with the new snapshot, and
//! schedules a background write of the state's persisted projection. A
//! command that changes nothing still notifies but writes nothing.
//!
//! Commands are expected to be issued from one logical thread of control
//! (a UI event loop, a CLI invocation). The store is `Send + Sync` so that it
//! can be shared with the persistence task, but concurrent commands from
//! several threads may deliver notifications out of order.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use emporium_client::{CartState, Store};
//!
//! let cart: Arc<Store<CartState>> = Arc::new(Store::in_memory());
//! let _subscription = cart.subscribe(|state: &CartState| {
//!     let _ = state.total_items();
//! });
//! cart.open_cart();
//! assert!(cart.is_open());
//! ```

mod persist;
mod subscription;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::Result;
use crate::storage::Storage;
use persist::{Pending, Persistence, Sink};

pub use persist::FORMAT_VERSION;
pub use subscription::Subscription;

/// State that can live in a [`Store`].
pub trait StoreState: Clone + Default + Send + Sync + 'static {
    /// Name of the durable blob holding this state.
    const STORAGE_KEY: &'static str;

    /// The part of the state that is persisted.
    type Persisted: Serialize + DeserializeOwned;

    /// Extract the persisted projection.
    fn project(&self) -> Self::Persisted;

    /// Rebuild state from a persisted projection. Transient fields take
    /// their default values.
    fn restore(persisted: Self::Persisted) -> Self;
}

/// What a command did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The state changed: notify subscribers and persist.
    Changed,
    /// Nothing changed: notify subscribers with the current state, skip the write.
    Unchanged,
    /// Nothing changed and subscribers are not told.
    Silent,
}

impl From<bool> for Outcome {
    fn from(changed: bool) -> Self {
        if changed { Self::Changed } else { Self::Unchanged }
    }
}

/// Options for a persisted store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Quiet period after a change before it is written.
    pub debounce: Duration,
}

impl StoreOptions {
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            debounce: Self::DEFAULT_DEBOUNCE,
        }
    }
}

struct Current<S> {
    revision: u64,
    state: Arc<S>,
}

/// A reactive container for one [`StoreState`] value.
pub struct Store<S: StoreState> {
    current: Mutex<Current<S>>,
    subscribers: Arc<subscription::Registry<S>>,
    persistence: Option<Persistence<S>>,
}

impl<S: StoreState> Default for Store<S> {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<S: StoreState> Store<S> {
    /// Create a store that is never persisted.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_state(S::default(), None)
    }

    /// Create a store rehydrated from `storage` that persists its changes back.
    ///
    /// A missing or corrupt blob yields the default state. Inside a tokio
    /// runtime changes are written by a debounced background task; otherwise
    /// every change is written synchronously.
    #[must_use]
    pub fn open(storage: Arc<dyn Storage>, options: StoreOptions) -> Self {
        let state = Arc::new(persist::rehydrate::<S>(storage.as_ref()));
        let sink = Arc::new(Sink::new(storage));
        let persistence = Persistence::start(
            sink,
            Pending {
                revision: 0,
                state: Arc::clone(&state),
            },
            options.debounce,
        );
        debug!(key = S::STORAGE_KEY, "store opened");
        Self {
            current: Mutex::new(Current { revision: 0, state }),
            subscribers: Arc::default(),
            persistence: Some(persistence),
        }
    }

    fn with_state(state: S, persistence: Option<Persistence<S>>) -> Self {
        Self {
            current: Mutex::new(Current {
                revision: 0,
                state: Arc::new(state),
            }),
            subscribers: Arc::default(),
            persistence,
        }
    }

    /// The current state.
    #[must_use]
    pub fn snapshot(&self) -> Arc<S> {
        Arc::clone(&self.lock().state)
    }

    /// Number of state changes since the store was created.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    /// Whether the store writes to durable storage.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.persistence.is_some()
    }

    /// Register `callback` to run with the new state after every command.
    ///
    /// Commands that leave the state as it was still notify, with the
    /// current snapshot. The one exception is saving a product that is
    /// already in the wishlist. Callbacks run in registration order on the
    /// thread that issued the command, after the store has released its lock.
    pub fn subscribe<F>(&self, callback: F) -> Subscription<S>
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        let id = self.subscribers.insert(Arc::new(callback));
        Subscription::new(id, &self.subscribers)
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Apply a command to the state.
    ///
    /// `command` edits a copy of the state and reports what it did. Only a
    /// [`Outcome::Changed`] command bumps the revision and schedules a write.
    /// Returns whether the state changed.
    pub(crate) fn apply<F, O>(&self, name: &'static str, command: F) -> bool
    where
        F: FnOnce(&mut S) -> O,
        O: Into<Outcome>,
    {
        let (outcome, pending) = {
            let mut current = self.lock();
            let mut next = S::clone(&current.state);
            let outcome = command(&mut next).into();
            if outcome == Outcome::Changed {
                current.revision += 1;
                current.state = Arc::new(next);
            }
            let pending = Pending {
                revision: current.revision,
                state: Arc::clone(&current.state),
            };
            (outcome, pending)
        };

        match outcome {
            Outcome::Silent => false,
            Outcome::Unchanged => {
                debug!(key = S::STORAGE_KEY, command = name, "state unchanged");
                self.subscribers.notify(&pending.state);
                false
            }
            Outcome::Changed => {
                debug!(
                    key = S::STORAGE_KEY,
                    command = name,
                    revision = pending.revision,
                    "state changed"
                );
                self.subscribers.notify(&pending.state);
                if let Some(persistence) = &self.persistence {
                    persistence.schedule(pending);
                }
                true
            }
        }
    }

    /// Write the current state now, bypassing the debounce.
    ///
    /// Does nothing for an in-memory store or when the current state is
    /// already stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be encoded or written.
    pub async fn flush(&self) -> Result<()> {
        let Some(persistence) = &self.persistence else {
            return Ok(());
        };
        let pending = {
            let current = self.lock();
            Pending {
                revision: current.revision,
                state: Arc::clone(&current.state),
            }
        };
        persistence.write_now(pending).await
    }

    /// Stop the background writer and write the current state.
    ///
    /// Later changes are only persisted by explicit [`flush`](Self::flush) calls.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the final write fails.
    pub async fn shutdown(&self) -> Result<()> {
        if let Some(persistence) = &self.persistence {
            persistence.stop();
        }
        self.flush().await
    }

    fn lock(&self) -> MutexGuard<'_, Current<S>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: StoreState + std::fmt::Debug> std::fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let current = self.lock();
        f.debug_struct("Store")
            .field("key", &S::STORAGE_KEY)
            .field("revision", &current.revision)
            .field("state", &current.state)
            .field("persisted", &self.persistence.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde::Deserialize;

    use super::*;
    use crate::error::StorageError;
    use crate::storage::MemoryStorage;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: i64,
        #[serde(skip)]
        touched: bool,
    }

    impl StoreState for Counter {
        const STORAGE_KEY: &'static str = "counter";
        type Persisted = Self;

        fn project(&self) -> Self {
            self.clone()
        }

        fn restore(persisted: Self) -> Self {
            persisted
        }
    }

    impl Store<Counter> {
        fn add(&self, n: i64) -> bool {
            self.apply("add", |state| {
                if n == 0 {
                    return false;
                }
                state.value += n;
                state.touched = true;
                true
            })
        }
    }

    /// Storage that counts saves and can be told to fail.
    #[derive(Default)]
    struct CountingStorage {
        inner: MemoryStorage,
        saves: AtomicUsize,
        fail: std::sync::atomic::AtomicBool,
    }

    impl Storage for CountingStorage {
        fn load(&self, key: &str) -> Result<Option<String>> {
            self.inner.load(key)
        }

        fn save(&self, key: &str, data: &str) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StorageError::Backend("disk full".to_owned()));
            }
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.inner.save(key, data)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_subscribers_see_post_change_snapshot() {
        let store = Store::<Counter>::in_memory();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = store.subscribe(move |state: &Counter| {
            sink.lock().unwrap().push(state.value);
        });

        store.add(2);
        store.add(3);
        assert_eq!(*seen.lock().unwrap(), vec![2, 5]);
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn test_unchanged_command_notifies_without_writing() {
        let storage = Arc::new(CountingStorage::default());
        let store =
            Store::<Counter>::open(Arc::clone(&storage) as Arc<dyn Storage>, StoreOptions::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = store.subscribe(move |state: &Counter| {
            sink.lock().unwrap().push(state.value);
        });

        assert!(store.add(2));
        assert!(!store.add(0));
        assert_eq!(*seen.lock().unwrap(), vec![2, 2]);
        assert_eq!(store.revision(), 1);
        assert_eq!(storage.saves.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_silent_command_does_not_notify() {
        let store = Store::<Counter>::in_memory();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _sub = store.subscribe(move |_: &Counter| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!store.apply("noop", |_| Outcome::Silent));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_dropped_subscription_stops_notifications() {
        let store = Store::<Counter>::in_memory();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let sub = store.subscribe(move |_: &Counter| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(store.subscriber_count(), 1);

        store.add(1);
        sub.unsubscribe();
        store.add(1);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_subscriber_may_read_store() {
        let store = Arc::new(Store::<Counter>::in_memory());
        let observed = Arc::new(Mutex::new(None));
        let (store_ref, slot) = (Arc::downgrade(&store), Arc::clone(&observed));
        let _sub = store.subscribe(move |_: &Counter| {
            if let Some(store) = store_ref.upgrade() {
                *slot.lock().unwrap() = Some(store.snapshot().value);
            }
        });

        store.add(7);
        assert_eq!(*observed.lock().unwrap(), Some(7));
    }

    #[test]
    fn test_write_through_without_runtime() {
        let storage = MemoryStorage::new();
        let store = Store::<Counter>::open(Arc::new(storage.clone()), StoreOptions::default());
        store.add(4);

        let reopened = Store::<Counter>::open(Arc::new(storage), StoreOptions::default());
        assert_eq!(reopened.snapshot().value, 4);
        assert!(!reopened.snapshot().touched);
    }

    /// Poll `future` once on the current thread, outside any runtime.
    fn poll_once<F: std::future::Future>(future: F) -> std::task::Poll<F::Output> {
        let mut future = std::pin::pin!(future);
        let mut cx = std::task::Context::from_waker(std::task::Waker::noop());
        future.as_mut().poll(&mut cx)
    }

    #[test]
    fn test_flush_and_shutdown_without_runtime() {
        let storage = Arc::new(CountingStorage::default());
        let store =
            Store::<Counter>::open(Arc::clone(&storage) as Arc<dyn Storage>, StoreOptions::default());
        storage.fail.store(true, Ordering::SeqCst);
        store.add(5);
        storage.fail.store(false, Ordering::SeqCst);

        assert!(matches!(poll_once(store.flush()), std::task::Poll::Ready(Ok(()))));
        assert_eq!(storage.saves.load(Ordering::SeqCst), 1);

        store.add(1);
        assert!(matches!(poll_once(store.shutdown()), std::task::Poll::Ready(Ok(()))));
        assert_eq!(
            storage.inner.get("counter").as_deref(),
            Some(r#"{"version":1,"state":{"value":6}}"#)
        );
    }

    #[test]
    fn test_corrupt_blob_starts_empty() {
        let storage = MemoryStorage::new();
        storage.insert("counter", "not json at all");
        let store = Store::<Counter>::open(Arc::new(storage), StoreOptions::default());
        assert_eq!(*store.snapshot(), Counter::default());
    }

    #[test]
    fn test_unknown_version_starts_empty() {
        let storage = MemoryStorage::new();
        storage.insert("counter", r#"{"version":99,"state":{"value":3}}"#);
        let store = Store::<Counter>::open(Arc::new(storage), StoreOptions::default());
        assert_eq!(store.snapshot().value, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_coalesces_writes() {
        let storage = Arc::new(CountingStorage::default());
        let store = Store::<Counter>::open(
            Arc::clone(&storage) as Arc<dyn Storage>,
            StoreOptions {
                debounce: Duration::from_millis(100),
            },
        );

        for _ in 0..5 {
            store.add(1);
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
        store.flush().await.unwrap();

        assert_eq!(storage.saves.load(Ordering::SeqCst), 1);
        let blob = storage.inner.get("counter").unwrap();
        assert_eq!(blob, r#"{"version":1,"state":{"value":5}}"#);
    }

    #[tokio::test]
    async fn test_write_failure_keeps_memory_state() {
        let storage = Arc::new(CountingStorage::default());
        storage.fail.store(true, Ordering::SeqCst);
        let store = Store::<Counter>::open(
            Arc::clone(&storage) as Arc<dyn Storage>,
            StoreOptions {
                debounce: Duration::ZERO,
            },
        );

        assert!(store.add(3));
        assert_eq!(store.snapshot().value, 3);
        assert!(store.flush().await.is_err());

        // The next successful write supersedes the failed ones.
        storage.fail.store(false, Ordering::SeqCst);
        store.flush().await.unwrap();
        assert_eq!(
            storage.inner.get("counter").as_deref(),
            Some(r#"{"version":1,"state":{"value":3}}"#)
        );
    }

    #[tokio::test]
    async fn test_flush_without_changes_writes_nothing() {
        let storage = Arc::new(CountingStorage::default());
        let store =
            Store::<Counter>::open(Arc::clone(&storage) as Arc<dyn Storage>, StoreOptions::default());
        store.flush().await.unwrap();
        assert_eq!(storage.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_shutdown_persists_final_state() {
        let storage = MemoryStorage::new();
        let store = Store::<Counter>::open(
            Arc::new(storage.clone()),
            StoreOptions {
                debounce: Duration::from_secs(60),
            },
        );
        store.add(9);
        store.shutdown().await.unwrap();

        let reopened = Store::<Counter>::open(Arc::new(storage), StoreOptions::default());
        assert_eq!(reopened.snapshot().value, 9);
    }
}
