//! Background persistence of store snapshots.
//!
//! Blobs are JSON envelopes: `{"version":1,"state":<projection>}`.
//!
//! Each state change publishes the newest snapshot on a `watch` channel,
//! which keeps only the latest value. The writer task waits for a change,
//! sleeps the debounce interval, then writes whatever is newest by then, so
//! a burst of commands costs a single write. Writes carry the revision they
//! were taken at and the [`Sink`] refuses to overwrite a newer revision with
//! an older one.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::StoreState;
use crate::error::{Result, StorageError};
use crate::storage::Storage;

/// Current blob format version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a, P> {
    version: u32,
    state: &'a P,
}

#[derive(Deserialize)]
struct Envelope<P> {
    version: u32,
    state: P,
}

/// Encode the persisted projection of `state`.
pub(crate) fn encode<S: StoreState>(state: &S) -> Result<String> {
    let projection = state.project();
    Ok(serde_json::to_string(&EnvelopeRef {
        version: FORMAT_VERSION,
        state: &projection,
    })?)
}

/// Decode a blob written by [`encode`].
pub(crate) fn decode<S: StoreState>(blob: &str) -> Result<S> {
    let envelope: Envelope<S::Persisted> = serde_json::from_str(blob)?;
    if envelope.version != FORMAT_VERSION {
        return Err(StorageError::UnsupportedVersion(envelope.version));
    }
    Ok(S::restore(envelope.state))
}

/// Load the initial state for `S`, falling back to the default.
///
/// A missing blob is a fresh start; an unreadable or corrupt one is logged
/// and also treated as a fresh start.
pub(crate) fn rehydrate<S: StoreState>(storage: &dyn Storage) -> S {
    let blob = match storage.load(S::STORAGE_KEY) {
        Ok(Some(blob)) => blob,
        Ok(None) => {
            debug!(key = S::STORAGE_KEY, "no persisted state; starting empty");
            return S::default();
        }
        Err(error) => {
            warn!(key = S::STORAGE_KEY, %error, "failed to read persisted state; starting empty");
            return S::default();
        }
    };

    decode::<S>(&blob).unwrap_or_else(|error| {
        warn!(key = S::STORAGE_KEY, %error, "discarding corrupt persisted state");
        S::default()
    })
}

/// Serialized writer in front of a storage backend.
pub(crate) struct Sink<S> {
    storage: Arc<dyn Storage>,
    last_written: Mutex<u64>,
    _state: std::marker::PhantomData<fn(&S)>,
}

impl<S: StoreState> Sink<S> {
    pub(crate) fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            last_written: Mutex::new(0),
            _state: std::marker::PhantomData,
        }
    }

    /// Write `state` taken at `revision` unless something as new is already stored.
    pub(crate) fn write(&self, revision: u64, state: &S) -> Result<()> {
        let mut last_written = self
            .last_written
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if revision <= *last_written {
            return Ok(());
        }

        let blob = encode(state)?;
        self.storage.save(S::STORAGE_KEY, &blob)?;
        *last_written = revision;
        debug!(key = S::STORAGE_KEY, revision, bytes = blob.len(), "persisted state");
        Ok(())
    }

    /// Best-effort write: failures are logged, never returned.
    pub(crate) fn write_logged(&self, revision: u64, state: &S) {
        if let Err(error) = self.write(revision, state) {
            warn!(key = S::STORAGE_KEY, revision, %error, "failed to persist state");
        }
    }
}

/// A snapshot waiting to be written.
pub(crate) struct Pending<S> {
    pub(crate) revision: u64,
    pub(crate) state: Arc<S>,
}

impl<S> Clone for Pending<S> {
    fn clone(&self) -> Self {
        Self {
            revision: self.revision,
            state: Arc::clone(&self.state),
        }
    }
}

/// How state changes reach storage.
pub(crate) enum Writer<S> {
    /// Debounced background task on the tokio runtime.
    Debounced {
        tx: watch::Sender<Pending<S>>,
        task: Mutex<Option<JoinHandle<()>>>,
    },
    /// No runtime was available: write synchronously on every change.
    WriteThrough,
}

/// Persistence attached to a store.
pub(crate) struct Persistence<S> {
    pub(crate) sink: Arc<Sink<S>>,
    writer: Writer<S>,
}

impl<S: StoreState> Persistence<S> {
    /// Start persisting changes made after `initial`.
    pub(crate) fn start(sink: Arc<Sink<S>>, initial: Pending<S>, debounce: Duration) -> Self {
        let writer = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let (tx, rx) = watch::channel(initial);
                let task = handle.spawn(run_writer(rx, Arc::clone(&sink), debounce));
                Writer::Debounced {
                    tx,
                    task: Mutex::new(Some(task)),
                }
            }
            Err(_) => {
                debug!(
                    key = S::STORAGE_KEY,
                    "no tokio runtime; persisting synchronously"
                );
                Writer::WriteThrough
            }
        };
        Self { sink, writer }
    }

    /// Schedule `pending` for writing, replacing anything not yet written.
    pub(crate) fn schedule(&self, pending: Pending<S>) {
        match &self.writer {
            Writer::Debounced { tx, .. } => {
                tx.send_replace(pending);
            }
            Writer::WriteThrough => self.sink.write_logged(pending.revision, &pending.state),
        }
    }

    /// Write `pending` now and wait for the result.
    ///
    /// Without a runtime the write happens on the calling thread.
    pub(crate) async fn write_now(&self, pending: Pending<S>) -> Result<()> {
        match &self.writer {
            Writer::Debounced { .. } => {
                let sink = Arc::clone(&self.sink);
                tokio::task::spawn_blocking(move || sink.write(pending.revision, &pending.state))
                    .await?
            }
            Writer::WriteThrough => self.sink.write(pending.revision, &pending.state),
        }
    }

    /// Stop the background task, if any.
    pub(crate) fn stop(&self) {
        if let Writer::Debounced { task, .. } = &self.writer {
            let handle = task.lock().unwrap_or_else(PoisonError::into_inner).take();
            if let Some(handle) = handle {
                handle.abort();
            }
        }
    }
}

async fn run_writer<S: StoreState>(
    mut rx: watch::Receiver<Pending<S>>,
    sink: Arc<Sink<S>>,
    debounce: Duration,
) {
    while rx.changed().await.is_ok() {
        if !debounce.is_zero() {
            tokio::time::sleep(debounce).await;
        }
        let pending = rx.borrow_and_update().clone();
        let sink = Arc::clone(&sink);
        let result = tokio::task::spawn_blocking(move || {
            sink.write_logged(pending.revision, &pending.state);
        })
        .await;
        if let Err(error) = result {
            warn!(key = S::STORAGE_KEY, %error, "persistence task failed");
        }
    }
    debug!(key = S::STORAGE_KEY, "store dropped; persistence writer exiting");
}
