//! Prepare serializer
//!
//! A single-slot register for the operation currently driving the native
//! engine through a lifecycle transition (a prepare, or the teardown run by
//! `stop`). Each new operation swaps its own completion into the slot and
//! then waits for the one it displaced, so operations run one after the
//! other in arrival order and at most one native prepare is ever in flight.

use crate::native::NativePlayer;
use log::debug;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// How an operation in the slot finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled {
    /// The engine reached Ready
    Prepared,

    /// The prepare failed; the engine is in whatever state it reports
    Failed(String),

    /// A teardown returned the engine to Idle
    Released,
}

/// Result of `ensure_ready`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepareOutcome {
    Ready,
    Failed(String),
}

impl From<PrepareOutcome> for Settled {
    fn from(outcome: PrepareOutcome) -> Self {
        match outcome {
            PrepareOutcome::Ready => Settled::Prepared,
            PrepareOutcome::Failed(reason) => Settled::Failed(reason),
        }
    }
}

type Completion = watch::Receiver<Option<Settled>>;

struct Slot {
    id: u64,
    done: Completion,
}

/// Serializes prepare and teardown operations on the native handle
pub struct PrepareSerializer {
    slot: Arc<Mutex<Option<Slot>>>,
    next_id: AtomicU64,
}

impl PrepareSerializer {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(0),
        }
    }

    /// Take the slot for a new operation
    ///
    /// Synchronous, so callers can queue up before yielding. The returned
    /// reservation must wait its turn before touching the engine.
    pub fn reserve(&self) -> Reservation {
        let (sender, done) = watch::channel(None);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let previous = self
            .slot
            .lock()
            .replace(Slot { id, done })
            .map(|slot| slot.done);

        Reservation {
            slot: Arc::clone(&self.slot),
            id,
            sender: Some(sender),
            previous,
        }
    }

    /// Whether an operation currently holds the slot
    pub fn is_busy(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Wait for the operation currently in the slot, if any
    pub async fn settled(&self) -> Option<Settled> {
        let pending = self.slot.lock().as_ref().map(|slot| slot.done.clone());
        match pending {
            Some(done) => Some(wait(done).await),
            None => None,
        }
    }

    /// Bring the engine to Ready, joining any operation already in flight
    ///
    /// `prepare` runs only if the engine is still not prepared once every
    /// earlier operation has settled. A caller that joined a failed prepare
    /// adopts its failure instead of issuing another one.
    pub async fn ensure_ready<F, Fut>(
        &self,
        engine: &dyn NativePlayer,
        prepare: F,
    ) -> PrepareOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PrepareOutcome>,
    {
        self.reserve().ensure_ready(engine, prepare).await
    }
}

impl Default for PrepareSerializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Ownership of the serializer slot for one operation
///
/// Dropping a reservation without settling it settles it as failed, so no
/// waiter is left hanging if the owning task is aborted.
pub struct Reservation {
    slot: Arc<Mutex<Option<Slot>>>,
    id: u64,
    sender: Option<watch::Sender<Option<Settled>>>,
    previous: Option<Completion>,
}

impl Reservation {
    /// Wait until the operation this reservation displaced has settled
    pub async fn wait_turn(&mut self) -> Option<Settled> {
        match self.previous.take() {
            Some(done) => Some(wait(done).await),
            None => None,
        }
    }

    /// `PrepareSerializer::ensure_ready` on an already taken slot
    ///
    /// Lets a caller queue up synchronously and run the rest on another task.
    pub async fn ensure_ready<F, Fut>(
        mut self,
        engine: &dyn NativePlayer,
        prepare: F,
    ) -> PrepareOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PrepareOutcome>,
    {
        let previous = self.wait_turn().await;

        if engine.state().is_prepared() {
            self.settle(Settled::Prepared);
            return PrepareOutcome::Ready;
        }

        if let Some(Settled::Failed(reason)) = previous {
            debug!("Joined a failed prepare: {}", reason);
            self.settle(Settled::Failed(reason.clone()));
            return PrepareOutcome::Failed(reason);
        }

        let outcome = prepare().await;
        self.settle(outcome.clone().into());
        outcome
    }

    /// Publish the result and release the slot
    pub fn settle(mut self, settled: Settled) {
        self.finish(settled);
    }

    fn finish(&mut self, settled: Settled) {
        let Some(sender) = self.sender.take() else {
            return;
        };

        {
            let mut slot = self.slot.lock();
            if slot.as_ref().map(|s| s.id) == Some(self.id) {
                *slot = None;
            }
        }
        // Nobody may be waiting any more; that is fine.
        let _ = sender.send(Some(settled));
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        self.finish(Settled::Failed("operation abandoned".to_string()));
    }
}

async fn wait(mut done: Completion) -> Settled {
    let settled = match done.wait_for(Option::is_some).await {
        Ok(value) => value.clone(),
        Err(_) => None,
    };
    settled.unwrap_or_else(|| Settled::Failed("operation abandoned".to_string()))
}
