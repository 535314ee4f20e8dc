//! Multi-subscriber event dispatch
//!
//! Used both for the notifications the player publishes to the UI and for
//! the change notifications views publish to the player.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

type Callback<E> = Arc<dyn Fn(E) + Send + Sync>;
type Subscribers<E> = RwLock<Vec<(u64, Callback<E>)>>;

/// Event dispatcher
pub struct EventDispatcher<E> {
    subscribers: Arc<Subscribers<E>>,
    next_id: AtomicU64,
}

impl<E: Clone + Send + 'static> EventDispatcher<E> {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(Vec::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register `callback`; it stays registered until the returned handle is dropped
    pub fn subscribe<F>(&self, callback: F) -> EventSubscription
    where
        F: Fn(E) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.write().push((id, Arc::new(callback)));

        let subscribers: Weak<Subscribers<E>> = Arc::downgrade(&self.subscribers);
        EventSubscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(subscribers) = subscribers.upgrade() {
                    subscribers.write().retain(|(sub_id, _)| *sub_id != id);
                }
            })),
        }
    }

    /// Deliver `event` to every subscriber
    ///
    /// Callbacks run outside the registry lock, so they may subscribe or
    /// unsubscribe while being notified.
    pub fn dispatch(&self, event: E) {
        let callbacks: Vec<Callback<E>> = self
            .subscribers
            .read()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in callbacks {
            callback(event.clone());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl<E: Clone + Send + 'static> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Event subscription handle
///
/// Dropping it removes the subscriber.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct EventSubscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl EventSubscription {
    /// Remove the subscriber now
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for EventSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSubscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
