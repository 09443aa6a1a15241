//! Topic-keyed publish/subscribe channel.
//!
//! Delivery is synchronous and in subscription order. There is no buffering
//! or replay: a publish with no subscribers is dropped. The handler list is
//! snapshotted before delivery, so handlers subscribed while a publish is in
//! progress only see later publishes, and handlers may publish or subscribe
//! re-entrantly without deadlocking.

use log::trace;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct BusInner<T> {
    next_id: u64,
    topics: HashMap<String, Vec<(u64, Handler<T>)>>,
}

/// Shared event bus; clones refer to the same channel
pub struct EventBus<T> {
    inner: Arc<Mutex<BusInner<T>>>,
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> EventBus<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(BusInner {
                next_id: 0,
                topics: HashMap::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BusInner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver `payload` to every current subscriber of `topic`
    pub fn publish(&self, topic: &str, payload: &T) {
        let handlers: Vec<Handler<T>> = match self.lock().topics.get(topic) {
            Some(list) => list.iter().map(|(_, handler)| handler.clone()).collect(),
            None => Vec::new(),
        };
        trace!("publish '{}' to {} subscriber(s)", topic, handlers.len());
        for handler in handlers {
            handler(payload);
        }
    }

    /// Register `handler` for `topic`.
    ///
    /// The handler stays registered until the returned [`Subscription`] is
    /// dropped or explicitly unsubscribed.
    pub fn subscribe<F>(&self, topic: impl Into<String>, handler: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let topic = topic.into();
        let id = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner
                .topics
                .entry(topic.clone())
                .or_default()
                .push((id, Arc::new(handler)));
            id
        };

        let weak: Weak<Mutex<BusInner<T>>> = Arc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
                    if let Some(list) = inner.topics.get_mut(&topic) {
                        list.retain(|(handler_id, _)| *handler_id != id);
                        if list.is_empty() {
                            inner.topics.remove(&topic);
                        }
                    }
                }
            })),
        }
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.lock().topics.get(topic).map_or(0, Vec::len)
    }
}

/// Guard returned by [`EventBus::subscribe`]; unsubscribes on drop
#[must_use = "dropping a Subscription unsubscribes the handler"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}
