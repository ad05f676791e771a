//! Callback registry for editor change notifications

use std::sync::mpsc::{self, Receiver};

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Box<dyn FnMut(&T) -> bool + Send>;

/// Ordered set of subscribers to values of type `T`.
///
/// A callback that returns `false` is dropped after that delivery, which
/// is how channel subscribers go away once their receiver is gone.
pub struct Subscribers<T> {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback<T>)>,
}

impl<T> Subscribers<T> {
    pub fn new() -> Self {
        Subscribers { next_id: 0, callbacks: Vec::new() }
    }

    /// Register a callback invoked for every emitted value.
    pub fn subscribe<F>(&mut self, mut callback: F) -> SubscriptionId
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.subscribe_while(move |value| {
            callback(value);
            true
        })
    }

    /// Register a callback that stays subscribed while it returns `true`.
    pub fn subscribe_while<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&T) -> bool + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sid, _)| *sid != id);
        self.callbacks.len() != before
    }

    /// Deliver `value` to every subscriber in registration order.
    pub fn emit(&mut self, value: &T) {
        self.callbacks.retain_mut(|(_, callback)| callback(value));
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<T: Clone + Send + 'static> Subscribers<T> {
    /// Subscribe through a channel; the subscription ends when the
    /// receiver is dropped.
    pub fn channel(&mut self) -> Receiver<T> {
        let (tx, rx) = mpsc::channel();
        self.subscribe_while(move |value: &T| tx.send(value.clone()).is_ok());
        rx
    }
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Subscribers<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers").field("count", &self.callbacks.len()).finish()
    }
}
