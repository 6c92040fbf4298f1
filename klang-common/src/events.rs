//! Event bus for klang state broadcasting
//!
//! Provides a broadcast channel with last-value replay. Subscribers attached
//! after an event was published immediately observe the most recent value, so
//! late observers never miss the current state.

use std::sync::Mutex;
use tokio::sync::broadcast;

/// Broadcast bus carrying events of type `E` to any number of subscribers.
///
/// Unlike a bare [`broadcast::Sender`], the bus remembers the last published
/// event and hands it to new subscribers up front. Receivers that fall behind
/// the channel capacity observe a `Lagged` error and should resynchronize
/// from the next received value.
pub struct EventBus<E: Clone> {
    tx: broadcast::Sender<E>,
    last: Mutex<Option<E>>,
}

impl<E: Clone> EventBus<E> {
    /// Creates a new EventBus with the specified channel capacity.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            last: Mutex::new(None),
        }
    }

    /// Subscribe to the bus.
    ///
    /// Returns the most recently published event (if any) together with a
    /// receiver for all future events.
    pub fn subscribe(&self) -> (Option<E>, broadcast::Receiver<E>) {
        // Lock ordering: the replay snapshot and the subscription must be
        // taken under the same lock that publishers hold, otherwise a
        // concurrent emit could be both missed by the snapshot and the
        // receiver.
        let last = self.last.lock().unwrap();
        let rx = self.tx.subscribe();
        (last.clone(), rx)
    }

    /// Publish an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event. Zero
    /// subscribers is not an error; the event is still retained for replay.
    pub fn emit(&self, event: E) -> usize {
        let mut last = self.last.lock().unwrap();
        *last = Some(event.clone());
        self.tx.send(event).unwrap_or(0)
    }

    /// The most recently published event, if any.
    pub fn current(&self) -> Option<E> {
        self.last.lock().unwrap().clone()
    }
}
