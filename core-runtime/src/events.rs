//! # Bridge Event Bus
//!
//! Lifecycle notifications for the bridge, built on
//! `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The dispatcher emits a [`BridgeEvent`] for every state change it
//! applies: engine initialization, session registry mutations, and slot
//! command completions. Delivery is lossy: a subscriber that falls behind
//! observes a lag error and keeps receiving newer events; the bridge
//! itself never blocks on its observers.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{BridgeEvent, EventBus};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut stream = bus.subscribe();
//!
//! bus.emit(BridgeEvent::SessionOpened { session_id: 1 }).ok();
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event, BridgeEvent::SessionOpened { session_id: 1 });
//! # }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Notification emitted by the dispatcher after a state change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BridgeEvent {
    /// Engine finished loading the delegate module.
    Initialized {
        /// The tunnel endpoint the module attached to.
        endpoint: String,
    },
    /// A session was registered.
    SessionOpened { session_id: u64 },
    /// A session was removed from the registry.
    SessionClosed { session_id: u64 },
    /// A session's memory handle was replaced.
    SessionMemoryUpdated { session_id: u64 },
    /// A slot command completed and its result was published.
    CommandCompleted {
        /// Command tag (e.g. "socket").
        command: String,
        /// The result word written into the slot.
        result: i32,
    },
}

/// Broadcast channel for [`BridgeEvent`]s.
///
/// Cloning the bus clones the sender; each `subscribe()` creates an
/// independent receiver that sees all events emitted afterwards.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BridgeEvent>,
}

impl EventBus {
    /// Creates a bus whose subscribers may lag by at most `capacity`
    /// events before missing some.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received it, or an error if
    /// there are none. The dispatcher treats both outcomes as fine.
    pub fn emit(&self, event: BridgeEvent) -> Result<usize, SendError<BridgeEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<BridgeEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
