//! # Event Bus System
//!
//! Broadcasts transfer lifecycle events using `tokio::sync::broadcast`, so
//! hosts and diagnostics can observe transfers without touching the engine.
//!
//! ## Overview
//!
//! - **Event Types**: [`CoreEvent`] wrapping domain enums such as [`TransferEvent`]
//! - **EventBus**: central broadcast channel for publishing events
//! - **EventStream**: wrapper for consuming events with filtering
//!
//! Progress percentages are delivered through progress reporters, not the
//! bus. The bus carries `Progress` events too, but a lagging subscriber may
//! miss some; it must not be used to drive completion UI.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, TransferEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut stream = bus.subscribe();
//!
//! bus.emit(CoreEvent::Transfer(TransferEvent::Completed {
//!     transfer_id: "t-1".to_string(),
//!     bytes_written: 2048,
//!     duration_ms: 12,
//! }))
//! .ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event.description(), "Transfer completed");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events; it can keep receiving.
//! - **`RecvError::Closed`**: every sender was dropped; treat as shutdown.

use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use core_async::sync::broadcast::error::{RecvError, SendError};
pub use core_async::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Top-level event enum published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Transfer(TransferEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Transfer(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Transfer(TransferEvent::Failed { .. }) => EventSeverity::Error,
            CoreEvent::Transfer(TransferEvent::Completed { .. }) => EventSeverity::Info,
            CoreEvent::Transfer(TransferEvent::Started { .. }) => EventSeverity::Info,
            CoreEvent::Transfer(TransferEvent::Progress { .. }) => EventSeverity::Debug,
        }
    }

    /// Id of the transfer the event belongs to.
    pub fn transfer_id(&self) -> &str {
        match self {
            CoreEvent::Transfer(e) => e.transfer_id(),
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Source side of a transfer, as reported in events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    Asset,
    Url,
}

/// Lifecycle of a single transfer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum TransferEvent {
    Started {
        transfer_id: String,
        kind: TransferKind,
        /// Destination file name only; full paths stay out of events.
        destination: String,
        with_progress: bool,
        /// Unix epoch milliseconds
        started_at_ms: i64,
    },
    Progress {
        transfer_id: String,
        percent: u8,
    },
    Completed {
        transfer_id: String,
        bytes_written: u64,
        duration_ms: u64,
    },
    Failed {
        transfer_id: String,
        /// Wire error code, e.g. `NETWORK_ERROR`
        code: String,
        message: String,
    },
}

impl TransferEvent {
    fn description(&self) -> &str {
        match self {
            TransferEvent::Started { .. } => "Transfer started",
            TransferEvent::Progress { .. } => "Transfer in progress",
            TransferEvent::Completed { .. } => "Transfer completed",
            TransferEvent::Failed { .. } => "Transfer failed",
        }
    }

    pub fn transfer_id(&self) -> &str {
        match self {
            TransferEvent::Started { transfer_id, .. }
            | TransferEvent::Progress { transfer_id, .. }
            | TransferEvent::Completed { transfer_id, .. }
            | TransferEvent::Failed { transfer_id, .. } => transfer_id,
        }
    }
}

/// Central broadcast channel. Cloning shares the channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event. Fails only when nobody is subscribed.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// Receiver wrapper that skips events rejected by a predicate.
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Only deliver events for one transfer.
    pub fn for_transfer(self, transfer_id: impl Into<String>) -> Self {
        let transfer_id = transfer_id.into();
        self.filter(move |event| event.transfer_id() == transfer_id)
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking receive. `None` when no matching event is queued.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.accepts(&event) => return Some(Ok(event)),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
