//! # Event Bus System
//!
//! Broadcasts worker lifecycle and cache events using `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The offline cache manager emits a [`WorkerEvent`] whenever something an
//! embedding host may care about happens: the shell was installed, a new
//! version was activated, the caches were reset, a page asked for an offline
//! download. Subscribers are independent and never block the worker.
//!
//! ```text
//! ┌──────────────┐     emit      ┌───────────┐    subscribe    ┌────────────┐
//! │ install /    ├──────────────>│ EventBus  ├────────────────>│ Subscriber │
//! │ activate /   │               │ (broadcast│                 └────────────┘
//! │ fetch / msg  │               │  channel) ├────────────────>│ Subscriber │
//! └──────────────┘               └───────────┘                 └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, LifecycleEvent, WorkerEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(16);
//! let mut subscriber = event_bus.subscribe();
//!
//! event_bus
//!     .emit(WorkerEvent::Lifecycle(LifecycleEvent::Installed { core_paths: 3 }))
//!     .ok();
//!
//! let event = subscriber.recv().await.unwrap();
//! assert_eq!(event.description(), "App shell installed");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber fell `n` events behind. Non-fatal.
//! - **`RecvError::Closed`**: every sender was dropped. Treat as shutdown.
//!
//! Emitting with no subscribers returns `Err(SendError)`; the worker ignores it.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 64;

// ============================================================================
// Worker Event Types
// ============================================================================

/// Top-level event published through the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum WorkerEvent {
    /// Install / activate / lifecycle control
    Lifecycle(LifecycleEvent),
    /// Cache partition changes
    Cache(CacheEvent),
}

impl WorkerEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            WorkerEvent::Lifecycle(e) => e.description(),
            WorkerEvent::Cache(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            WorkerEvent::Cache(CacheEvent::Reset { .. }) => EventSeverity::Warning,
            WorkerEvent::Lifecycle(LifecycleEvent::Installed { .. })
            | WorkerEvent::Lifecycle(LifecycleEvent::Activated { .. })
            | WorkerEvent::Cache(CacheEvent::OfflineDownloadCompleted { .. }) => {
                EventSeverity::Info
            }
            _ => EventSeverity::Debug,
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

// ============================================================================
// Lifecycle Events
// ============================================================================

/// Events raised by the install and activate phases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LifecycleEvent {
    /// Every core path was fetched and staged in the temp partition.
    Installed {
        /// Number of core paths staged.
        core_paths: usize,
    },
    /// Reconciliation finished and the new manifest was recorded.
    Activated {
        /// Content entries dropped because their hash changed or they left the table.
        removed: usize,
        /// Entries merged from the temp partition.
        merged: usize,
        /// True when no previous manifest existed.
        first_run: bool,
    },
    /// A page asked the waiting worker to take over.
    SkipWaitingRequested,
}

impl LifecycleEvent {
    fn description(&self) -> &str {
        match self {
            LifecycleEvent::Installed { .. } => "App shell installed",
            LifecycleEvent::Activated { .. } => "App shell activated",
            LifecycleEvent::SkipWaitingRequested => "Skip waiting requested",
        }
    }
}

// ============================================================================
// Cache Events
// ============================================================================

/// Events describing changes to the cache partitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CacheEvent {
    /// Activation failed and every partition was deleted.
    Reset {
        /// Why reconciliation gave up.
        reason: String,
    },
    /// A same-origin response was cached lazily on first request.
    ResourceCached {
        /// Request path relative to the origin.
        path: String,
    },
    /// A page-triggered download of the full resource table finished.
    OfflineDownloadCompleted {
        /// Number of entries fetched because they were missing.
        downloaded: usize,
    },
}

impl CacheEvent {
    fn description(&self) -> &str {
        match self {
            CacheEvent::Reset { .. } => "Cache partitions reset",
            CacheEvent::ResourceCached { .. } => "Resource cached on first request",
            CacheEvent::OfflineDownloadCompleted { .. } => "Offline download completed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central broadcast channel for worker events.
///
/// Cloning the bus is cheap; all clones share the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<WorkerEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received it, or an error when
    /// nobody is listening.
    pub fn emit(&self, event: WorkerEvent) -> Result<usize, SendError<WorkerEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<WorkerEvent> {
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

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&WorkerEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with an optional predicate.
///
/// ```rust
/// use core_runtime::events::{EventBus, EventSeverity, EventStream};
///
/// let event_bus = EventBus::default();
/// let warnings = EventStream::new(event_bus.subscribe())
///     .filter(|event| event.severity() >= EventSeverity::Warning);
/// ```
pub struct EventStream {
    receiver: Receiver<WorkerEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<WorkerEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&WorkerEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &WorkerEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next matching event.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<WorkerEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Returns `None` if no matching event is currently available.
    pub fn try_recv(&mut self) -> Option<Result<WorkerEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
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
