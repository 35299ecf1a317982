//! Engine events and the channel that carries them to the UI task

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Opaque handle of one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EngineId(Uuid);

impl EngineId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EngineId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EngineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notification emitted by an engine, possibly from one of its own threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    AddressChanged(String),
    TitleChanged(String),
    LoadingStateChanged {
        is_loading: bool,
        can_go_back: bool,
        can_go_forward: bool,
    },
    NavigationError {
        url: String,
        message: String,
    },
}

/// An event tagged with the engine that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineMessage {
    pub engine: EngineId,
    pub event: EngineEvent,
}

pub type EventReceiver = mpsc::UnboundedReceiver<EngineMessage>;

/// Sending half handed to an engine at creation time.
///
/// Sending never blocks and is safe from any thread; the UI task owns the
/// receiving half and applies events in the order they were sent.
#[derive(Debug, Clone)]
pub struct EventSink {
    engine: EngineId,
    tx: mpsc::UnboundedSender<EngineMessage>,
}

impl EventSink {
    pub fn engine(&self) -> EngineId {
        self.engine
    }

    /// Returns false once the receiving side has gone away.
    pub fn emit(&self, event: EngineEvent) -> bool {
        self.tx
            .send(EngineMessage {
                engine: self.engine,
                event,
            })
            .is_ok()
    }

    /// Sink for another engine sharing the same channel.
    pub fn for_engine(&self, engine: EngineId) -> Self {
        Self {
            engine,
            tx: self.tx.clone(),
        }
    }
}

/// Create the engine event channel. The sink returned is a template; use
/// [`EventSink::for_engine`] to tag it for each engine.
pub fn event_channel() -> (EventSink, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sink = EventSink {
        engine: EngineId::new(),
        tx,
    };
    (sink, rx)
}
