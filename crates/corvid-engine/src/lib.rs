//! Corvid Engine Boundary
//!
//! The rendering engine is an opaque collaborator. This crate defines what the
//! browser core consumes from it:
//! - [`WebEngine`]: per-tab navigation primitives
//! - [`EngineEvent`]: asynchronous notifications, delivered through an [`EventSink`]
//! - [`CookieStore`]: the engine-global cookie jar with its visitor protocol
//!
//! The [`headless`] module provides an in-process engine that keeps a history
//! stack and a cookie jar in memory.

mod cookie;
mod engine;
mod error;
mod event;
pub mod headless;
mod time;

pub use cookie::{CookieStore, CookieVisitor, EngineCookie};
pub use engine::{EngineFactory, WebEngine};
pub use error::EngineError;
pub use event::{event_channel, EngineEvent, EngineId, EngineMessage, EventReceiver, EventSink};
pub use time::EngineTime;

pub type Result<T> = std::result::Result<T, EngineError>;
