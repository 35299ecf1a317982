//! Per-tab engine interface

use crate::event::{EngineId, EventSink};

/// Navigation primitives of one engine instance.
///
/// Calls return immediately; progress is reported through the [`EventSink`]
/// the engine was created with.
pub trait WebEngine: Send {
    fn id(&self) -> EngineId;

    fn navigate(&mut self, url: &str);

    fn reload(&mut self);

    fn go_back(&mut self);

    fn go_forward(&mut self);

    fn can_go_back(&self) -> bool;

    fn can_go_forward(&self) -> bool;

    fn open_dev_tools(&mut self);

    /// Authoritative address of the page. Empty before the first load.
    fn current_url(&self) -> String;

    fn title(&self) -> String;
}

/// Creates engine instances for new tabs.
pub trait EngineFactory: Send + Sync {
    fn create(&self, sink: EventSink) -> Box<dyn WebEngine>;
}
