//! Headless in-process engine
//!
//! Keeps a per-tab history stack and a shared cookie jar without rendering
//! anything. Loads complete as soon as they are requested; hosts under the
//! reserved `.invalid` TLD fail with a navigation error. Every call is recorded
//! so callers can see which engine received which primitive.

use parking_lot::Mutex;
use std::sync::Arc;
use url::Url;

use crate::cookie::{CookieStore, CookieVisitor, EngineCookie};
use crate::engine::{EngineFactory, WebEngine};
use crate::event::{EngineEvent, EngineId, EventSink};

/// A primitive received by a headless engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Navigate(String),
    Reload,
    GoBack,
    GoForward,
    OpenDevTools,
}

type CallLog = Arc<Mutex<Vec<(EngineId, EngineCall)>>>;

pub struct HeadlessEngine {
    sink: EventSink,
    entries: Vec<String>,
    position: Option<usize>,
    calls: CallLog,
}

impl HeadlessEngine {
    fn new(sink: EventSink, calls: CallLog) -> Self {
        Self {
            sink,
            entries: Vec::new(),
            position: None,
            calls,
        }
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().push((self.sink.engine(), call));
    }

    fn emit_loading(&self, is_loading: bool) {
        self.sink.emit(EngineEvent::LoadingStateChanged {
            is_loading,
            can_go_back: self.can_go_back(),
            can_go_forward: self.can_go_forward(),
        });
    }

    /// Report the entry at the current position as loaded.
    fn commit_current(&self) {
        let url = self.current_url();
        self.sink.emit(EngineEvent::AddressChanged(url));
        self.sink.emit(EngineEvent::TitleChanged(self.title()));
        self.emit_loading(false);
    }

    fn fails(url: &str) -> bool {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.ends_with(".invalid")))
            .unwrap_or(false)
    }
}

impl WebEngine for HeadlessEngine {
    fn id(&self) -> EngineId {
        self.sink.engine()
    }

    fn navigate(&mut self, url: &str) {
        self.record(EngineCall::Navigate(url.to_string()));
        self.emit_loading(true);

        if Self::fails(url) {
            self.sink.emit(EngineEvent::NavigationError {
                url: url.to_string(),
                message: "ERR_NAME_NOT_RESOLVED".to_string(),
            });
            self.emit_loading(false);
            return;
        }

        let next = self.position.map_or(0, |p| p + 1);
        self.entries.truncate(next);
        self.entries.push(url.to_string());
        self.position = Some(next);
        self.commit_current();
    }

    fn reload(&mut self) {
        self.record(EngineCall::Reload);
        self.emit_loading(true);
        self.commit_current();
    }

    fn go_back(&mut self) {
        self.record(EngineCall::GoBack);
        if let Some(p) = self.position.filter(|p| *p > 0) {
            self.position = Some(p - 1);
            self.emit_loading(true);
            self.commit_current();
        }
    }

    fn go_forward(&mut self) {
        self.record(EngineCall::GoForward);
        if self.can_go_forward() {
            self.position = self.position.map(|p| p + 1);
            self.emit_loading(true);
            self.commit_current();
        }
    }

    fn can_go_back(&self) -> bool {
        self.position.is_some_and(|p| p > 0)
    }

    fn can_go_forward(&self) -> bool {
        self.position
            .is_some_and(|p| p + 1 < self.entries.len())
    }

    fn open_dev_tools(&mut self) {
        self.record(EngineCall::OpenDevTools);
    }

    fn current_url(&self) -> String {
        self.position
            .and_then(|p| self.entries.get(p))
            .cloned()
            .unwrap_or_default()
    }

    fn title(&self) -> String {
        let url = self.current_url();
        Url::parse(&url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or(url)
    }
}

/// Factory for [`HeadlessEngine`]s sharing one call log.
#[derive(Clone, Default)]
pub struct HeadlessEngineFactory {
    calls: CallLog,
}

impl HeadlessEngineFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every primitive received so far, in order.
    pub fn calls(&self) -> Vec<(EngineId, EngineCall)> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, engine: EngineId) -> Vec<EngineCall> {
        self.calls
            .lock()
            .iter()
            .filter(|(id, _)| *id == engine)
            .map(|(_, call)| call.clone())
            .collect()
    }
}

impl EngineFactory for HeadlessEngineFactory {
    fn create(&self, sink: EventSink) -> Box<dyn WebEngine> {
        tracing::debug!(engine = %sink.engine(), "Creating headless engine");
        Box::new(HeadlessEngine::new(sink, Arc::clone(&self.calls)))
    }
}

/// In-memory cookie jar. Enumeration runs on a separate thread, like a real
/// engine's IO thread.
#[derive(Clone, Default)]
pub struct HeadlessCookieStore {
    cookies: Arc<Mutex<Vec<(String, EngineCookie)>>>,
}

impl HeadlessCookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cookies(&self) -> Vec<EngineCookie> {
        self.cookies.lock().iter().map(|(_, c)| c.clone()).collect()
    }

    /// Origin URL each cookie was last set for.
    pub fn urls(&self) -> Vec<String> {
        self.cookies.lock().iter().map(|(u, _)| u.clone()).collect()
    }
}

impl CookieStore for HeadlessCookieStore {
    fn visit_all_cookies(&self, mut visitor: Box<dyn CookieVisitor>) -> bool {
        let snapshot = self.cookies();

        std::thread::spawn(move || {
            let total = snapshot.len();
            for (index, cookie) in snapshot.iter().enumerate() {
                if !visitor.visit(cookie, index, total) {
                    break;
                }
            }
        });

        true
    }

    fn set_cookie(&self, url: &str, cookie: EngineCookie) -> bool {
        if cookie.name.is_empty() {
            return false;
        }

        let mut cookies = self.cookies.lock();
        cookies.retain(|(_, existing)| !existing.same_key(&cookie));
        cookies.push((url.to_string(), cookie));
        true
    }
}
