//! Tab data structure
//!
//! A tab displays:
//! - Header (page title, "New Tab" until the engine reports one)
//! - Loading indicator
//! - Selection highlight

use chrono::{DateTime, Utc};
use corvid_engine::{EngineEvent, EngineId, WebEngine};

use crate::state::LoadState;

/// A tab is identified by the engine instance it owns.
pub type TabId = EngineId;

pub const DEFAULT_HEADER: &str = "New Tab";

/// Last navigation the engine reported as failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationFailure {
    pub url: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Observable change produced by applying one engine event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabUpdate {
    AddressChanged(String),
    TitleChanged(String),
    LoadingChanged(LoadState),
    NavigationFailed(NavigationFailure),
}

pub struct Tab {
    /// Engine instance, exclusively owned
    engine: Box<dyn WebEngine>,
    /// Display title
    header: String,
    load_state: LoadState,
    /// Written only by the registry
    is_selected: bool,
    /// Engine capabilities as of the last loading-state event
    can_go_back: bool,
    can_go_forward: bool,
    last_error: Option<NavigationFailure>,
    created_at: DateTime<Utc>,
}

impl Tab {
    pub fn new(engine: Box<dyn WebEngine>) -> Self {
        Self {
            engine,
            header: DEFAULT_HEADER.to_string(),
            load_state: LoadState::Idle,
            is_selected: false,
            can_go_back: false,
            can_go_forward: false,
            last_error: None,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> TabId {
        self.engine.id()
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    /// Address as reported by the engine right now.
    pub fn current_url(&self) -> String {
        self.engine.current_url()
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn is_loading(&self) -> bool {
        self.load_state.is_loading()
    }

    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    pub fn can_go_back(&self) -> bool {
        self.can_go_back
    }

    pub fn can_go_forward(&self) -> bool {
        self.can_go_forward
    }

    pub fn last_error(&self) -> Option<&NavigationFailure> {
        self.last_error.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Ask the engine to load `url`. Returns false when nothing was requested
    /// because `url` is blank or already the current address.
    pub fn navigate(&mut self, url: &str) -> bool {
        let url = url.trim();
        if url.is_empty() || url == self.engine.current_url() {
            tracing::debug!(tab_id = %self.id(), url = %url, "Skipping redundant navigation");
            return false;
        }

        self.last_error = None;
        self.transition_to(LoadState::Loading);
        self.engine.navigate(url);

        tracing::debug!(tab_id = %self.id(), url = %url, "Navigation requested");
        true
    }

    pub fn go_back(&mut self) -> bool {
        if !self.engine.can_go_back() {
            return false;
        }
        self.transition_to(LoadState::Loading);
        self.engine.go_back();
        true
    }

    pub fn go_forward(&mut self) -> bool {
        if !self.engine.can_go_forward() {
            return false;
        }
        self.transition_to(LoadState::Loading);
        self.engine.go_forward();
        true
    }

    pub fn reload(&mut self) {
        self.transition_to(LoadState::Loading);
        self.engine.reload();
    }

    pub fn open_dev_tools(&mut self) {
        self.engine.open_dev_tools();
    }

    pub(crate) fn select(&mut self) {
        self.is_selected = true;
    }

    pub(crate) fn deselect(&mut self) {
        self.is_selected = false;
    }

    /// Header shown until the engine reports the real title, e.g. the title
    /// saved in a session snapshot.
    pub(crate) fn set_header(&mut self, header: &str) {
        self.header = if header.trim().is_empty() {
            DEFAULT_HEADER.to_string()
        } else {
            header.to_string()
        };
    }

    /// Apply one engine event. Must run on the task that owns the registry.
    pub fn apply_event(&mut self, event: EngineEvent) -> Option<TabUpdate> {
        match event {
            EngineEvent::AddressChanged(url) => Some(TabUpdate::AddressChanged(url)),
            EngineEvent::TitleChanged(title) => {
                let previous = std::mem::take(&mut self.header);
                self.set_header(&title);
                (previous != self.header).then(|| TabUpdate::TitleChanged(self.header.clone()))
            }
            EngineEvent::LoadingStateChanged {
                is_loading,
                can_go_back,
                can_go_forward,
            } => {
                self.can_go_back = can_go_back;
                self.can_go_forward = can_go_forward;
                if is_loading {
                    self.last_error = None;
                }

                let next = LoadState::from(is_loading);
                let changed = self.load_state != next;
                self.transition_to(next);
                changed.then_some(TabUpdate::LoadingChanged(next))
            }
            EngineEvent::NavigationError { url, message } => {
                tracing::warn!(tab_id = %self.id(), url = %url, error = %message, "Navigation failed");

                let failure = NavigationFailure {
                    url,
                    message,
                    at: Utc::now(),
                };
                self.last_error = Some(failure.clone());
                self.transition_to(LoadState::Idle);
                Some(TabUpdate::NavigationFailed(failure))
            }
        }
    }

    fn transition_to(&mut self, next: LoadState) {
        if self.load_state != next {
            tracing::debug!(
                tab_id = %self.id(),
                from = %self.load_state,
                to = %next,
                "Tab state transition"
            );
            self.load_state = next;
        }
    }
}

impl std::fmt::Debug for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tab")
            .field("id", &self.id())
            .field("header", &self.header)
            .field("url", &self.current_url())
            .field("load_state", &self.load_state)
            .field("is_selected", &self.is_selected)
            .finish()
    }
}
