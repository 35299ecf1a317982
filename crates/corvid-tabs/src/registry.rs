//! Tab Registry
//!
//! Ordered tab strip plus the current selection. The registry is the only
//! writer of `Tab::is_selected`.

use std::sync::Arc;

use corvid_engine::{EngineFactory, EngineId, EngineMessage, EventSink};

use crate::error::TabError;
use crate::tab::{Tab, TabId, TabUpdate};
use crate::Result;

/// Address loaded into the replacement tab when the last tab is closed,
/// unless the owner configures another one.
pub const DEFAULT_TAB_URL: &str = "about:blank";

/// What happened when a tab was closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseOutcome {
    pub closed: TabId,
    /// Selection after the close
    pub selected: Option<TabId>,
    pub selection_changed: bool,
    /// Fresh tab created because the strip would otherwise be empty
    pub replacement: Option<TabId>,
}

pub struct TabRegistry {
    tabs: Vec<Tab>,
    selected: Option<TabId>,
    factory: Arc<dyn EngineFactory>,
    /// Template sink; each engine gets a copy tagged with its own id
    events: EventSink,
    default_url: String,
}

impl TabRegistry {
    pub fn new(factory: Arc<dyn EngineFactory>, events: EventSink) -> Self {
        Self {
            tabs: Vec::new(),
            selected: None,
            factory,
            events,
            default_url: DEFAULT_TAB_URL.to_string(),
        }
    }

    pub fn with_default_url(mut self, url: impl Into<String>) -> Self {
        self.default_url = url.into();
        self
    }

    pub fn set_default_url(&mut self, url: impl Into<String>) {
        self.default_url = url.into();
    }

    pub fn default_url(&self) -> &str {
        &self.default_url
    }

    fn create_tab(&self) -> Tab {
        let sink = self.events.for_engine(EngineId::new());
        Tab::new(self.factory.create(sink))
    }

    /// Open a new tab at the end of the strip, select it and start loading
    /// `initial_url`.
    pub fn add_tab(&mut self, initial_url: &str) -> TabId {
        let tab = self.create_tab();
        let id = tab.id();
        self.tabs.push(tab);
        self.set_selection(id);

        if let Some(tab) = self.get_mut(id) {
            tab.navigate(initial_url);
        }

        tracing::info!(tab_id = %id, url = %initial_url, "Created new tab");
        id
    }

    /// Append a tab from a saved session. The tab is attached before its
    /// navigation is issued, and only becomes selected if nothing else is.
    pub fn restore_tab(&mut self, url: &str, title: &str) -> TabId {
        let mut tab = self.create_tab();
        tab.set_header(title);
        let id = tab.id();
        self.tabs.push(tab);

        if self.selected.is_none() {
            self.set_selection(id);
        }

        if let Some(tab) = self.get_mut(id) {
            tab.navigate(url);
        }

        tracing::debug!(tab_id = %id, url = %url, "Restored tab");
        id
    }

    /// Close a tab. A selected tab hands the selection to its left neighbour
    /// (wrapping to the end); closing the last tab opens a fresh one.
    pub fn close_tab(&mut self, id: TabId) -> Result<CloseOutcome> {
        let index = self.index_of(id).ok_or(TabError::NotFound(id))?;
        let was_selected = self.selected == Some(id);

        // Dropping the tab releases its engine
        drop(self.tabs.remove(index));
        tracing::info!(tab_id = %id, "Closed tab");

        if self.tabs.is_empty() {
            self.selected = None;
            let default_url = self.default_url.clone();
            let replacement = self.add_tab(&default_url);
            return Ok(CloseOutcome {
                closed: id,
                selected: Some(replacement),
                selection_changed: true,
                replacement: Some(replacement),
            });
        }

        if !was_selected {
            return Ok(CloseOutcome {
                closed: id,
                selected: self.selected,
                selection_changed: false,
                replacement: None,
            });
        }

        let count = self.tabs.len();
        let next_index = (index + count - 1) % count;
        let next = self.tabs[next_index].id();
        self.selected = None;
        self.set_selection(next);

        Ok(CloseOutcome {
            closed: id,
            selected: Some(next),
            selection_changed: true,
            replacement: None,
        })
    }

    /// Select a tab. Returns false if it already was selected.
    pub fn select(&mut self, id: TabId) -> Result<bool> {
        if !self.contains(id) {
            return Err(TabError::NotFound(id));
        }
        if self.selected == Some(id) {
            return Ok(false);
        }

        self.set_selection(id);
        tracing::debug!(tab_id = %id, "Selected tab");
        Ok(true)
    }

    /// Move the selection `offset` places along the strip, wrapping at both
    /// ends. Returns the new selection if it changed.
    pub fn select_relative(&mut self, offset: isize) -> Option<TabId> {
        if self.tabs.is_empty() {
            return None;
        }

        let count = self.tabs.len() as isize;
        let current = self.selected_index().unwrap_or(0) as isize;
        let target = (current + offset).rem_euclid(count) as usize;
        let id = self.tabs[target].id();

        match self.select(id) {
            Ok(true) => Some(id),
            _ => None,
        }
    }

    fn set_selection(&mut self, id: TabId) {
        if let Some(previous) = self.selected.take() {
            if let Some(tab) = self.get_mut(previous) {
                tab.deselect();
            }
        }
        if let Some(tab) = self.get_mut(id) {
            tab.select();
            self.selected = Some(id);
        }
    }

    /// Route an engine event to the tab that owns the engine. Events from
    /// engines whose tab is already closed are dropped.
    pub fn dispatch(&mut self, message: EngineMessage) -> Option<(TabId, TabUpdate)> {
        let Some(tab) = self.get_mut(message.engine) else {
            tracing::debug!(engine = %message.engine, "Dropping event for closed tab");
            return None;
        };

        let id = tab.id();
        tab.apply_event(message.event).map(|update| (id, update))
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn contains(&self, id: TabId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id() == id)
    }

    pub fn get(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id() == id)
    }

    pub fn get_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id() == id)
    }

    pub fn selected_id(&self) -> Option<TabId> {
        self.selected
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected.and_then(|id| self.index_of(id))
    }

    pub fn selected(&self) -> Option<&Tab> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn selected_mut(&mut self) -> Option<&mut Tab> {
        let id = self.selected?;
        self.get_mut(id)
    }
}
