//! Session snapshot

use corvid_tabs::Tab;
use serde::{Deserialize, Serialize};

/// One saved tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabEntry {
    pub url: String,
    pub title: String,
}

impl TabEntry {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// Point-in-time copy of the tab strip, in display order. Holds no reference
/// to live tabs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionSnapshot {
    entries: Vec<TabEntry>,
}

impl SessionSnapshot {
    pub fn new(entries: Vec<TabEntry>) -> Self {
        Self { entries }
    }

    /// Capture URL (as the engine reports it) and header of each tab.
    pub fn capture<'a>(tabs: impl IntoIterator<Item = &'a Tab>) -> Self {
        let entries = tabs
            .into_iter()
            .map(|tab| TabEntry::new(tab.current_url(), tab.header()))
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[TabEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TabEntry> {
        self.entries.iter()
    }
}

impl IntoIterator for SessionSnapshot {
    type Item = TabEntry;
    type IntoIter = std::vec::IntoIter<TabEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
