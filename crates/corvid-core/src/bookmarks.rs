use corvid_storage::Database;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::Result;

const BOOKMARKS_KEY: &str = "bookmarks";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub title: String,
    pub url: String,
}

impl Bookmark {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Insert or update by URL. Returns true if the bookmark is new.
fn upsert(bookmarks: &mut Vec<Bookmark>, bookmark: Bookmark) -> bool {
    if let Some(existing) = bookmarks.iter_mut().find(|b| b.url == bookmark.url) {
        *existing = bookmark;
        false
    } else {
        bookmarks.push(bookmark);
        true
    }
}

pub trait BookmarkStore: Send + Sync {
    fn list(&self) -> Result<Vec<Bookmark>>;

    /// Add a bookmark, replacing any with the same URL. Returns true if new.
    fn add(&self, bookmark: Bookmark) -> Result<bool>;

    /// Returns true if a bookmark was removed.
    fn remove(&self, url: &str) -> Result<bool>;
}

/// Bookmarks stored as a JSON list in the settings table.
pub struct SettingsBookmarks {
    db: Database,
}

impl SettingsBookmarks {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn save(&self, bookmarks: &[Bookmark]) -> Result<()> {
        self.db.set_json(BOOKMARKS_KEY, bookmarks)?;
        Ok(())
    }
}

impl BookmarkStore for SettingsBookmarks {
    fn list(&self) -> Result<Vec<Bookmark>> {
        Ok(self.db.get_json(BOOKMARKS_KEY)?.unwrap_or_default())
    }

    fn add(&self, bookmark: Bookmark) -> Result<bool> {
        let mut bookmarks = self.list()?;
        let added = upsert(&mut bookmarks, bookmark);
        self.save(&bookmarks)?;
        Ok(added)
    }

    fn remove(&self, url: &str) -> Result<bool> {
        let mut bookmarks = self.list()?;
        let before = bookmarks.len();
        bookmarks.retain(|bookmark| bookmark.url != url);

        if bookmarks.len() == before {
            return Ok(false);
        }
        self.save(&bookmarks)?;
        Ok(true)
    }
}

/// Bookmarks for anonymous mode, gone when the browser exits.
#[derive(Default)]
pub struct MemoryBookmarks {
    bookmarks: Mutex<Vec<Bookmark>>,
}

impl MemoryBookmarks {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BookmarkStore for MemoryBookmarks {
    fn list(&self) -> Result<Vec<Bookmark>> {
        Ok(self.bookmarks.lock().clone())
    }

    fn add(&self, bookmark: Bookmark) -> Result<bool> {
        Ok(upsert(&mut self.bookmarks.lock(), bookmark))
    }

    fn remove(&self, url: &str) -> Result<bool> {
        let mut bookmarks = self.bookmarks.lock();
        let before = bookmarks.len();
        bookmarks.retain(|bookmark| bookmark.url != url);
        Ok(bookmarks.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_bookmarks() {
        let store = SettingsBookmarks::new(Database::open_in_memory().unwrap());
        assert!(store.list().unwrap().is_empty());

        assert!(store.add(Bookmark::new("Rust", "https://rust-lang.org/")).unwrap());
        assert!(!store
            .add(Bookmark::new("Rust Lang", "https://rust-lang.org/"))
            .unwrap());

        let bookmarks = store.list().unwrap();
        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks[0].title, "Rust Lang");

        assert!(store.remove("https://rust-lang.org/").unwrap());
        assert!(!store.remove("https://rust-lang.org/").unwrap());
    }

    #[test]
    fn test_memory_bookmarks() {
        let store = MemoryBookmarks::new();
        store.add(Bookmark::new("A", "https://a.test/")).unwrap();
        store.add(Bookmark::new("B", "https://b.test/")).unwrap();

        assert_eq!(store.list().unwrap().len(), 2);
        assert!(store.remove("https://a.test/").unwrap());
        assert_eq!(store.list().unwrap()[0].url, "https://b.test/");
    }
}
