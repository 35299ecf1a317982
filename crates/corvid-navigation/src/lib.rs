//! Corvid Navigation
//!
//! - Address bar resolution, first match wins:
//!   1. blank → `about:blank`
//!   2. `about:` / `file://` → as typed
//!   3. absolute URL → as typed
//!   4. bare host or IP → `https://`
//!   5. dotted text without spaces → `https://`
//!   6. anything else → search
//! - Browsing history, persisted in SQLite or kept nowhere (anonymous mode)

mod error;
mod history;
mod input;

pub use error::NavigationError;
pub use history::{AnonymousHistory, HistoryEntry, HistoryManager, HistoryStore};
pub use input::{UrlResolver, DEFAULT_SEARCH_TEMPLATE};

pub type Result<T> = std::result::Result<T, NavigationError>;
