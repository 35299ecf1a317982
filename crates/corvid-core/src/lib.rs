//! Corvid Core
//!
//! Central coordination layer for the Corvid browser. The [`Browser`] owns the
//! tab strip, the command router and the address bar, and wires them to the
//! session, history and bookmark stores.

mod bookmarks;
mod browser;
mod commands;
mod config;
mod error;
mod gesture;

pub use bookmarks::{Bookmark, BookmarkStore, MemoryBookmarks, SettingsBookmarks};
pub use browser::{Browser, CommandOutcome, HISTORY_LIMIT};
pub use commands::{Action, BindingDiagnostic, BoundCommand, CommandRouter};
pub use config::{
    Config, ConfigProvider, FileConfigProvider, GeneralSettings, MemoryConfigProvider, Settings,
    CONFIG_FILE, DEFAULT_HOME_URL,
};
pub use error::CoreError;
pub use gesture::{GestureError, Key, KeyGesture, Modifiers};

// Re-export core components
pub use corvid_engine::{CookieStore, EngineFactory, EngineId};
pub use corvid_navigation::{HistoryEntry, NavigationError, UrlResolver};
pub use corvid_session::{SaveReport, SessionError};
pub use corvid_storage::{Database, StorageError};
pub use corvid_tabs::{CloseOutcome, LoadState, Tab, TabError, TabId, TabUpdate};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging. An explicit `level` wins over `RUST_LOG`; the default
/// is `info`.
pub fn init_logging(level: Option<&str>) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = level
        .and_then(|level| EnvFilter::try_new(level).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
