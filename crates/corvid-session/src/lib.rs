//! Corvid Session Management
//!
//! - A session is the ordered list of open tabs (URL + title) plus every cookie
//!   in the engine's cookie jar
//! - Saved on shutdown, restored on startup
//! - Cookies are only written after a complete enumeration of the jar
//! - Anonymous mode swaps in a store that persists nothing

mod collector;
mod cookie;
mod error;
mod manager;
mod session;

pub use collector::{collect_cookies, CookieCollector, DEFAULT_COOKIE_TIMEOUT};
pub use cookie::CookieRecord;
pub use error::SessionError;
pub use manager::{
    AnonymousSessionStore, FileSessionStore, RestoreReport, SaveReport, SessionStore,
    COOKIES_FILE, SESSION_FILE,
};
pub use session::{SessionSnapshot, TabEntry};

pub type Result<T> = std::result::Result<T, SessionError>;
