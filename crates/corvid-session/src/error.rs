//! Session error types

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Engine error: {0}")]
    Engine(#[from] corvid_engine::EngineError),

    #[error("Cookie enumeration ended after {visited} of {total} cookies")]
    IncompleteCookieEnumeration { visited: usize, total: usize },

    #[error("Cookie enumeration did not complete within {0:?}")]
    CookieTimeout(Duration),

    #[error("Cookie store is unavailable")]
    CookieStoreUnavailable,
}
