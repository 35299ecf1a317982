//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] corvid_storage::StorageError),

    #[error("Tab error: {0}")]
    Tab(#[from] corvid_tabs::TabError),

    #[error("Session error: {0}")]
    Session(#[from] corvid_session::SessionError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] corvid_navigation::NavigationError),

    #[error("Gesture error: {0}")]
    Gesture(#[from] crate::gesture::GestureError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Stale command from generation {issued} (current {current})")]
    StaleCommand { issued: u64, current: u64 },
}
