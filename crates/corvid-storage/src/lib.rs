//! Corvid Storage Layer
//!
//! SQLite-backed persistence for browsing history and small settings blobs.
//! Session and cookie snapshots live in plain JSON files and are handled by
//! `corvid-session`, not here.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
