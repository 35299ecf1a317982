//! Corvid Tab Management
//!
//! A [`Tab`] owns exactly one engine instance and mirrors its observable state.
//! The [`TabRegistry`] keeps the tab strip in order and is the single owner of
//! the selection: at most one tab is selected, and exactly one whenever the
//! registry is non-empty.

mod error;
mod registry;
mod state;
mod tab;

pub use error::TabError;
pub use registry::{CloseOutcome, TabRegistry, DEFAULT_TAB_URL};
pub use state::LoadState;
pub use tab::{NavigationFailure, Tab, TabId, TabUpdate, DEFAULT_HEADER};

pub type Result<T> = std::result::Result<T, TabError>;
