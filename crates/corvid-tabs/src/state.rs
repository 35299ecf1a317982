//! Tab loading state machine
//!
//! ```text
//! Idle
//!   ↓ navigate / reload / engine starts loading
//! Loading
//!   ↓ load finished / navigation error
//! Idle
//! ```
//!
//! Selection is tracked separately and is orthogonal to loading.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    /// Nothing in flight; the engine shows its last committed page
    #[default]
    Idle,
    /// A navigation, reload or history move is in progress
    Loading,
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::Idle => "idle",
            LoadState::Loading => "loading",
        }
    }
}

impl From<bool> for LoadState {
    fn from(is_loading: bool) -> Self {
        if is_loading {
            LoadState::Loading
        } else {
            LoadState::Idle
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
