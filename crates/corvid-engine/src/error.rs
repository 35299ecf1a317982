//! Engine error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Time out of engine range: {0}")]
    TimeOutOfRange(String),
}
