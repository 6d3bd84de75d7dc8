use thiserror::Error;

use super::status::SessionStatus;

/// Status transition errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The requested transition is not an edge of the session state graph
    #[error("invalid status transition from {} to {}", .from.name(), .to.name())]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },
}

/// Result type for status operations
pub type StateResult<T> = Result<T, StateError>;
