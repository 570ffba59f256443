use thiserror::Error;

/// Every failure the engine can report. None of them are fatal; the caller
/// decides how to proceed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error("no connection from '{from}' to '{to}'")]
    ConnectionNotFound { from: String, to: String },

    #[error("user '{0}' already exists")]
    DuplicateUser(String),

    #[error("'{from}' and '{to}' are already connected")]
    DuplicateConnection { from: String, to: String },

    #[error("user '{0}' cannot be connected to itself")]
    SelfLoop(String),

    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    #[error("graph contains a negative weight cycle")]
    NegativeCycle,
}

pub type Result<T> = std::result::Result<T, GraphError>;
