use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid feedback: {0}")]
    InvalidFeedback(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
