use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid ticket id: {0}")]
    InvalidTicketId(String),
    #[error("ticket not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Backend(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("analysis error: {0}")]
    Analysis(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Only transport failures are worth a manual retry; everything else
    /// needs the user to change their input or setup first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Network(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
