use std::path::PathBuf;

use shared::error::ValidationError;
use thiserror::Error;

/// Where a failure sits in the user-facing error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request never produced a response, or the response was unreadable.
    Transport,
    /// The backend answered with a non-success status.
    Status,
    /// A referenced entity does not exist. Tolerated without a notification.
    Missing,
    /// Rejected locally before anything was sent.
    Rejected,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{method} {url} returned status {status}")]
    Status {
        method: String,
        url: String,
        status: u16,
    },
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid store url: {0}")]
    Url(#[from] url::ParseError),
    #[error("the static catalog is read-only")]
    ReadOnly,
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            StoreError::Transport(_) | StoreError::Decode(_) | StoreError::Io { .. } => {
                ErrorClass::Transport
            }
            StoreError::Status { .. } => ErrorClass::Status,
            StoreError::NotFound { .. } => ErrorClass::Missing,
            StoreError::Url(_) | StoreError::ReadOnly | StoreError::Validation(_) => {
                ErrorClass::Rejected
            }
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
