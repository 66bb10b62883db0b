use std::path::PathBuf;

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Username already exists: {username}")]
    DuplicateUsername { username: String },

    #[error("User not found: {username}")]
    UnknownUser { username: String },

    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Failed to read user store {}: {source}", path.display())]
    StorageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write user store {}: {source}", path.display())]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Password hashing failed: {reason}")]
    Hashing { reason: String },
}

impl StoreError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        StoreError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            StoreError::StorageRead { .. } | StoreError::StorageWrite { .. }
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            StoreError::DuplicateUsername { .. } => StatusCode::CONFLICT,
            StoreError::UnknownUser { .. } => StatusCode::NOT_FOUND,
            StoreError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            StoreError::StorageRead { .. }
            | StoreError::StorageWrite { .. }
            | StoreError::Hashing { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Maps a store failure onto the handlers' rejection type. Storage details
/// stay in the logs.
pub fn reject(e: StoreError) -> (StatusCode, String) {
    let status = e.status();
    if status.is_server_error() {
        tracing::error!(error = %e, "store operation failed");
        (status, "Internal storage error".into())
    } else {
        (status, e.to_string())
    }
}
