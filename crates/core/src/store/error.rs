//! Persistence error types.

use thiserror::Error;

use conciliar_shared::{AppError, ExternalServiceKind};

/// Errors reported by a workflow store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The referenced row does not exist for the tenant.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The write conflicts with stored state (duplicate, already decided).
    #[error("Rejected by store: {0}")]
    Validation(String),

    /// The backend could not be reached or failed mid-operation.
    #[error("Store transport failure: {0}")]
    Transport(String),
}

impl StoreError {
    /// Returns the error code for reports and logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "STORE_NOT_FOUND",
            Self::Validation(_) => "STORE_VALIDATION",
            Self::Transport(_) => "STORE_TRANSPORT",
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(message) => Self::NotFound(message),
            StoreError::Validation(message) => Self::Validation(message),
            StoreError::Transport(message) => Self::ExternalService {
                kind: ExternalServiceKind::Transient,
                message,
            },
        }
    }
}
