//! Import error types.

use thiserror::Error;

use conciliar_shared::AppError;

/// A parse failure located in the source file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Line {line}, field {field}: {message}")]
pub struct ImportError {
    /// 1-based line number.
    pub line: usize,
    /// Tag or column that failed.
    pub field: String,
    /// What went wrong.
    pub message: String,
}

impl ImportError {
    /// Creates a new import error.
    pub fn new(line: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for reports and logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        "IMPORT_PARSE_ERROR"
    }
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        Self::Validation(err.to_string())
    }
}
