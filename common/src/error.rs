//! Error types surfaced by the ledger core.

use thiserror::Error;

/// Main error type for account and ledger operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankError {
    /// An identifier did not resolve to a stored entity.
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    /// The request was rejected before any state was touched.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The persistence collaborator failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl BankError {
    /// An account id that does not resolve.
    pub fn account_not_found(id: impl ToString) -> Self {
        BankError::NotFound {
            resource: "Account",
            id: id.to_string(),
        }
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        BankError::InvalidArgument(message.into())
    }

    /// The amount would take a balance below zero.
    pub fn insufficient_funds() -> Self {
        Self::invalid_argument("Insufficient funds")
    }

    /// Check if this error is retryable.
    ///
    /// Business rejections are final; only collaborator failures may succeed
    /// on a later attempt, and retrying is always the caller's decision.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BankError::Storage(_))
    }

    /// Get error code for boundary responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            BankError::NotFound { .. } => "NOT_FOUND",
            BankError::InvalidArgument(_) => "INVALID_ARGUMENT",
            BankError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Message without the kind prefix, as shown to API callers.
    pub fn message(&self) -> String {
        match self {
            BankError::InvalidArgument(message) | BankError::Storage(message) => message.clone(),
            BankError::NotFound { .. } => self.to_string(),
        }
    }
}

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, BankError>;
