//! Error hierarchy for the recommendation engine
//!
//! Errors are raised synchronously by the calculators and the orchestrator and
//! surface to the caller unchanged. Degenerate history (no runs, no runs at an
//! effort level) is never an error; it is resolved by the documented fallbacks.

use thiserror::Error;

/// Top-level error type for all nextrun operations
#[derive(Debug, Error)]
pub enum NextRunError {
    /// Caller supplied an unusable argument (e.g. a blank user id)
    #[error("Invalid argument {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    /// The history provider has no record of this user
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: String },

    /// Calculation errors
    #[error("Calculation error: {0}")]
    Calculation(#[from] CalculationError),

    /// Run history provider errors
    #[error("History provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Rule configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Errors raised by the pure calculators
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalculationError {
    /// A bounded value fell outside its permitted range
    #[error("{field} must be between {min} and {max} inclusive, got {value}")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Invalid parameter
    #[error("Invalid parameter {parameter}: {reason}")]
    InvalidArgument { parameter: String, reason: String },

    /// Numerical overflow
    #[error("Numerical overflow in {calculation}")]
    Overflow { calculation: String },
}

/// Errors raised by a run history provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Backing store could not be reached
    #[error("History unavailable: {reason}")]
    Unavailable { reason: String },

    /// Stored history could not be decoded
    #[error("Corrupt history: {reason}")]
    Corrupt { reason: String },
}

/// Result type alias for nextrun operations
pub type Result<T> = std::result::Result<T, NextRunError>;

impl NextRunError {
    /// Check if error is retryable by the caller
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NextRunError::Provider(ProviderError::Unavailable { .. })
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            NextRunError::InvalidArgument { .. } => ErrorSeverity::Warning,
            NextRunError::UserNotFound { .. } => ErrorSeverity::Warning,
            NextRunError::Calculation(_) => ErrorSeverity::Warning,
            NextRunError::Provider(_) => ErrorSeverity::Error,
            NextRunError::Configuration(_) => ErrorSeverity::Critical,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            NextRunError::UserNotFound { user_id } => {
                format!("No run history is registered for '{}'", user_id)
            }
            NextRunError::Provider(ProviderError::Unavailable { .. }) => {
                "Run history is temporarily unavailable. Please try again.".to_string()
            }
            NextRunError::Configuration(reason) => {
                format!("The recommendation rules are misconfigured: {}", reason)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}
