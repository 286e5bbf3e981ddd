//! Error taxonomy for the analysis core
//!
//! Every variant aborts the operation that raised it and reaches the caller
//! unmodified. Non-converged regression fits are not errors; they surface as a
//! [`ConvergenceWarning`](crate::regression::ConvergenceWarning) attached to
//! the returned model.

use thiserror::Error;

/// Errors raised by the analysis core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// A required field is missing, blank or malformed
    #[error("Schema error: {0}")]
    Schema(String),

    /// A categorical field holds a value outside its two expected categories
    #[error("Encoding error: field '{field}' has unexpected value '{value}' (expected {expected})")]
    Encoding {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    /// Chi-square precondition violated (non-positive expected frequency)
    #[error("Degenerate contingency table: {0}")]
    DegenerateTable(String),

    /// Regression precondition violated (rank deficiency, single-class outcome)
    #[error("Degenerate regression input: {0}")]
    DegenerateInput(String),

    /// A configuration value is out of range or refers to unknown data
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
