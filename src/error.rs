//! Error types for the Deduction Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during deduction and benefit
//! calculation. Every error is fatal: the engine is pure, so retrying the
//! same input yields the same error.

use thiserror::Error;

use crate::config::RateCategory;
use crate::models::Month;

/// The main error type for the Deduction Engine.
///
/// # Example
///
/// ```
/// use fradrag_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/table.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/table.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A month in the calculation period broke a precondition of the
    /// selected deduction strategy.
    #[error("Precondition violated for {month}: {message}")]
    PreconditionViolation {
        /// The offending month.
        month: Month,
        /// A description of the violated precondition.
        message: String,
    },

    /// A deduction record could not be constructed.
    #[error("Invalid deduction: {message}")]
    InvalidDeduction {
        /// A description of what made the deduction invalid.
        message: String,
    },

    /// A period was empty, reversed or not aligned to whole months.
    #[error("Invalid period: {message}")]
    InvalidPeriod {
        /// A description of what made the period invalid.
        message: String,
    },

    /// A month number outside 1..=12, or an unparseable month.
    #[error("Invalid month: {value}")]
    InvalidMonth {
        /// The rejected input.
        value: String,
    },

    /// No rate was found for the given category and month.
    #[error("Rate not found for category '{category}' in {month}")]
    RateNotFound {
        /// The requested rate category.
        category: RateCategory,
        /// The month for which the rate was requested.
        month: Month,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
