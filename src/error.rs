//! Error types for the payroll ledger engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the ledger operations can surface. Unparsable amounts
//! are not errors: the amount parser falls back to a configured
//! default instead of failing.

use thiserror::Error;

/// Boxed cause carried by [`LedgerError::Transform`].
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A sum of amounts that does not fit in a `Decimal`.
///
/// Returned by the pure aggregation functions; the file-backed components
/// wrap it in [`LedgerError::Overflow`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("sum of amounts for {scope} exceeds the decimal range")]
pub struct AmountOverflow {
    /// What was being summed, e.g. `employee 'Alice Smith'`.
    pub scope: String,
}

impl AmountOverflow {
    /// Creates an overflow report for `scope`.
    pub fn new(scope: impl Into<String>) -> Self {
        Self { scope: scope.into() }
    }
}

/// The main error type for the payroll ledger engine.
///
/// File-related variants carry the name of the operation that failed and
/// the path it was working on, so the message is useful without a backtrace.
///
/// # Example
///
/// ```
/// use payroll_ledger::error::LedgerError;
///
/// let error = LedgerError::NotFound {
///     operation: "discover_periods",
///     path: "/missing/ledger.json".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "discover_periods: file not found: /missing/ledger.json"
/// );
/// ```
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A required argument was missing or empty.
    #[error("Invalid argument '{field}': {message}")]
    Validation {
        /// The argument that failed validation.
        field: String,
        /// A description of the problem.
        message: String,
    },

    /// A referenced file does not exist.
    #[error("{operation}: file not found: {path}")]
    NotFound {
        /// The operation that needed the file.
        operation: &'static str,
        /// The path that was not found.
        path: String,
    },

    /// A well-formed document is missing a node the operation requires.
    #[error("{operation}: document '{path}' has no '{node}' node")]
    Structural {
        /// The operation that inspected the document.
        operation: &'static str,
        /// The path of the document.
        path: String,
        /// The name of the missing node.
        node: String,
    },

    /// The transformation engine failed.
    #[error("{operation}: transformation of '{path}' failed: {source}")]
    Transform {
        /// The operation that ran the transformation.
        operation: &'static str,
        /// The input or definition path involved.
        path: String,
        /// The underlying cause.
        #[source]
        source: BoxedCause,
    },

    /// A payment for the same employee and period is already recorded.
    #[error("Payment already recorded for {name} {surname} in period '{period}'")]
    Conflict {
        /// Employee first name.
        name: String,
        /// Employee surname.
        surname: String,
        /// The duplicated period label.
        period: String,
    },

    /// A document could not be parsed.
    #[error("{operation}: failed to parse document '{path}': {source}")]
    Parse {
        /// The operation that loaded the document.
        operation: &'static str,
        /// The path of the document.
        path: String,
        /// The JSON parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing a file failed.
    #[error("{operation}: I/O failure on '{path}': {source}")]
    Io {
        /// The operation that touched the file.
        operation: &'static str,
        /// The path involved.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A sum of ledger amounts left the range of `Decimal`.
    #[error("{operation}: {source} in '{path}'")]
    Overflow {
        /// The operation that summed the amounts.
        operation: &'static str,
        /// The path of the document.
        path: String,
        /// What was being summed.
        #[source]
        source: AmountOverflow,
    },

    /// A configuration file could not be parsed or failed validation.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParse {
        /// The path to the configuration file.
        path: String,
        /// A description of the problem.
        message: String,
    },
}

impl LedgerError {
    /// Builds a [`LedgerError::Validation`] for the given argument.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Builds a [`LedgerError::Overflow`] for the document at `path`.
    pub fn overflow(
        operation: &'static str,
        path: impl Into<String>,
        source: AmountOverflow,
    ) -> Self {
        Self::Overflow {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Builds a [`LedgerError::Transform`] from any error-like cause.
    pub fn transform(
        operation: &'static str,
        path: impl Into<String>,
        source: impl Into<BoxedCause>,
    ) -> Self {
        Self::Transform {
            operation,
            path: path.into(),
            source: source.into(),
        }
    }
}

/// A type alias for Results that return LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;
