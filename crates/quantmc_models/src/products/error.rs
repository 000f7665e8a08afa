//! Product construction and cashflow errors.

use quantmc_core::types::Date;
use thiserror::Error;

/// Errors from product construction and cashflow generation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProductError {
    /// A product was constructed with no periods.
    #[error("Product schedule must have at least one period")]
    EmptySchedule,

    /// Parallel schedule arrays have different lengths.
    #[error("Schedule field {field} has {got} entries, expected {expected}")]
    LengthMismatch {
        /// The offending field
        field: &'static str,
        /// The expected entry count
        expected: usize,
        /// The provided entry count
        got: usize,
    },

    /// Schedule dates are not strictly increasing.
    #[error("Schedule dates must be strictly increasing (violation at index {index})")]
    NonIncreasingDates {
        /// Index of the first out-of-order date
        index: usize,
    },

    /// An input value violates a constraint.
    #[error("Invalid value: {reason}")]
    InvalidValue {
        /// Description of the violated constraint
        reason: String,
    },

    /// A fixing the product depends on was not supplied.
    #[error("Missing fixing for {observable} at {date}")]
    MissingFixing {
        /// Display form of the observable
        observable: String,
        /// The date the fixing was needed at
        date: Date,
    },
}
