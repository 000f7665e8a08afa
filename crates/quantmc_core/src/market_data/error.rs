//! Market data error types.
//!
//! Construction-time validation failures and out-of-domain queries for
//! curves and other market data sources.

use crate::types::Date;
use thiserror::Error;

/// Market data operation errors.
///
/// Validation errors are raised synchronously at construction time and
/// never coerced; domain errors are raised at the query site.
///
/// # Examples
///
/// ```
/// use quantmc_core::market_data::MarketDataError;
///
/// let err = MarketDataError::LengthMismatch { dates: 3, values: 2 };
/// assert!(format!("{}", err).contains("3"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// A date precedes the source's anchor date.
    #[error("Date {date} is before the anchor date {anchor}")]
    BeforeAnchor {
        /// The offending date
        date: Date,
        /// The source's anchor date
        anchor: Date,
    },

    /// Dates are not strictly increasing.
    #[error("Dates must be strictly increasing (violation at index {index})")]
    NonIncreasingDates {
        /// Index of the first out-of-order date
        index: usize,
    },

    /// Parallel arrays have different lengths.
    #[error("Dates and values must have the same length: {dates} dates, {values} values")]
    LengthMismatch {
        /// Number of dates provided
        dates: usize,
        /// Number of values provided
        values: usize,
    },

    /// Query date outside the source's supported domain.
    #[error("Date {date} is outside the curve domain [{min}, {max}]")]
    OutOfDomain {
        /// The query date
        date: Date,
        /// Earliest supported date
        min: Date,
        /// Latest supported date
        max: Date,
    },

    /// Not enough data points for construction.
    #[error("Insufficient data: got {got}, need {need}")]
    InsufficientData {
        /// Number of points provided
        got: usize,
        /// Minimum number of points required
        need: usize,
    },

    /// An input value violates a constraint.
    #[error("Invalid value: {reason}")]
    InvalidValue {
        /// Description of the violated constraint
        reason: String,
    },
}
