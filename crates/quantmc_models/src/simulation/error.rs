//! Simulation error types.

use quantmc_core::market_data::MarketDataError;
use quantmc_core::types::Date;
use thiserror::Error;

use super::correlated::CorrelationError;
use super::traits::SimulatorState;

/// Errors from simulator configuration, preparation and path queries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// An operation was called in the wrong lifecycle state.
    #[error("{operation} requires state {required}, but the simulator is {current}")]
    InvalidState {
        /// The operation that was attempted
        operation: &'static str,
        /// The state the operation requires
        required: SimulatorState,
        /// The simulator's current state
        current: SimulatorState,
    },

    /// The simulator cannot produce the requested observable.
    #[error("Observable {observable} is not provided by this simulator")]
    UnsupportedObservable {
        /// Display form of the observable
        observable: String,
    },

    /// The observable was never registered before `prepare`.
    #[error("Observable {observable} was not registered before prepare")]
    UnregisteredObservable {
        /// Display form of the observable
        observable: String,
    },

    /// The date was never registered for this query before `prepare`.
    #[error("Date {date} was not registered for {context} before prepare")]
    UnregisteredDate {
        /// What the date was needed for (observable or "numeraire")
        context: String,
        /// The unregistered date
        date: Date,
    },

    /// `prepare` was called with no dates registered.
    #[error("No dates were registered before prepare")]
    NothingRegistered,

    /// A registered date precedes the simulator's value date.
    #[error("Date {date} precedes the value date {value_date}")]
    DateBeforeValueDate {
        /// The offending date
        date: Date,
        /// The simulator's value date
        value_date: Date,
    },

    /// A model parameter violates a constraint.
    #[error("Invalid model parameter: {reason}")]
    InvalidParameter {
        /// Description of the violated constraint
        reason: String,
    },

    /// A market data query failed during simulation.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    /// The correlation matrix failed validation or decomposition.
    #[error(transparent)]
    Correlation(#[from] CorrelationError),
}
