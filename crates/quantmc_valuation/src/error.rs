//! Error taxonomy for the valuation engine.

use quantmc_core::types::{CurrencyError, Date};
use quantmc_models::products::ProductError;
use quantmc_models::simulation::SimulationError;
use thiserror::Error;

/// Errors arising while configuring or running a valuation.
#[derive(Debug, Error)]
pub enum ValuationError {
    /// A settings field was missing or out of range.
    #[error("Invalid setting {name}: {reason}")]
    InvalidSettings {
        /// Field name
        name: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// The portfolio to value contains no products.
    #[error("The portfolio contains no products")]
    EmptyPortfolio,

    /// The simulator cannot produce a required observable.
    #[error("The simulator does not provide {observable}")]
    UnsupportedObservable {
        /// Display form of the missing observable
        observable: String,
    },

    /// An early-exercise product has no exercise dates.
    #[error("The product has no exercise dates")]
    NoExerciseDates,

    /// An exercise date has no corresponding post-exercise product.
    #[error("No post-exercise product is registered for exercise date {date}")]
    NoPostExerciseProduct {
        /// The unmapped exercise date
        date: Date,
    },

    /// The exposure date grid was empty or out of order.
    #[error("Invalid exposure dates: {reason}")]
    InvalidExposureDates {
        /// What was wrong with the grid
        reason: String,
    },

    /// A cross-sectional regression could not be solved.
    #[error("Regression failed: {reason}")]
    RegressionFailed {
        /// Why the normal equations could not be solved
        reason: String,
    },

    /// A simulator call failed.
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    /// Product construction or cashflow generation failed.
    #[error(transparent)]
    Product(#[from] ProductError),

    /// A currency pair could not be formed.
    #[error(transparent)]
    Currency(#[from] CurrencyError),
}
