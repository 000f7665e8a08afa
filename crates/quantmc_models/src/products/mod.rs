//! Product contracts: the abstraction a payoff must satisfy to be
//! valued, plus the concrete legs and swaps.

pub mod bermudan;
pub mod cashflow;
pub mod cds;
pub mod error;
pub mod fixed_leg;
pub mod float_leg;
pub mod swap;
pub mod traits;

pub use bermudan::BermudanSwaption;
pub use cashflow::{Cashflow, Fixings};
pub use cds::Cds;
pub use error::ProductError;
pub use fixed_leg::FixedLeg;
pub use float_leg::FloatLeg;
pub use swap::InterestRateSwap;
pub use traits::{EarlyExercise, Product};
