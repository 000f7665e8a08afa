//! The product contract and its early-exercise extension.
//!
//! A product is immutable after construction. It declares the
//! observables it depends on and the dates it needs them at, so the
//! valuation engine can register simulator requirements before
//! `prepare`; given the realised [`Fixings`] of one path it produces the
//! contractual cashflows for that path.

use quantmc_core::market_data::Observable;
use quantmc_core::types::{Currency, Date};

use super::cashflow::{Cashflow, Fixings};
use super::error::ProductError;

/// A derivative product that can be valued by path simulation.
pub trait Product: Send + Sync {
    /// The currency the product's cashflows are paid in.
    fn currency(&self) -> Currency;

    /// Every observable the cashflows depend on.
    fn required_observables(&self) -> Vec<Observable>;

    /// The dates `observable` must be known at to generate cashflows.
    ///
    /// Empty for observables the product does not depend on.
    fn observation_dates(&self, observable: &Observable) -> Vec<Date>;

    /// The ordered dates on which cashflows can occur.
    fn cashflow_dates(&self) -> Vec<Date>;

    /// The latest date the product can pay or observe on.
    fn last_date(&self) -> Date;

    /// The realised cashflows given one path's fixings.
    fn cashflows(&self, fixings: &Fixings) -> Result<Vec<Cashflow>, ProductError>;

    /// Clones the product behind the trait object.
    fn clone_box(&self) -> Box<dyn Product>;
}

impl Clone for Box<dyn Product> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A product the holder may terminate into another product at given
/// dates.
pub trait EarlyExercise: Product {
    /// The ordered dates at which exercise can occur.
    fn exercise_dates(&self) -> Vec<Date>;

    /// The candidate products received on exercise.
    fn post_exercise_products(&self) -> Vec<Box<dyn Product>>;

    /// Index into [`EarlyExercise::post_exercise_products`] for an
    /// exercise at `date`, or `None` when `date` is not an exercise
    /// date.
    fn post_exercise_product_index(&self, date: Date) -> Option<usize>;

    /// Whether the decision at `date` is holder-optimal
    /// (`max(exercise, continuation)`) rather than mandatory.
    fn is_long_optionality(&self, date: Date) -> bool;
}

/// Validates that a schedule field runs parallel to the payment dates.
pub(crate) fn check_parallel(
    field: &'static str,
    expected: usize,
    got: usize,
) -> Result<(), ProductError> {
    if got != expected {
        return Err(ProductError::LengthMismatch {
            field,
            expected,
            got,
        });
    }
    Ok(())
}

/// Validates that dates are strictly increasing and non-empty.
pub(crate) fn check_schedule(dates: &[Date]) -> Result<(), ProductError> {
    if dates.is_empty() {
        return Err(ProductError::EmptySchedule);
    }
    for i in 1..dates.len() {
        if dates[i] <= dates[i - 1] {
            return Err(ProductError::NonIncreasingDates { index: i });
        }
    }
    Ok(())
}
