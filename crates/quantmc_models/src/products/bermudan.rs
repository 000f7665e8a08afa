//! Bermudan swaption: the right to enter a swap on a set of dates.

use quantmc_core::market_data::Observable;
use quantmc_core::types::{Currency, Date};

use super::cashflow::{Cashflow, Fixings};
use super::error::ProductError;
use super::swap::InterestRateSwap;
use super::traits::{check_parallel, check_schedule, EarlyExercise, Product};

/// An option to enter an interest rate swap at any one of a set of
/// exercise dates.
///
/// The swaption itself pays nothing: its whole value lies in the
/// optionality, so `cashflows` is empty and valuation goes through the
/// early-exercise machinery. Exercising at `exercise_dates[i]` delivers
/// `underlying_swaps[i]`, normally the same swap truncated to its
/// remaining periods (see [`InterestRateSwap::truncated_from`]).
#[derive(Clone, Debug)]
pub struct BermudanSwaption {
    exercise_dates: Vec<Date>,
    underlying_swaps: Vec<InterestRateSwap>,
}

impl BermudanSwaption {
    /// Creates a swaption from exercise dates and the swap delivered at
    /// each.
    pub fn new(
        exercise_dates: Vec<Date>,
        underlying_swaps: Vec<InterestRateSwap>,
    ) -> Result<Self, ProductError> {
        check_schedule(&exercise_dates)?;
        check_parallel(
            "underlying_swaps",
            exercise_dates.len(),
            underlying_swaps.len(),
        )?;
        let currency = underlying_swaps[0].currency();
        if underlying_swaps.iter().any(|s| s.currency() != currency) {
            return Err(ProductError::InvalidValue {
                reason: "All underlying swaps must share one currency".to_string(),
            });
        }
        Ok(Self {
            exercise_dates,
            underlying_swaps,
        })
    }

    /// A swaption on one swap, exercising into its remaining periods at
    /// each exercise date.
    pub fn on_swap(
        exercise_dates: Vec<Date>,
        swap: &InterestRateSwap,
    ) -> Result<Self, ProductError> {
        let swaps = exercise_dates
            .iter()
            .map(|&date| swap.truncated_from(date))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(exercise_dates, swaps)
    }
}

impl Product for BermudanSwaption {
    fn currency(&self) -> Currency {
        self.underlying_swaps[0].currency()
    }

    fn required_observables(&self) -> Vec<Observable> {
        Vec::new()
    }

    fn observation_dates(&self, _observable: &Observable) -> Vec<Date> {
        Vec::new()
    }

    fn cashflow_dates(&self) -> Vec<Date> {
        Vec::new()
    }

    fn last_date(&self) -> Date {
        self.underlying_swaps
            .iter()
            .map(|s| s.last_date())
            .max()
            .expect("at least one underlying swap")
    }

    fn cashflows(&self, _fixings: &Fixings) -> Result<Vec<Cashflow>, ProductError> {
        Ok(Vec::new())
    }

    fn clone_box(&self) -> Box<dyn Product> {
        Box::new(self.clone())
    }
}

impl EarlyExercise for BermudanSwaption {
    fn exercise_dates(&self) -> Vec<Date> {
        self.exercise_dates.clone()
    }

    fn post_exercise_products(&self) -> Vec<Box<dyn Product>> {
        self.underlying_swaps
            .iter()
            .map(|s| s.clone_box())
            .collect()
    }

    fn post_exercise_product_index(&self, date: Date) -> Option<usize> {
        self.exercise_dates.iter().position(|&d| d == date)
    }

    fn is_long_optionality(&self, _date: Date) -> bool {
        true
    }
}
