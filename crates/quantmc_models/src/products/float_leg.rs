//! Floating leg: coupons set from an index fixing.

use quantmc_core::market_data::{FloatingIndex, Observable};
use quantmc_core::types::{Currency, Date};

use super::cashflow::{Cashflow, Fixings};
use super::error::ProductError;
use super::traits::{check_parallel, check_schedule, Product};

/// A leg paying `notional * (fixing + spread) * accrual_fraction` on each
/// payment date, where the fixing of the index is observed on the
/// period's reset date.
#[derive(Clone, Debug)]
pub struct FloatLeg {
    index: FloatingIndex,
    payment_dates: Vec<Date>,
    reset_dates: Vec<Date>,
    notionals: Vec<f64>,
    spreads: Vec<f64>,
    accrual_fractions: Vec<f64>,
}

impl FloatLeg {
    /// Creates a floating leg from parallel schedule arrays.
    ///
    /// Each reset date must not be after its payment date.
    pub fn new(
        index: FloatingIndex,
        payment_dates: Vec<Date>,
        reset_dates: Vec<Date>,
        notionals: Vec<f64>,
        spreads: Vec<f64>,
        accrual_fractions: Vec<f64>,
    ) -> Result<Self, ProductError> {
        check_schedule(&payment_dates)?;
        check_schedule(&reset_dates)?;
        check_parallel("reset_dates", payment_dates.len(), reset_dates.len())?;
        check_parallel("notionals", payment_dates.len(), notionals.len())?;
        check_parallel("spreads", payment_dates.len(), spreads.len())?;
        check_parallel(
            "accrual_fractions",
            payment_dates.len(),
            accrual_fractions.len(),
        )?;
        for (i, (&reset, &payment)) in reset_dates.iter().zip(&payment_dates).enumerate() {
            if reset > payment {
                return Err(ProductError::InvalidValue {
                    reason: format!(
                        "Reset date {} after payment date {} at index {}",
                        reset, payment, i
                    ),
                });
            }
        }
        Ok(Self {
            index,
            payment_dates,
            reset_dates,
            notionals,
            spreads,
            accrual_fractions,
        })
    }

    /// The index the leg resets against.
    pub fn index(&self) -> &FloatingIndex {
        &self.index
    }
}

impl Product for FloatLeg {
    fn currency(&self) -> Currency {
        self.index.currency()
    }

    fn required_observables(&self) -> Vec<Observable> {
        vec![Observable::Index(self.index.clone())]
    }

    fn observation_dates(&self, observable: &Observable) -> Vec<Date> {
        if *observable == Observable::Index(self.index.clone()) {
            self.reset_dates.clone()
        } else {
            Vec::new()
        }
    }

    fn cashflow_dates(&self) -> Vec<Date> {
        self.payment_dates.clone()
    }

    fn last_date(&self) -> Date {
        *self.payment_dates.last().expect("schedule is non-empty")
    }

    fn cashflows(&self, fixings: &Fixings) -> Result<Vec<Cashflow>, ProductError> {
        let observable = Observable::Index(self.index.clone());
        let mut flows = Vec::with_capacity(self.payment_dates.len());
        for (i, &date) in self.payment_dates.iter().enumerate() {
            let fixing = fixings.get(&observable, self.reset_dates[i])?;
            let amount =
                self.notionals[i] * (fixing + self.spreads[i]) * self.accrual_fractions[i];
            flows.push(Cashflow::new(date, amount, self.currency()));
        }
        Ok(flows)
    }

    fn clone_box(&self) -> Box<dyn Product> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn leg() -> FloatLeg {
        FloatLeg::new(
            FloatingIndex::jibar_3m(),
            vec![d(2020, 3, 1), d(2020, 6, 1)],
            vec![d(2019, 12, 1), d(2020, 3, 1)],
            vec![1_000_000.0, 1_000_000.0],
            vec![0.0, 0.001],
            vec![0.25, 0.25],
        )
        .unwrap()
    }

    #[test]
    fn test_cashflows_from_fixings() {
        let leg = leg();
        let jibar = Observable::Index(FloatingIndex::jibar_3m());
        let mut fixings = Fixings::new();
        fixings.insert(jibar.clone(), d(2019, 12, 1), 0.07);
        fixings.insert(jibar, d(2020, 3, 1), 0.075);

        let flows = leg.cashflows(&fixings).unwrap();
        assert_relative_eq!(flows[0].amount, 1_000_000.0 * 0.07 * 0.25);
        assert_relative_eq!(flows[1].amount, 1_000_000.0 * 0.076 * 0.25);
    }

    #[test]
    fn test_missing_fixing_is_an_error() {
        let leg = leg();
        assert!(matches!(
            leg.cashflows(&Fixings::new()),
            Err(ProductError::MissingFixing { .. })
        ));
    }

    #[test]
    fn test_observation_dates_are_reset_dates() {
        let leg = leg();
        let jibar = Observable::Index(FloatingIndex::jibar_3m());
        assert_eq!(leg.observation_dates(&jibar), vec![d(2019, 12, 1), d(2020, 3, 1)]);
        assert_eq!(leg.required_observables(), vec![jibar]);
    }

    #[test]
    fn test_reset_after_payment_rejected() {
        assert!(FloatLeg::new(
            FloatingIndex::jibar_3m(),
            vec![d(2020, 3, 1)],
            vec![d(2020, 4, 1)],
            vec![1.0],
            vec![0.0],
            vec![0.25],
        )
        .is_err());
    }
}
