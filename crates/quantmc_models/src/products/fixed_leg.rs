//! Fixed leg: known coupons on a payment schedule.

use quantmc_core::market_data::Observable;
use quantmc_core::types::{Currency, Date};

use super::cashflow::{Cashflow, Fixings};
use super::error::ProductError;
use super::traits::{check_parallel, check_schedule, Product};

/// A leg paying `notional * rate * accrual_fraction` on each payment
/// date. No observables are required; the cashflows are known at
/// construction.
#[derive(Clone, Debug)]
pub struct FixedLeg {
    currency: Currency,
    payment_dates: Vec<Date>,
    notionals: Vec<f64>,
    rates: Vec<f64>,
    accrual_fractions: Vec<f64>,
}

impl FixedLeg {
    /// Creates a fixed leg from parallel schedule arrays.
    pub fn new(
        currency: Currency,
        payment_dates: Vec<Date>,
        notionals: Vec<f64>,
        rates: Vec<f64>,
        accrual_fractions: Vec<f64>,
    ) -> Result<Self, ProductError> {
        check_schedule(&payment_dates)?;
        check_parallel("notionals", payment_dates.len(), notionals.len())?;
        check_parallel("rates", payment_dates.len(), rates.len())?;
        check_parallel(
            "accrual_fractions",
            payment_dates.len(),
            accrual_fractions.len(),
        )?;
        Ok(Self {
            currency,
            payment_dates,
            notionals,
            rates,
            accrual_fractions,
        })
    }

    /// A leg with constant notional and rate on the given dates.
    pub fn flat(
        currency: Currency,
        payment_dates: Vec<Date>,
        notional: f64,
        rate: f64,
        accrual_fraction: f64,
    ) -> Result<Self, ProductError> {
        let n = payment_dates.len();
        Self::new(
            currency,
            payment_dates,
            vec![notional; n],
            vec![rate; n],
            vec![accrual_fraction; n],
        )
    }
}

impl Product for FixedLeg {
    fn currency(&self) -> Currency {
        self.currency
    }

    fn required_observables(&self) -> Vec<Observable> {
        Vec::new()
    }

    fn observation_dates(&self, _observable: &Observable) -> Vec<Date> {
        Vec::new()
    }

    fn cashflow_dates(&self) -> Vec<Date> {
        self.payment_dates.clone()
    }

    fn last_date(&self) -> Date {
        *self.payment_dates.last().expect("schedule is non-empty")
    }

    fn cashflows(&self, _fixings: &Fixings) -> Result<Vec<Cashflow>, ProductError> {
        Ok(self
            .payment_dates
            .iter()
            .enumerate()
            .map(|(i, &date)| {
                Cashflow::new(
                    date,
                    self.notionals[i] * self.rates[i] * self.accrual_fractions[i],
                    self.currency,
                )
            })
            .collect())
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

    #[test]
    fn test_cashflows_are_known() {
        let leg = FixedLeg::flat(
            Currency::ZAR,
            vec![d(2020, 3, 1), d(2020, 6, 1)],
            1_000_000.0,
            0.08,
            0.25,
        )
        .unwrap();
        let flows = leg.cashflows(&Fixings::new()).unwrap();
        assert_eq!(flows.len(), 2);
        assert_relative_eq!(flows[0].amount, 20_000.0);
        assert_eq!(flows[1].date, d(2020, 6, 1));
        assert!(leg.required_observables().is_empty());
    }

    #[test]
    fn test_construction_validation() {
        assert!(matches!(
            FixedLeg::new(Currency::ZAR, vec![], vec![], vec![], vec![]),
            Err(ProductError::EmptySchedule)
        ));
        assert!(matches!(
            FixedLeg::new(
                Currency::ZAR,
                vec![d(2020, 3, 1), d(2020, 6, 1)],
                vec![1.0],
                vec![0.08, 0.08],
                vec![0.25, 0.25],
            ),
            Err(ProductError::LengthMismatch { field: "notionals", .. })
        ));
        assert!(matches!(
            FixedLeg::flat(Currency::ZAR, vec![d(2020, 6, 1), d(2020, 3, 1)], 1.0, 0.08, 0.25),
            Err(ProductError::NonIncreasingDates { .. })
        ));
    }
}
