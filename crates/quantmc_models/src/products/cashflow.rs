//! Cashflows and realised path fixings.

use std::collections::HashMap;

use quantmc_core::market_data::Observable;
use quantmc_core::types::{Currency, Date};

use super::error::ProductError;

/// A single contractual cashflow.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cashflow {
    /// Payment date
    pub date: Date,
    /// Signed amount in `currency`
    pub amount: f64,
    /// Payment currency
    pub currency: Currency,
}

impl Cashflow {
    /// Creates a cashflow.
    pub fn new(date: Date, amount: f64, currency: Currency) -> Self {
        Self {
            date,
            amount,
            currency,
        }
    }
}

/// Realised observable values along one path, keyed by
/// `(observable, date)`.
///
/// The valuation engine fills one of these per path from simulator
/// queries and hands it to each product's cashflow generation.
#[derive(Clone, Debug, Default)]
pub struct Fixings {
    values: HashMap<(Observable, Date), f64>,
}

impl Fixings {
    /// An empty fixing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one fixing, replacing any previous value for the key.
    pub fn insert(&mut self, observable: Observable, date: Date, value: f64) {
        self.values.insert((observable, date), value);
    }

    /// Records a series of fixings for one observable.
    ///
    /// # Errors
    ///
    /// Returns `LengthMismatch` when the slices differ in length.
    pub fn insert_series(
        &mut self,
        observable: &Observable,
        dates: &[Date],
        values: &[f64],
    ) -> Result<(), ProductError> {
        if dates.len() != values.len() {
            return Err(ProductError::LengthMismatch {
                field: "fixing values",
                expected: dates.len(),
                got: values.len(),
            });
        }
        for (&date, &value) in dates.iter().zip(values) {
            self.insert(observable.clone(), date, value);
        }
        Ok(())
    }

    /// The fixing for `observable` at `date`.
    ///
    /// # Errors
    ///
    /// Returns `MissingFixing` when the value was never recorded.
    pub fn get(&self, observable: &Observable, date: Date) -> Result<f64, ProductError> {
        self.values
            .get(&(observable.clone(), date))
            .copied()
            .ok_or_else(|| ProductError::MissingFixing {
                observable: observable.to_string(),
                date,
            })
    }

    /// Number of recorded fixings.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no fixings are recorded.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantmc_core::market_data::FloatingIndex;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let jibar = Observable::Index(FloatingIndex::jibar_3m());
        let mut fixings = Fixings::new();
        fixings.insert(jibar.clone(), d(2020, 3, 1), 0.071);
        assert_eq!(fixings.get(&jibar, d(2020, 3, 1)).unwrap(), 0.071);
        assert!(matches!(
            fixings.get(&jibar, d(2020, 6, 1)),
            Err(ProductError::MissingFixing { .. })
        ));
    }

    #[test]
    fn test_insert_series_length_check() {
        let jibar = Observable::Index(FloatingIndex::jibar_3m());
        let mut fixings = Fixings::new();
        let dates = [d(2020, 3, 1), d(2020, 6, 1)];
        assert!(fixings.insert_series(&jibar, &dates, &[0.07]).is_err());
        fixings.insert_series(&jibar, &dates, &[0.07, 0.072]).unwrap();
        assert_eq!(fixings.len(), 2);
    }
}
