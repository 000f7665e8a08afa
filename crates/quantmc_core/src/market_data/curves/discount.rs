//! Discount curve implementations.

use crate::market_data::curves::traits::DiscountingSource;
use crate::market_data::error::MarketDataError;
use crate::types::{Currency, Date};

const DAYS_PER_YEAR: f64 = 365.0;

/// A discount curve with a single continuously compounded rate.
///
/// # Examples
///
/// ```
/// use quantmc_core::market_data::{DiscountingSource, FlatDiscountCurve};
/// use quantmc_core::types::{Currency, Date};
///
/// let anchor = Date::from_ymd(2016, 9, 17).unwrap();
/// let curve = FlatDiscountCurve::new(Currency::ZAR, anchor, 0.07);
/// let df = curve.df(anchor.add_days(365)).unwrap();
/// assert!((df - (-0.07f64).exp()).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct FlatDiscountCurve {
    currency: Currency,
    anchor: Date,
    rate: f64,
}

impl FlatDiscountCurve {
    /// Creates a flat curve from a continuously compounded rate.
    pub fn new(currency: Currency, anchor: Date, rate: f64) -> Self {
        Self {
            currency,
            anchor,
            rate,
        }
    }

    /// Returns the continuously compounded rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl DiscountingSource for FlatDiscountCurve {
    fn currency(&self) -> Currency {
        self.currency
    }

    fn anchor_date(&self) -> Date {
        self.anchor
    }

    fn df(&self, date: Date) -> Result<f64, MarketDataError> {
        if date < self.anchor {
            return Err(MarketDataError::BeforeAnchor {
                date,
                anchor: self.anchor,
            });
        }
        let t = (date - self.anchor) as f64 / DAYS_PER_YEAR;
        Ok((-self.rate * t).exp())
    }
}

/// A discount curve interpolated from dated continuously compounded rates.
///
/// Rates are interpolated linearly in time between pillar dates and held
/// flat beyond the last pillar. Queries between the anchor and the first
/// pillar use the first rate.
#[derive(Clone, Debug)]
pub struct InterpolatedDiscountCurve {
    currency: Currency,
    anchor: Date,
    /// Pillar offsets from the anchor, in years (Act/365 fixed).
    times: Vec<f64>,
    rates: Vec<f64>,
    last_date: Date,
}

impl InterpolatedDiscountCurve {
    /// Creates a curve from pillar dates and continuously compounded rates.
    ///
    /// # Errors
    ///
    /// - `LengthMismatch` when the slices differ in length
    /// - `InsufficientData` when fewer than one pillar is supplied
    /// - `BeforeAnchor` when any pillar precedes the anchor
    /// - `NonIncreasingDates` when the pillars are not strictly increasing
    pub fn new(
        currency: Currency,
        anchor: Date,
        dates: &[Date],
        rates: &[f64],
    ) -> Result<Self, MarketDataError> {
        if dates.len() != rates.len() {
            return Err(MarketDataError::LengthMismatch {
                dates: dates.len(),
                values: rates.len(),
            });
        }
        if dates.is_empty() {
            return Err(MarketDataError::InsufficientData { got: 0, need: 1 });
        }
        for (i, &date) in dates.iter().enumerate() {
            if date < anchor {
                return Err(MarketDataError::BeforeAnchor { date, anchor });
            }
            if i > 0 && date <= dates[i - 1] {
                return Err(MarketDataError::NonIncreasingDates { index: i });
            }
        }
        let times = dates
            .iter()
            .map(|&d| (d - anchor) as f64 / DAYS_PER_YEAR)
            .collect();
        Ok(Self {
            currency,
            anchor,
            times,
            rates: rates.to_vec(),
            last_date: *dates.last().expect("dates checked non-empty"),
        })
    }

    /// The last pillar date.
    pub fn last_date(&self) -> Date {
        self.last_date
    }

    fn rate_at(&self, t: f64) -> f64 {
        if t <= self.times[0] {
            return self.rates[0];
        }
        if t >= *self.times.last().expect("at least one pillar") {
            return *self.rates.last().expect("at least one pillar");
        }
        // Linear interpolation between the bracketing pillars.
        let i = self.times.partition_point(|&x| x < t);
        let (t0, t1) = (self.times[i - 1], self.times[i]);
        let (r0, r1) = (self.rates[i - 1], self.rates[i]);
        r0 + (r1 - r0) * (t - t0) / (t1 - t0)
    }
}

impl DiscountingSource for InterpolatedDiscountCurve {
    fn currency(&self) -> Currency {
        self.currency
    }

    fn anchor_date(&self) -> Date {
        self.anchor
    }

    fn df(&self, date: Date) -> Result<f64, MarketDataError> {
        if date < self.anchor {
            return Err(MarketDataError::BeforeAnchor {
                date,
                anchor: self.anchor,
            });
        }
        let t = (date - self.anchor) as f64 / DAYS_PER_YEAR;
        Ok((-self.rate_at(t) * t).exp())
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
    fn test_flat_curve_df_at_anchor_is_one() {
        let curve = FlatDiscountCurve::new(Currency::ZAR, d(2016, 9, 17), 0.07);
        assert_relative_eq!(curve.df(d(2016, 9, 17)).unwrap(), 1.0);
    }

    #[test]
    fn test_flat_curve_rejects_dates_before_anchor() {
        let curve = FlatDiscountCurve::new(Currency::ZAR, d(2016, 9, 17), 0.07);
        assert!(matches!(
            curve.df(d(2016, 9, 16)),
            Err(MarketDataError::BeforeAnchor { .. })
        ));
    }

    #[test]
    fn test_interpolated_matches_flat_with_equal_rates() {
        let anchor = d(2016, 9, 17);
        let dates = [anchor.add_months(12), anchor.add_months(60)];
        let curve =
            InterpolatedDiscountCurve::new(Currency::USD, anchor, &dates, &[0.05, 0.05]).unwrap();
        let flat = FlatDiscountCurve::new(Currency::USD, anchor, 0.05);
        for months in [0, 6, 12, 36, 60, 120] {
            let date = anchor.add_months(months);
            assert_relative_eq!(
                curve.df(date).unwrap(),
                flat.df(date).unwrap(),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_interpolated_rate_is_linear_between_pillars() {
        let anchor = d(2020, 1, 1);
        let d1 = anchor.add_days(365);
        let d2 = anchor.add_days(3 * 365);
        let curve =
            InterpolatedDiscountCurve::new(Currency::EUR, anchor, &[d1, d2], &[0.02, 0.04])
                .unwrap();
        // Midpoint in time gives the midpoint rate.
        let mid = anchor.add_days(2 * 365);
        let t = 2.0_f64;
        assert_relative_eq!(curve.df(mid).unwrap(), (-0.03 * t).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_interpolated_extrapolates_flat() {
        let anchor = d(2020, 1, 1);
        let d1 = anchor.add_days(365);
        let curve =
            InterpolatedDiscountCurve::new(Currency::EUR, anchor, &[d1], &[0.03]).unwrap();
        let far = anchor.add_days(10 * 365);
        assert_relative_eq!(curve.df(far).unwrap(), (-0.03_f64 * 10.0).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_interpolated_construction_validation() {
        let anchor = d(2020, 1, 1);
        let d1 = anchor.add_days(100);
        let d2 = anchor.add_days(200);

        assert!(matches!(
            InterpolatedDiscountCurve::new(Currency::EUR, anchor, &[d1, d2], &[0.02]),
            Err(MarketDataError::LengthMismatch { dates: 2, values: 1 })
        ));
        assert!(matches!(
            InterpolatedDiscountCurve::new(Currency::EUR, anchor, &[], &[]),
            Err(MarketDataError::InsufficientData { .. })
        ));
        assert!(matches!(
            InterpolatedDiscountCurve::new(Currency::EUR, anchor, &[d2, d1], &[0.02, 0.03]),
            Err(MarketDataError::NonIncreasingDates { index: 1 })
        ));
        assert!(matches!(
            InterpolatedDiscountCurve::new(
                Currency::EUR,
                anchor,
                &[anchor.add_days(-1)],
                &[0.02]
            ),
            Err(MarketDataError::BeforeAnchor { .. })
        ));
    }
}
