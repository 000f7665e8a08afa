//! Curve and market-data source trait definitions.

use crate::market_data::error::MarketDataError;
use crate::market_data::observables::ReferenceEntity;
use crate::types::{Currency, CurrencyPair, Date};

/// A source of discount factors for one currency.
///
/// # Contract
///
/// - `df(anchor_date()) == 1`
/// - `df(d)` is expected (not enforced) to be non-increasing in `d` for
///   non-negative rates
/// - queries before the anchor date are out of domain
pub trait DiscountingSource: Send + Sync {
    /// The currency in which discounting is performed.
    fn currency(&self) -> Currency;

    /// The date from which discount factors are measured.
    fn anchor_date(&self) -> Date;

    /// Discount factor from the anchor date to `date`.
    fn df(&self, date: Date) -> Result<f64, MarketDataError>;
}

/// A source of FX rates for one directional currency pair.
///
/// Rates follow the engine-wide convention: units of the pair's counter
/// currency per one unit of its base currency.
pub trait FxSource: Send + Sync {
    /// The pair this source quotes.
    fn pair(&self) -> CurrencyPair;

    /// The forward FX rate at `date` (the spot rate at the anchor).
    fn rate(&self, date: Date) -> Result<f64, MarketDataError>;
}

/// A source of survival probabilities for one reference entity.
///
/// # Contract
///
/// - `survival(anchor_date()) == 1`
/// - `survival(d)` is non-increasing in `d` for non-negative hazard rates
/// - `survival_between(d1, d2) == survival(d2) / survival(d1)` for
///   `d2 >= d1`
pub trait SurvivalProbabilitySource: Send + Sync {
    /// The entity whose default this source describes.
    fn reference_entity(&self) -> &ReferenceEntity;

    /// The date from which survival is measured.
    fn anchor_date(&self) -> Date;

    /// Survival probability from the anchor date until `date`.
    fn survival(&self, date: Date) -> Result<f64, MarketDataError>;

    /// Survival probability between two dates, conditional on survival to
    /// `date1`.
    ///
    /// # Errors
    ///
    /// Returns `MarketDataError::OutOfDomain` when `date2 < date1`, and
    /// propagates errors from the underlying queries.
    fn survival_between(&self, date1: Date, date2: Date) -> Result<f64, MarketDataError> {
        if date2 < date1 {
            return Err(MarketDataError::OutOfDomain {
                date: date2,
                min: date1,
                max: date2.add_days((date1 - date2).max(0)),
            });
        }
        Ok(self.survival(date2)? / self.survival(date1)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlatSurvival {
        entity: ReferenceEntity,
        anchor: Date,
        hazard: f64,
    }

    impl SurvivalProbabilitySource for FlatSurvival {
        fn reference_entity(&self) -> &ReferenceEntity {
            &self.entity
        }

        fn anchor_date(&self) -> Date {
            self.anchor
        }

        fn survival(&self, date: Date) -> Result<f64, MarketDataError> {
            if date < self.anchor {
                return Err(MarketDataError::BeforeAnchor {
                    date,
                    anchor: self.anchor,
                });
            }
            let t = (date - self.anchor) as f64 / 365.0;
            Ok((-self.hazard * t).exp())
        }
    }

    fn source() -> FlatSurvival {
        FlatSurvival {
            entity: ReferenceEntity::new("ABC"),
            anchor: Date::from_ymd(2016, 9, 17).unwrap(),
            hazard: 0.02,
        }
    }

    #[test]
    fn test_default_survival_between_is_ratio() {
        let s = source();
        let d1 = s.anchor.add_months(12);
        let d2 = s.anchor.add_months(36);
        let ratio = s.survival(d2).unwrap() / s.survival(d1).unwrap();
        let between = s.survival_between(d1, d2).unwrap();
        assert!((between - ratio).abs() < 1e-14);
    }

    #[test]
    fn test_default_survival_between_rejects_reversed_dates() {
        let s = source();
        let d1 = s.anchor.add_months(12);
        let d2 = s.anchor.add_months(6);
        assert!(s.survival_between(d1, d2).is_err());
    }

    #[test]
    fn test_survival_between_same_date_is_one() {
        let s = source();
        let d = s.anchor.add_months(12);
        assert!((s.survival_between(d, d).unwrap() - 1.0).abs() < 1e-14);
    }
}
