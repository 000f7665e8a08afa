//! FX forward rate sources.

use std::sync::Arc;

use crate::market_data::curves::traits::{DiscountingSource, FxSource};
use crate::market_data::error::MarketDataError;
use crate::types::{CurrencyPair, Date};

/// FX forwards from covered interest parity.
///
/// The forward rate at `date` is
/// `spot * df_base(date) / df_counter(date)`, so a higher counter-currency
/// rate pushes the forward above spot.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use quantmc_core::market_data::{FlatDiscountCurve, ForwardParityFxSource, FxSource};
/// use quantmc_core::types::{Currency, CurrencyPair, Date};
///
/// let anchor = Date::from_ymd(2016, 9, 17).unwrap();
/// let usd = Arc::new(FlatDiscountCurve::new(Currency::USD, anchor, 0.01));
/// let zar = Arc::new(FlatDiscountCurve::new(Currency::ZAR, anchor, 0.07));
/// let pair = CurrencyPair::new(Currency::USD, Currency::ZAR).unwrap();
/// let fx = ForwardParityFxSource::new(pair, 13.6, usd, zar).unwrap();
/// assert!(fx.rate(anchor.add_days(365)).unwrap() > 13.6);
/// ```
#[derive(Clone)]
pub struct ForwardParityFxSource {
    pair: CurrencyPair,
    spot: f64,
    base_curve: Arc<dyn DiscountingSource>,
    counter_curve: Arc<dyn DiscountingSource>,
}

impl ForwardParityFxSource {
    /// Creates an FX source from a spot rate and the two discount curves.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` when the spot is not strictly positive or a
    /// curve's currency does not match the corresponding side of the pair.
    pub fn new(
        pair: CurrencyPair,
        spot: f64,
        base_curve: Arc<dyn DiscountingSource>,
        counter_curve: Arc<dyn DiscountingSource>,
    ) -> Result<Self, MarketDataError> {
        if !(spot > 0.0) {
            return Err(MarketDataError::InvalidValue {
                reason: format!("Spot rate must be strictly positive, got {}", spot),
            });
        }
        if base_curve.currency() != pair.base() {
            return Err(MarketDataError::InvalidValue {
                reason: format!(
                    "Base curve currency {} does not match pair {}",
                    base_curve.currency(),
                    pair
                ),
            });
        }
        if counter_curve.currency() != pair.counter() {
            return Err(MarketDataError::InvalidValue {
                reason: format!(
                    "Counter curve currency {} does not match pair {}",
                    counter_curve.currency(),
                    pair
                ),
            });
        }
        Ok(Self {
            pair,
            spot,
            base_curve,
            counter_curve,
        })
    }

    /// Returns the spot rate.
    pub fn spot(&self) -> f64 {
        self.spot
    }
}

impl FxSource for ForwardParityFxSource {
    fn pair(&self) -> CurrencyPair {
        self.pair
    }

    fn rate(&self, date: Date) -> Result<f64, MarketDataError> {
        let df_base = self.base_curve.df(date)?;
        let df_counter = self.counter_curve.df(date)?;
        Ok(self.spot * df_base / df_counter)
    }
}
