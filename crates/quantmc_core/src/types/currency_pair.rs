//! Currency pair identifiers for FX observables.
//!
//! A [`CurrencyPair`] is a directional value identifier: it names the pair
//! but carries no rate. The fixed convention everywhere in this engine is
//! *units of counter currency per one unit of base currency*. A USD/ZAR
//! rate of 13.6 means 1 USD buys 13.6 ZAR. The reciprocal is never implied;
//! use [`CurrencyPair::inverse`] to name the opposite direction explicitly.

use std::fmt;

use super::currency::Currency;
use super::error::CurrencyError;

/// A directional currency pair.
///
/// # Examples
///
/// ```
/// use quantmc_core::types::{Currency, CurrencyPair};
///
/// let usdzar = CurrencyPair::new(Currency::USD, Currency::ZAR).unwrap();
/// assert_eq!(usdzar.base(), Currency::USD);
/// assert_eq!(usdzar.counter(), Currency::ZAR);
/// assert_eq!(usdzar.code(), "USD/ZAR");
///
/// let zarusd = usdzar.inverse();
/// assert_eq!(zarusd.base(), Currency::ZAR);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurrencyPair {
    /// Base currency: the unit being priced.
    base: Currency,
    /// Counter currency: the unit the rate is expressed in.
    counter: Currency,
}

impl CurrencyPair {
    /// Creates a new currency pair.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::SameCurrency` when base and counter are
    /// identical.
    pub fn new(base: Currency, counter: Currency) -> Result<Self, CurrencyError> {
        if base == counter {
            return Err(CurrencyError::SameCurrency(base.code().to_string()));
        }
        Ok(Self { base, counter })
    }

    /// Returns the base currency.
    #[inline]
    pub fn base(&self) -> Currency {
        self.base
    }

    /// Returns the counter currency.
    #[inline]
    pub fn counter(&self) -> Currency {
        self.counter
    }

    /// Returns the pair code in BASE/COUNTER format.
    pub fn code(&self) -> String {
        format!("{}/{}", self.base.code(), self.counter.code())
    }

    /// Returns the pair with base and counter swapped.
    ///
    /// A rate for the inverse pair is the reciprocal of a rate for this
    /// pair; the conversion is the caller's responsibility.
    pub fn inverse(&self) -> Self {
        Self {
            base: self.counter,
            counter: self.base,
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.counter)
    }
}
