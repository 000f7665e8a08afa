//! Market observables: the lookup keys for simulated or historical values.
//!
//! An [`Observable`] identifies a quantity a simulator can be asked to
//! produce along a path: a floating index fixing, an FX rate, or the
//! default time/recovery of a reference entity. Equality and hashing are
//! by value, never by reference, so two independently constructed
//! observables with the same content are the same key.

use std::fmt;

use crate::types::{Currency, CurrencyPair};

/// A floating rate index such as JIBAR 3M or EURIBOR 3M.
///
/// # Examples
///
/// ```
/// use quantmc_core::market_data::FloatingIndex;
///
/// let jibar = FloatingIndex::jibar_3m();
/// assert_eq!(jibar.tenor_months(), 3);
/// assert_eq!(format!("{}", jibar), "JIBAR3M");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloatingIndex {
    currency: Currency,
    name: String,
    tenor_months: u32,
}

impl FloatingIndex {
    /// Creates a floating index from its currency, name and tenor.
    pub fn new(currency: Currency, name: impl Into<String>, tenor_months: u32) -> Self {
        Self {
            currency,
            name: name.into(),
            tenor_months,
        }
    }

    /// 3-month JIBAR (ZAR).
    pub fn jibar_3m() -> Self {
        Self::new(Currency::ZAR, "JIBAR3M", 3)
    }

    /// 3-month LIBOR (USD).
    pub fn libor_3m() -> Self {
        Self::new(Currency::USD, "LIBOR3M", 3)
    }

    /// 3-month EURIBOR (EUR).
    pub fn euribor_3m() -> Self {
        Self::new(Currency::EUR, "EURIBOR3M", 3)
    }

    /// Returns the index currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the index name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tenor in months.
    pub fn tenor_months(&self) -> u32 {
        self.tenor_months
    }

    /// Returns the tenor as a year fraction (months / 12).
    pub fn tenor_years(&self) -> f64 {
        f64::from(self.tenor_months) / 12.0
    }
}

impl fmt::Display for FloatingIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Names the defaultable entity a hazard curve or CDS refers to.
///
/// Identity is by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceEntity(String);

impl ReferenceEntity {
    /// Creates a reference entity from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the entity name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReferenceEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A market observable: the key under which simulated values are stored
/// and queried.
///
/// # Examples
///
/// ```
/// use quantmc_core::market_data::{FloatingIndex, Observable};
///
/// let a = Observable::Index(FloatingIndex::jibar_3m());
/// let b = Observable::Index(FloatingIndex::jibar_3m());
/// assert_eq!(a, b); // value identity
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Observable {
    /// A floating rate index fixing.
    Index(FloatingIndex),

    /// An FX rate for a directional currency pair.
    Fx(CurrencyPair),

    /// The default time of a reference entity, encoded as the default
    /// date's serial day (infinity when no default occurs on the path).
    DefaultTime(ReferenceEntity),

    /// The recovery rate realised at a reference entity's default.
    DefaultRecovery(ReferenceEntity),
}

impl fmt::Display for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observable::Index(index) => write!(f, "{}", index),
            Observable::Fx(pair) => write!(f, "{}", pair),
            Observable::DefaultTime(entity) => write!(f, "DefaultTime:{}", entity),
            Observable::DefaultRecovery(entity) => write!(f, "DefaultRecovery:{}", entity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_floating_index_constructors() {
        assert_eq!(FloatingIndex::jibar_3m().currency(), Currency::ZAR);
        assert_eq!(FloatingIndex::libor_3m().currency(), Currency::USD);
        assert_eq!(FloatingIndex::euribor_3m().currency(), Currency::EUR);
        assert!((FloatingIndex::jibar_3m().tenor_years() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_observable_value_identity() {
        let a = Observable::Index(FloatingIndex::jibar_3m());
        let b = Observable::Index(FloatingIndex::new(Currency::ZAR, "JIBAR3M", 3));
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_observable_variants_distinct() {
        let entity = ReferenceEntity::new("ABC");
        let time = Observable::DefaultTime(entity.clone());
        let recovery = Observable::DefaultRecovery(entity);
        assert_ne!(time, recovery);
    }

    #[test]
    fn test_display() {
        let pair = CurrencyPair::new(Currency::USD, Currency::ZAR).unwrap();
        assert_eq!(format!("{}", Observable::Fx(pair)), "USD/ZAR");
        assert_eq!(
            format!("{}", Observable::DefaultTime(ReferenceEntity::new("ABC"))),
            "DefaultTime:ABC"
        );
    }
}
