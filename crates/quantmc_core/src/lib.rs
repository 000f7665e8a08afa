//! # quantmc_core: Foundation Types for Monte Carlo Valuation
//!
//! ## Layer 1 (Foundation) Role
//!
//! quantmc_core is the bottom layer of the workspace, providing:
//! - Time types: `Date`, `DayCount`, `Calendar` (`types`)
//! - Currency types: `Currency`, `CurrencyPair` (`types`)
//! - Market observables: `Observable`, `FloatingIndex` (`market_data`)
//! - Curve traits and implementations: discounting, FX forwards,
//!   hazard curves (`market_data::curves`)
//! - Error types: `DateError`, `CurrencyError`, `MarketDataError`
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other quantmc_* crates, with minimal
//! external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - chrono: Date arithmetic
//! - thiserror: Error type derivation
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use quantmc_core::types::{Currency, Date, DayCount};
//!
//! // Date operations
//! let start = Date::from_ymd(2024, 1, 1).unwrap();
//! let end = Date::from_ymd(2024, 7, 1).unwrap();
//! let year_fraction = DayCount::Actual365Fixed.year_fraction(start, end);
//! assert!(year_fraction > 0.0);
//!
//! // Currency information
//! let usd = Currency::USD;
//! assert_eq!(usd.code(), "USD");
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialisation for Date, Currency, Observable

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod market_data;
pub mod types;

#[cfg(test)]
mod tests {
    #[test]
    fn it_works() {
        assert_eq!(2 + 2, 4);
    }
}
