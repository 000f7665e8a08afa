//! # quantmc_valuation: Monte Carlo Valuation Engine
//!
//! ## Layer 3 (Valuation) Role
//!
//! quantmc_valuation couples the product contracts and simulators of
//! `quantmc_models` into present values and risk profiles:
//! - [`Coordinator::value`]: portfolio valuation with path-indexed
//!   draws, rayon-partitioned paths and value-date deflation
//! - [`Coordinator::value_early_exercise`]: least-squares Monte Carlo
//!   with a regression pass and an independent forward pass
//! - [`Coordinator::exposure_profile`]: forward mark-to-market matrices
//!   and expected/potential exposure statistics
//!
//! ## Usage Examples
//!
//! ```rust
//! use quantmc_core::types::{Currency, Date};
//! use quantmc_models::products::{FixedLeg, Product};
//! use quantmc_models::simulation::HullWhite1f;
//! use quantmc_valuation::{Coordinator, ValuationSettings};
//!
//! let value_date = Date::from_ymd(2016, 9, 17).unwrap();
//! let sim = HullWhite1f::new(Currency::ZAR, 0.05, 0.01, 0.07, 0.07, value_date).unwrap();
//! let leg = FixedLeg::flat(
//!     Currency::ZAR,
//!     vec![value_date.add_months(12)],
//!     1_000_000.0,
//!     0.07,
//!     1.0,
//! )
//! .unwrap();
//!
//! let settings = ValuationSettings::builder().paths(256).seed(42).build().unwrap();
//! let products: Vec<Box<dyn Product>> = vec![Box::new(leg)];
//! let result = Coordinator::new(settings).value(&products, &sim).unwrap();
//! assert!(result.pv > 0.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

mod early_exercise;
pub mod engine;
pub mod error;
pub mod exposure;
mod regression;
pub mod settings;

pub use engine::{Coordinator, ValuationResult};
pub use error::ValuationError;
pub use exposure::{ExposureProfile, ExposureResult};
pub use settings::{ValuationSettings, ValuationSettingsBuilder, MAX_PATHS};
