//! # quantmc_models: Simulators and Product Contracts
//!
//! ## Layer 2 (Models) Role
//!
//! quantmc_models sits on top of `quantmc_core` and provides:
//! - The simulator lifecycle contract and its implementations
//!   (`simulation`): single-factor Hull-White, correlated
//!   multi-currency rates/FX, deterministic-credit FX jump
//! - Path-indexed random number generation (`simulation::rng`)
//! - The product contract and concrete products (`products`): fixed and
//!   floating legs, interest rate swaps, credit default swaps, Bermudan
//!   swaptions
//!
//! External dependencies are minimal: `rand`/`rand_distr` for path
//! generation, `thiserror` for error taxonomy, optional `serde`.
//!
//! ## Usage Examples
//!
//! ```rust
//! use quantmc_core::types::{Currency, Date};
//! use quantmc_models::simulation::{HullWhite1f, Simulator};
//!
//! let value_date = Date::from_ymd(2016, 9, 17).unwrap();
//! let mut sim = HullWhite1f::new(Currency::ZAR, 0.05, 0.01, 0.07, 0.07, value_date).unwrap();
//! sim.reset();
//! sim.set_numeraire_dates(&[value_date.add_months(12)]).unwrap();
//! sim.prepare().unwrap();
//! sim.run_simulation(0).unwrap();
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod products;
pub mod simulation;
