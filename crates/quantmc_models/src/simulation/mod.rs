//! Stochastic path simulators and their lifecycle contract.

pub mod correlated;
pub mod credit_fx_jump;
pub mod error;
pub mod hull_white;
pub mod multi_hw_fx;
pub mod rng;
pub(crate) mod timeline;
pub mod traits;

pub use correlated::{CholeskyFactor, CorrelationError, CorrelationMatrix};
pub use credit_fx_jump::DeterministicCreditFxJump;
pub use error::SimulationError;
pub use hull_white::HullWhite1f;
pub use multi_hw_fx::MultiHwFx;
pub use rng::PathRng;
pub use traits::{Simulator, SimulatorState};
