//! The simulator lifecycle and query contract.
//!
//! A simulator is a state machine. Freshly constructed it is
//! `Unconfigured`; `reset` moves it to `Configured`, where numeraire and
//! observable dates are registered; `prepare` validates the configuration
//! and precomputes the timeline, moving to `Prepared`; `run_simulation`
//! evolves one path and moves to `Simulated`, after which path state can
//! be queried. `run_simulation` may be called repeatedly with different
//! path indices without re-preparing. Any call outside this order yields
//! [`SimulationError::InvalidState`](super::error::SimulationError).

use std::fmt;

use quantmc_core::market_data::Observable;
use quantmc_core::types::{Currency, Date};

use super::error::SimulationError;

/// The lifecycle state of a simulator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SimulatorState {
    /// Constructed but not yet reset; no configuration accepted.
    Unconfigured,
    /// Accepting numeraire and observable date registrations.
    Configured,
    /// Timeline built; ready to run paths.
    Prepared,
    /// Holding the state of one simulated path.
    Simulated,
}

impl fmt::Display for SimulatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SimulatorState::Unconfigured => "Unconfigured",
            SimulatorState::Configured => "Configured",
            SimulatorState::Prepared => "Prepared",
            SimulatorState::Simulated => "Simulated",
        };
        write!(f, "{}", name)
    }
}

/// A stochastic path simulator.
///
/// Implementations evolve one or more market factors along a path and
/// answer "what was the value of observable O at date D on this path".
/// Path draws are derived from the base seed and the path index, so the
/// same index always reproduces the same path and distinct indices are
/// independent regardless of how paths are partitioned across threads.
pub trait Simulator: Send {
    /// The current lifecycle state.
    fn state(&self) -> SimulatorState;

    /// The date at which valuation occurs; the numeraire is 1 here.
    fn value_date(&self) -> Date;

    /// The currency of the simulator's numeraire.
    fn numeraire_currency(&self) -> Currency;

    /// Whether this simulator can produce values for `observable`.
    fn provides(&self, observable: &Observable) -> bool;

    /// Sets the base seed from which per-path draws are derived.
    ///
    /// May be called in any state before `prepare`.
    fn set_seed(&mut self, seed: u64);

    /// Clears all configuration and path state; moves to `Configured`.
    fn reset(&mut self);

    /// Registers dates at which the numeraire must be queryable.
    fn set_numeraire_dates(&mut self, dates: &[Date]) -> Result<(), SimulationError>;

    /// Registers an observable and the dates it must be queryable at.
    ///
    /// May be called multiple times for different observables; dates for
    /// the same observable accumulate.
    fn set_required_dates(
        &mut self,
        observable: &Observable,
        dates: &[Date],
    ) -> Result<(), SimulationError>;

    /// Validates the configuration and precomputes the simulation
    /// timeline; moves to `Prepared`.
    ///
    /// # Errors
    ///
    /// Fails when no dates were registered, or when any registered date
    /// precedes the value date.
    fn prepare(&mut self) -> Result<(), SimulationError>;

    /// Simulates the path with the given index from the value date to the
    /// latest registered date; moves to `Simulated`.
    ///
    /// Two calls with the same index reproduce the same path.
    fn run_simulation(&mut self, path_index: u64) -> Result<(), SimulationError>;

    /// Values of `observable` at `dates` on the current path.
    ///
    /// Valid only after `run_simulation`; every date must have been
    /// registered for the observable before `prepare`.
    fn get_indices(
        &self,
        observable: &Observable,
        dates: &[Date],
    ) -> Result<Vec<f64>, SimulationError>;

    /// The numeraire value at `date` on the current path.
    ///
    /// Valid only after `run_simulation`; the date must be the value date
    /// or a registered numeraire date.
    fn numeraire(&self, date: Date) -> Result<f64, SimulationError>;

    /// Explanatory path variables at `date` for cross-sectional
    /// regression (continuation values, forward mark-to-market).
    fn underlying_factors(&self, date: Date) -> Result<Vec<f64>, SimulationError>;

    /// Clones the simulator behind the trait object, configuration and
    /// all, for per-thread replication.
    fn clone_box(&self) -> Box<dyn Simulator>;
}

impl Clone for Box<dyn Simulator> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(format!("{}", SimulatorState::Unconfigured), "Unconfigured");
        assert_eq!(format!("{}", SimulatorState::Simulated), "Simulated");
    }
}
