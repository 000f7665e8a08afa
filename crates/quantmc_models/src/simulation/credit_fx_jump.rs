//! Deterministic-rates FX simulator with a default-time jump.
//!
//! Rates are deterministic: the numeraire is the reciprocal of the
//! discount factor, so discounting is exact and path-independent. The
//! FX rate is log-normal around its forward,
//! ```text
//! X(t) = F(t) * exp(-vol^2 * t / 2 + vol * W(t))
//! ```
//! and each path carries an exogenous default time for one reference
//! entity, sampled by inverse CDF from a survival-probability source:
//! draw uniform `u` and find the earliest date whose survival from the
//! value date is at most `u`. From the default date onward the FX level
//! is multiplied by `1 + rel_jump_size`, the classic devaluation of a
//! currency whose sovereign has defaulted.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use quantmc_core::market_data::{
    DiscountingSource, FxSource, Observable, ReferenceEntity, SurvivalProbabilitySource,
};
use quantmc_core::types::{Currency, CurrencyPair, Date};

use super::error::SimulationError;
use super::rng::PathRng;
use super::timeline::Timeline;
use super::traits::{Simulator, SimulatorState};

/// Log-normal FX with deterministic rates and a default-contingent jump.
///
/// Provides the FX pair (and its inverse), the entity's default time
/// (as the default date's serial day, infinity when the path never
/// defaults) and the recovery rate realised at default.
#[derive(Clone)]
pub struct DeterministicCreditFxJump {
    value_date: Date,
    discount: Arc<dyn DiscountingSource>,
    fx_forwards: Arc<dyn FxSource>,
    survival: Arc<dyn SurvivalProbabilitySource>,
    entity: ReferenceEntity,
    pair: CurrencyPair,
    fx_vol: f64,
    rel_jump_size: f64,
    recovery_rate: f64,
    seed: u64,

    state: SimulatorState,
    numeraire_dates: BTreeSet<Date>,
    required: HashMap<Observable, BTreeSet<Date>>,
    timeline: Timeline,

    // State of the current path.
    fx: Vec<f64>,
    default_serial: f64,
}

impl DeterministicCreditFxJump {
    /// Creates the simulator.
    ///
    /// # Errors
    ///
    /// - the discount curve must be anchored at the value date and match
    ///   the pair's counter currency
    /// - the survival source's anchor must not be after the value date
    /// - `fx_vol` must be finite and non-negative, `rel_jump_size`
    ///   greater than -1, and `recovery_rate` in [0, 1]
    pub fn new(
        value_date: Date,
        discount: Arc<dyn DiscountingSource>,
        fx_forwards: Arc<dyn FxSource>,
        survival: Arc<dyn SurvivalProbabilitySource>,
        fx_vol: f64,
        rel_jump_size: f64,
        recovery_rate: f64,
    ) -> Result<Self, SimulationError> {
        let pair = fx_forwards.pair();
        if discount.anchor_date() != value_date {
            return Err(SimulationError::InvalidParameter {
                reason: format!(
                    "Discount curve anchored at {}, expected the value date {}",
                    discount.anchor_date(),
                    value_date
                ),
            });
        }
        if discount.currency() != pair.counter() {
            return Err(SimulationError::InvalidParameter {
                reason: format!(
                    "Discount curve is in {}, but the pair {} is quoted in {}",
                    discount.currency(),
                    pair,
                    pair.counter()
                ),
            });
        }
        if survival.anchor_date() > value_date {
            return Err(SimulationError::InvalidParameter {
                reason: format!(
                    "Survival source anchored at {}, after the value date {}",
                    survival.anchor_date(),
                    value_date
                ),
            });
        }
        if !fx_vol.is_finite() || fx_vol < 0.0 {
            return Err(SimulationError::InvalidParameter {
                reason: format!("FX volatility must be finite and non-negative, got {}", fx_vol),
            });
        }
        if !(rel_jump_size > -1.0) || !rel_jump_size.is_finite() {
            return Err(SimulationError::InvalidParameter {
                reason: format!("Relative jump size must exceed -1, got {}", rel_jump_size),
            });
        }
        if !(0.0..=1.0).contains(&recovery_rate) {
            return Err(SimulationError::InvalidParameter {
                reason: format!("Recovery rate must be in [0, 1], got {}", recovery_rate),
            });
        }

        let entity = survival.reference_entity().clone();
        Ok(Self {
            value_date,
            discount,
            fx_forwards,
            survival,
            entity,
            pair,
            fx_vol,
            rel_jump_size,
            recovery_rate,
            seed: 0,
            state: SimulatorState::Unconfigured,
            numeraire_dates: BTreeSet::new(),
            required: HashMap::new(),
            timeline: Timeline::default(),
            fx: Vec::new(),
            default_serial: f64::INFINITY,
        })
    }

    /// The reference entity whose default drives the jump.
    pub fn reference_entity(&self) -> &ReferenceEntity {
        &self.entity
    }

    /// Earliest day (as a date serial) at which survival from the value
    /// date drops to `u`, or infinity when it stays above `u` up to
    /// `horizon`. Integer bisection; survival is non-increasing.
    fn implied_default_serial(&self, u: f64, horizon: Date) -> Result<f64, SimulationError> {
        let sp = |date: Date| self.survival.survival_between(self.value_date, date);
        if sp(horizon)? > u {
            return Ok(f64::INFINITY);
        }
        let mut lo = 0i64; // survival here is 1 > u
        let mut hi = horizon - self.value_date;
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if sp(self.value_date.add_days(mid))? > u {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Ok(self.value_date.add_days(hi).serial() as f64)
    }

    fn require_state(
        &self,
        operation: &'static str,
        required: SimulatorState,
    ) -> Result<(), SimulationError> {
        if self.state != required {
            return Err(SimulationError::InvalidState {
                operation,
                required,
                current: self.state,
            });
        }
        Ok(())
    }
}

impl Simulator for DeterministicCreditFxJump {
    fn state(&self) -> SimulatorState {
        self.state
    }

    fn value_date(&self) -> Date {
        self.value_date
    }

    fn numeraire_currency(&self) -> Currency {
        self.discount.currency()
    }

    fn provides(&self, observable: &Observable) -> bool {
        match observable {
            Observable::Fx(pair) => *pair == self.pair || *pair == self.pair.inverse(),
            Observable::DefaultTime(entity) | Observable::DefaultRecovery(entity) => {
                *entity == self.entity
            }
            Observable::Index(_) => false,
        }
    }

    fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    fn reset(&mut self) {
        self.numeraire_dates.clear();
        self.required.clear();
        self.timeline.clear();
        self.fx.clear();
        self.default_serial = f64::INFINITY;
        self.state = SimulatorState::Configured;
    }

    fn set_numeraire_dates(&mut self, dates: &[Date]) -> Result<(), SimulationError> {
        self.require_state("set_numeraire_dates", SimulatorState::Configured)?;
        self.numeraire_dates.extend(dates.iter().copied());
        Ok(())
    }

    fn set_required_dates(
        &mut self,
        observable: &Observable,
        dates: &[Date],
    ) -> Result<(), SimulationError> {
        self.require_state("set_required_dates", SimulatorState::Configured)?;
        if !self.provides(observable) {
            return Err(SimulationError::UnsupportedObservable {
                observable: observable.to_string(),
            });
        }
        self.required
            .entry(observable.clone())
            .or_default()
            .extend(dates.iter().copied());
        Ok(())
    }

    fn prepare(&mut self) -> Result<(), SimulationError> {
        self.require_state("prepare", SimulatorState::Configured)?;
        let registered: Vec<Date> = self
            .numeraire_dates
            .iter()
            .copied()
            .chain(self.required.values().flatten().copied())
            .collect();
        self.timeline = Timeline::build(self.value_date, registered)?;
        self.state = SimulatorState::Prepared;
        Ok(())
    }

    fn run_simulation(&mut self, path_index: u64) -> Result<(), SimulationError> {
        if self.state != SimulatorState::Prepared && self.state != SimulatorState::Simulated {
            return Err(SimulationError::InvalidState {
                operation: "run_simulation",
                required: SimulatorState::Prepared,
                current: self.state,
            });
        }

        let mut rng = PathRng::for_path(self.seed, path_index);
        let n = self.timeline.len();
        let horizon = self.timeline.date(n - 1);

        // The default draw comes first so the Brownian stream is the
        // same whether or not the path defaults.
        let u = rng.gen_uniform();
        self.default_serial = if horizon > self.value_date {
            self.implied_default_serial(u, horizon)?
        } else {
            f64::INFINITY
        };

        self.fx.clear();
        self.fx.reserve(n);
        let mut w = 0.0;
        for k in 0..n {
            if k > 0 {
                let dt = self.timeline.time(k) - self.timeline.time(k - 1);
                w += dt.sqrt() * rng.gen_normal();
            }
            let date = self.timeline.date(k);
            let t = self.timeline.time(k);
            let forward = self.fx_forwards.rate(date)?;
            let mut level = forward * (-0.5 * self.fx_vol * self.fx_vol * t + self.fx_vol * w).exp();
            if (date.serial() as f64) >= self.default_serial {
                level *= 1.0 + self.rel_jump_size;
            }
            self.fx.push(level);
        }

        self.state = SimulatorState::Simulated;
        Ok(())
    }

    fn get_indices(
        &self,
        observable: &Observable,
        dates: &[Date],
    ) -> Result<Vec<f64>, SimulationError> {
        self.require_state("get_indices", SimulatorState::Simulated)?;
        if !self.provides(observable) {
            return Err(SimulationError::UnsupportedObservable {
                observable: observable.to_string(),
            });
        }
        let registered = self.required.get(observable).ok_or_else(|| {
            SimulationError::UnregisteredObservable {
                observable: observable.to_string(),
            }
        })?;

        let mut values = Vec::with_capacity(dates.len());
        for &date in dates {
            if !registered.contains(&date) {
                return Err(SimulationError::UnregisteredDate {
                    context: observable.to_string(),
                    date,
                });
            }
            let value = match observable {
                Observable::Fx(pair) => {
                    let i = self.timeline.index_of(date).expect("registered date");
                    if *pair == self.pair {
                        self.fx[i]
                    } else {
                        1.0 / self.fx[i]
                    }
                }
                Observable::DefaultTime(_) => self.default_serial,
                Observable::DefaultRecovery(_) => self.recovery_rate,
                Observable::Index(_) => unreachable!("provides() rejects Index observables"),
            };
            values.push(value);
        }
        Ok(values)
    }

    fn numeraire(&self, date: Date) -> Result<f64, SimulationError> {
        self.require_state("numeraire", SimulatorState::Simulated)?;
        if date != self.value_date && !self.numeraire_dates.contains(&date) {
            return Err(SimulationError::UnregisteredDate {
                context: "numeraire".to_string(),
                date,
            });
        }
        Ok(1.0 / self.discount.df(date)?)
    }

    fn underlying_factors(&self, date: Date) -> Result<Vec<f64>, SimulationError> {
        self.require_state("underlying_factors", SimulatorState::Simulated)?;
        let i = self
            .timeline
            .index_of(date)
            .ok_or(SimulationError::UnregisteredDate {
                context: "underlying factors".to_string(),
                date,
            })?;
        Ok(vec![self.fx[i]])
    }

    fn clone_box(&self) -> Box<dyn Simulator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use quantmc_core::market_data::{
        FlatDiscountCurve, ForwardParityFxSource, HazardCurve, SurvivalProbabilitySource,
    };

    fn value_date() -> Date {
        Date::from_ymd(2016, 9, 17).unwrap()
    }

    fn usdzar() -> CurrencyPair {
        CurrencyPair::new(Currency::USD, Currency::ZAR).unwrap()
    }

    fn hazard_curve(hazard: f64) -> Arc<HazardCurve> {
        Arc::new(
            HazardCurve::new(
                ReferenceEntity::new("SOVEREIGN"),
                value_date(),
                &[value_date().add_months(240)],
                &[hazard],
            )
            .unwrap(),
        )
    }

    fn simulator(fx_vol: f64, jump: f64, hazard: f64) -> DeterministicCreditFxJump {
        let zar = Arc::new(FlatDiscountCurve::new(Currency::ZAR, value_date(), 0.07));
        let usd = Arc::new(FlatDiscountCurve::new(Currency::USD, value_date(), 0.02));
        let fx = Arc::new(ForwardParityFxSource::new(usdzar(), 13.6, usd, zar.clone()).unwrap());
        DeterministicCreditFxJump::new(value_date(), zar, fx, hazard_curve(hazard), fx_vol, jump, 0.4)
            .unwrap()
    }

    fn prepared(fx_vol: f64, jump: f64, hazard: f64, dates: &[Date]) -> DeterministicCreditFxJump {
        let mut sim = simulator(fx_vol, jump, hazard);
        let entity = sim.reference_entity().clone();
        sim.reset();
        sim.set_numeraire_dates(dates).unwrap();
        sim.set_required_dates(&Observable::Fx(usdzar()), dates).unwrap();
        sim.set_required_dates(&Observable::DefaultTime(entity.clone()), dates).unwrap();
        sim.set_required_dates(&Observable::DefaultRecovery(entity), dates).unwrap();
        sim.prepare().unwrap();
        sim
    }

    #[test]
    fn test_parameter_validation() {
        let zar = Arc::new(FlatDiscountCurve::new(Currency::ZAR, value_date(), 0.07));
        let usd = Arc::new(FlatDiscountCurve::new(Currency::USD, value_date(), 0.02));
        let fx = Arc::new(ForwardParityFxSource::new(usdzar(), 13.6, usd.clone(), zar.clone()).unwrap());

        // Discount curve in the wrong currency.
        assert!(DeterministicCreditFxJump::new(
            value_date(),
            usd,
            fx.clone(),
            hazard_curve(0.02),
            0.15,
            -0.3,
            0.4,
        )
        .is_err());

        // Jump of -100% or worse.
        assert!(DeterministicCreditFxJump::new(
            value_date(),
            zar.clone(),
            fx.clone(),
            hazard_curve(0.02),
            0.15,
            -1.0,
            0.4,
        )
        .is_err());

        // Recovery outside [0, 1].
        assert!(DeterministicCreditFxJump::new(
            value_date(),
            zar,
            fx,
            hazard_curve(0.02),
            0.15,
            -0.3,
            1.2,
        )
        .is_err());
    }

    #[test]
    fn test_numeraire_is_deterministic_inverse_df() {
        let date = value_date().add_months(18);
        let mut sim = prepared(0.15, -0.3, 0.02, &[date]);
        sim.run_simulation(0).unwrap();
        let t = (date - value_date()) as f64 / 365.0;
        assert_relative_eq!(sim.numeraire(date).unwrap(), (0.07 * t).exp(), epsilon = 1e-12);
        assert_relative_eq!(sim.numeraire(value_date()).unwrap(), 1.0);
    }

    #[test]
    fn test_zero_vol_zero_hazard_tracks_forward() {
        let dates: Vec<Date> = (1..=6).map(|i| value_date().add_months(6 * i)).collect();
        let mut sim = prepared(0.0, -0.3, 0.0, &dates);
        sim.run_simulation(0).unwrap();

        let values = sim.get_indices(&Observable::Fx(usdzar()), &dates).unwrap();
        for (&date, &value) in dates.iter().zip(&values) {
            let t = (date - value_date()) as f64 / 365.0;
            assert_relative_eq!(value, 13.6 * ((0.07 - 0.02) * t).exp(), epsilon = 1e-12);
        }

        // No default within the horizon.
        let entity = sim.reference_entity().clone();
        let tau = sim
            .get_indices(&Observable::DefaultTime(entity), &dates[..1])
            .unwrap()[0];
        assert!(tau.is_infinite());
    }

    #[test]
    fn test_default_fraction_matches_survival_curve() {
        let date = value_date().add_months(60);
        let mut sim = prepared(0.15, -0.3, 0.10, &[date]);
        let entity = sim.reference_entity().clone();

        let n_paths = 4000;
        let mut defaulted = 0;
        for path in 0..n_paths {
            sim.run_simulation(path).unwrap();
            let tau = sim
                .get_indices(&Observable::DefaultTime(entity.clone()), &[date])
                .unwrap()[0];
            if tau <= date.serial() as f64 {
                defaulted += 1;
            }
        }
        let fraction = defaulted as f64 / n_paths as f64;
        let expected = 1.0 - hazard_curve(0.10).survival(date).unwrap();
        // Binomial standard error is about 0.008 at these parameters.
        assert!((fraction - expected).abs() < 0.025);
    }

    #[test]
    fn test_jump_applied_from_default_date() {
        // Certain immediate default: enormous hazard, zero volatility.
        let date = value_date().add_months(12);
        let mut sim = prepared(0.0, -0.5, 50.0, &[date]);
        sim.run_simulation(0).unwrap();

        let entity = sim.reference_entity().clone();
        let tau = sim
            .get_indices(&Observable::DefaultTime(entity), &[date])
            .unwrap()[0];
        assert!(tau <= date.serial() as f64);

        let t = (date - value_date()) as f64 / 365.0;
        let forward = 13.6 * ((0.07 - 0.02) * t).exp();
        let value = sim.get_indices(&Observable::Fx(usdzar()), &[date]).unwrap()[0];
        assert_relative_eq!(value, forward * 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_recovery_observable_is_constant() {
        let date = value_date().add_months(12);
        let mut sim = prepared(0.15, -0.3, 0.02, &[date]);
        let entity = sim.reference_entity().clone();
        sim.run_simulation(9).unwrap();
        let recovery = sim
            .get_indices(&Observable::DefaultRecovery(entity), &[date])
            .unwrap()[0];
        assert_relative_eq!(recovery, 0.4);
    }

    #[test]
    fn test_same_path_index_is_deterministic() {
        let dates: Vec<Date> = (1..=4).map(|i| value_date().add_months(6 * i)).collect();
        let mut sim = prepared(0.15, -0.3, 0.05, &dates);
        sim.run_simulation(21).unwrap();
        let first = sim.get_indices(&Observable::Fx(usdzar()), &dates).unwrap();
        sim.run_simulation(3).unwrap();
        sim.run_simulation(21).unwrap();
        let second = sim.get_indices(&Observable::Fx(usdzar()), &dates).unwrap();
        assert_eq!(first, second);
    }
}
