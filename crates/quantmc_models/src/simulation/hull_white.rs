//! Single-factor Hull-White short-rate simulator.
//!
//! The short rate follows the mean-reverting SDE
//! ```text
//! dr(t) = a * (b - r(t)) * dt + sigma * dW(t)
//! ```
//! with mean reversion speed `a`, long-run rate `b` and volatility
//! `sigma`. Each time step uses the exact transition of the
//! Ornstein-Uhlenbeck process rather than an Euler scheme, so step size
//! does not bias the distribution:
//! ```text
//! r(t+dt) = b + (r(t) - b) * exp(-a*dt)
//!           + sigma * sqrt((1 - exp(-2*a*dt)) / (2*a)) * Z
//! ```
//! The bank-account numeraire accumulates by trapezoidal integration of
//! the short rate along the path. Forward rates are derived analytically
//! from the simulated short rate via the model's affine bond-price
//! formula; no nested simulation takes place.

use std::collections::{BTreeSet, HashMap};

use quantmc_core::market_data::{FloatingIndex, Observable};
use quantmc_core::types::{Currency, Date};

use super::error::SimulationError;
use super::rng::PathRng;
use super::timeline::Timeline;
use super::traits::{Simulator, SimulatorState};

/// Single-factor Hull-White (Vasicek) short-rate simulator.
///
/// # Examples
///
/// ```
/// use quantmc_core::market_data::{FloatingIndex, Observable};
/// use quantmc_core::types::{Currency, Date};
/// use quantmc_models::simulation::{HullWhite1f, Simulator};
///
/// let value_date = Date::from_ymd(2016, 9, 17).unwrap();
/// let mut sim = HullWhite1f::new(Currency::ZAR, 0.05, 0.01, 0.07, 0.07, value_date).unwrap();
/// sim.add_forecast(FloatingIndex::jibar_3m()).unwrap();
///
/// let dates = [value_date.add_months(12)];
/// sim.reset();
/// sim.set_numeraire_dates(&dates).unwrap();
/// sim.set_required_dates(&Observable::Index(FloatingIndex::jibar_3m()), &dates).unwrap();
/// sim.prepare().unwrap();
/// sim.run_simulation(0).unwrap();
/// let rate = sim.get_indices(&Observable::Index(FloatingIndex::jibar_3m()), &dates).unwrap()[0];
/// assert!(rate.is_finite());
/// ```
#[derive(Clone)]
pub struct HullWhite1f {
    currency: Currency,
    mean_reversion: f64,
    volatility: f64,
    r0: f64,
    long_run_rate: f64,
    value_date: Date,
    seed: u64,
    forecast_indices: Vec<FloatingIndex>,

    state: SimulatorState,
    numeraire_dates: BTreeSet<Date>,
    required: HashMap<Observable, BTreeSet<Date>>,

    // Built by prepare.
    timeline: Timeline,

    // State of the current path.
    rates: Vec<f64>,
    bank_account: Vec<f64>,
}

impl HullWhite1f {
    /// Creates the simulator from model parameters and a value date.
    ///
    /// # Errors
    ///
    /// Mean reversion must be strictly positive; volatility must be
    /// finite and non-negative (zero gives a deterministic path, which
    /// is a valid limiting case).
    pub fn new(
        currency: Currency,
        mean_reversion: f64,
        volatility: f64,
        r0: f64,
        long_run_rate: f64,
        value_date: Date,
    ) -> Result<Self, SimulationError> {
        if !(mean_reversion > 0.0) || !mean_reversion.is_finite() {
            return Err(SimulationError::InvalidParameter {
                reason: format!("Mean reversion must be strictly positive, got {}", mean_reversion),
            });
        }
        if !volatility.is_finite() || volatility < 0.0 {
            return Err(SimulationError::InvalidParameter {
                reason: format!("Volatility must be finite and non-negative, got {}", volatility),
            });
        }
        Ok(Self {
            currency,
            mean_reversion,
            volatility,
            r0,
            long_run_rate,
            value_date,
            seed: 0,
            forecast_indices: Vec::new(),
            state: SimulatorState::Unconfigured,
            numeraire_dates: BTreeSet::new(),
            required: HashMap::new(),
            timeline: Timeline::default(),
            rates: Vec::new(),
            bank_account: Vec::new(),
        })
    }

    /// Registers a floating index this simulator will forecast.
    ///
    /// # Errors
    ///
    /// The index currency must match the simulator currency.
    pub fn add_forecast(&mut self, index: FloatingIndex) -> Result<(), SimulationError> {
        if index.currency() != self.currency {
            return Err(SimulationError::InvalidParameter {
                reason: format!(
                    "Forecast index {} is in {}, simulator is in {}",
                    index,
                    index.currency(),
                    self.currency
                ),
            });
        }
        if !self.forecast_indices.contains(&index) {
            self.forecast_indices.push(index);
        }
        Ok(())
    }

    /// The simulator currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// The initial short rate r(0).
    pub(crate) fn initial_rate(&self) -> f64 {
        self.r0
    }

    /// Indices registered via [`HullWhite1f::add_forecast`].
    pub(crate) fn forecast_indices(&self) -> &[FloatingIndex] {
        &self.forecast_indices
    }

    /// One exact Ornstein-Uhlenbeck transition over `dt` years.
    pub(crate) fn step_rate(&self, r: f64, dt: f64, z: f64) -> f64 {
        let a = self.mean_reversion;
        let decay = (-a * dt).exp();
        let stdev = self.volatility * ((1.0 - (-2.0 * a * dt).exp()) / (2.0 * a)).sqrt();
        self.long_run_rate + (r - self.long_run_rate) * decay + stdev * z
    }

    /// Zero-coupon bond price `P(t, t + tau)` given the short rate at `t`.
    ///
    /// Affine formula `P = A(tau) * exp(-B(tau) * r)` with
    /// `B = (1 - exp(-a*tau)) / a` and
    /// `ln A = (B - tau) * (b - sigma^2 / (2*a^2)) - sigma^2 * B^2 / (4*a)`.
    pub(crate) fn bond_price(&self, r: f64, tau: f64) -> f64 {
        let a = self.mean_reversion;
        let sigma = self.volatility;
        let b = self.long_run_rate;
        let big_b = (1.0 - (-a * tau).exp()) / a;
        let ln_a = (big_b - tau) * (b - sigma * sigma / (2.0 * a * a))
            - sigma * sigma * big_b * big_b / (4.0 * a);
        (ln_a - big_b * r).exp()
    }

    /// Simple forward rate over `tenor` years given the short rate.
    pub(crate) fn forward_rate(&self, r: f64, tenor: f64) -> f64 {
        let p = self.bond_price(r, tenor);
        (1.0 / p - 1.0) / tenor
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

    fn registered_dates(&self) -> impl Iterator<Item = Date> + '_ {
        self.numeraire_dates
            .iter()
            .copied()
            .chain(self.required.values().flatten().copied())
    }
}

impl Simulator for HullWhite1f {
    fn state(&self) -> SimulatorState {
        self.state
    }

    fn value_date(&self) -> Date {
        self.value_date
    }

    fn numeraire_currency(&self) -> Currency {
        self.currency
    }

    fn provides(&self, observable: &Observable) -> bool {
        match observable {
            Observable::Index(index) => self.forecast_indices.contains(index),
            _ => false,
        }
    }

    fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    fn reset(&mut self) {
        self.numeraire_dates.clear();
        self.required.clear();
        self.timeline.clear();
        self.rates.clear();
        self.bank_account.clear();
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
        self.timeline = Timeline::build(self.value_date, self.registered_dates())?;
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
        self.rates.clear();
        self.rates.reserve(n);
        self.bank_account.clear();
        self.bank_account.reserve(n);

        self.rates.push(self.r0);
        self.bank_account.push(1.0);
        let mut log_bank = 0.0;
        for k in 1..n {
            let dt = self.timeline.time(k) - self.timeline.time(k - 1);
            let prev = self.rates[k - 1];
            let next = self.step_rate(prev, dt, rng.gen_normal());
            log_bank += 0.5 * (prev + next) * dt;
            self.rates.push(next);
            self.bank_account.push(log_bank.exp());
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
        let index = match observable {
            Observable::Index(index) if self.forecast_indices.contains(index) => index,
            _ => {
                return Err(SimulationError::UnsupportedObservable {
                    observable: observable.to_string(),
                })
            }
        };
        let registered = self.required.get(observable).ok_or_else(|| {
            SimulationError::UnregisteredObservable {
                observable: observable.to_string(),
            }
        })?;

        let tenor = index.tenor_years();
        let mut values = Vec::with_capacity(dates.len());
        for &date in dates {
            if !registered.contains(&date) {
                return Err(SimulationError::UnregisteredDate {
                    context: observable.to_string(),
                    date,
                });
            }
            // Registered dates are on the timeline by construction.
            let i = self.timeline.index_of(date).expect("registered date");
            values.push(self.forward_rate(self.rates[i], tenor));
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
        let i = self.timeline.index_of(date).expect("registered date");
        Ok(self.bank_account[i])
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
        Ok(vec![self.rates[i]])
    }

    fn clone_box(&self) -> Box<dyn Simulator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn value_date() -> Date {
        Date::from_ymd(2016, 9, 17).unwrap()
    }

    fn jibar() -> Observable {
        Observable::Index(FloatingIndex::jibar_3m())
    }

    fn configured_sim(vol: f64) -> HullWhite1f {
        let mut sim =
            HullWhite1f::new(Currency::ZAR, 0.05, vol, 0.07, 0.07, value_date()).unwrap();
        sim.add_forecast(FloatingIndex::jibar_3m()).unwrap();
        sim
    }

    fn dates() -> Vec<Date> {
        (1..=10).map(|i| value_date().add_months(3 * i)).collect()
    }

    fn prepared_sim(vol: f64) -> HullWhite1f {
        let mut sim = configured_sim(vol);
        let dates = dates();
        sim.reset();
        sim.set_numeraire_dates(&dates).unwrap();
        sim.set_required_dates(&jibar(), &dates).unwrap();
        sim.prepare().unwrap();
        sim
    }

    #[test]
    fn test_parameter_validation() {
        assert!(HullWhite1f::new(Currency::ZAR, 0.0, 0.01, 0.07, 0.07, value_date()).is_err());
        assert!(HullWhite1f::new(Currency::ZAR, -0.05, 0.01, 0.07, 0.07, value_date()).is_err());
        assert!(HullWhite1f::new(Currency::ZAR, 0.05, -0.01, 0.07, 0.07, value_date()).is_err());
        // Zero volatility is a valid limiting case.
        assert!(HullWhite1f::new(Currency::ZAR, 0.05, 0.0, 0.07, 0.07, value_date()).is_ok());
    }

    #[test]
    fn test_forecast_currency_must_match() {
        let mut sim = configured_sim(0.01);
        assert!(sim.add_forecast(FloatingIndex::libor_3m()).is_err());
    }

    #[test]
    fn test_lifecycle_guards() {
        let mut sim = configured_sim(0.01);
        let dates = dates();

        // Unconfigured: registration and prepare are rejected.
        assert!(matches!(
            sim.set_numeraire_dates(&dates),
            Err(SimulationError::InvalidState { .. })
        ));
        assert!(matches!(sim.prepare(), Err(SimulationError::InvalidState { .. })));

        sim.reset();
        // Configured but nothing registered.
        assert!(matches!(sim.prepare(), Err(SimulationError::NothingRegistered)));

        sim.set_numeraire_dates(&dates).unwrap();
        // Queries before any run are rejected.
        assert!(matches!(
            sim.run_simulation(0),
            Err(SimulationError::InvalidState { .. })
        ));
        sim.prepare().unwrap();
        assert!(matches!(
            sim.numeraire(dates[0]),
            Err(SimulationError::InvalidState { .. })
        ));

        sim.run_simulation(0).unwrap();
        assert!(sim.numeraire(dates[0]).is_ok());
    }

    #[test]
    fn test_dates_before_value_date_rejected() {
        let mut sim = configured_sim(0.01);
        sim.reset();
        sim.set_numeraire_dates(&[value_date().add_days(-1)]).unwrap();
        assert!(matches!(
            sim.prepare(),
            Err(SimulationError::DateBeforeValueDate { .. })
        ));
    }

    #[test]
    fn test_unregistered_queries_rejected() {
        let mut sim = prepared_sim(0.01);
        sim.run_simulation(0).unwrap();

        let unregistered = value_date().add_months(7);
        assert!(matches!(
            sim.numeraire(unregistered),
            Err(SimulationError::UnregisteredDate { .. })
        ));
        assert!(matches!(
            sim.get_indices(&jibar(), &[unregistered]),
            Err(SimulationError::UnregisteredDate { .. })
        ));
        let libor = Observable::Index(FloatingIndex::libor_3m());
        assert!(matches!(
            sim.get_indices(&libor, &[dates()[0]]),
            Err(SimulationError::UnsupportedObservable { .. })
        ));
    }

    #[test]
    fn test_same_path_index_is_deterministic() {
        let mut sim = prepared_sim(0.01);
        let dates = dates();

        sim.run_simulation(3).unwrap();
        let first = sim.get_indices(&jibar(), &dates).unwrap();
        let numeraire_first = sim.numeraire(dates[5]).unwrap();

        sim.run_simulation(7).unwrap();
        sim.run_simulation(3).unwrap();
        let second = sim.get_indices(&jibar(), &dates).unwrap();
        assert_eq!(first, second);
        assert_eq!(numeraire_first, sim.numeraire(dates[5]).unwrap());
    }

    #[test]
    fn test_zero_volatility_is_deterministic_flat_path() {
        let mut sim = prepared_sim(0.0);
        let dates = dates();
        sim.run_simulation(0).unwrap();

        // r0 == b, so the short rate never moves and the bank account is
        // exp(r * t).
        for &date in &dates {
            let t = (date - value_date()) as f64 / 365.0;
            assert_relative_eq!(sim.numeraire(date).unwrap(), (0.07 * t).exp(), epsilon = 1e-12);
            assert_relative_eq!(sim.underlying_factors(date).unwrap()[0], 0.07);
        }

        // The forward is the flat-rate simple forward over the tenor.
        let tenor = 0.25;
        let expected = ((0.07f64 * tenor).exp() - 1.0) / tenor;
        for value in sim.get_indices(&jibar(), &dates).unwrap() {
            assert_relative_eq!(value, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_short_rate_mean_reverts() {
        // Start well above the long-run rate; the cross-path mean of the
        // short rate far out should approach b + (r0 - b) * exp(-a*t).
        let mut sim = HullWhite1f::new(Currency::ZAR, 0.5, 0.01, 0.12, 0.05, value_date()).unwrap();
        sim.add_forecast(FloatingIndex::jibar_3m()).unwrap();
        let far = value_date().add_months(120);
        sim.reset();
        sim.set_numeraire_dates(&[far]).unwrap();
        sim.prepare().unwrap();

        let n_paths = 2000;
        let mut sum = 0.0;
        for path in 0..n_paths {
            sim.run_simulation(path).unwrap();
            sum += sim.underlying_factors(far).unwrap()[0];
        }
        let mean = sum / n_paths as f64;
        let t = (far - value_date()) as f64 / 365.0;
        let expected = 0.05 + (0.12 - 0.05) * (-0.5 * t).exp();
        // Stationary stdev is sigma / sqrt(2a) = 0.01, so the standard
        // error of the mean over 2000 paths is well under 1e-3.
        assert!((mean - expected).abs() < 1e-3);
    }

    #[test]
    fn test_bond_price_consistent_with_flat_limit() {
        let sim = configured_sim(0.0);
        // With sigma = 0 and r = b the bond price is exp(-b * tau).
        assert_relative_eq!(sim.bond_price(0.07, 2.0), (-0.14f64).exp(), epsilon = 1e-12);
    }
}
