//! Correlated multi-currency rates and FX simulator.
//!
//! Composes one [`HullWhite1f`] short-rate process per currency with one
//! log-normal FX process per currency pair against the value currency.
//! All factors are driven by correlated Gaussian shocks each time step;
//! the correlation matrix is validated by Cholesky decomposition at
//! construction. The numeraire is the value currency's bank account.
//!
//! Each FX process follows
//! ```text
//! X(t+dt) = X(t) * exp((r_value - r_base - vol^2/2) * dt + vol * sqrt(dt) * W)
//! ```
//! so the drift is the rate differential and zero-volatility paths track
//! the covered-interest-parity forward exactly. Cross pairs and inverse
//! pairs are answered by triangulation through the value currency.

use std::collections::{BTreeSet, HashMap};

use quantmc_core::market_data::Observable;
use quantmc_core::types::{Currency, CurrencyPair, Date};

use super::correlated::{CholeskyFactor, CorrelationMatrix};
use super::error::SimulationError;
use super::hull_white::HullWhite1f;
use super::rng::PathRng;
use super::timeline::Timeline;
use super::traits::{Simulator, SimulatorState};

/// Multi-currency Hull-White rates with correlated log-normal FX.
#[derive(Clone)]
pub struct MultiHwFx {
    value_date: Date,
    value_currency: Currency,
    value_model: usize,
    rate_models: Vec<HullWhite1f>,
    /// Simulated pairs, each quoted as value currency per unit of base.
    pairs: Vec<CurrencyPair>,
    spots: Vec<f64>,
    fx_vols: Vec<f64>,
    cholesky: CholeskyFactor,
    seed: u64,

    state: SimulatorState,
    numeraire_dates: BTreeSet<Date>,
    required: HashMap<Observable, BTreeSet<Date>>,
    timeline: Timeline,

    // State of the current path: [factor][timeline point].
    rates: Vec<Vec<f64>>,
    fx: Vec<Vec<f64>>,
    bank_account: Vec<f64>,
}

impl MultiHwFx {
    /// Creates the simulator.
    ///
    /// `rate_models` must contain exactly one model per currency,
    /// including the value currency. Every pair must have the value
    /// currency as counter and a modelled currency as base; `spots` and
    /// `fx_vols` run parallel to `pairs`. The correlation matrix covers
    /// rate factors first (in `rate_models` order) then FX factors (in
    /// `pairs` order).
    pub fn new(
        value_date: Date,
        value_currency: Currency,
        rate_models: Vec<HullWhite1f>,
        pairs: Vec<CurrencyPair>,
        spots: Vec<f64>,
        fx_vols: Vec<f64>,
        correlation: CorrelationMatrix,
    ) -> Result<Self, SimulationError> {
        if rate_models.is_empty() {
            return Err(SimulationError::InvalidParameter {
                reason: "At least one rate model is required".to_string(),
            });
        }
        let mut value_model = None;
        for (i, model) in rate_models.iter().enumerate() {
            if model.value_date() != value_date {
                return Err(SimulationError::InvalidParameter {
                    reason: format!(
                        "Rate model for {} has value date {}, expected {}",
                        model.currency(),
                        model.value_date(),
                        value_date
                    ),
                });
            }
            if rate_models[..i].iter().any(|m| m.currency() == model.currency()) {
                return Err(SimulationError::InvalidParameter {
                    reason: format!("Duplicate rate model for {}", model.currency()),
                });
            }
            if model.currency() == value_currency {
                value_model = Some(i);
            }
        }
        let value_model = value_model.ok_or_else(|| SimulationError::InvalidParameter {
            reason: format!("No rate model supplied for value currency {}", value_currency),
        })?;

        if pairs.len() != spots.len() || pairs.len() != fx_vols.len() {
            return Err(SimulationError::InvalidParameter {
                reason: format!(
                    "Pairs, spots and vols must run parallel: {} pairs, {} spots, {} vols",
                    pairs.len(),
                    spots.len(),
                    fx_vols.len()
                ),
            });
        }
        for (i, pair) in pairs.iter().enumerate() {
            if pair.counter() != value_currency {
                return Err(SimulationError::InvalidParameter {
                    reason: format!(
                        "Pair {} must be quoted against the value currency {}",
                        pair, value_currency
                    ),
                });
            }
            if !rate_models.iter().any(|m| m.currency() == pair.base()) {
                return Err(SimulationError::InvalidParameter {
                    reason: format!("No rate model for pair {} base currency", pair),
                });
            }
            if pairs[..i].contains(pair) {
                return Err(SimulationError::InvalidParameter {
                    reason: format!("Duplicate pair {}", pair),
                });
            }
            if !(spots[i] > 0.0) {
                return Err(SimulationError::InvalidParameter {
                    reason: format!("Spot for {} must be strictly positive, got {}", pair, spots[i]),
                });
            }
            if !fx_vols[i].is_finite() || fx_vols[i] < 0.0 {
                return Err(SimulationError::InvalidParameter {
                    reason: format!(
                        "Volatility for {} must be finite and non-negative, got {}",
                        pair, fx_vols[i]
                    ),
                });
            }
        }

        let n_factors = rate_models.len() + pairs.len();
        if correlation.dim() != n_factors {
            return Err(SimulationError::InvalidParameter {
                reason: format!(
                    "Correlation matrix is {}x{}, need {} factors ({} rates + {} FX)",
                    correlation.dim(),
                    correlation.dim(),
                    n_factors,
                    rate_models.len(),
                    pairs.len()
                ),
            });
        }
        let cholesky = correlation.cholesky()?;

        Ok(Self {
            value_date,
            value_currency,
            value_model,
            rate_models,
            pairs,
            spots,
            fx_vols,
            cholesky,
            seed: 0,
            state: SimulatorState::Unconfigured,
            numeraire_dates: BTreeSet::new(),
            required: HashMap::new(),
            timeline: Timeline::default(),
            rates: Vec::new(),
            fx: Vec::new(),
            bank_account: Vec::new(),
        })
    }

    fn model_for(&self, currency: Currency) -> Option<usize> {
        self.rate_models.iter().position(|m| m.currency() == currency)
    }

    fn pair_for(&self, base: Currency) -> Option<usize> {
        self.pairs.iter().position(|p| p.base() == base)
    }

    /// Value currency units per unit of `currency` at timeline point `i`.
    fn vs_value(&self, currency: Currency, i: usize) -> Option<f64> {
        if currency == self.value_currency {
            Some(1.0)
        } else {
            self.pair_for(currency).map(|j| self.fx[j][i])
        }
    }

    /// Rate for an arbitrary providable pair by triangulation:
    /// counter per base = (value per base) / (value per counter).
    fn fx_level(&self, pair: &CurrencyPair, i: usize) -> Option<f64> {
        let base = self.vs_value(pair.base(), i)?;
        let counter = self.vs_value(pair.counter(), i)?;
        Some(base / counter)
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

impl Simulator for MultiHwFx {
    fn state(&self) -> SimulatorState {
        self.state
    }

    fn value_date(&self) -> Date {
        self.value_date
    }

    fn numeraire_currency(&self) -> Currency {
        self.value_currency
    }

    fn provides(&self, observable: &Observable) -> bool {
        match observable {
            Observable::Index(index) => self
                .rate_models
                .iter()
                .any(|m| m.forecast_indices().contains(index)),
            Observable::Fx(pair) => {
                let modelled = |ccy: Currency| {
                    ccy == self.value_currency || self.pair_for(ccy).is_some()
                };
                modelled(pair.base()) && modelled(pair.counter())
            }
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
        self.fx.clear();
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
        let n_rates = self.rate_models.len();
        let n_fx = self.pairs.len();

        self.rates = self
            .rate_models
            .iter()
            .map(|m| {
                let mut r = Vec::with_capacity(n);
                r.push(m.initial_rate());
                r
            })
            .collect();
        self.fx = self
            .spots
            .iter()
            .map(|&s| {
                let mut x = Vec::with_capacity(n);
                x.push(s);
                x
            })
            .collect();
        self.bank_account = Vec::with_capacity(n);
        self.bank_account.push(1.0);

        let mut shocks = vec![0.0; n_rates + n_fx];
        let mut log_bank = 0.0;
        for k in 1..n {
            let dt = self.timeline.time(k) - self.timeline.time(k - 1);
            rng.fill_normal(&mut shocks);
            self.cholesky.transform_inplace(&mut shocks);

            // FX drift uses the short rates at the start of the step.
            let r_value_prev = self.rates[self.value_model][k - 1];
            for (j, pair) in self.pairs.iter().enumerate() {
                let m = self
                    .model_for(pair.base())
                    .expect("pair base currencies are validated at construction");
                let r_base_prev = self.rates[m][k - 1];
                let vol = self.fx_vols[j];
                let growth = (r_value_prev - r_base_prev - 0.5 * vol * vol) * dt
                    + vol * dt.sqrt() * shocks[n_rates + j];
                let prev = self.fx[j][k - 1];
                self.fx[j].push(prev * growth.exp());
            }

            for (i, model) in self.rate_models.iter().enumerate() {
                let prev = self.rates[i][k - 1];
                let next = model.step_rate(prev, dt, shocks[i]);
                self.rates[i].push(next);
            }
            let r_value_next = self.rates[self.value_model][k];
            log_bank += 0.5 * (r_value_prev + r_value_next) * dt;
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
            let i = self.timeline.index_of(date).expect("registered date");
            let value = match observable {
                Observable::Index(index) => {
                    let m = self
                        .model_for(index.currency())
                        .expect("provides() checked the index currency");
                    self.rate_models[m].forward_rate(self.rates[m][i], index.tenor_years())
                }
                Observable::Fx(pair) => self
                    .fx_level(pair, i)
                    .expect("provides() checked both currencies"),
                _ => unreachable!("provides() admits only Index and Fx"),
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
        let mut factors = Vec::with_capacity(self.rates.len() + self.fx.len());
        factors.extend(self.rates.iter().map(|r| r[i]));
        factors.extend(self.fx.iter().map(|x| x[i]));
        Ok(factors)
    }

    fn clone_box(&self) -> Box<dyn Simulator> {
        Box::new(self.clone())
    }
}
