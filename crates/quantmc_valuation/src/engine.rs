//! The valuation coordinator: portfolio present values by Monte Carlo.
//!
//! [`Coordinator::value`] wires products to a simulator: it registers
//! every observable a product needs and every date the numeraire must be
//! known at, prepares the simulator once, then values paths in parallel.
//! Each worker owns a cloned simulator, and path draws depend only on
//! the path index, so the result is identical however the paths are
//! partitioned across threads.
//!
//! Cashflows in a currency other than the simulator's numeraire currency
//! are converted at the simulated FX rate on the cashflow date before
//! deflation.

use std::collections::BTreeSet;

use quantmc_core::market_data::Observable;
use quantmc_core::types::{CurrencyPair, Date};
use quantmc_models::products::{Fixings, Product};
use quantmc_models::simulation::Simulator;
use rayon::prelude::*;
use tracing::debug;

use crate::error::ValuationError;
use crate::settings::ValuationSettings;

/// The outcome of a Monte Carlo valuation.
#[derive(Clone, Debug)]
pub struct ValuationResult {
    /// Present value in the simulator's numeraire currency.
    pub pv: f64,
    /// Standard error of the present value estimate.
    pub std_error: f64,
    /// Number of paths the estimate was formed over.
    pub paths: usize,
}

/// Coordinates products, a simulator and settings into valuations.
///
/// The coordinator never mutates the caller's simulator: it works on a
/// clone, so one configured simulator can be reused across calls.
#[derive(Clone, Debug)]
pub struct Coordinator {
    settings: ValuationSettings,
}

impl Coordinator {
    /// Creates a coordinator with the given settings.
    pub fn new(settings: ValuationSettings) -> Self {
        Self { settings }
    }

    /// The settings this coordinator runs with.
    pub fn settings(&self) -> &ValuationSettings {
        &self.settings
    }

    /// Values a portfolio of products under the simulator's measure.
    ///
    /// Every cashflow is deflated to the value date by the path
    /// numeraire, `amount / N(t_cf) * N(t_value)`, and converted into the
    /// numeraire currency where needed.
    ///
    /// # Errors
    ///
    /// Fails when the portfolio is empty, when the simulator cannot
    /// produce a required observable, or when any simulator or product
    /// call fails.
    pub fn value(
        &self,
        products: &[Box<dyn Product>],
        simulator: &dyn Simulator,
    ) -> Result<ValuationResult, ValuationError> {
        if products.is_empty() {
            return Err(ValuationError::EmptyPortfolio);
        }
        let refs: Vec<&dyn Product> = products.iter().map(|p| p.as_ref()).collect();
        let mut sim = simulator.clone_box();
        self.configure(sim.as_mut(), &refs, &[])?;
        sim.prepare()?;

        let paths = self.settings.paths();
        let values = run_paths(sim.as_ref(), paths, 0, |worker, path| {
            worker.run_simulation(path)?;
            let mut total = 0.0;
            for product in products {
                let flows = deflated_flows(worker, product.as_ref())?;
                total += flows.iter().map(|(_, amount)| amount).sum::<f64>();
            }
            Ok(total)
        })?;

        let (pv, std_error) = mean_and_std_error(&values);
        debug!(
            pv,
            std_error,
            paths,
            products = products.len(),
            "portfolio valuation complete"
        );
        Ok(ValuationResult {
            pv,
            std_error,
            paths,
        })
    }

    /// Seeds, resets and registers the simulator for these products.
    ///
    /// Numeraire dates are every product cashflow date plus
    /// `extra_numeraire_dates`; FX conversion observables are registered
    /// for products paying outside the numeraire currency.
    pub(crate) fn configure(
        &self,
        sim: &mut dyn Simulator,
        products: &[&dyn Product],
        extra_numeraire_dates: &[Date],
    ) -> Result<(), ValuationError> {
        sim.set_seed(self.settings.seed());
        sim.reset();
        let numeraire_currency = sim.numeraire_currency();
        let mut numeraire_dates: BTreeSet<Date> = extra_numeraire_dates.iter().copied().collect();
        for product in products {
            for observable in product.required_observables() {
                if !sim.provides(&observable) {
                    return Err(ValuationError::UnsupportedObservable {
                        observable: observable.to_string(),
                    });
                }
                let dates = product.observation_dates(&observable);
                if !dates.is_empty() {
                    sim.set_required_dates(&observable, &dates)?;
                }
            }
            let flow_dates = product.cashflow_dates();
            if product.currency() != numeraire_currency && !flow_dates.is_empty() {
                let pair = CurrencyPair::new(product.currency(), numeraire_currency)?;
                let observable = Observable::Fx(pair);
                if !sim.provides(&observable) {
                    return Err(ValuationError::UnsupportedObservable {
                        observable: observable.to_string(),
                    });
                }
                sim.set_required_dates(&observable, &flow_dates)?;
            }
            numeraire_dates.extend(flow_dates);
        }
        if !numeraire_dates.is_empty() {
            let dates: Vec<Date> = numeraire_dates.into_iter().collect();
            sim.set_numeraire_dates(&dates)?;
        }
        Ok(())
    }
}

/// Runs `paths` consecutive path indices starting at `first_path`,
/// partitioned across the rayon pool, collecting one record per path.
///
/// Each partition works on its own clone of the prepared simulator.
/// Records land in path order, so downstream aggregation is independent
/// of the partitioning.
pub(crate) fn run_paths<T, F>(
    prepared: &dyn Simulator,
    paths: usize,
    first_path: u64,
    per_path: F,
) -> Result<Vec<T>, ValuationError>
where
    T: Clone + Default + Send,
    F: Fn(&mut dyn Simulator, u64) -> Result<T, ValuationError> + Sync,
{
    let chunk = paths.div_ceil(rayon::current_num_threads()).max(1);
    let mut workers: Vec<Box<dyn Simulator>> = (0..paths.div_ceil(chunk))
        .map(|_| prepared.clone_box())
        .collect();
    let mut records = vec![T::default(); paths];
    records
        .par_chunks_mut(chunk)
        .enumerate()
        .zip(workers.par_iter_mut())
        .try_for_each(
            |((chunk_index, out), worker)| -> Result<(), ValuationError> {
                for (offset, slot) in out.iter_mut().enumerate() {
                    let path = first_path + (chunk_index * chunk + offset) as u64;
                    *slot = per_path(worker.as_mut(), path)?;
                }
                Ok(())
            },
        )?;
    Ok(records)
}

/// The product's cashflows on the current path, converted into the
/// numeraire currency and deflated to the value date.
pub(crate) fn deflated_flows(
    sim: &dyn Simulator,
    product: &dyn Product,
) -> Result<Vec<(Date, f64)>, ValuationError> {
    let fixings = gather_fixings(sim, product)?;
    let numeraire_currency = sim.numeraire_currency();
    let numeraire_at_value = sim.numeraire(sim.value_date())?;
    let mut flows = Vec::new();
    for flow in product.cashflows(&fixings)? {
        let mut amount = flow.amount;
        if flow.currency != numeraire_currency {
            let pair = CurrencyPair::new(flow.currency, numeraire_currency)?;
            let rates = sim.get_indices(&Observable::Fx(pair), &[flow.date])?;
            amount *= rates[0];
        }
        flows.push((flow.date, amount / sim.numeraire(flow.date)? * numeraire_at_value));
    }
    Ok(flows)
}

/// Reads every fixing the product needs from the current path.
pub(crate) fn gather_fixings(
    sim: &dyn Simulator,
    product: &dyn Product,
) -> Result<Fixings, ValuationError> {
    let mut fixings = Fixings::new();
    for observable in product.required_observables() {
        let dates = product.observation_dates(&observable);
        if dates.is_empty() {
            continue;
        }
        let values = sim.get_indices(&observable, &dates)?;
        fixings.insert_series(&observable, &dates, &values)?;
    }
    Ok(fixings)
}

/// Sample mean and its standard error.
pub(crate) fn mean_and_std_error(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let variance = values
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d
        })
        .sum::<f64>()
        / (n - 1.0);
    (mean, (variance / n).sqrt())
}
