//! Forward exposure profiles by regression-based mark-to-market.
//!
//! At each exposure date the deflated value of a path's remaining
//! cashflows is regressed on that date's underlying factors; the fitted
//! value, rescaled by the path numeraire, is the path's forward
//! mark-to-market. The per-path matrix feeds expected exposure, a
//! time-weighted expected positive exposure, and a potential future
//! exposure quantile at the configured confidence level.

use quantmc_core::types::Date;
use quantmc_models::products::Product;
use quantmc_models::simulation::Simulator;
use tracing::debug;

use crate::engine::{deflated_flows, run_paths, Coordinator};
use crate::error::ValuationError;
use crate::regression;

const DAYS_PER_YEAR: f64 = 365.0;

/// Summary statistics of an exposure simulation.
#[derive(Clone, Debug)]
pub struct ExposureProfile {
    dates: Vec<Date>,
    expected_exposure: Vec<f64>,
    pfe: Vec<f64>,
    epe: f64,
    confidence: f64,
}

impl ExposureProfile {
    /// The exposure dates the profile was computed on.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Expected exposure `E[max(V(t), 0)]` at each exposure date.
    pub fn expected_exposure(&self) -> &[f64] {
        &self.expected_exposure
    }

    /// Potential future exposure at each exposure date: the
    /// [`confidence`](ExposureProfile::confidence) quantile of positive
    /// exposure.
    pub fn pfe(&self) -> &[f64] {
        &self.pfe
    }

    /// Time-weighted expected positive exposure over the date grid.
    pub fn epe(&self) -> f64 {
        self.epe
    }

    /// The confidence level the PFE quantile was taken at.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

/// The per-path forward marks plus their summary statistics.
#[derive(Clone, Debug)]
pub struct ExposureResult {
    /// Forward mark-to-market per path and exposure date,
    /// `values[path][date]`, in the numeraire currency.
    pub values: Vec<Vec<f64>>,
    /// Aggregated exposure statistics.
    pub profile: ExposureProfile,
}

/// One path's raw material for the exposure regressions.
#[derive(Clone, Debug, Default)]
struct ExposureRecord {
    flows: Vec<(Date, f64)>,
    factors: Vec<f64>,
    numeraires: Vec<f64>,
    numeraire_at_value: f64,
}

impl Coordinator {
    /// Simulates the portfolio's forward mark-to-market on a date grid.
    ///
    /// `exposure_dates` must be strictly increasing and non-empty; each
    /// must be on or after the simulator's value date.
    ///
    /// # Errors
    ///
    /// Fails on an empty portfolio, an empty or out-of-order date grid,
    /// an unsolvable regression, or any simulator or product failure.
    pub fn exposure_profile(
        &self,
        products: &[Box<dyn Product>],
        simulator: &dyn Simulator,
        exposure_dates: &[Date],
    ) -> Result<ExposureResult, ValuationError> {
        if products.is_empty() {
            return Err(ValuationError::EmptyPortfolio);
        }
        if exposure_dates.is_empty() {
            return Err(ValuationError::InvalidExposureDates {
                reason: "the date grid is empty".to_string(),
            });
        }
        if exposure_dates.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ValuationError::InvalidExposureDates {
                reason: "dates must be strictly increasing".to_string(),
            });
        }

        let refs: Vec<&dyn Product> = products.iter().map(|p| p.as_ref()).collect();
        let mut sim = simulator.clone_box();
        self.configure(sim.as_mut(), &refs, exposure_dates)?;
        sim.prepare()?;
        let value_date = sim.value_date();

        let mut probe = sim.clone_box();
        probe.run_simulation(0)?;
        let n_factors = probe.underlying_factors(exposure_dates[0])?.len();
        drop(probe);

        let paths = self.settings().paths();
        let records = run_paths(sim.as_ref(), paths, 0, |worker, path| {
            worker.run_simulation(path)?;
            let mut record = ExposureRecord {
                numeraire_at_value: worker.numeraire(value_date)?,
                ..ExposureRecord::default()
            };
            for &date in exposure_dates {
                record.factors.extend(worker.underlying_factors(date)?);
                record.numeraires.push(worker.numeraire(date)?);
            }
            for product in products {
                record.flows.extend(deflated_flows(worker, product.as_ref())?);
            }
            Ok(record)
        })?;

        let n_dates = exposure_dates.len();
        let mut values = vec![vec![0.0; n_dates]; paths];
        let mut factor_column = Vec::with_capacity(paths * n_factors);
        let mut targets = vec![0.0; paths];
        for (j, &date) in exposure_dates.iter().enumerate() {
            factor_column.clear();
            for (target, record) in targets.iter_mut().zip(&records) {
                factor_column
                    .extend_from_slice(&record.factors[j * n_factors..(j + 1) * n_factors]);
                *target = record
                    .flows
                    .iter()
                    .filter(|(d, _)| *d > date)
                    .map(|(_, amount)| amount)
                    .sum();
            }
            let beta = regression::fit(&factor_column, n_factors, &targets)?;
            for (row, record) in values.iter_mut().zip(&records) {
                let fitted = regression::predict(
                    &beta,
                    &record.factors[j * n_factors..(j + 1) * n_factors],
                );
                row[j] = fitted * record.numeraires[j] / record.numeraire_at_value;
            }
        }

        let confidence = self.settings().pfe_confidence();
        let expected_exposure: Vec<f64> = (0..n_dates)
            .map(|j| values.iter().map(|row| row[j].max(0.0)).sum::<f64>() / paths as f64)
            .collect();
        let pfe: Vec<f64> = (0..n_dates)
            .map(|j| {
                let exposures: Vec<f64> = values.iter().map(|row| row[j].max(0.0)).collect();
                positive_quantile(exposures, confidence)
            })
            .collect();
        let times: Vec<f64> = exposure_dates
            .iter()
            .map(|&d| (d - value_date) as f64 / DAYS_PER_YEAR)
            .collect();
        let epe = time_weighted_average(&expected_exposure, &times);

        debug!(
            paths,
            dates = n_dates,
            epe,
            confidence,
            "exposure profile complete"
        );
        Ok(ExposureResult {
            values,
            profile: ExposureProfile {
                dates: exposure_dates.to_vec(),
                expected_exposure,
                pfe,
                epe,
                confidence,
            },
        })
    }
}

/// The `confidence` quantile of the sample, by sorted-order index.
fn positive_quantile(mut exposures: Vec<f64>, confidence: f64) -> f64 {
    exposures.sort_by(|a, b| a.total_cmp(b));
    let last = exposures.len() - 1;
    let index = ((last as f64) * confidence).round() as usize;
    exposures[index.min(last)]
}

/// Trapezoidal time-weighted average over the grid; with a single point
/// the value at that point.
fn time_weighted_average(values: &[f64], times: &[f64]) -> f64 {
    if times.len() < 2 {
        return values.first().copied().unwrap_or(0.0);
    }
    let mut integral = 0.0;
    for i in 0..times.len() - 1 {
        integral += 0.5 * (values[i] + values[i + 1]) * (times[i + 1] - times[i]);
    }
    let span = times[times.len() - 1] - times[0];
    if span > 0.0 {
        integral / span
    } else {
        values[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quantile_indexing() {
        let sample = vec![4.0, 1.0, 3.0, 2.0];
        assert_relative_eq!(positive_quantile(sample.clone(), 0.5), 3.0);
        assert_relative_eq!(positive_quantile(sample.clone(), 0.99), 4.0);
        assert_relative_eq!(positive_quantile(vec![5.0], 0.95), 5.0);
    }

    #[test]
    fn test_time_weighted_average() {
        let values = [0.0, 10.0, 20.0];
        let times = [0.0, 0.5, 1.0];
        // Trapezoid: (0.5 * 10 * 0.5) + (0.5 * 30 * 0.5) = 10 over span 1.
        assert_relative_eq!(time_weighted_average(&values, &times), 10.0);
        assert_relative_eq!(time_weighted_average(&values[..1], &times[..1]), 0.0);
    }
}
