//! Least-squares Monte Carlo valuation of early-exercise rights.
//!
//! The backward pass works over an explicit `(path, exercise date)`
//! arena: deflated continuation values are regressed on a quadratic
//! basis of the simulator's underlying factors and compared with the
//! deflated value of exercising, fixing the exercise boundary one date
//! at a time from the last to the first. A second, independent set of
//! paths then applies the fixed boundary forwards, so the reported value
//! is free of the in-sample bias of the regression paths.

use quantmc_core::types::Date;
use quantmc_models::products::{EarlyExercise, Product};
use quantmc_models::simulation::Simulator;
use tracing::debug;

use crate::engine::{deflated_flows, mean_and_std_error, run_paths, Coordinator, ValuationResult};
use crate::error::ValuationError;
use crate::regression;

/// Everything the exercise decision needs from one path.
#[derive(Clone, Debug, Default)]
struct PathRecord {
    /// Underlying factors, one block of `n_factors` per exercise date.
    factors: Vec<f64>,
    /// Deflated value of exercising at each exercise date.
    exercise_values: Vec<f64>,
    /// The product's own deflated cashflows.
    own_flows: Vec<(Date, f64)>,
}

impl Coordinator {
    /// Values a product carrying early-exercise rights.
    ///
    /// Runs two independent path sets of the configured size: the first
    /// fixes the exercise boundary by regression, the second applies it
    /// to produce the reported estimate. Long-optionality dates exercise
    /// only when the exercise value beats the estimated continuation;
    /// other dates exercise unconditionally.
    ///
    /// # Errors
    ///
    /// Fails when the product has no exercise dates, an exercise date
    /// maps to no post-exercise product, a regression cannot be solved,
    /// or any simulator or product call fails.
    pub fn value_early_exercise(
        &self,
        product: &dyn EarlyExercise,
        simulator: &dyn Simulator,
    ) -> Result<ValuationResult, ValuationError> {
        let exercise_dates = product.exercise_dates();
        if exercise_dates.is_empty() {
            return Err(ValuationError::NoExerciseDates);
        }
        let post_products = product.post_exercise_products();

        let mut sim = simulator.clone_box();
        {
            let mut refs: Vec<&dyn Product> = Vec::with_capacity(post_products.len() + 1);
            refs.push(product);
            refs.extend(post_products.iter().map(|p| p.as_ref()));
            self.configure(sim.as_mut(), &refs, &exercise_dates)?;
        }
        sim.prepare()?;

        let mut probe = sim.clone_box();
        probe.run_simulation(0)?;
        let n_factors = probe.underlying_factors(exercise_dates[0])?.len();
        drop(probe);

        let paths = self.settings().paths();
        let records = run_paths(sim.as_ref(), paths, 0, |worker, path| {
            record_path(worker, product, &post_products, &exercise_dates, path)
        })?;
        let (coefficients, long) =
            fix_boundary(product, &records, &exercise_dates, n_factors)?;

        let values = run_paths(sim.as_ref(), paths, paths as u64, |worker, path| {
            let record = record_path(worker, product, &post_products, &exercise_dates, path)?;
            Ok(policy_value(
                &record,
                &exercise_dates,
                &long,
                &coefficients,
                n_factors,
            ))
        })?;

        let (pv, std_error) = mean_and_std_error(&values);
        debug!(
            pv,
            std_error,
            paths,
            exercise_dates = exercise_dates.len(),
            "early-exercise valuation complete"
        );
        Ok(ValuationResult {
            pv,
            std_error,
            paths,
        })
    }
}

/// Simulates one path and gathers the arena row for it.
fn record_path(
    sim: &mut dyn Simulator,
    product: &dyn EarlyExercise,
    post_products: &[Box<dyn Product>],
    exercise_dates: &[Date],
    path: u64,
) -> Result<PathRecord, ValuationError> {
    sim.run_simulation(path)?;
    let mut record = PathRecord::default();
    for &date in exercise_dates {
        record.factors.extend(sim.underlying_factors(date)?);
    }
    record.own_flows = deflated_flows(sim, product)?;
    record.exercise_values.reserve(exercise_dates.len());
    for &date in exercise_dates {
        let index = product
            .post_exercise_product_index(date)
            .ok_or(ValuationError::NoPostExerciseProduct { date })?;
        let flows = deflated_flows(sim, post_products[index].as_ref())?;
        record
            .exercise_values
            .push(flows.iter().map(|(_, amount)| amount).sum());
    }
    Ok(record)
}

/// Backward pass: fixes the exercise boundary as one regression per
/// exercise date, last to first, and reports which dates carry long
/// optionality.
fn fix_boundary(
    product: &dyn EarlyExercise,
    records: &[PathRecord],
    exercise_dates: &[Date],
    n_factors: usize,
) -> Result<(Vec<Vec<f64>>, Vec<bool>), ValuationError> {
    let n_exercise = exercise_dates.len();
    let long: Vec<bool> = exercise_dates
        .iter()
        .map(|&date| product.is_long_optionality(date))
        .collect();

    // Continuation from beyond the last exercise date: the product's own
    // remaining flows.
    let last = exercise_dates[n_exercise - 1];
    let mut continuation: Vec<f64> = records
        .iter()
        .map(|record| flows_after(&record.own_flows, last))
        .collect();

    let mut coefficients = vec![Vec::new(); n_exercise];
    let mut factor_column = Vec::with_capacity(records.len() * n_factors);
    for e in (0..n_exercise).rev() {
        factor_column.clear();
        for record in records {
            factor_column.extend_from_slice(&record.factors[e * n_factors..(e + 1) * n_factors]);
        }
        let beta = regression::fit(&factor_column, n_factors, &continuation)?;
        for (value, record) in continuation.iter_mut().zip(records) {
            let fitted =
                regression::predict(&beta, &record.factors[e * n_factors..(e + 1) * n_factors]);
            let exercise = record.exercise_values[e];
            if !long[e] || exercise > fitted {
                *value = exercise;
            }
        }
        coefficients[e] = beta;
        if e > 0 {
            // Flows between the previous and this exercise date accrue
            // whatever is decided here.
            for (value, record) in continuation.iter_mut().zip(records) {
                *value += flows_between(&record.own_flows, exercise_dates[e - 1], exercise_dates[e]);
            }
        }
    }
    Ok((coefficients, long))
}

/// Forward pass for one path: applies the fixed boundary and returns the
/// deflated value realised under it.
fn policy_value(
    record: &PathRecord,
    exercise_dates: &[Date],
    long: &[bool],
    coefficients: &[Vec<f64>],
    n_factors: usize,
) -> f64 {
    for (e, &date) in exercise_dates.iter().enumerate() {
        let fitted = regression::predict(
            &coefficients[e],
            &record.factors[e * n_factors..(e + 1) * n_factors],
        );
        let exercise = record.exercise_values[e];
        if !long[e] || exercise > fitted {
            let before: f64 = record
                .own_flows
                .iter()
                .filter(|(d, _)| *d <= date)
                .map(|(_, amount)| amount)
                .sum();
            return before + exercise;
        }
    }
    record.own_flows.iter().map(|(_, amount)| amount).sum()
}

/// Sum of deflated flows strictly after `date`.
fn flows_after(flows: &[(Date, f64)], date: Date) -> f64 {
    flows
        .iter()
        .filter(|(d, _)| *d > date)
        .map(|(_, amount)| amount)
        .sum()
}

/// Sum of deflated flows in the half-open interval `(from, to]`.
fn flows_between(flows: &[(Date, f64)], from: Date, to: Date) -> f64 {
    flows
        .iter()
        .filter(|(d, _)| *d > from && *d <= to)
        .map(|(_, amount)| amount)
        .sum()
}
