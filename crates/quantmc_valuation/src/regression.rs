//! Cross-sectional least-squares regression on a quadratic basis.
//!
//! Continuation values and forward marks are estimated by regressing
//! path values on a quadratic polynomial in the simulator's underlying
//! factors: the constant, each factor, and every pairwise product. The
//! fit solves the normal equations with a Cholesky factorisation; a tiny
//! ridge term keeps near-degenerate designs solvable.

use crate::error::ValuationError;

/// Number of basis functions for `n_factors` explanatory variables.
pub(crate) fn basis_len(n_factors: usize) -> usize {
    1 + n_factors + n_factors * (n_factors + 1) / 2
}

/// Evaluates the quadratic basis at one factor vector, into `out`.
pub(crate) fn quadratic_basis(factors: &[f64], out: &mut Vec<f64>) {
    out.clear();
    out.push(1.0);
    out.extend_from_slice(factors);
    for i in 0..factors.len() {
        for j in i..factors.len() {
            out.push(factors[i] * factors[j]);
        }
    }
}

/// Fits `targets` on the quadratic basis of the factor rows.
///
/// `factors` holds one row of `n_factors` values per target,
/// concatenated. Returns the basis coefficients.
///
/// # Errors
///
/// Returns [`ValuationError::RegressionFailed`] when the row and target
/// counts disagree, there are fewer observations than basis functions,
/// or the normal equations are not positive definite.
pub(crate) fn fit(
    factors: &[f64],
    n_factors: usize,
    targets: &[f64],
) -> Result<Vec<f64>, ValuationError> {
    let n = targets.len();
    if n * n_factors != factors.len() {
        return Err(ValuationError::RegressionFailed {
            reason: format!(
                "{} factor values do not form {} rows of {}",
                factors.len(),
                n,
                n_factors
            ),
        });
    }
    let k = basis_len(n_factors);
    if n < k {
        return Err(ValuationError::RegressionFailed {
            reason: format!("{} observations cannot identify {} coefficients", n, k),
        });
    }

    let mut xtx = vec![0.0; k * k];
    let mut xty = vec![0.0; k];
    let mut row = Vec::with_capacity(k);
    for (p, &y) in targets.iter().enumerate() {
        quadratic_basis(&factors[p * n_factors..(p + 1) * n_factors], &mut row);
        for i in 0..k {
            xty[i] += row[i] * y;
            for j in i..k {
                xtx[i * k + j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[i * k + j] = xtx[j * k + i];
        }
    }

    // Ridge scaled to the design's magnitude.
    let trace: f64 = (0..k).map(|i| xtx[i * k + i]).sum();
    let ridge = 1e-10 * (1.0 + trace / k as f64);
    for i in 0..k {
        xtx[i * k + i] += ridge;
    }

    cholesky_solve(&mut xtx, &mut xty, k)?;
    Ok(xty)
}

/// Evaluates a fitted quadratic at one factor vector.
pub(crate) fn predict(beta: &[f64], factors: &[f64]) -> f64 {
    let mut basis = Vec::with_capacity(beta.len());
    quadratic_basis(factors, &mut basis);
    basis.iter().zip(beta).map(|(b, c)| b * c).sum()
}

/// Solves `a x = b` in place for symmetric positive definite `a`,
/// leaving the solution in `b`.
fn cholesky_solve(a: &mut [f64], b: &mut [f64], k: usize) -> Result<(), ValuationError> {
    for i in 0..k {
        for j in 0..=i {
            let mut sum = a[i * k + j];
            for m in 0..j {
                sum -= a[i * k + m] * a[j * k + m];
            }
            if i == j {
                if sum <= 0.0 {
                    return Err(ValuationError::RegressionFailed {
                        reason: "The normal equations are not positive definite".to_string(),
                    });
                }
                a[i * k + i] = sum.sqrt();
            } else {
                a[i * k + j] = sum / a[j * k + j];
            }
        }
    }
    for i in 0..k {
        let mut sum = b[i];
        for m in 0..i {
            sum -= a[i * k + m] * b[m];
        }
        b[i] = sum / a[i * k + i];
    }
    for i in (0..k).rev() {
        let mut sum = b[i];
        for m in i + 1..k {
            sum -= a[m * k + i] * b[m];
        }
        b[i] = sum / a[i * k + i];
    }
    Ok(())
}
