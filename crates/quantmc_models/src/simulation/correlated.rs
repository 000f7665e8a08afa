//! Correlated Gaussian shocks via Cholesky decomposition.
//!
//! Given `n` independent standard normals `Z`, the correlated shocks are
//! `W = L * Z` where `L` is the lower triangular Cholesky factor of the
//! correlation matrix `C = L * L^T`. Validation of the matrix happens at
//! construction; positive definiteness is established by attempting the
//! decomposition itself.

use thiserror::Error;

/// Correlation matrix validation and decomposition errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorrelationError {
    /// The matrix is not positive definite.
    #[error("Correlation matrix is not positive definite")]
    NotPositiveDefinite,

    /// The flat data length does not match the stated dimension.
    #[error("Invalid matrix dimensions: expected {expected} elements, got {got}")]
    InvalidDimensions {
        /// Expected element count (dim squared)
        expected: usize,
        /// Provided element count
        got: usize,
    },

    /// A diagonal element is not 1.
    #[error("Diagonal element at index {index} is {value}, expected 1.0")]
    InvalidDiagonal {
        /// Row/column index of the offending diagonal
        index: usize,
        /// The offending value
        value: f64,
    },

    /// The matrix is not symmetric.
    #[error("Matrix is not symmetric at ({i}, {j})")]
    NotSymmetric {
        /// Row index
        i: usize,
        /// Column index
        j: usize,
    },

    /// An off-diagonal correlation is outside [-1, 1].
    #[error("Correlation at ({i}, {j}) is {value}, must be in [-1, 1]")]
    OutOfRange {
        /// Row index
        i: usize,
        /// Column index
        j: usize,
        /// The offending value
        value: f64,
    },
}

/// A validated correlation matrix.
///
/// Must be square and symmetric with unit diagonal and off-diagonal
/// elements in [-1, 1]. Positive definiteness is only checked when
/// [`CorrelationMatrix::cholesky`] is called.
#[derive(Clone, Debug)]
pub struct CorrelationMatrix {
    /// Row-major elements
    data: Vec<f64>,
    dim: usize,
}

impl CorrelationMatrix {
    /// Creates a correlation matrix from a flat row-major array.
    pub fn new(data: &[f64], dim: usize) -> Result<Self, CorrelationError> {
        let expected = dim * dim;
        if data.len() != expected {
            return Err(CorrelationError::InvalidDimensions {
                expected,
                got: data.len(),
            });
        }

        let epsilon = 1e-10;
        for i in 0..dim {
            let diag = data[i * dim + i];
            if (diag - 1.0).abs() > epsilon {
                return Err(CorrelationError::InvalidDiagonal {
                    index: i,
                    value: diag,
                });
            }
        }
        for i in 0..dim {
            for j in (i + 1)..dim {
                let val_ij = data[i * dim + j];
                let val_ji = data[j * dim + i];
                if (val_ij - val_ji).abs() > epsilon {
                    return Err(CorrelationError::NotSymmetric { i, j });
                }
                if !(-1.0..=1.0).contains(&val_ij) {
                    return Err(CorrelationError::OutOfRange {
                        i,
                        j,
                        value: val_ij,
                    });
                }
            }
        }

        Ok(Self {
            data: data.to_vec(),
            dim,
        })
    }

    /// The identity matrix (uncorrelated factors).
    pub fn identity(dim: usize) -> Self {
        let mut data = vec![0.0; dim * dim];
        for i in 0..dim {
            data[i * dim + i] = 1.0;
        }
        Self { data, dim }
    }

    /// The matrix dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Element at (i, j).
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.dim + j]
    }

    /// Lower triangular Cholesky factor `L` with `C = L * L^T`.
    ///
    /// # Errors
    ///
    /// Returns `NotPositiveDefinite` when a pivot is non-positive, which
    /// is how non-positive-definite matrices are detected.
    pub fn cholesky(&self) -> Result<CholeskyFactor, CorrelationError> {
        let n = self.dim;
        let mut lower = vec![0.0; n * n];

        for i in 0..n {
            for j in 0..=i {
                if j == i {
                    let mut sum = 0.0;
                    for k in 0..j {
                        let l_jk = lower[j * n + k];
                        sum += l_jk * l_jk;
                    }
                    let diag = self.get(j, j) - sum;
                    if diag <= 0.0 {
                        return Err(CorrelationError::NotPositiveDefinite);
                    }
                    lower[j * n + j] = diag.sqrt();
                } else {
                    let mut sum = 0.0;
                    for k in 0..j {
                        sum += lower[i * n + k] * lower[j * n + k];
                    }
                    let l_jj = lower[j * n + j];
                    if l_jj <= 0.0 {
                        return Err(CorrelationError::NotPositiveDefinite);
                    }
                    lower[i * n + j] = (self.get(i, j) - sum) / l_jj;
                }
            }
        }

        Ok(CholeskyFactor {
            data: lower,
            dim: n,
        })
    }
}

/// Lower triangular Cholesky factor of a correlation matrix.
#[derive(Clone, Debug)]
pub struct CholeskyFactor {
    /// Row-major lower triangle; upper triangle stored as zeros
    data: Vec<f64>,
    dim: usize,
}

impl CholeskyFactor {
    /// The matrix dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Element at (i, j); zero above the diagonal.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if j > i {
            0.0
        } else {
            self.data[i * self.dim + j]
        }
    }

    /// Transforms independent standard normals into correlated normals
    /// in place (`W = L * Z`).
    ///
    /// # Panics
    ///
    /// Panics if `z.len() < self.dim()`.
    pub fn transform_inplace(&self, z: &mut [f64]) {
        assert!(
            z.len() >= self.dim,
            "Input vector length {} is less than matrix dimension {}",
            z.len(),
            self.dim
        );

        let n = self.dim;
        // W_i depends only on Z_0..=Z_i, so walking rows backwards lets
        // the transform reuse the input buffer.
        for i in (0..n).rev() {
            let mut sum = 0.0;
            for j in 0..=i {
                sum += self.get(i, j) * z[j];
            }
            z[i] = sum;
        }
    }
}
