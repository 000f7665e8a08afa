//! Valuation run settings.
//!
//! Immutable configuration for a Monte Carlo valuation: how many paths
//! to run, which base seed to derive path draws from, and the confidence
//! level used for potential future exposure quantiles. Built through
//! [`ValuationSettingsBuilder`] with validation at build time.

use crate::error::ValuationError;

/// Maximum number of simulation paths allowed.
pub const MAX_PATHS: usize = 10_000_000;

/// Immutable Monte Carlo valuation settings.
///
/// # Examples
///
/// ```rust
/// use quantmc_valuation::ValuationSettings;
///
/// let settings = ValuationSettings::builder()
///     .paths(10_000)
///     .seed(42)
///     .build()
///     .expect("valid settings");
///
/// assert_eq!(settings.paths(), 10_000);
/// assert_eq!(settings.seed(), 42);
/// ```
#[derive(Clone, Debug)]
pub struct ValuationSettings {
    paths: usize,
    seed: u64,
    pfe_confidence: f64,
}

impl ValuationSettings {
    /// Creates a new settings builder.
    #[inline]
    pub fn builder() -> ValuationSettingsBuilder {
        ValuationSettingsBuilder::default()
    }

    /// Number of simulation paths.
    #[inline]
    pub fn paths(&self) -> usize {
        self.paths
    }

    /// Base seed from which per-path draws are derived.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Confidence level for potential future exposure quantiles.
    #[inline]
    pub fn pfe_confidence(&self) -> f64 {
        self.pfe_confidence
    }
}

/// Builder for [`ValuationSettings`].
///
/// The path count is required; the seed defaults to 0 and the PFE
/// confidence level to 0.95.
#[derive(Clone, Debug, Default)]
pub struct ValuationSettingsBuilder {
    paths: Option<usize>,
    seed: u64,
    pfe_confidence: Option<f64>,
}

impl ValuationSettingsBuilder {
    /// Sets the number of simulation paths, in `[1, 10_000_000]`.
    #[inline]
    pub fn paths(mut self, paths: usize) -> Self {
        self.paths = Some(paths);
        self
    }

    /// Sets the base seed.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the PFE confidence level, in `(0, 1)`.
    #[inline]
    pub fn pfe_confidence(mut self, confidence: f64) -> Self {
        self.pfe_confidence = Some(confidence);
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns [`ValuationError::InvalidSettings`] when the path count is
    /// missing or outside `[1, 10_000_000]`, or when the confidence level
    /// is outside `(0, 1)`.
    pub fn build(self) -> Result<ValuationSettings, ValuationError> {
        let paths = self.paths.ok_or(ValuationError::InvalidSettings {
            name: "paths",
            reason: "must be specified".to_string(),
        })?;
        if paths == 0 || paths > MAX_PATHS {
            return Err(ValuationError::InvalidSettings {
                name: "paths",
                reason: format!("{} is outside [1, {}]", paths, MAX_PATHS),
            });
        }
        let pfe_confidence = self.pfe_confidence.unwrap_or(0.95);
        if !(pfe_confidence > 0.0 && pfe_confidence < 1.0) {
            return Err(ValuationError::InvalidSettings {
                name: "pfe_confidence",
                reason: format!("{} is outside (0, 1)", pfe_confidence),
            });
        }
        Ok(ValuationSettings {
            paths,
            seed: self.seed,
            pfe_confidence,
        })
    }
}
