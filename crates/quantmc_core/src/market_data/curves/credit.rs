//! Hazard rate curves and survival probabilities.

use crate::market_data::curves::traits::SurvivalProbabilitySource;
use crate::market_data::error::MarketDataError;
use crate::market_data::observables::ReferenceEntity;
use crate::types::Date;

const DAYS_PER_YEAR: f64 = 365.0;

/// A piecewise-constant hazard rate curve for one reference entity.
///
/// The hazard `hazards[0]` applies from the anchor date to `dates[0]`,
/// `hazards[i]` applies on `(dates[i-1], dates[i]]`, and the final hazard
/// extends flat beyond the last date. Survival probabilities come from
/// integrating the hazard with Act/365 fixed year fractions:
/// `SP(t) = exp(-integral of hazard to t)`.
///
/// # Examples
///
/// ```
/// use quantmc_core::market_data::{HazardCurve, ReferenceEntity, SurvivalProbabilitySource};
/// use quantmc_core::types::Date;
///
/// let anchor = Date::from_ymd(2016, 9, 17).unwrap();
/// let curve = HazardCurve::new(
///     ReferenceEntity::new("ABC"),
///     anchor,
///     &[anchor.add_months(120)],
///     &[0.02],
/// ).unwrap();
/// let sp = curve.survival(anchor.add_days(365)).unwrap();
/// assert!((sp - (-0.02f64).exp()).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct HazardCurve {
    entity: ReferenceEntity,
    anchor: Date,
    /// Segment end offsets from the anchor, in days.
    boundaries: Vec<i64>,
    hazards: Vec<f64>,
    /// Integrated hazard at each boundary.
    cumulative: Vec<f64>,
}

impl HazardCurve {
    /// Creates a hazard curve from pillar dates and hazard rates.
    ///
    /// # Errors
    ///
    /// - `LengthMismatch` when the slices differ in length
    /// - `InsufficientData` when no pillars are supplied
    /// - `BeforeAnchor` when any pillar is before the anchor
    /// - `NonIncreasingDates` when the pillars are not strictly increasing
    /// - `InvalidValue` when any hazard is negative or non-finite
    pub fn new(
        entity: ReferenceEntity,
        anchor: Date,
        dates: &[Date],
        hazards: &[f64],
    ) -> Result<Self, MarketDataError> {
        if dates.len() != hazards.len() {
            return Err(MarketDataError::LengthMismatch {
                dates: dates.len(),
                values: hazards.len(),
            });
        }
        if dates.is_empty() {
            return Err(MarketDataError::InsufficientData { got: 0, need: 1 });
        }
        for (i, &date) in dates.iter().enumerate() {
            if date < anchor {
                return Err(MarketDataError::BeforeAnchor { date, anchor });
            }
            if i > 0 && date <= dates[i - 1] {
                return Err(MarketDataError::NonIncreasingDates { index: i });
            }
        }
        for &h in hazards {
            if !h.is_finite() || h < 0.0 {
                return Err(MarketDataError::InvalidValue {
                    reason: format!("Hazard rates must be finite and non-negative, got {}", h),
                });
            }
        }

        let boundaries: Vec<i64> = dates.iter().map(|&d| d - anchor).collect();
        let mut cumulative = Vec::with_capacity(boundaries.len());
        let mut acc = 0.0;
        let mut prev = 0i64;
        for (&days, &h) in boundaries.iter().zip(hazards) {
            acc += h * (days - prev) as f64 / DAYS_PER_YEAR;
            cumulative.push(acc);
            prev = days;
        }

        Ok(Self {
            entity,
            anchor,
            boundaries,
            hazards: hazards.to_vec(),
            cumulative,
        })
    }

    /// Integrated hazard from the anchor to `days` after the anchor.
    fn integrated_hazard(&self, days: i64) -> f64 {
        debug_assert!(days >= 0);
        let i = self.boundaries.partition_point(|&b| b < days);
        if i == 0 {
            return self.hazards[0] * days as f64 / DAYS_PER_YEAR;
        }
        let (seg_start, seg_cum) = (self.boundaries[i - 1], self.cumulative[i - 1]);
        // Past the last pillar the final hazard extends flat.
        let h = self.hazards[i.min(self.hazards.len() - 1)];
        seg_cum + h * (days - seg_start) as f64 / DAYS_PER_YEAR
    }

    /// The earliest date at which the survival probability is at most `u`.
    ///
    /// This inverts the survival curve, mapping a uniform draw to a default
    /// date. Returns `None` when the curve never decays to `u` (a zero
    /// tail hazard). `u == 1` maps to the anchor date.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` when `u` is outside `(0, 1]`.
    pub fn implied_default_date(&self, u: f64) -> Result<Option<Date>, MarketDataError> {
        if !(u > 0.0 && u <= 1.0) {
            return Err(MarketDataError::InvalidValue {
                reason: format!("Survival draw must be in (0, 1], got {}", u),
            });
        }
        let target = -u.ln();
        if target == 0.0 {
            return Ok(Some(self.anchor));
        }

        let i = self.cumulative.partition_point(|&c| c < target);
        let (seg_start, seg_cum) = if i == 0 {
            (0i64, 0.0)
        } else {
            (self.boundaries[i - 1], self.cumulative[i - 1])
        };
        let h = self.hazards[i.min(self.hazards.len() - 1)];
        if h <= 0.0 {
            // Hazard is flat at zero here, so survival never reaches u.
            return Ok(None);
        }
        let extra = (target - seg_cum) * DAYS_PER_YEAR / h;
        let days = seg_start + extra.ceil() as i64;
        Ok(Some(self.anchor.add_days(days)))
    }
}

impl SurvivalProbabilitySource for HazardCurve {
    fn reference_entity(&self) -> &ReferenceEntity {
        &self.entity
    }

    fn anchor_date(&self) -> Date {
        self.anchor
    }

    fn survival(&self, date: Date) -> Result<f64, MarketDataError> {
        if date < self.anchor {
            return Err(MarketDataError::BeforeAnchor {
                date,
                anchor: self.anchor,
            });
        }
        Ok((-self.integrated_hazard(date - self.anchor)).exp())
    }
}
