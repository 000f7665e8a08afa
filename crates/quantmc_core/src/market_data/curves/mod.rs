//! Curve implementations: discounting, FX forwards and credit.

pub mod credit;
pub mod discount;
pub mod fx;
pub mod traits;

pub use credit::HazardCurve;
pub use discount::{FlatDiscountCurve, InterpolatedDiscountCurve};
pub use fx::ForwardParityFxSource;
pub use traits::{DiscountingSource, FxSource, SurvivalProbabilitySource};
