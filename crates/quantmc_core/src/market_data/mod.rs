//! Market data: observables, curves and their error types.
//!
//! Everything a simulator consumes at calibration time lives here. An
//! [`Observable`] names a simulated quantity; the curve traits in
//! [`curves`] describe the static market data the models are built from.

pub mod curves;
pub mod error;
pub mod observables;

pub use curves::{
    DiscountingSource, FlatDiscountCurve, ForwardParityFxSource, FxSource, HazardCurve,
    InterpolatedDiscountCurve, SurvivalProbabilitySource,
};
pub use error::MarketDataError;
pub use observables::{FloatingIndex, Observable, ReferenceEntity};
