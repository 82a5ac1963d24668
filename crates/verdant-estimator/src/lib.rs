//! Emission estimation for the Verdant climate impact toolkit.
//!
//! Maps an activity category and quantity to kilograms of CO2-equivalent
//! using one canonical factor table, with optional regional grid factors
//! and passenger sharing.
//!
//! # Modules
//!
//! - [`factors`] -- The validated, immutable [`EmissionFactorTable`]
//! - [`estimator`] -- [`EmissionEstimator`]: factor resolution and arithmetic
//! - [`equivalence`] -- Trees, car-km and car-hours equivalents
//! - [`error`] -- [`EstimateError`]
//!
//! # Guarantees
//!
//! - Negative or non-numeric quantities are rejected, never clamped.
//! - An unknown category is estimated with a positive default factor and
//!   flagged `factor_source = "default"`. It never reports zero.
//! - Identical inputs give identical outputs. The estimator holds no
//!   mutable state.

pub mod equivalence;
pub mod error;
pub mod estimator;
pub mod factors;

pub use equivalence::EquivalenceConfig;
pub use error::EstimateError;
pub use estimator::{EmissionEstimator, EstimateContext};
pub use factors::{DefaultFactors, EmissionFactorTable, FactorConfig, FactorSpec};
