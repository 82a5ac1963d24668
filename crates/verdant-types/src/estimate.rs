//! Input and output records of the emission estimator.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ActivityKind, FactorSource};

/// One activity to estimate, as received from a caller.
///
/// `context` is a free-form key/value map. The estimator recognizes
/// `region` (or `country`), `passengers` and `kind`; any other keys are
/// carried along untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActivityRecord {
    /// Free-form category name, matched case-insensitively.
    pub category: String,
    /// Amount of activity in the category's unit. Must be non-negative.
    #[ts(as = "String")]
    pub quantity: Decimal,
    /// Unit the caller believes the quantity is in, if stated.
    #[serde(default)]
    pub unit: Option<String>,
    /// Optional regional and occupancy context.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
}

impl ActivityRecord {
    /// Create a record with no unit and an empty context.
    pub fn new(category: impl Into<String>, quantity: Decimal) -> Self {
        Self {
            category: category.into(),
            quantity,
            unit: None,
            context: BTreeMap::new(),
        }
    }

    /// Add a context entry, returning the updated record.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Human-relatable equivalents of an emitted mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Equivalences {
    /// Tree-years of growth needed to absorb the mass.
    #[ts(as = "String")]
    pub trees: Decimal,
    /// Kilometres driven in an average gasoline car.
    #[ts(as = "String")]
    pub car_km: Decimal,
    /// Hours of driving in an average car.
    #[ts(as = "String")]
    pub car_hours: Decimal,
}

impl Equivalences {
    /// All-zero equivalents.
    pub const ZERO: Self = Self {
        trees: Decimal::ZERO,
        car_km: Decimal::ZERO,
        car_hours: Decimal::ZERO,
    };
}

/// The estimator's answer for one activity.
///
/// Key names are stable: downstream consumers (the aggregator, dashboards
/// reading the generated bindings) parse `co2_kg` and `factor_source`
/// directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EstimateResult {
    /// Estimated CO2-equivalent mass in kilograms.
    #[ts(as = "String")]
    pub co2_kg: Decimal,
    /// The category as matched (trimmed and lowercased).
    pub category: String,
    /// The quantity echoed back.
    #[ts(as = "String")]
    pub quantity: Decimal,
    /// Unit of the quantity.
    pub unit: String,
    /// Activity family, when known.
    pub kind: Option<ActivityKind>,
    /// Factor applied, in kg CO2e per unit.
    #[ts(as = "String")]
    pub factor_kg_per_unit: Decimal,
    /// Where the factor came from.
    pub factor_source: FactorSource,
    /// Passenger count the emission was shared across (1 when unshared).
    pub passengers: u32,
    /// Region used for a grid factor lookup, when one was given.
    pub region: Option<String>,
    /// Relatable equivalents of `co2_kg`.
    pub equivalences: Equivalences,
}

/// Daily and yearly footprint of a diet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DietEstimate {
    /// Estimate for a single day of the diet.
    pub daily: EstimateResult,
    /// Mass emitted over a full year of the diet.
    #[ts(as = "String")]
    pub yearly_co2_kg: Decimal,
    /// Relatable equivalents of the yearly mass.
    pub yearly_equivalences: Equivalences,
}

/// One row of the factor table, for display and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FactorEntry {
    /// Normalized category key.
    pub category: String,
    /// Activity family.
    pub kind: ActivityKind,
    /// kg CO2e per unit of the kind.
    #[ts(as = "String")]
    pub kg_co2e_per_unit: Decimal,
    /// Whether the emission is divided among passengers.
    pub shared: bool,
    /// Whether a regional grid factor may replace this value.
    pub grid_dependent: bool,
}
