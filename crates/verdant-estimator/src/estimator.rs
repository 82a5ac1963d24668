//! The emission estimator.
//!
//! [`EmissionEstimator`] maps an activity (category, quantity, context) to
//! an [`EstimateResult`]. It is a pure function over an immutable
//! [`EmissionFactorTable`]: no I/O, no interior mutability, deterministic
//! for identical inputs. Share it by reference or behind an `Arc`.
//!
//! # Resolution order
//!
//! 1. Exact match of the trimmed, lowercased category -> `table`.
//!    A grid-dependent entry with a known `region` -> `regional`.
//! 2. Unknown category, kind `energy`, known `region` -> `regional`.
//! 3. Otherwise the default factor for the kind (or the generic default)
//!    -> `default`. Defaults are never zero.
//!
//! Shared-vehicle categories divide the emission by the passenger count
//! (minimum 1). That models shared responsibility, not physical output.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use verdant_types::{
    ActivityKind, ActivityRecord, DietEstimate, EstimateResult, FactorEntry, FactorSource,
};

use crate::equivalence::{DAYS_PER_YEAR, EquivalenceConfig};
use crate::error::EstimateError;
use crate::factors::{EmissionFactorTable, normalize_key};

/// Context keys read from a free-form map by [`EstimateContext::from_map`].
pub mod context_keys {
    /// Region or grid the activity happened in.
    pub const REGION: &str = "region";
    /// Synonym for [`REGION`].
    pub const COUNTRY: &str = "country";
    /// Number of people sharing a vehicle.
    pub const PASSENGERS: &str = "passengers";
    /// Activity kind hint (`transport`, `energy`, `diet`).
    pub const KIND: &str = "kind";
}

/// Optional context refining an estimate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EstimateContext {
    /// Region for grid factor lookup.
    pub region: Option<String>,
    /// People sharing the vehicle. `None` and `Some(0)` both mean one.
    pub passengers: Option<u32>,
    /// Kind hint used to pick a default for unknown categories.
    pub kind: Option<ActivityKind>,
    /// Unit the caller stated, if any.
    pub unit: Option<String>,
}

impl EstimateContext {
    /// Context with a kind hint only.
    pub fn for_kind(kind: ActivityKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Read recognized keys from a free-form map.
    ///
    /// Unknown keys are ignored. An unparseable `passengers` value or an
    /// unknown `kind` is logged and treated as absent; context is never
    /// fatal.
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let region = map
            .get(context_keys::REGION)
            .or_else(|| map.get(context_keys::COUNTRY))
            .map(|r| r.trim().to_owned())
            .filter(|r| !r.is_empty());

        let passengers = map.get(context_keys::PASSENGERS).and_then(|raw| {
            let parsed = raw.trim().parse::<u32>().ok();
            if parsed.is_none() {
                warn!(value = raw.as_str(), "ignoring unparseable passenger count");
            }
            parsed
        });

        let kind = map.get(context_keys::KIND).and_then(|raw| {
            let parsed = ActivityKind::parse(raw);
            if parsed.is_none() {
                warn!(value = raw.as_str(), "ignoring unknown activity kind");
            }
            parsed
        });

        Self {
            region,
            passengers,
            kind,
            unit: None,
        }
    }

    /// Effective passenger count (at least one).
    pub fn passenger_count(&self) -> u32 {
        self.passengers.unwrap_or(1).max(1)
    }
}

/// How a category was resolved to a factor.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Resolution {
    kind: Option<ActivityKind>,
    factor: Decimal,
    source: FactorSource,
    shared: bool,
    region: Option<String>,
}

/// Pure estimator over an immutable factor table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionEstimator {
    table: EmissionFactorTable,
    equivalence: EquivalenceConfig,
}

impl Default for EmissionEstimator {
    fn default() -> Self {
        Self::new(EmissionFactorTable::canonical(), EquivalenceConfig::default())
    }
}

impl EmissionEstimator {
    /// Create an estimator over a validated table.
    pub const fn new(table: EmissionFactorTable, equivalence: EquivalenceConfig) -> Self {
        Self { table, equivalence }
    }

    /// The factor table in use.
    pub const fn table(&self) -> &EmissionFactorTable {
        &self.table
    }

    /// The equivalence constants in use.
    pub const fn equivalence(&self) -> &EquivalenceConfig {
        &self.equivalence
    }

    /// Every factor in the table, ordered by kind then category.
    pub fn factors(&self) -> Vec<FactorEntry> {
        self.table.entries()
    }

    /// Parse a textual quantity.
    ///
    /// Accepts plain and scientific notation. Rejects text that is not a
    /// number and numbers below zero.
    pub fn parse_quantity(raw: &str) -> Result<Decimal, EstimateError> {
        let trimmed = raw.trim();
        let value = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .ok()
            .ok_or_else(|| EstimateError::NonNumericQuantity {
                field: "quantity",
                raw: raw.to_owned(),
            })?;
        validate_quantity("quantity", value)?;
        Ok(value)
    }

    /// Estimate the CO2e of one activity.
    pub fn estimate(
        &self,
        category: &str,
        quantity: Decimal,
        context: &EstimateContext,
    ) -> Result<EstimateResult, EstimateError> {
        validate_quantity("quantity", quantity)?;

        let resolution = self.resolve(category, context);
        let passengers = if resolution.shared {
            context.passenger_count()
        } else {
            1
        };

        let raw = quantity
            .checked_mul(resolution.factor)
            .ok_or(EstimateError::ArithmeticOverflow)?;
        let co2_kg = if passengers > 1 {
            raw.checked_div(Decimal::from(passengers))
                .ok_or(EstimateError::ArithmeticOverflow)?
        } else {
            raw
        }
        .normalize();

        let unit = resolution
            .kind
            .map(|k| k.unit().to_owned())
            .or_else(|| context.unit.clone())
            .unwrap_or_else(|| "unit".to_owned());
        if let (Some(kind), Some(stated)) = (resolution.kind, context.unit.as_deref())
            && !stated.eq_ignore_ascii_case(kind.unit())
        {
            warn!(
                category,
                stated_unit = stated,
                expected_unit = kind.unit(),
                "stated unit differs from factor unit; quantity taken as given"
            );
        }

        Ok(EstimateResult {
            co2_kg,
            category: normalize_key(category),
            quantity,
            unit,
            kind: resolution.kind,
            factor_kg_per_unit: resolution.factor,
            factor_source: resolution.source,
            passengers,
            region: resolution.region,
            equivalences: self.equivalence.equivalences(co2_kg),
        })
    }

    /// Estimate a caller-supplied [`ActivityRecord`].
    pub fn estimate_record(&self, record: &ActivityRecord) -> Result<EstimateResult, EstimateError> {
        let mut context = EstimateContext::from_map(&record.context);
        context.unit.clone_from(&record.unit);
        self.estimate(&record.category, record.quantity, &context)
    }

    /// Estimate a trip.
    pub fn estimate_transport(
        &self,
        vehicle: &str,
        distance_km: Decimal,
        passengers: u32,
    ) -> Result<EstimateResult, EstimateError> {
        let context = EstimateContext {
            passengers: Some(passengers),
            ..EstimateContext::for_kind(ActivityKind::Transport)
        };
        self.estimate(vehicle, distance_km, &context)
    }

    /// Estimate energy use, optionally on a regional grid.
    pub fn estimate_energy(
        &self,
        source: &str,
        energy_kwh: Decimal,
        region: Option<&str>,
    ) -> Result<EstimateResult, EstimateError> {
        let context = EstimateContext {
            region: region.map(str::to_owned),
            ..EstimateContext::for_kind(ActivityKind::Energy)
        };
        self.estimate(source, energy_kwh, &context)
    }

    /// Estimate the daily and yearly footprint of a diet.
    pub fn estimate_diet(
        &self,
        diet: &str,
        calories_per_day: Decimal,
    ) -> Result<DietEstimate, EstimateError> {
        let daily = self.estimate(
            diet,
            calories_per_day,
            &EstimateContext::for_kind(ActivityKind::Diet),
        )?;
        let yearly_co2_kg = daily
            .co2_kg
            .checked_mul(DAYS_PER_YEAR)
            .ok_or(EstimateError::ArithmeticOverflow)?
            .normalize();
        Ok(DietEstimate {
            yearly_equivalences: self.equivalence.equivalences(yearly_co2_kg),
            yearly_co2_kg,
            daily,
        })
    }

    fn resolve(&self, category: &str, context: &EstimateContext) -> Resolution {
        let regional = context
            .region
            .as_deref()
            .and_then(|region| self.table.regional(region).map(|f| (normalize_key(region), f)));

        if let Some(spec) = self.table.lookup(category) {
            if spec.grid_dependent
                && let Some((region, factor)) = regional
            {
                debug!(category, region = region.as_str(), %factor, "regional grid factor");
                return Resolution {
                    kind: Some(spec.kind),
                    factor,
                    source: FactorSource::Regional,
                    shared: spec.shared,
                    region: Some(region),
                };
            }
            debug!(category, factor = %spec.kg_co2e_per_unit, "table factor");
            return Resolution {
                kind: Some(spec.kind),
                factor: spec.kg_co2e_per_unit,
                source: FactorSource::Table,
                shared: spec.shared,
                region: None,
            };
        }

        if context.kind == Some(ActivityKind::Energy)
            && let Some((region, factor)) = regional
        {
            debug!(category, region = region.as_str(), %factor, "unknown source on regional grid");
            return Resolution {
                kind: context.kind,
                factor,
                source: FactorSource::Regional,
                shared: false,
                region: Some(region),
            };
        }

        let factor = self.table.default_for(context.kind);
        warn!(
            category,
            kind = ?context.kind,
            %factor,
            "unrecognized category; using default factor"
        );
        Resolution {
            kind: context.kind,
            factor,
            source: FactorSource::Default,
            shared: false,
            region: None,
        }
    }
}

fn validate_quantity(field: &'static str, value: Decimal) -> Result<(), EstimateError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(EstimateError::NegativeQuantity { field, value });
    }
    Ok(())
}
