//! The canonical emission factor table.
//!
//! Every factor is kg CO2e per unit of its [`ActivityKind`]: per km for
//! transport, per kWh for energy, per kcal for diet. The table is built
//! once from [`FactorConfig`] and never mutated afterwards, so it can be
//! shared freely between threads.
//!
//! # Unified values
//!
//! Earlier tooling carried several overlapping tables with conflicting
//! entries (a bare `car` at 0.12 kg/km next to `car_gasoline` at 0.192,
//! `natural_gas` at 2.75 per m3 next to 0.449 per kWh). The defaults here
//! keep one value per key:
//!
//! | Key | Factor | Note |
//! |-----|--------|------|
//! | `car` | 0.192 kg/km | alias of `car_gasoline` |
//! | `natural_gas` | 0.449 kg/kWh | energy basis, not volume |
//! | `flight` | 0.25 kg/km | short-haul average |
//! | `electricity` | 0.385 kg/kWh | US grid average, grid dependent |
//!
//! Diet factors are stored per kcal (3.3 kg per 1000 kcal becomes
//! 0.0033 kg/kcal) so every estimate is `quantity * factor`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::error;

use verdant_types::{ActivityKind, FactorEntry};

use crate::error::EstimateError;

/// One configured factor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FactorSpec {
    /// Activity family the factor belongs to.
    pub kind: ActivityKind,
    /// kg CO2e per unit of the kind.
    pub kg_co2e_per_unit: Decimal,
    /// Whether the emission is divided among passengers.
    #[serde(default)]
    pub shared: bool,
    /// Whether a regional grid factor may replace this value.
    #[serde(default)]
    pub grid_dependent: bool,
}

/// Fallback factors for categories not present in the table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DefaultFactors {
    /// Unknown transport mode, kg/km.
    #[serde(default = "default_transport")]
    pub transport: Decimal,
    /// Unknown energy source, kg/kWh.
    #[serde(default = "default_energy")]
    pub energy: Decimal,
    /// Unknown diet, kg/kcal.
    #[serde(default = "default_diet")]
    pub diet: Decimal,
    /// Unknown category with no kind hint at all.
    #[serde(default = "default_transport")]
    pub generic: Decimal,
}

impl Default for DefaultFactors {
    fn default() -> Self {
        Self {
            transport: default_transport(),
            energy: default_energy(),
            diet: default_diet(),
            generic: default_transport(),
        }
    }
}

/// Deserializable form of the factor table (the `factors` config section).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FactorConfig {
    /// Category key to factor.
    #[serde(default = "default_table")]
    pub table: BTreeMap<String, FactorSpec>,
    /// Region key to grid electricity factor, kg/kWh.
    #[serde(default = "default_regional_grid")]
    pub regional_grid: BTreeMap<String, Decimal>,
    /// Fallback factors.
    #[serde(default)]
    pub defaults: DefaultFactors,
}

impl Default for FactorConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            regional_grid: default_regional_grid(),
            defaults: DefaultFactors::default(),
        }
    }
}

/// The validated, immutable factor table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionFactorTable {
    /// Normalized category key to factor.
    factors: BTreeMap<String, FactorSpec>,
    /// Normalized region key to grid factor.
    regional_grid: BTreeMap<String, Decimal>,
    /// Fallbacks.
    defaults: DefaultFactors,
}

impl EmissionFactorTable {
    /// Build a table from configuration.
    ///
    /// Keys are trimmed and lowercased. An empty key, a negative factor,
    /// or two keys that collide after normalization are rejected. Default
    /// factors must be strictly positive so an unknown category never
    /// reports zero emissions.
    pub fn from_config(config: &FactorConfig) -> Result<Self, EstimateError> {
        let mut factors = BTreeMap::new();
        for (raw_key, spec) in &config.table {
            let key = normalize_key(raw_key);
            if key.is_empty() {
                return Err(EstimateError::InvalidFactor {
                    category: raw_key.clone(),
                    reason: "category key is empty",
                });
            }
            if spec.kg_co2e_per_unit.is_sign_negative() {
                return Err(EstimateError::InvalidFactor {
                    category: raw_key.clone(),
                    reason: "factor is negative",
                });
            }
            if factors.insert(key, spec.clone()).is_some() {
                return Err(EstimateError::InvalidFactor {
                    category: raw_key.clone(),
                    reason: "duplicate category after normalization",
                });
            }
        }

        let mut regional_grid = BTreeMap::new();
        for (raw_region, factor) in &config.regional_grid {
            if factor.is_sign_negative() {
                return Err(EstimateError::InvalidFactor {
                    category: raw_region.clone(),
                    reason: "regional grid factor is negative",
                });
            }
            if regional_grid.insert(normalize_key(raw_region), *factor).is_some() {
                return Err(EstimateError::InvalidFactor {
                    category: raw_region.clone(),
                    reason: "duplicate region after normalization",
                });
            }
        }

        let defaults = config.defaults.clone();
        for (name, value) in [
            ("defaults.transport", defaults.transport),
            ("defaults.energy", defaults.energy),
            ("defaults.diet", defaults.diet),
            ("defaults.generic", defaults.generic),
        ] {
            if value <= Decimal::ZERO {
                return Err(EstimateError::InvalidFactor {
                    category: name.to_owned(),
                    reason: "default factor must be positive",
                });
            }
        }

        Ok(Self {
            factors,
            regional_grid,
            defaults,
        })
    }

    /// The built-in table.
    ///
    /// The built-in config always validates (see the tests). Should that
    /// break, the table comes back empty and every estimate falls back to
    /// a default factor, so the failure is logged at `error`.
    pub fn canonical() -> Self {
        Self::from_config(&FactorConfig::default()).unwrap_or_else(|err| {
            error!(%err, "built-in factor table is invalid; only default factors remain");
            Self {
                factors: BTreeMap::new(),
                regional_grid: BTreeMap::new(),
                defaults: DefaultFactors::default(),
            }
        })
    }

    /// Look up a category. The key is normalized before matching.
    pub fn lookup(&self, category: &str) -> Option<&FactorSpec> {
        self.factors.get(&normalize_key(category))
    }

    /// Look up a regional grid factor.
    pub fn regional(&self, region: &str) -> Option<Decimal> {
        self.regional_grid.get(&normalize_key(region)).copied()
    }

    /// The fallback factor for a kind, or the generic fallback.
    pub const fn default_for(&self, kind: Option<ActivityKind>) -> Decimal {
        match kind {
            Some(ActivityKind::Transport) => self.defaults.transport,
            Some(ActivityKind::Energy) => self.defaults.energy,
            Some(ActivityKind::Diet) => self.defaults.diet,
            None => self.defaults.generic,
        }
    }

    /// Number of categories in the table.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Whether the table has no categories.
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// All entries, ordered by kind then category.
    pub fn entries(&self) -> Vec<FactorEntry> {
        let mut entries: Vec<FactorEntry> = self
            .factors
            .iter()
            .map(|(category, spec)| FactorEntry {
                category: category.clone(),
                kind: spec.kind,
                kg_co2e_per_unit: spec.kg_co2e_per_unit,
                shared: spec.shared,
                grid_dependent: spec.grid_dependent,
            })
            .collect();
        entries.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.category.cmp(&b.category)));
        entries
    }
}

/// Trim and lowercase a category or region key.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Built-in values
// ---------------------------------------------------------------------------

fn default_transport() -> Decimal {
    Decimal::new(15, 2)
}

fn default_energy() -> Decimal {
    Decimal::new(4, 1)
}

fn default_diet() -> Decimal {
    Decimal::new(2, 3)
}

fn spec(kind: ActivityKind, mantissa: i64, scale: u32) -> FactorSpec {
    FactorSpec {
        kind,
        kg_co2e_per_unit: Decimal::new(mantissa, scale),
        shared: false,
        grid_dependent: false,
    }
}

fn car(mantissa: i64, scale: u32) -> FactorSpec {
    FactorSpec {
        shared: true,
        ..spec(ActivityKind::Transport, mantissa, scale)
    }
}

fn default_table() -> BTreeMap<String, FactorSpec> {
    use ActivityKind::{Diet, Energy, Transport};

    let entries = [
        // Transport, kg per km.
        ("car", car(192, 3)),
        ("car_gasoline", car(192, 3)),
        ("car_diesel", car(171, 3)),
        ("car_electric", car(53, 3)),
        ("car_hybrid", car(102, 3)),
        ("bus", spec(Transport, 89, 3)),
        ("train", spec(Transport, 41, 3)),
        ("motorcycle", spec(Transport, 113, 3)),
        ("bicycle", spec(Transport, 0, 0)),
        ("walking", spec(Transport, 0, 0)),
        ("electric_scooter", spec(Transport, 15, 3)),
        ("flight", spec(Transport, 25, 2)),
        // Energy, kg per kWh.
        (
            "electricity",
            FactorSpec {
                grid_dependent: true,
                ..spec(Energy, 385, 3)
            },
        ),
        ("solar", spec(Energy, 45, 3)),
        ("wind", spec(Energy, 11, 3)),
        ("hydro", spec(Energy, 24, 3)),
        ("natural_gas", spec(Energy, 449, 3)),
        ("coal", spec(Energy, 900, 3)),
        // Diet, kg per kcal.
        ("meat_heavy", spec(Diet, 33, 4)),
        ("average", spec(Diet, 25, 4)),
        ("pescatarian", spec(Diet, 21, 4)),
        ("vegetarian", spec(Diet, 17, 4)),
        ("vegan", spec(Diet, 15, 4)),
    ];

    entries
        .into_iter()
        .map(|(key, spec)| (key.to_owned(), spec))
        .collect()
}

fn default_regional_grid() -> BTreeMap<String, Decimal> {
    [
        ("us", Decimal::new(385, 3)),
        ("eu", Decimal::new(275, 3)),
        ("china", Decimal::new(681, 3)),
        ("india", Decimal::new(708, 3)),
        ("germany", Decimal::new(312, 3)),
        // Nuclear-heavy grid.
        ("france", Decimal::new(52, 3)),
    ]
    .into_iter()
    .map(|(key, factor)| (key.to_owned(), factor))
    .collect()
}
