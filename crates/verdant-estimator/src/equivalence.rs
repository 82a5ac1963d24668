//! Conversion of emitted mass into relatable equivalents.
//!
//! Each equivalent divides the mass by a named constant. The constants are
//! configurable through [`EquivalenceConfig`]; the defaults below are the
//! values every report uses unless the config overrides them.

use rust_decimal::Decimal;
use serde::Deserialize;

use verdant_types::Equivalences;

/// kg CO2 a single tree absorbs in one year of growth.
pub const KG_CO2_PER_TREE_YEAR: Decimal = Decimal::from_parts(21, 0, 0, false, 0);

/// kg CO2 emitted per km by an average gasoline car (matches `car_gasoline`).
pub const KG_CO2_PER_CAR_KM: Decimal = Decimal::from_parts(192, 0, 0, false, 3);

/// kg CO2 emitted per hour of average car use.
pub const KG_CO2_PER_CAR_HOUR: Decimal = Decimal::from_parts(4, 0, 0, false, 1);

/// Days used to scale a daily footprint to a yearly one.
pub const DAYS_PER_YEAR: Decimal = Decimal::from_parts(365, 0, 0, false, 0);

/// Decimal places equivalents are rounded to.
pub const EQUIVALENCE_DECIMAL_PLACES: u32 = 2;

/// Conversion constants (the `equivalence` config section).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EquivalenceConfig {
    /// See [`KG_CO2_PER_TREE_YEAR`].
    #[serde(default = "default_tree_year")]
    pub kg_co2_per_tree_year: Decimal,
    /// See [`KG_CO2_PER_CAR_KM`].
    #[serde(default = "default_car_km")]
    pub kg_co2_per_car_km: Decimal,
    /// See [`KG_CO2_PER_CAR_HOUR`].
    #[serde(default = "default_car_hour")]
    pub kg_co2_per_car_hour: Decimal,
}

impl Default for EquivalenceConfig {
    fn default() -> Self {
        Self::canonical()
    }
}

impl EquivalenceConfig {
    /// The documented constants.
    pub const fn canonical() -> Self {
        Self {
            kg_co2_per_tree_year: KG_CO2_PER_TREE_YEAR,
            kg_co2_per_car_km: KG_CO2_PER_CAR_KM,
            kg_co2_per_car_hour: KG_CO2_PER_CAR_HOUR,
        }
    }

    /// Names of constants that are zero or negative.
    pub fn invalid_constants(&self) -> Vec<&'static str> {
        [
            ("kg_co2_per_tree_year", self.kg_co2_per_tree_year),
            ("kg_co2_per_car_km", self.kg_co2_per_car_km),
            ("kg_co2_per_car_hour", self.kg_co2_per_car_hour),
        ]
        .into_iter()
        .filter(|(_, value)| *value <= Decimal::ZERO)
        .map(|(name, _)| name)
        .collect()
    }

    /// Convert a mass into equivalents.
    pub fn equivalences(&self, co2_kg: Decimal) -> Equivalences {
        Equivalences {
            trees: ratio(co2_kg, self.kg_co2_per_tree_year),
            car_km: ratio(co2_kg, self.kg_co2_per_car_km),
            car_hours: ratio(co2_kg, self.kg_co2_per_car_hour),
        }
    }
}

/// `value / per`, rounded. A zero divisor yields zero.
pub fn ratio(value: Decimal, per: Decimal) -> Decimal {
    value
        .checked_div(per)
        .map_or(Decimal::ZERO, |v| v.round_dp(EQUIVALENCE_DECIMAL_PLACES))
}

const fn default_tree_year() -> Decimal {
    KG_CO2_PER_TREE_YEAR
}

const fn default_car_km() -> Decimal {
    KG_CO2_PER_CAR_KM
}

const fn default_car_hour() -> Decimal {
    KG_CO2_PER_CAR_HOUR
}
