//! Offset marketplace configuration and the built-in catalog.

use rust_decimal::Decimal;
use serde::Deserialize;

use verdant_types::{OffsetProject, OffsetProjectType};

/// The `offsets` config section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OffsetConfig {
    /// Projects available for purchase, in display order.
    #[serde(default = "default_projects")]
    pub projects: Vec<OffsetProject>,
    /// Price used to cost offset recommendations, USD per ton.
    #[serde(default = "default_average_cost_per_ton")]
    pub average_cost_per_ton: Decimal,
    /// Below this many recommended tons, neutrality is immediate.
    #[serde(default = "default_immediate_threshold_tons")]
    pub immediate_threshold_tons: Decimal,
}

impl Default for OffsetConfig {
    fn default() -> Self {
        Self {
            projects: default_projects(),
            average_cost_per_ton: default_average_cost_per_ton(),
            immediate_threshold_tons: default_immediate_threshold_tons(),
        }
    }
}

const fn default_average_cost_per_ton() -> Decimal {
    Decimal::from_parts(35, 0, 0, false, 0)
}

const fn default_immediate_threshold_tons() -> Decimal {
    Decimal::from_parts(10, 0, 0, false, 0)
}

fn project(
    name: &str,
    project_type: OffsetProjectType,
    location: &str,
    cost_per_ton: i64,
    co2_capacity_tons: i64,
    certification: &str,
    co_benefits: &[&str],
) -> OffsetProject {
    OffsetProject {
        name: name.to_owned(),
        project_type,
        location: location.to_owned(),
        cost_per_ton: Decimal::new(cost_per_ton, 0),
        co2_capacity_tons: Decimal::new(co2_capacity_tons, 0),
        certification: certification.to_owned(),
        co_benefits: co_benefits.iter().map(|b| (*b).to_owned()).collect(),
    }
}

fn default_projects() -> Vec<OffsetProject> {
    use OffsetProjectType::{CarbonCapture, Reforestation, RenewableEnergy};

    vec![
        project(
            "Amazon Rainforest Protection",
            Reforestation,
            "Brazil",
            25,
            50_000,
            "Verra",
            &["biodiversity", "community_employment", "water_protection"],
        ),
        project(
            "Urban Tree Planting Initiative",
            Reforestation,
            "United States",
            45,
            10_000,
            "Gold Standard",
            &["urban_cooling", "air_quality", "community_engagement"],
        ),
        project(
            "Solar Farm Development",
            RenewableEnergy,
            "India",
            30,
            75_000,
            "CDM",
            &["energy_access", "job_creation", "technology_transfer"],
        ),
        project(
            "Direct Air Capture Facility",
            CarbonCapture,
            "Iceland",
            150,
            4_000,
            "Puro Earth",
            &["technological_innovation", "permanent_removal"],
        ),
    ]
}
