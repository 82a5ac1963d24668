//! Enumeration types shared across the Verdant workspace.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Activity kinds
// ---------------------------------------------------------------------------

/// The family an emission factor belongs to.
///
/// The kind fixes the unit the activity quantity is measured in and which
/// default factor applies when a category is not in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ActivityKind {
    /// Travel, measured in kilometres.
    Transport,
    /// Energy consumption, measured in kilowatt-hours.
    Energy,
    /// Food intake, measured in kilocalories.
    Diet,
}

impl ActivityKind {
    /// All kinds, in table display order.
    pub const ALL: [Self; 3] = [Self::Transport, Self::Energy, Self::Diet];

    /// The unit quantities of this kind are expressed in.
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Transport => "km",
            Self::Energy => "kWh",
            Self::Diet => "kcal",
        }
    }

    /// Parse a kind name, case-insensitively. Returns `None` for unknown names.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "transport" | "transportation" => Some(Self::Transport),
            "energy" => Some(Self::Energy),
            "diet" | "food" => Some(Self::Diet),
            _ => None,
        }
    }
}

impl core::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Transport => "transport",
            Self::Energy => "energy",
            Self::Diet => "diet",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Factor provenance
// ---------------------------------------------------------------------------

/// Where the factor used for an estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum FactorSource {
    /// Exact match in the canonical factor table.
    Table,
    /// A regional grid factor replaced the table value.
    Regional,
    /// The category was not recognized; a documented default was used.
    Default,
}

impl FactorSource {
    /// Whether the estimate rests on a fallback rather than a known factor.
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }
}

// ---------------------------------------------------------------------------
// Offsets
// ---------------------------------------------------------------------------

/// Category of a carbon offset project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum OffsetProjectType {
    /// Forest protection and tree planting.
    Reforestation,
    /// Displacement of fossil generation by renewables.
    RenewableEnergy,
    /// Engineered removal and permanent storage.
    CarbonCapture,
}

impl OffsetProjectType {
    /// Parse a project type name, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "reforestation" => Some(Self::Reforestation),
            "renewable_energy" | "renewable" => Some(Self::RenewableEnergy),
            "carbon_capture" | "capture" => Some(Self::CarbonCapture),
            _ => None,
        }
    }
}

/// Verification state of an offset purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum VerificationStatus {
    /// Recorded but not yet confirmed by the certifying registry.
    PendingVerification,
    /// Confirmed by the certifying registry.
    Verified,
}

/// How soon a user can reach carbon neutrality through offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum CarbonNeutralTimeline {
    /// The recommended volume can be bought at once.
    Immediate,
    /// The volume is large enough to be phased over several months.
    ThreeToSixMonths,
}

// ---------------------------------------------------------------------------
// Community challenges
// ---------------------------------------------------------------------------

/// Template a community challenge is created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ChallengeType {
    /// Cut single-use plastic.
    PlasticReduction,
    /// Reduce household energy use.
    EnergySavings,
    /// Replace car trips with transit, cycling or walking.
    SustainableTransport,
}

impl ChallengeType {
    /// Parse a challenge type name, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "plastic_reduction" | "plastic" => Some(Self::PlasticReduction),
            "energy_savings" | "energy" => Some(Self::EnergySavings),
            "sustainable_transport" | "transport" | "transportation" => {
                Some(Self::SustainableTransport)
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Policy advocacy
// ---------------------------------------------------------------------------

/// Policy area an advocacy letter addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PolicyIssue {
    /// Transition of the power supply to renewables.
    RenewableEnergy,
    /// A price on carbon emissions.
    CarbonPricing,
    /// Transit, charging and active-travel infrastructure.
    Transportation,
    /// Energy efficiency standards for buildings.
    BuildingEfficiency,
}

impl PolicyIssue {
    /// Parse an issue name, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "renewable_energy" | "renewables" => Some(Self::RenewableEnergy),
            "carbon_pricing" | "carbon_tax" => Some(Self::CarbonPricing),
            "transportation" | "transport" => Some(Self::Transportation),
            "building_efficiency" | "buildings" => Some(Self::BuildingEfficiency),
            _ => None,
        }
    }

    /// The issue in running text.
    pub const fn label(self) -> &'static str {
        match self {
            Self::RenewableEnergy => "renewable energy",
            Self::CarbonPricing => "carbon pricing",
            Self::Transportation => "transportation",
            Self::BuildingEfficiency => "building efficiency",
        }
    }
}

/// How forcefully an advocacy letter opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum LetterUrgency {
    /// Expresses support.
    Low,
    /// Requests attention.
    Medium,
    /// Demands immediate action.
    High,
}

impl LetterUrgency {
    /// Parse an urgency level, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_units() {
        assert_eq!(ActivityKind::Transport.unit(), "km");
        assert_eq!(ActivityKind::Energy.unit(), "kWh");
        assert_eq!(ActivityKind::Diet.unit(), "kcal");
    }

    #[test]
    fn kind_parse_is_case_insensitive() {
        assert_eq!(ActivityKind::parse(" Energy "), Some(ActivityKind::Energy));
        assert_eq!(ActivityKind::parse("TRANSPORTATION"), Some(ActivityKind::Transport));
        assert_eq!(ActivityKind::parse("laundry"), None);
    }

    #[test]
    fn factor_source_serializes_snake_case() {
        let json = serde_json::to_string(&FactorSource::Default).ok();
        assert_eq!(json.as_deref(), Some("\"default\""));
        assert!(FactorSource::Default.is_default());
        assert!(!FactorSource::Regional.is_default());
    }

    #[test]
    fn policy_issue_accepts_spaced_names() {
        assert_eq!(
            PolicyIssue::parse("Carbon Pricing"),
            Some(PolicyIssue::CarbonPricing)
        );
        assert_eq!(
            PolicyIssue::parse("building-efficiency"),
            Some(PolicyIssue::BuildingEfficiency)
        );
        assert_eq!(PolicyIssue::parse("zoning"), None);
        assert_eq!(LetterUrgency::parse(" HIGH "), Some(LetterUrgency::High));
        assert_eq!(LetterUrgency::parse("urgent"), None);
    }

    #[test]
    fn challenge_type_aliases() {
        assert_eq!(ChallengeType::parse("energy"), Some(ChallengeType::EnergySavings));
        assert_eq!(ChallengeType::parse("gardening"), None);
    }
}
