//! The offset marketplace.
//!
//! [`OffsetMarketplace`] is immutable once built: queries and purchases
//! take `&self`, and a purchase only produces a record. Recording the
//! offset against a user is the caller's job (the toolkit feeds it to the
//! aggregator as `offsets_purchased`).

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use verdant_types::{
    CarbonNeutralTimeline, OffsetNeeds, OffsetProject, OffsetProjectType, OffsetPurchase,
    ProjectListing, PurchaseId, UserId, VerificationStatus,
};

use crate::OffsetError;
use crate::catalog::OffsetConfig;

/// Kilograms per metric ton.
pub const KG_PER_TON: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Decimal places for reported tons and dollars.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

const ONE_HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Catalog query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    /// Only projects of this type. `None` for all types.
    pub project_type: Option<OffsetProjectType>,
    /// Case-insensitive substring of the project location. `None` or
    /// `"global"` for everywhere.
    pub location: Option<String>,
}

impl ProjectFilter {
    fn matches(&self, project: &OffsetProject) -> bool {
        let type_ok = self
            .project_type
            .is_none_or(|t| t == project.project_type);
        let location_ok = self
            .location
            .as_deref()
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty() && l != "global")
            .is_none_or(|l| project.location.to_lowercase().contains(&l));
        type_ok && location_ok
    }
}

/// Offset catalog with needs calculation and purchasing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetMarketplace {
    config: OffsetConfig,
}

impl OffsetMarketplace {
    /// Build a marketplace from a validated catalog.
    ///
    /// Project names must be unique (case-insensitively) and non-empty;
    /// prices must be non-negative and capacities positive.
    pub fn new(config: OffsetConfig) -> Result<Self, OffsetError> {
        let mut names = BTreeSet::new();
        for project in &config.projects {
            let reason = if project.name.trim().is_empty() {
                Some("name is empty")
            } else if project.cost_per_ton.is_sign_negative() {
                Some("cost per ton is negative")
            } else if project.co2_capacity_tons <= Decimal::ZERO {
                Some("capacity must be positive")
            } else if !names.insert(project.name.trim().to_lowercase()) {
                Some("duplicate project name")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(OffsetError::InvalidCatalog {
                    project: project.name.clone(),
                    reason,
                });
            }
        }
        for (name, value) in [
            ("average_cost_per_ton", config.average_cost_per_ton),
            ("immediate_threshold_tons", config.immediate_threshold_tons),
        ] {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(OffsetError::InvalidCatalog {
                    project: name.to_owned(),
                    reason: "must be non-negative",
                });
            }
        }
        Ok(Self { config })
    }

    /// The configuration in use.
    pub const fn config(&self) -> &OffsetConfig {
        &self.config
    }

    /// Look up a project by name, case-insensitively.
    pub fn project(&self, name: &str) -> Option<&OffsetProject> {
        let wanted = name.trim();
        self.config
            .projects
            .iter()
            .find(|p| p.name.trim().eq_ignore_ascii_case(wanted))
    }

    /// Projects matching `filter`, with their count and mean price.
    pub fn projects(&self, filter: &ProjectFilter) -> ProjectListing {
        let available: Vec<OffsetProject> = self
            .config
            .projects
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();

        let total_cost = available
            .iter()
            .fold(Decimal::ZERO, |acc, p| acc.saturating_add(p.cost_per_ton));
        let average_cost_per_ton = total_cost
            .checked_div(Decimal::from(available.len()))
            .map_or(Decimal::ZERO, |avg| {
                avg.round_dp(MONEY_DECIMAL_PLACES).normalize()
            });

        debug!(
            matched = available.len(),
            project_type = ?filter.project_type,
            "offset catalog queried"
        );

        ProjectListing {
            total_projects: u32::try_from(available.len()).unwrap_or(u32::MAX),
            available_projects: available,
            average_cost_per_ton,
            recommendation: filter
                .project_type
                .unwrap_or(OffsetProjectType::Reforestation),
        }
    }

    /// How many tons to offset after a planned reduction, and what it costs.
    pub fn offset_needs(
        &self,
        current_emissions_kg: Decimal,
        reduction_goal_percent: Decimal,
    ) -> Result<OffsetNeeds, OffsetError> {
        if current_emissions_kg.is_sign_negative() && !current_emissions_kg.is_zero() {
            return Err(OffsetError::NegativeEmissions(current_emissions_kg));
        }
        if reduction_goal_percent < Decimal::ZERO || reduction_goal_percent > ONE_HUNDRED {
            return Err(OffsetError::GoalOutOfRange(reduction_goal_percent));
        }

        let remaining_share = ONE_HUNDRED
            .checked_sub(reduction_goal_percent)
            .and_then(|r| r.checked_div(ONE_HUNDRED))
            .ok_or(OffsetError::ArithmeticOverflow)?;
        let recommended_tons = current_emissions_kg
            .checked_mul(remaining_share)
            .and_then(|kg| kg.checked_div(KG_PER_TON))
            .ok_or(OffsetError::ArithmeticOverflow)?;
        let cost = recommended_tons
            .checked_mul(self.config.average_cost_per_ton)
            .ok_or(OffsetError::ArithmeticOverflow)?;

        let carbon_neutral_timeline = if recommended_tons < self.config.immediate_threshold_tons {
            CarbonNeutralTimeline::Immediate
        } else {
            CarbonNeutralTimeline::ThreeToSixMonths
        };

        Ok(OffsetNeeds {
            current_emissions_tons: money(
                current_emissions_kg
                    .checked_div(KG_PER_TON)
                    .ok_or(OffsetError::ArithmeticOverflow)?,
            ),
            reduction_goal_percent,
            recommended_offset_tons: money(recommended_tons),
            estimated_cost_usd: money(cost),
            carbon_neutral_timeline,
        })
    }

    /// Purchase offsets stamped with the current time.
    pub fn purchase(
        &self,
        user_id: &UserId,
        project_name: &str,
        tons: Decimal,
    ) -> Result<OffsetPurchase, OffsetError> {
        self.purchase_at(user_id, project_name, tons, Utc::now())
    }

    /// Purchase offsets at an explicit timestamp.
    ///
    /// The purchase starts as pending verification.
    pub fn purchase_at(
        &self,
        user_id: &UserId,
        project_name: &str,
        tons: Decimal,
        purchased_at: DateTime<Utc>,
    ) -> Result<OffsetPurchase, OffsetError> {
        if tons <= Decimal::ZERO {
            return Err(OffsetError::NonPositiveTons(tons));
        }
        let project = self
            .project(project_name)
            .ok_or_else(|| OffsetError::UnknownProject(project_name.to_owned()))?;
        if tons > project.co2_capacity_tons {
            return Err(OffsetError::ExceedsCapacity {
                project: project.name.clone(),
                capacity: project.co2_capacity_tons,
                requested: tons,
            });
        }
        let total_cost_usd = tons
            .checked_mul(project.cost_per_ton)
            .ok_or(OffsetError::ArithmeticOverflow)?;

        let purchase = OffsetPurchase {
            purchase_id: PurchaseId::new(),
            user_id: user_id.clone(),
            project_name: project.name.clone(),
            tons_offset: tons.normalize(),
            total_cost_usd: money(total_cost_usd),
            purchased_at,
            verification_status: VerificationStatus::PendingVerification,
        };
        info!(
            purchase_id = %purchase.purchase_id,
            user_id = user_id.as_str(),
            project = project.name.as_str(),
            tons = %purchase.tons_offset,
            cost_usd = %purchase.total_cost_usd,
            "offset purchased"
        );
        Ok(purchase)
    }
}

fn money(value: Decimal) -> Decimal {
    value.round_dp(MONEY_DECIMAL_PLACES).normalize()
}
