//! Carbon offset marketplace for the Verdant climate impact toolkit.
//!
//! - [`marketplace`] -- [`OffsetMarketplace`]: catalog queries, offset needs, purchases
//! - [`catalog`] -- [`OffsetConfig`] and the built-in project catalog
//!
//! Costs are in US dollars, volumes in metric tons of CO2e. All amounts
//! are `Decimal`.

pub mod catalog;
pub mod marketplace;

pub use catalog::OffsetConfig;
pub use marketplace::{OffsetMarketplace, ProjectFilter};

use rust_decimal::Decimal;

/// Errors that can occur in the offset marketplace.
#[derive(Debug, thiserror::Error)]
pub enum OffsetError {
    /// A purchase named a project that is not in the catalog.
    #[error("unknown offset project: {0:?}")]
    UnknownProject(String),

    /// A purchase asked for zero or negative tons.
    #[error("tons must be positive, got {0}")]
    NonPositiveTons(Decimal),

    /// A purchase asked for more than the project can supply.
    #[error("{project:?} can supply {capacity} t, requested {requested} t")]
    ExceedsCapacity {
        /// The project name.
        project: String,
        /// Tons the project can supply.
        capacity: Decimal,
        /// Tons requested.
        requested: Decimal,
    },

    /// Emissions passed to the needs calculation were negative.
    #[error("current emissions must be non-negative, got {0}")]
    NegativeEmissions(Decimal),

    /// The reduction goal was outside 0..=100 percent.
    #[error("reduction goal must be within 0..=100 percent, got {0}")]
    GoalOutOfRange(Decimal),

    /// The catalog configuration is unusable.
    #[error("invalid offset catalog entry {project:?}: {reason}")]
    InvalidCatalog {
        /// The project at fault.
        project: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Arithmetic overflow in a checked `Decimal` operation.
    #[error("arithmetic overflow in offset calculation")]
    ArithmeticOverflow,
}
