//! Error types for the `verdant-estimator` crate.

use rust_decimal::Decimal;

/// Errors that can occur while building a factor table or estimating.
#[derive(Debug, thiserror::Error)]
pub enum EstimateError {
    /// A quantity was below zero.
    #[error("{field} must be non-negative, got {value}")]
    NegativeQuantity {
        /// Name of the offending input field.
        field: &'static str,
        /// The rejected value.
        value: Decimal,
    },

    /// A quantity could not be read as a number.
    #[error("{field} must be numeric, got {raw:?}")]
    NonNumericQuantity {
        /// Name of the offending input field.
        field: &'static str,
        /// The raw text that failed to parse.
        raw: String,
    },

    /// A factor table entry is unusable.
    #[error("invalid emission factor for {category:?}: {reason}")]
    InvalidFactor {
        /// The table key at fault.
        category: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Arithmetic overflow in a checked `Decimal` operation.
    #[error("arithmetic overflow in emission calculation")]
    ArithmeticOverflow,
}
