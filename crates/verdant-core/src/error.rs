//! # Error Types
//!
//! Domain-specific error types for verdant-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  verdant-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  verdant-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pricing resolver itself never returns an error: every resolver code
//! path produces a value, and malformed upstream data is normalized away
//! at ingestion (see verdant-db). These types guard the write path -
//! creating and updating products, promotions, and blueprints.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations on the authoring path.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Promotion cannot be found.
    #[error("Promotion not found: {0}")]
    PromotionNotFound(String),

    /// A promotion schedule is contradictory.
    ///
    /// ## When This Occurs
    /// - `starts_at` after `ends_at`
    /// - time-of-day window with only one bound supplied on create
    #[error("Promotion {promotion_id} has an invalid schedule: {reason}")]
    InvalidSchedule {
        promotion_id: String,
        reason: String,
    },

    /// A blueprint tier references a price the product does not carry.
    #[error("Product {product_id} has no price for tier {tier_id}")]
    MissingTierPrice {
        product_id: String,
        tier_id: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when authored input doesn't meet requirements.
/// Used for early validation before anything is persisted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid time window).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::MissingTierPrice {
            product_id: "prod-1".to_string(),
            tier_id: "3_5g".to_string(),
        };
        assert_eq!(err.to_string(), "Product prod-1 has no price for tier 3_5g");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 10_000,
        };
        assert_eq!(err.to_string(), "discount must be between 0 and 10000");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "price".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
