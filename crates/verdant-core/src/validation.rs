//! # Validation Module
//!
//! Input validation for the catalog write path.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Admin frontend                                               │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation before persist        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database constraints (NOT NULL, CHECK, FK)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The read path never validates: rows already in the store are
//! normalized leniently at ingestion (see verdant-db) and the resolver
//! treats them as immutable facts.

use crate::error::ValidationError;
use crate::types::{Discount, Promotion};
use crate::{MAX_DISCOUNT_BPS, MAX_QUANTITY_GRAMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product or promotion name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
///
/// ## Example
/// ```rust
/// use verdant_core::validation::validate_name;
///
/// assert!(validate_name("Sunset Sherbet 3.5g").is_ok());
/// assert!(validate_name("").is_err());
/// ```
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a category label.
///
/// Empty is allowed upstream by omitting the field entirely; a present
/// label must be non-empty and at most 100 characters.
pub fn validate_category(category: &str) -> ValidationResult<()> {
    let category = category.trim();

    if category.is_empty() {
        return Err(ValidationError::Required {
            field: "category".to_string(),
        });
    }

    if category.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "category".to_string(),
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (promotional freebies)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a line quantity in grams.
///
/// ## Rules
/// - Must be positive and finite
/// - Must not exceed MAX_QUANTITY_GRAMS
pub fn validate_quantity_grams(grams: f64) -> ValidationResult<()> {
    if !grams.is_finite() || grams <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if grams > MAX_QUANTITY_GRAMS {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_QUANTITY_GRAMS as i64,
        });
    }

    Ok(())
}

/// Validates a discount magnitude.
///
/// ## Rules
/// - Percentage: at most 100% (10000 bps)
/// - Fixed amount: non-negative
///
/// The resolver also floors final prices at zero, so an out-of-range row
/// that slips past authoring still cannot produce a negative total.
pub fn validate_discount(discount: &Discount) -> ValidationResult<()> {
    match discount {
        Discount::Percentage(pct) => {
            if pct.bps() > MAX_DISCOUNT_BPS {
                return Err(ValidationError::OutOfRange {
                    field: "discount".to_string(),
                    min: 0,
                    max: MAX_DISCOUNT_BPS as i64,
                });
            }
        }
        Discount::FixedAmount(amount) => {
            if amount.is_negative() {
                return Err(ValidationError::MustBePositive {
                    field: "discount".to_string(),
                });
            }
        }
    }

    Ok(())
}

// =============================================================================
// Schedule Validators
// =============================================================================

/// Validates a promotion's schedule fields before persisting.
///
/// ## Rules
/// - `starts_at` must not be after `ends_at` when both are present
/// - A time-of-day window must declare both bounds or neither
/// - Weekday values must be 0-6 (0 = Sunday)
///
/// Stored rows that violate these rules are still evaluated leniently
/// (an inverted window simply never matches); this check exists to catch
/// authoring mistakes before they reach the store.
pub fn validate_promotion_schedule(promotion: &Promotion) -> ValidationResult<()> {
    if let (Some(starts_at), Some(ends_at)) = (promotion.starts_at, promotion.ends_at) {
        if starts_at > ends_at {
            return Err(ValidationError::InvalidFormat {
                field: "validity window".to_string(),
                reason: "starts_at is after ends_at".to_string(),
            });
        }
    }

    if promotion.time_of_day_start.is_some() != promotion.time_of_day_end.is_some() {
        return Err(ValidationError::InvalidFormat {
            field: "time of day window".to_string(),
            reason: "both bounds are required".to_string(),
        });
    }

    if let Some(days) = &promotion.days_of_week {
        if days.iter().any(|day| *day > 6) {
            return Err(ValidationError::OutOfRange {
                field: "days_of_week".to_string(),
                min: 0,
                max: 6,
            });
        }
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use verdant_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{Money, Percent};
    use crate::types::PromotionScope;
    use chrono::{NaiveTime, TimeZone, Utc};

    fn promo() -> Promotion {
        Promotion::new(
            "promo-1",
            "vendor-1",
            "Test",
            PromotionScope::Global,
            Discount::Percentage(Percent::from_bps(1000)),
        )
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Sunset Sherbet 3.5g").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_category() {
        assert!(validate_category("flower").is_ok());
        assert!(validate_category("").is_err());
        assert!(validate_category(&"A".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(4000).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_validate_quantity_grams() {
        assert!(validate_quantity_grams(3.5).is_ok());
        assert!(validate_quantity_grams(0.0).is_err());
        assert!(validate_quantity_grams(-1.0).is_err());
        assert!(validate_quantity_grams(f64::NAN).is_err());
        assert!(validate_quantity_grams(20_000.0).is_err());
    }

    #[test]
    fn test_validate_discount() {
        assert!(validate_discount(&Discount::Percentage(Percent::from_bps(10_000))).is_ok());
        assert!(validate_discount(&Discount::Percentage(Percent::from_bps(10_001))).is_err());
        assert!(validate_discount(&Discount::FixedAmount(Money::from_cents(500))).is_ok());
        assert!(validate_discount(&Discount::FixedAmount(Money::from_cents(-500))).is_err());
    }

    #[test]
    fn test_validate_schedule_window_order() {
        let mut promotion = promo();
        promotion.starts_at = Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        promotion.ends_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!(validate_promotion_schedule(&promotion).is_err());

        promotion.ends_at = Some(Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap());
        assert!(validate_promotion_schedule(&promotion).is_ok());
    }

    #[test]
    fn test_validate_schedule_time_window_needs_both_bounds() {
        let mut promotion = promo();
        promotion.time_of_day_start = NaiveTime::from_hms_opt(16, 0, 0);
        assert!(validate_promotion_schedule(&promotion).is_err());

        promotion.time_of_day_end = NaiveTime::from_hms_opt(18, 0, 0);
        assert!(validate_promotion_schedule(&promotion).is_ok());
    }

    #[test]
    fn test_validate_schedule_weekdays() {
        let mut promotion = promo();
        promotion.days_of_week = Some(vec![0, 3, 6]);
        assert!(validate_promotion_schedule(&promotion).is_ok());

        promotion.days_of_week = Some(vec![7]);
        assert!(validate_promotion_schedule(&promotion).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
