//! # Display Formatting
//!
//! String formatting helpers for prices and savings.
//!
//! These produce the exact strings the storefront and POS surfaces show.
//! Keeping them next to the resolver means a `PriceCalculation` formats
//! the same way on every surface; locale handling beyond USD is a
//! frontend concern.

use crate::money::Money;
use crate::pricing::PriceCalculation;

/// Formats a price for display: `$10.99`.
///
/// ## Example
/// ```rust
/// use verdant_core::format::format_price;
/// use verdant_core::money::Money;
///
/// assert_eq!(format_price(Money::from_cents(3200)), "$32.00");
/// ```
pub fn format_price(amount: Money) -> String {
    amount.to_string()
}

/// Formats a savings line: `Save $8.00`. Empty when there are no savings.
///
/// ## Example
/// ```rust
/// use verdant_core::format::format_savings;
/// use verdant_core::money::Money;
///
/// assert_eq!(format_savings(Money::from_cents(800)), "Save $8.00");
/// assert_eq!(format_savings(Money::zero()), "");
/// ```
pub fn format_savings(savings: Money) -> String {
    if savings.is_positive() {
        format!("Save {}", savings)
    } else {
        String::new()
    }
}

/// Formats a discount percentage: `20% OFF`. Whole percentages drop the
/// fraction; others keep one decimal place. Empty at zero.
///
/// ## Example
/// ```rust
/// use verdant_core::format::format_discount_percentage;
///
/// assert_eq!(format_discount_percentage(20.0), "20% OFF");
/// assert_eq!(format_discount_percentage(12.5), "12.5% OFF");
/// assert_eq!(format_discount_percentage(0.0), "");
/// ```
pub fn format_discount_percentage(percentage: f64) -> String {
    if percentage <= 0.0 {
        return String::new();
    }

    if percentage.fract() == 0.0 {
        format!("{}% OFF", percentage as i64)
    } else {
        format!("{:.1}% OFF", percentage)
    }
}

/// Formats the price line for a resolved calculation: discounted prices
/// show both the final and the struck-through original.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use verdant_core::format::format_price_line;
/// use verdant_core::pricing::calculate_price;
/// use verdant_core::types::{Discount, Product, Promotion, PromotionScope};
/// use verdant_core::Percent;
///
/// let mut product = Product::new("p1", "v1", "Blue Dream");
/// product.regular_price_cents = Some(4000);
/// let promo = Promotion::new(
///     "promo",
///     "v1",
///     "20% Off",
///     PromotionScope::Global,
///     Discount::Percentage(Percent::from_bps(2000)),
/// );
///
/// let quote = calculate_price(&product, &[promo], 1.0, None, None, Utc::now());
/// assert_eq!(format_price_line(&quote), "$32.00 (was $40.00)");
/// ```
pub fn format_price_line(calculation: &PriceCalculation) -> String {
    if calculation.savings.is_positive() {
        format!(
            "{} (was {})",
            calculation.final_price, calculation.original_price
        )
    } else {
        calculation.final_price.to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Money::from_cents(3200)), "$32.00");
        assert_eq!(format_price(Money::from_cents(99)), "$0.99");
        assert_eq!(format_price(Money::zero()), "$0.00");
    }

    #[test]
    fn test_format_savings() {
        assert_eq!(format_savings(Money::from_cents(800)), "Save $8.00");
        assert_eq!(format_savings(Money::zero()), "");
    }

    #[test]
    fn test_format_discount_percentage() {
        assert_eq!(format_discount_percentage(20.0), "20% OFF");
        assert_eq!(format_discount_percentage(12.5), "12.5% OFF");
        assert_eq!(format_discount_percentage(0.0), "");
    }

    #[test]
    fn test_format_price_line_without_discount() {
        let quote = PriceCalculation {
            original_price: Money::from_cents(4000),
            final_price: Money::from_cents(4000),
            savings: Money::zero(),
            discount_percentage: 0.0,
            applied_promotion: None,
            badge: None,
        };
        assert_eq!(format_price_line(&quote), "$40.00");
    }
}
