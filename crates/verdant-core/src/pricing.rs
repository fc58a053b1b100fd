//! # Pricing Resolver
//!
//! Given a product, a candidate list of promotions, and purchase context
//! (quantity, optional tier), deterministically computes the price the
//! customer pays, which single promotion (if any) produced that price, and
//! a display badge.
//!
//! ## Resolution Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Price Resolution                                   │
//! │                                                                         │
//! │  Product + Promotions + (quantity, tier, now)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Base price:  override → tier price → regular → current → $0           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Filter:  is_promotion_active ∧ scope match                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Rank:  greatest discount, ties → higher priority                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PriceCalculation { original, final, savings, %, promotion, badge }    │
//! │                                                                         │
//! │  At most ONE promotion is ever applied. No stacking.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Purity
//! Every function here is a pure, total function over immutable inputs:
//! no I/O, no clock reads (evaluation time is an argument), no errors.
//! Concurrent callers need no coordination - each invocation works on its
//! own stack-local inputs and produces a fresh result.
//!
//! This resolver is a display-time calculation. The actual charge is
//! computed and persisted by the order pipeline, which consumes the same
//! functions at checkout with purchase-time context.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{AppliedPromotion, BadgeDisplay, Discount, Product, Promotion, PromotionScope};

// =============================================================================
// Result Types
// =============================================================================

/// The outcome of a single price resolution.
///
/// Constructed fresh per call; never persisted and has no identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceCalculation {
    /// The base price the calculation started from.
    pub original_price: Money,

    /// What the customer pays. Never negative.
    pub final_price: Money,

    /// `original_price - final_price`.
    pub savings: Money,

    /// Savings as a percentage of the original price (display only).
    /// Zero when the original price is zero.
    pub discount_percentage: f64,

    /// The single promotion that produced this price, if any.
    pub applied_promotion: Option<AppliedPromotion>,

    /// Badge from the winning promotion, color resolved for display.
    pub badge: Option<BadgeDisplay>,
}

impl PriceCalculation {
    /// A calculation where no promotion applied: price unchanged.
    fn unchanged(base: Money) -> Self {
        PriceCalculation {
            original_price: base,
            final_price: base,
            savings: Money::zero(),
            discount_percentage: 0.0,
            applied_promotion: None,
            badge: None,
        }
    }
}

/// A per-tier price quote produced by [`calculate_tier_prices`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TierQuote {
    /// Tier id from the blueprint, e.g. "3_5g".
    pub tier_id: String,
    /// Tier display label, e.g. "Eighth".
    pub label: String,
    /// Tier weight in grams.
    pub grams: f64,
    /// The resolved price for this tier.
    pub calculation: PriceCalculation,
}

// =============================================================================
// Activity & Applicability
// =============================================================================

/// Checks whether a promotion is live at `now`.
///
/// A promotion is active iff its active flag is set AND `now` falls within
/// the validity window when bounds are present AND `now`'s weekday is
/// allowed when an allowlist is present AND `now`'s time-of-day falls
/// within the window when BOTH bounds are present. An absent bound imposes
/// no restriction. All comparisons are inclusive at the boundaries.
///
/// Weekdays use 0 = Sunday .. 6 = Saturday.
pub fn is_promotion_active(promotion: &Promotion, now: DateTime<Utc>) -> bool {
    if !promotion.is_active {
        return false;
    }

    if let Some(starts_at) = promotion.starts_at {
        if now < starts_at {
            return false;
        }
    }
    if let Some(ends_at) = promotion.ends_at {
        if now > ends_at {
            return false;
        }
    }

    if let Some(days) = &promotion.days_of_week {
        let today = now.weekday().num_days_from_sunday() as u8;
        if !days.contains(&today) {
            return false;
        }
    }

    // Time-of-day window only constrains when both ends are declared
    if let (Some(start), Some(end)) = (promotion.time_of_day_start, promotion.time_of_day_end) {
        let time = now.time();
        if time < start || time > end {
            return false;
        }
    }

    true
}

/// Checks whether an active promotion applies to this product and
/// purchase context.
///
/// ## Scope Rules
/// - `Product`: product id is in the promotion's target list
/// - `Category`: product has a category and it is targeted
/// - `Tier`: a named tier id matches, or, when no tier ids are named,
///   the quantity falls within `[min_grams, max_grams]` (defaults:
///   0 / unbounded)
/// - `Global`: applies to everything
/// - `Unknown`: never applies
pub fn does_promotion_apply(
    promotion: &Promotion,
    product: &Product,
    quantity_grams: f64,
    tier_id: Option<&str>,
    now: DateTime<Utc>,
) -> bool {
    if !is_promotion_active(promotion, now) {
        return false;
    }

    match promotion.scope {
        PromotionScope::Product => promotion.product_ids.iter().any(|id| *id == product.id),

        PromotionScope::Category => match &product.category {
            Some(category) => promotion.categories.iter().any(|c| c == category),
            None => false,
        },

        PromotionScope::Tier => {
            if !promotion.tier_ids.is_empty() {
                tier_id
                    .map(|tier| promotion.tier_ids.iter().any(|id| id == tier))
                    .unwrap_or(false)
            } else {
                let min = promotion.min_grams.unwrap_or(0.0);
                let max = promotion.max_grams.unwrap_or(f64::INFINITY);
                quantity_grams >= min && quantity_grams <= max
            }
        }

        PromotionScope::Global => true,

        PromotionScope::Unknown => false,
    }
}

// =============================================================================
// Discount Math
// =============================================================================

/// Computes the discount a promotion takes off `original`.
///
/// Percentage: `original × bps / 10000`, rounded half-up.
/// Fixed amount: clamped to `original` so this step alone can never push
/// a price negative.
///
/// ## Example
/// ```rust
/// use verdant_core::money::Money;
/// use verdant_core::pricing::calculate_discount;
/// use verdant_core::types::{Discount, Promotion, PromotionScope};
///
/// let promo = Promotion::new(
///     "p",
///     "v",
///     "Overshoot",
///     PromotionScope::Global,
///     Discount::FixedAmount(Money::from_cents(1500)),
/// );
/// // $15 off a $10 item discounts $10, not $15
/// assert_eq!(
///     calculate_discount(&promo, Money::from_cents(1000)).cents(),
///     1000
/// );
/// ```
pub fn calculate_discount(promotion: &Promotion, original: Money) -> Money {
    match promotion.discount {
        Discount::Percentage(pct) => original.percent_of(pct),
        Discount::FixedAmount(amount) => amount.min(original),
    }
}

// =============================================================================
// Best-Offer Selection
// =============================================================================

/// Ranks applicable promotions against `base` and returns the winner.
///
/// Greatest discount wins; equal discounts fall to the higher priority;
/// a full tie keeps the earliest candidate (strict comparisons).
fn best_for_base<'a>(
    product: &Product,
    promotions: &'a [Promotion],
    quantity_grams: f64,
    tier_id: Option<&str>,
    base: Money,
    now: DateTime<Utc>,
) -> Option<&'a Promotion> {
    let mut best: Option<(&Promotion, Money)> = None;

    for promotion in promotions {
        if !does_promotion_apply(promotion, product, quantity_grams, tier_id, now) {
            continue;
        }

        let discount = calculate_discount(promotion, base);
        best = match best {
            None => Some((promotion, discount)),
            Some((leader, leader_discount)) => {
                let wins = discount > leader_discount
                    || (discount == leader_discount && promotion.priority > leader.priority);
                if wins {
                    Some((promotion, discount))
                } else {
                    Some((leader, leader_discount))
                }
            }
        };
    }

    best.map(|(promotion, _)| promotion)
}

/// Finds the single best promotion for a product out of a candidate list.
///
/// Filters to applicable promotions, computes each discount against the
/// product's base price, and selects the greatest; ties break in favor of
/// the higher `priority` value (default 0). Returns `None` when nothing
/// applies.
pub fn find_best_promotion<'a>(
    product: &Product,
    promotions: &'a [Promotion],
    quantity_grams: f64,
    tier_id: Option<&str>,
    now: DateTime<Utc>,
) -> Option<&'a Promotion> {
    best_for_base(
        product,
        promotions,
        quantity_grams,
        tier_id,
        product.base_price(),
        now,
    )
}

// =============================================================================
// Price Calculation
// =============================================================================

/// Resolves the price for a product in a given purchase context.
///
/// ## Base Price Precedence
/// 1. An explicit `tier_price_override`, when supplied
/// 2. The product's tier-price entry for `tier_id`, when both exist
/// 3. The product's regular price, falling back to current price, then $0
///
/// The winning promotion's savings come off that base;
/// `final = max(0, base - savings)`. Fixed discounts are already clamped
/// in [`calculate_discount`], and the floor here is kept as a second
/// guard for percentage edge cases. The discount percentage is 0 when the
/// base price is 0.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use verdant_core::pricing::calculate_price;
/// use verdant_core::types::{Discount, Product, Promotion, PromotionScope};
/// use verdant_core::Percent;
///
/// let mut product = Product::new("p1", "v1", "Blue Dream");
/// product.regular_price_cents = Some(4000);
///
/// let promo = Promotion::new(
///     "promo",
///     "v1",
///     "20% Off",
///     PromotionScope::Global,
///     Discount::Percentage(Percent::from_bps(2000)),
/// );
///
/// let quote = calculate_price(&product, &[promo], 1.0, None, None, Utc::now());
/// assert_eq!(quote.original_price.cents(), 4000);
/// assert_eq!(quote.final_price.cents(), 3200);
/// assert_eq!(quote.savings.cents(), 800);
/// assert_eq!(quote.discount_percentage, 20.0);
/// ```
pub fn calculate_price(
    product: &Product,
    promotions: &[Promotion],
    quantity_grams: f64,
    tier_id: Option<&str>,
    tier_price_override: Option<Money>,
    now: DateTime<Utc>,
) -> PriceCalculation {
    let base = tier_price_override
        .or_else(|| tier_id.and_then(|tier| product.tier_price(tier)))
        .unwrap_or_else(|| product.base_price());

    let winner = best_for_base(product, promotions, quantity_grams, tier_id, base, now);

    let Some(promotion) = winner else {
        return PriceCalculation::unchanged(base);
    };

    let savings = calculate_discount(promotion, base);
    let final_price = base.sub_floor_zero(savings);
    let discount_percentage = if base.is_zero() {
        0.0
    } else {
        savings.cents() as f64 / base.cents() as f64 * 100.0
    };

    PriceCalculation {
        original_price: base,
        final_price,
        savings,
        discount_percentage,
        applied_promotion: Some(AppliedPromotion::from(promotion)),
        badge: promotion.badge.as_ref().map(BadgeDisplay::from),
    }
}

/// Resolves a price for every priced tier in the product's blueprint.
///
/// Walks the blueprint's tier list in stored order (the blueprint is
/// pre-sorted by `sort_order`; nothing is re-sorted here), quoting each
/// tier that has a recorded price in `pricing_values` and skipping tiers
/// without one. Products without a blueprint quote no tiers.
pub fn calculate_tier_prices(
    product: &Product,
    promotions: &[Promotion],
    now: DateTime<Utc>,
) -> Vec<TierQuote> {
    let Some(blueprint) = &product.blueprint else {
        return Vec::new();
    };

    let mut quotes = Vec::with_capacity(blueprint.tiers.len());
    for tier in &blueprint.tiers {
        let Some(price) = product.tier_price(&tier.id) else {
            continue;
        };

        let calculation = calculate_price(
            product,
            promotions,
            tier.grams,
            Some(&tier.id),
            Some(price),
            now,
        );
        quotes.push(TierQuote {
            tier_id: tier.id.clone(),
            label: tier.label.clone(),
            grams: tier.grams,
            calculation,
        });
    }

    quotes
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Percent;
    use crate::types::{Badge, PricingBlueprint, TierSpec};
    use crate::DEFAULT_BADGE_COLOR;
    use chrono::{NaiveTime, TimeZone};

    /// Fixed evaluation time: Monday 2024-01-01 12:00:00 UTC.
    fn monday_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn priced_product(cents: i64) -> Product {
        let mut product = Product::new("prod-1", "vendor-1", "Sunset Sherbet");
        product.regular_price_cents = Some(cents);
        product
    }

    fn global_percent(id: &str, bps: u32) -> Promotion {
        Promotion::new(
            id,
            "vendor-1",
            format!("{}% off", bps / 100),
            PromotionScope::Global,
            Discount::Percentage(Percent::from_bps(bps)),
        )
    }

    fn global_fixed(id: &str, cents: i64) -> Promotion {
        Promotion::new(
            id,
            "vendor-1",
            "fixed off",
            PromotionScope::Global,
            Discount::FixedAmount(Money::from_cents(cents)),
        )
    }

    // -------------------------------------------------------------------------
    // Activity
    // -------------------------------------------------------------------------

    #[test]
    fn test_inactive_flag_disables_promotion() {
        let mut promo = global_percent("p", 2000);
        promo.is_active = false;
        assert!(!is_promotion_active(&promo, monday_noon()));
    }

    #[test]
    fn test_future_start_is_not_active() {
        let mut promo = global_percent("p", 2000);
        promo.starts_at = Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        assert!(!is_promotion_active(&promo, monday_noon()));
    }

    #[test]
    fn test_past_end_is_not_active() {
        let mut promo = global_percent("p", 2000);
        promo.ends_at = Some(Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap());
        assert!(!is_promotion_active(&promo, monday_noon()));
    }

    #[test]
    fn test_window_boundaries_are_inclusive() {
        let mut promo = global_percent("p", 2000);
        promo.starts_at = Some(monday_noon());
        promo.ends_at = Some(monday_noon());
        assert!(is_promotion_active(&promo, monday_noon()));
    }

    #[test]
    fn test_weekday_allowlist() {
        let mut promo = global_percent("p", 2000);

        // 2024-01-01 is a Monday → day 1 in 0=Sunday numbering
        promo.days_of_week = Some(vec![1]);
        assert!(is_promotion_active(&promo, monday_noon()));

        promo.days_of_week = Some(vec![0, 6]); // weekend only
        assert!(!is_promotion_active(&promo, monday_noon()));
    }

    #[test]
    fn test_time_of_day_window() {
        let mut promo = global_percent("p", 2000);
        promo.time_of_day_start = NaiveTime::from_hms_opt(16, 0, 0);
        promo.time_of_day_end = NaiveTime::from_hms_opt(18, 0, 0);

        // Noon is outside happy hour
        assert!(!is_promotion_active(&promo, monday_noon()));

        let four_pm = Utc.with_ymd_and_hms(2024, 1, 1, 16, 0, 0).unwrap();
        assert!(is_promotion_active(&promo, four_pm)); // inclusive start

        let six_pm = Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap();
        assert!(is_promotion_active(&promo, six_pm)); // inclusive end
    }

    #[test]
    fn test_single_time_bound_imposes_no_restriction() {
        let mut promo = global_percent("p", 2000);
        promo.time_of_day_start = NaiveTime::from_hms_opt(16, 0, 0);
        promo.time_of_day_end = None;
        assert!(is_promotion_active(&promo, monday_noon()));
    }

    // -------------------------------------------------------------------------
    // Applicability
    // -------------------------------------------------------------------------

    #[test]
    fn test_product_scope_requires_listing() {
        let product = priced_product(4000);

        let mut promo = global_percent("p", 2000);
        promo.scope = PromotionScope::Product;
        promo.product_ids = vec!["prod-1".to_string()];
        assert!(does_promotion_apply(&promo, &product, 1.0, None, monday_noon()));

        promo.product_ids = vec!["other".to_string()];
        assert!(!does_promotion_apply(&promo, &product, 1.0, None, monday_noon()));
    }

    #[test]
    fn test_category_scope_requires_product_category() {
        let mut product = priced_product(4000);

        let mut promo = global_percent("p", 2000);
        promo.scope = PromotionScope::Category;
        promo.categories = vec!["flower".to_string()];

        // No category on the product → never matches
        assert!(!does_promotion_apply(&promo, &product, 1.0, None, monday_noon()));

        product.category = Some("flower".to_string());
        assert!(does_promotion_apply(&promo, &product, 1.0, None, monday_noon()));

        product.category = Some("edibles".to_string());
        assert!(!does_promotion_apply(&promo, &product, 1.0, None, monday_noon()));
    }

    #[test]
    fn test_tier_scope_by_named_tier() {
        let product = priced_product(4000);

        let mut promo = global_percent("p", 2000);
        promo.scope = PromotionScope::Tier;
        promo.tier_ids = vec!["3_5g".to_string()];

        assert!(does_promotion_apply(&promo, &product, 3.5, Some("3_5g"), monday_noon()));
        assert!(!does_promotion_apply(&promo, &product, 7.0, Some("7g"), monday_noon()));
        // Named tiers require a supplied tier id
        assert!(!does_promotion_apply(&promo, &product, 3.5, None, monday_noon()));
    }

    #[test]
    fn test_tier_scope_by_gram_bounds() {
        let product = priced_product(4000);

        let mut promo = global_percent("p", 2000);
        promo.scope = PromotionScope::Tier;
        promo.min_grams = Some(7.0);
        promo.max_grams = Some(28.0);

        assert!(does_promotion_apply(&promo, &product, 7.0, None, monday_noon())); // inclusive
        assert!(does_promotion_apply(&promo, &product, 28.0, None, monday_noon())); // inclusive
        assert!(!does_promotion_apply(&promo, &product, 3.5, None, monday_noon()));
        assert!(!does_promotion_apply(&promo, &product, 28.5, None, monday_noon()));
    }

    #[test]
    fn test_tier_scope_default_bounds_are_open() {
        let product = priced_product(4000);

        let mut promo = global_percent("p", 2000);
        promo.scope = PromotionScope::Tier;
        // No tier ids, no bounds: any quantity matches
        assert!(does_promotion_apply(&promo, &product, 0.0, None, monday_noon()));
        assert!(does_promotion_apply(&promo, &product, 1000.0, None, monday_noon()));
    }

    #[test]
    fn test_unknown_scope_never_applies() {
        let product = priced_product(4000);

        let mut promo = global_percent("p", 2000);
        promo.scope = PromotionScope::Unknown;
        assert!(!does_promotion_apply(&promo, &product, 1.0, None, monday_noon()));
    }

    #[test]
    fn test_inactive_promotion_never_applies_regardless_of_scope() {
        let product = priced_product(4000);

        let mut promo = global_percent("p", 2000);
        promo.is_active = false;
        assert!(!does_promotion_apply(&promo, &product, 1.0, None, monday_noon()));
    }

    // -------------------------------------------------------------------------
    // Discount math & best-offer selection
    // -------------------------------------------------------------------------

    #[test]
    fn test_fixed_discount_clamps_to_price() {
        let promo = global_fixed("p", 1500);
        assert_eq!(
            calculate_discount(&promo, Money::from_cents(1000)).cents(),
            1000
        );
        assert_eq!(
            calculate_discount(&promo, Money::from_cents(2000)).cents(),
            1500
        );
    }

    #[test]
    fn test_best_promotion_is_highest_discount() {
        let product = priced_product(4000);
        let promos = vec![
            global_percent("ten", 1000),    // $4.00 off
            global_percent("twenty", 2000), // $8.00 off ← winner
            global_fixed("five-flat", 500), // $5.00 off
        ];

        let best = find_best_promotion(&product, &promos, 1.0, None, monday_noon()).unwrap();
        assert_eq!(best.id, "twenty");
    }

    #[test]
    fn test_equal_savings_resolve_by_priority() {
        let product = priced_product(4000);

        // Both discount exactly $8.00
        let mut low = global_percent("low", 2000);
        low.priority = 1;
        let mut high = global_fixed("high", 800);
        high.priority = 5;

        let promos = vec![low, high];
        let best = find_best_promotion(&product, &promos, 1.0, None, monday_noon()).unwrap();
        assert_eq!(best.id, "high");
    }

    #[test]
    fn test_full_tie_keeps_first_candidate() {
        let product = priced_product(4000);
        let promos = vec![global_percent("first", 2000), global_fixed("second", 800)];

        let best = find_best_promotion(&product, &promos, 1.0, None, monday_noon()).unwrap();
        assert_eq!(best.id, "first");
    }

    #[test]
    fn test_no_applicable_promotion_returns_none() {
        let product = priced_product(4000);

        let mut promo = global_percent("p", 2000);
        promo.is_active = false;
        assert!(find_best_promotion(&product, &[promo], 1.0, None, monday_noon()).is_none());
    }

    // -------------------------------------------------------------------------
    // calculate_price
    // -------------------------------------------------------------------------

    #[test]
    fn test_no_promotions_leaves_price_unchanged() {
        let product = priced_product(4000);
        let quote = calculate_price(&product, &[], 1.0, None, None, monday_noon());

        assert_eq!(quote.original_price.cents(), 4000);
        assert_eq!(quote.final_price.cents(), 4000);
        assert_eq!(quote.savings.cents(), 0);
        assert_eq!(quote.discount_percentage, 0.0);
        assert!(quote.applied_promotion.is_none());
        assert!(quote.badge.is_none());
    }

    #[test]
    fn test_twenty_percent_off_forty_dollars() {
        let product = priced_product(4000);
        let promo = global_percent("p", 2000);

        let quote = calculate_price(&product, &[promo], 1.0, None, None, monday_noon());
        assert_eq!(quote.original_price.cents(), 4000);
        assert_eq!(quote.final_price.cents(), 3200);
        assert_eq!(quote.savings.cents(), 800);
        assert_eq!(quote.discount_percentage, 20.0);
        assert_eq!(quote.applied_promotion.unwrap().id, "p");
    }

    #[test]
    fn test_oversized_fixed_discount_floors_at_zero() {
        // $15 off a $10 product: savings clamp to $10, price floors at $0
        let product = priced_product(1000);
        let promo = global_fixed("p", 1500);

        let quote = calculate_price(&product, &[promo], 1.0, None, None, monday_noon());
        assert_eq!(quote.final_price.cents(), 0);
        assert_eq!(quote.savings.cents(), 1000);
        assert_eq!(quote.discount_percentage, 100.0);
    }

    #[test]
    fn test_percentage_bounds_hold() {
        // 0% and 100% both stay within [0, original]
        let product = priced_product(4000);

        let quote = calculate_price(
            &product,
            &[global_percent("zero", 0)],
            1.0,
            None,
            None,
            monday_noon(),
        );
        assert_eq!(quote.final_price.cents(), 4000);

        let quote = calculate_price(
            &product,
            &[global_percent("all", 10_000)],
            1.0,
            None,
            None,
            monday_noon(),
        );
        assert_eq!(quote.final_price.cents(), 0);
        assert_eq!(quote.savings.cents(), 4000);
    }

    #[test]
    fn test_zero_base_price_has_zero_discount_percentage() {
        let product = Product::new("prod-1", "vendor-1", "Unpriced");
        let promo = global_percent("p", 2000);

        let quote = calculate_price(&product, &[promo], 1.0, None, None, monday_noon());
        assert_eq!(quote.original_price.cents(), 0);
        assert_eq!(quote.final_price.cents(), 0);
        assert_eq!(quote.discount_percentage, 0.0); // no division by zero
    }

    #[test]
    fn test_base_price_precedence() {
        let mut product = priced_product(4000);
        product.current_price_cents = Some(3800);
        product.pricing_values.insert("3_5g".to_string(), 3000);

        // Explicit override beats everything
        let quote = calculate_price(
            &product,
            &[],
            3.5,
            Some("3_5g"),
            Some(Money::from_cents(2500)),
            monday_noon(),
        );
        assert_eq!(quote.original_price.cents(), 2500);

        // Tier map entry beats regular price
        let quote = calculate_price(&product, &[], 3.5, Some("3_5g"), None, monday_noon());
        assert_eq!(quote.original_price.cents(), 3000);

        // Unknown tier falls back to regular price
        let quote = calculate_price(&product, &[], 3.5, Some("nope"), None, monday_noon());
        assert_eq!(quote.original_price.cents(), 4000);

        // Regular absent → current price
        product.regular_price_cents = None;
        let quote = calculate_price(&product, &[], 1.0, None, None, monday_noon());
        assert_eq!(quote.original_price.cents(), 3800);
    }

    #[test]
    fn test_badge_passes_through_with_default_color() {
        let product = priced_product(4000);

        let mut promo = global_percent("p", 2000);
        promo.badge = Some(Badge {
            text: "20% OFF".to_string(),
            color: None,
        });

        let quote = calculate_price(&product, &[promo], 1.0, None, None, monday_noon());
        let badge = quote.badge.unwrap();
        assert_eq!(badge.text, "20% OFF");
        assert_eq!(badge.color, DEFAULT_BADGE_COLOR);
    }

    // -------------------------------------------------------------------------
    // calculate_tier_prices
    // -------------------------------------------------------------------------

    fn flower_blueprint() -> PricingBlueprint {
        PricingBlueprint {
            id: "bp-flower".to_string(),
            name: "Flower".to_string(),
            tiers: vec![
                TierSpec {
                    id: "1g".to_string(),
                    label: "Gram".to_string(),
                    grams: 1.0,
                    sort_order: 0,
                },
                TierSpec {
                    id: "3_5g".to_string(),
                    label: "Eighth".to_string(),
                    grams: 3.5,
                    sort_order: 1,
                },
                TierSpec {
                    id: "7g".to_string(),
                    label: "Quarter".to_string(),
                    grams: 7.0,
                    sort_order: 2,
                },
            ],
        }
    }

    #[test]
    fn test_tier_prices_skip_unpriced_tiers() {
        let mut product = priced_product(4000);
        product.blueprint = Some(flower_blueprint());
        product.pricing_values.insert("3_5g".to_string(), 3000);
        // 1g and 7g have no recorded price

        let quotes = calculate_tier_prices(&product, &[], monday_noon());
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].tier_id, "3_5g");
        assert_eq!(quotes[0].calculation.original_price.cents(), 3000);
    }

    #[test]
    fn test_tier_prices_preserve_blueprint_order() {
        let mut product = priced_product(4000);
        product.blueprint = Some(flower_blueprint());
        product.pricing_values.insert("7g".to_string(), 5500);
        product.pricing_values.insert("1g".to_string(), 1000);
        product.pricing_values.insert("3_5g".to_string(), 3000);

        let quotes = calculate_tier_prices(&product, &[], monday_noon());
        let ids: Vec<&str> = quotes.iter().map(|q| q.tier_id.as_str()).collect();
        assert_eq!(ids, vec!["1g", "3_5g", "7g"]);
    }

    #[test]
    fn test_tier_prices_apply_promotions_per_tier() {
        let mut product = priced_product(4000);
        product.blueprint = Some(flower_blueprint());
        product.pricing_values.insert("1g".to_string(), 1000);
        product.pricing_values.insert("7g".to_string(), 5500);

        // Quarter-and-up promotion: only the 7g tier qualifies
        let mut promo = global_percent("bulk", 1000);
        promo.scope = PromotionScope::Tier;
        promo.min_grams = Some(7.0);

        let quotes = calculate_tier_prices(&product, &[promo], monday_noon());
        assert_eq!(quotes.len(), 2);

        assert_eq!(quotes[0].tier_id, "1g");
        assert!(quotes[0].calculation.applied_promotion.is_none());

        assert_eq!(quotes[1].tier_id, "7g");
        assert_eq!(quotes[1].calculation.final_price.cents(), 4950);
        assert!(quotes[1].calculation.applied_promotion.is_some());
    }

    #[test]
    fn test_no_blueprint_quotes_nothing() {
        let product = priced_product(4000);
        assert!(calculate_tier_prices(&product, &[], monday_noon()).is_empty());
    }
}
