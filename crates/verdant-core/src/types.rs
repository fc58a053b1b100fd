//! # Domain Types
//!
//! Core domain types used throughout Verdant.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   Promotion     │   │ PricingBlueprint│       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  category       │   │  scope          │   │  tiers          │       │
//! │  │  prices         │   │  discount       │   │  (pre-sorted)   │       │
//! │  │  pricing_values │   │  schedule       │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ PromotionScope  │   │    Discount     │   │     Badge       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Product        │   │  Percentage     │   │  text           │       │
//! │  │  Category       │   │  FixedAmount    │   │  color (opt)    │       │
//! │  │  Tier           │   └─────────────────┘   └─────────────────┘       │
//! │  │  Global         │                                                    │
//! │  │  Unknown (⊥)    │                                                    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A Promotion may apply to zero, one, or many Products depending on scope;
//! a Product may have many applicable Promotions at evaluation time, of
//! which at most ONE is applied per calculation.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::money::{Money, Percent};
use crate::DEFAULT_BADGE_COLOR;

// =============================================================================
// Promotion Scope
// =============================================================================

/// What a promotion targets.
///
/// Rows arriving from the store may carry scope strings this version does
/// not recognize; those normalize to [`PromotionScope::Unknown`], which
/// never applies to anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PromotionScope {
    /// Applies to specifically listed product ids.
    Product,
    /// Applies to products whose category is listed.
    Category,
    /// Applies to a weight tier, by tier id or by gram bounds.
    Tier,
    /// Applies to every product in the vendor's catalog.
    Global,
    /// Unrecognized scope. Fails closed: never applies.
    Unknown,
}

impl PromotionScope {
    /// Parses a stored scope string. Anything unrecognized maps to
    /// [`PromotionScope::Unknown`] rather than erroring, so rows written
    /// by newer versions load instead of breaking the menu.
    pub fn parse(value: &str) -> PromotionScope {
        match value {
            "product" => PromotionScope::Product,
            "category" => PromotionScope::Category,
            "tier" => PromotionScope::Tier,
            "global" => PromotionScope::Global,
            _ => PromotionScope::Unknown,
        }
    }

    /// The stored string form of this scope.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PromotionScope::Product => "product",
            PromotionScope::Category => "category",
            PromotionScope::Tier => "tier",
            PromotionScope::Global => "global",
            PromotionScope::Unknown => "unknown",
        }
    }
}

/// Unrecognized scope strings deserialize to `Unknown` instead of
/// failing.
impl<'de> Deserialize<'de> for PromotionScope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(PromotionScope::parse(&value))
    }
}

// =============================================================================
// Discount
// =============================================================================

/// The discount mechanism a promotion carries.
///
/// Magnitudes are typed at ingestion: percentages become basis points,
/// fixed amounts become cents. Both are non-negative by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Discount {
    /// Percentage off the base price (2000 bps = 20%).
    Percentage(Percent),
    /// Fixed amount off, clamped to the base price at calculation time.
    FixedAmount(Money),
}

// =============================================================================
// Badge
// =============================================================================

/// A short display label attached to a promotion (e.g. "20% OFF").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Badge {
    /// Label text shown on the product card.
    pub text: String,
    /// Chip color. None means the UI-neutral default.
    pub color: Option<String>,
}

/// A badge resolved for display: color is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BadgeDisplay {
    pub text: String,
    pub color: String,
}

impl From<&Badge> for BadgeDisplay {
    fn from(badge: &Badge) -> Self {
        BadgeDisplay {
            text: badge.text.clone(),
            color: badge
                .color
                .clone()
                .unwrap_or_else(|| DEFAULT_BADGE_COLOR.to_string()),
        }
    }
}

// =============================================================================
// Pricing Blueprint
// =============================================================================

/// A quantity break point within a pricing blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TierSpec {
    /// Tier identifier, e.g. "3_5g". Keys the product's `pricing_values`.
    pub id: String,
    /// Display label, e.g. "Eighth".
    pub label: String,
    /// Weight this tier represents, in grams.
    pub grams: f64,
    /// Position within the blueprint.
    pub sort_order: i32,
}

/// A vendor-configured template defining the set of tiers for a product
/// category (e.g. flower: 1g / 3.5g / 7g / 14g / 28g).
///
/// ## Invariant
/// `tiers` is stored pre-sorted by `sort_order`. Consumers iterate it in
/// order and do not re-sort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingBlueprint {
    pub id: String,
    pub name: String,
    pub tiers: Vec<TierSpec>,
}

// =============================================================================
// Product
// =============================================================================

/// A product in a vendor's catalog.
///
/// Price fields are optional because upstream records are partially
/// populated; ingestion guarantees any present price is non-negative.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Vendor this product belongs to.
    pub vendor_id: String,

    /// Display name shown on menus and receipts.
    pub name: String,

    /// Category label, e.g. "flower", "edibles".
    pub category: Option<String>,

    /// Regular (list) price in cents.
    pub regular_price_cents: Option<i64>,

    /// Current (possibly marked-down) price in cents.
    /// Used only when no regular price is present.
    pub current_price_cents: Option<i64>,

    /// Per-tier prices in cents, keyed by tier id from the blueprint.
    /// Tiers without an entry have no recorded price.
    pub pricing_values: HashMap<String, i64>,

    /// The tier template this product prices against, when weight-priced.
    pub blueprint: Option<PricingBlueprint>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a minimal active product with no prices recorded.
    ///
    /// Timestamps start at the Unix epoch; the storage layer stamps real
    /// times on insert (this crate never reads the clock).
    ///
    /// ## Example
    /// ```rust
    /// use verdant_core::types::Product;
    ///
    /// let mut product = Product::new("prod-1", "vendor-1", "Sunset Sherbet");
    /// product.regular_price_cents = Some(4000);
    /// assert_eq!(product.base_price().cents(), 4000);
    /// ```
    pub fn new(
        id: impl Into<String>,
        vendor_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let now = DateTime::UNIX_EPOCH;
        Product {
            id: id.into(),
            vendor_id: vendor_id.into(),
            name: name.into(),
            category: None,
            regular_price_cents: None,
            current_price_cents: None,
            pricing_values: HashMap::new(),
            blueprint: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the product's base price: regular price preferred, falling
    /// back to current price, defaulting to zero when both are absent.
    pub fn base_price(&self) -> Money {
        Money::from_cents(
            self.regular_price_cents
                .or(self.current_price_cents)
                .unwrap_or(0),
        )
    }

    /// Returns the recorded price for a tier, if the product carries one.
    pub fn tier_price(&self, tier_id: &str) -> Option<Money> {
        self.pricing_values
            .get(tier_id)
            .copied()
            .map(Money::from_cents)
    }
}

// =============================================================================
// Promotion
// =============================================================================

/// A pricing promotion in a vendor's catalog.
///
/// Scheduling fields are all optional; an absent bound imposes no
/// restriction. Day-of-week values use 0 = Sunday .. 6 = Saturday.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Promotion {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Vendor this promotion belongs to.
    pub vendor_id: String,

    /// Internal name, e.g. "Munchie Monday".
    pub name: String,

    /// What the promotion targets.
    pub scope: PromotionScope,

    /// Discount mechanism and magnitude.
    pub discount: Discount,

    /// Target product ids (scope = Product).
    pub product_ids: Vec<String>,

    /// Target category labels (scope = Category).
    pub categories: Vec<String>,

    /// Target tier ids (scope = Tier). Empty means gram bounds apply instead.
    pub tier_ids: Vec<String>,

    /// Minimum quantity in grams for tier-scope matching. Default 0.
    pub min_grams: Option<f64>,

    /// Maximum quantity in grams for tier-scope matching. Default unbounded.
    pub max_grams: Option<f64>,

    /// Display badge for the storefront.
    pub badge: Option<Badge>,

    /// Tie-break priority; higher wins. Default 0.
    pub priority: i32,

    /// Master on/off switch.
    pub is_active: bool,

    /// Validity window start (inclusive).
    #[ts(as = "Option<String>")]
    pub starts_at: Option<DateTime<Utc>>,

    /// Validity window end (inclusive).
    #[ts(as = "Option<String>")]
    pub ends_at: Option<DateTime<Utc>>,

    /// Allowed weekdays, 0 = Sunday .. 6 = Saturday. None = every day.
    pub days_of_week: Option<Vec<u8>>,

    /// Time-of-day window start (inclusive). Applies only when both
    /// bounds are present.
    #[ts(as = "Option<String>")]
    pub time_of_day_start: Option<NaiveTime>,

    /// Time-of-day window end (inclusive).
    #[ts(as = "Option<String>")]
    pub time_of_day_end: Option<NaiveTime>,

    /// When the promotion was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Promotion {
    /// Creates an always-on promotion with no targets or schedule.
    ///
    /// Callers set target lists and schedule fields as needed.
    ///
    /// ## Example
    /// ```rust
    /// use verdant_core::money::Percent;
    /// use verdant_core::types::{Discount, Promotion, PromotionScope};
    ///
    /// let promo = Promotion::new(
    ///     "promo-1",
    ///     "vendor-1",
    ///     "20% Off Everything",
    ///     PromotionScope::Global,
    ///     Discount::Percentage(Percent::from_bps(2000)),
    /// );
    /// assert!(promo.is_active);
    /// assert_eq!(promo.priority, 0);
    /// ```
    pub fn new(
        id: impl Into<String>,
        vendor_id: impl Into<String>,
        name: impl Into<String>,
        scope: PromotionScope,
        discount: Discount,
    ) -> Self {
        Promotion {
            id: id.into(),
            vendor_id: vendor_id.into(),
            name: name.into(),
            scope,
            discount,
            product_ids: Vec::new(),
            categories: Vec::new(),
            tier_ids: Vec::new(),
            min_grams: None,
            max_grams: None,
            badge: None,
            priority: 0,
            is_active: true,
            starts_at: None,
            ends_at: None,
            days_of_week: None,
            time_of_day_start: None,
            time_of_day_end: None,
            created_at: DateTime::UNIX_EPOCH,
        }
    }
}

// =============================================================================
// Applied Promotion
// =============================================================================

/// Reference to the promotion a price calculation applied.
///
/// A calculation result needs the identity for analytics and the name for
/// display, not the whole rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppliedPromotion {
    pub id: String,
    pub name: String,
}

impl From<&Promotion> for AppliedPromotion {
    fn from(promotion: &Promotion) -> Self {
        AppliedPromotion {
            id: promotion.id.clone(),
            name: promotion.name.clone(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_scope_fails_closed_on_parse() {
        let scope: PromotionScope = serde_json::from_str("\"flash_sale\"").unwrap();
        assert_eq!(scope, PromotionScope::Unknown);

        let known: PromotionScope = serde_json::from_str("\"category\"").unwrap();
        assert_eq!(known, PromotionScope::Category);
    }

    #[test]
    fn test_discount_serde_shape() {
        let discount = Discount::Percentage(Percent::from_bps(2000));
        let json = serde_json::to_string(&discount).unwrap();
        assert!(json.contains("\"percentage\""));

        let back: Discount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, discount);
    }

    #[test]
    fn test_badge_display_defaults_color() {
        let badge = Badge {
            text: "20% OFF".to_string(),
            color: None,
        };
        let display = BadgeDisplay::from(&badge);
        assert_eq!(display.color, DEFAULT_BADGE_COLOR);

        let badge = Badge {
            text: "BOGO".to_string(),
            color: Some("#16a34a".to_string()),
        };
        assert_eq!(BadgeDisplay::from(&badge).color, "#16a34a");
    }

    #[test]
    fn test_base_price_precedence() {
        let mut product = Product::new("p1", "v1", "Gelato");
        assert_eq!(product.base_price().cents(), 0);

        product.current_price_cents = Some(3500);
        assert_eq!(product.base_price().cents(), 3500);

        product.regular_price_cents = Some(4000);
        assert_eq!(product.base_price().cents(), 4000);
    }

    #[test]
    fn test_tier_price_lookup() {
        let mut product = Product::new("p1", "v1", "Gelato");
        product.pricing_values.insert("3_5g".to_string(), 3000);

        assert_eq!(product.tier_price("3_5g").unwrap().cents(), 3000);
        assert!(product.tier_price("7g").is_none());
    }

    #[test]
    fn test_applied_promotion_from_promotion() {
        let promo = Promotion::new(
            "promo-1",
            "v1",
            "Happy Hour",
            PromotionScope::Global,
            Discount::FixedAmount(Money::from_cents(500)),
        );
        let applied = AppliedPromotion::from(&promo);
        assert_eq!(applied.id, "promo-1");
        assert_eq!(applied.name, "Happy Hour");
    }
}
