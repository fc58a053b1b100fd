//! # Row Ingestion
//!
//! Loose catalog rows, normalized ONCE into domain types.
//!
//! ## Why a Separate Row Layer?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Ingestion Boundary                                 │
//! │                                                                         │
//! │  Catalog rows arrive from vendor imports and admin tooling in          │
//! │  loosely-typed shapes: decimal strings, JSON blobs, half-filled        │
//! │  columns.                                                              │
//! │                                                                         │
//! │  ProductRow / PromotionRow  (what the store actually holds)            │
//! │       │                                                                 │
//! │       ▼  normalize()  ← the ONLY place lenient parsing happens         │
//! │       │                                                                 │
//! │  Product / Promotion  (typed, validated domain values)                 │
//! │                                                                         │
//! │  Everything downstream of this file trusts its inputs. The pricing    │
//! │  resolver never sees a string price.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Degradation Rules
//! - Malformed price / magnitude → absent / zero, with a warning
//! - Unrecognized promotion scope → `PromotionScope::Unknown` (fails closed)
//! - Unrecognized discount mechanism → the whole row is skipped
//! - Malformed JSON columns → treated as empty, with a warning

use chrono::{DateTime, NaiveTime, Utc};
use serde_json::Value;
use sqlx::FromRow;
use std::collections::HashMap;
use tracing::warn;

use verdant_core::money::{Money, Percent};
use verdant_core::types::{
    Badge, Discount, PricingBlueprint, Product, Promotion, PromotionScope,
};

// =============================================================================
// Product Row
// =============================================================================

/// A product row as stored, before normalization.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: String,
    pub vendor_id: String,
    pub name: String,
    pub category: Option<String>,
    /// Decimal dollar string, possibly malformed.
    pub regular_price: Option<String>,
    pub current_price: Option<String>,
    /// JSON object: tier id → price (number or decimal string).
    pub pricing_values: Option<String>,
    /// JSON blueprint object.
    pub blueprint: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    /// Normalizes this row into a domain product.
    ///
    /// Total: every row produces a product. Malformed fields degrade to
    /// absent rather than failing, so one bad import row cannot take a
    /// menu down.
    pub fn normalize(self) -> Product {
        let regular_price_cents = parse_price_field(&self.id, "regular_price", &self.regular_price);
        let current_price_cents = parse_price_field(&self.id, "current_price", &self.current_price);

        Product {
            pricing_values: parse_pricing_values(&self.id, &self.pricing_values),
            blueprint: parse_blueprint(&self.id, &self.blueprint),
            id: self.id,
            vendor_id: self.vendor_id,
            name: self.name,
            category: self.category,
            regular_price_cents,
            current_price_cents,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn parse_price_field(product_id: &str, field: &str, raw: &Option<String>) -> Option<i64> {
    let text = raw.as_deref()?;
    match parse_money(text) {
        Some(money) => Some(money.cents()),
        None => {
            warn!(product_id, field, value = text, "Dropping malformed price");
            None
        }
    }
}

fn parse_pricing_values(product_id: &str, raw: &Option<String>) -> HashMap<String, i64> {
    let Some(text) = raw.as_deref() else {
        return HashMap::new();
    };

    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) else {
        warn!(product_id, "Dropping malformed pricing_values column");
        return HashMap::new();
    };

    let mut values = HashMap::with_capacity(map.len());
    for (tier_id, value) in map {
        match parse_money_json(&value) {
            Some(money) => {
                values.insert(tier_id, money.cents());
            }
            None => {
                warn!(product_id, tier_id = %tier_id, "Dropping malformed tier price");
            }
        }
    }
    values
}

fn parse_blueprint(product_id: &str, raw: &Option<String>) -> Option<PricingBlueprint> {
    let text = raw.as_deref()?;
    match serde_json::from_str::<PricingBlueprint>(text) {
        Ok(mut blueprint) => {
            // Establish the pre-sorted invariant the resolver relies on
            blueprint.tiers.sort_by_key(|tier| tier.sort_order);
            Some(blueprint)
        }
        Err(err) => {
            warn!(product_id, %err, "Dropping malformed blueprint column");
            None
        }
    }
}

// =============================================================================
// Promotion Row
// =============================================================================

/// A promotion row as stored, before normalization.
#[derive(Debug, Clone, FromRow)]
pub struct PromotionRow {
    pub id: String,
    pub vendor_id: String,
    pub name: String,
    pub scope: String,
    pub discount_type: String,
    /// Decimal string: percent points or dollars, by discount_type.
    pub discount_value: Option<String>,
    /// JSON arrays of target identifiers.
    pub product_ids: Option<String>,
    pub categories: Option<String>,
    pub tier_ids: Option<String>,
    pub min_grams: Option<f64>,
    pub max_grams: Option<f64>,
    pub badge_text: Option<String>,
    pub badge_color: Option<String>,
    pub priority: i64,
    pub is_active: bool,
    /// RFC 3339 timestamps, possibly malformed.
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    /// JSON array of weekday numbers.
    pub days_of_week: Option<String>,
    /// 'HH:MM' times.
    pub time_of_day_start: Option<String>,
    pub time_of_day_end: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PromotionRow {
    /// Normalizes this row into a domain promotion.
    ///
    /// Returns `None` for rows whose discount mechanism this version does
    /// not recognize - a rule we cannot price must not reach the
    /// resolver. An unrecognized *scope* keeps the row (it fails closed
    /// at evaluation instead), so the admin UI can still list it.
    pub fn normalize(self) -> Option<Promotion> {
        let discount = match self.discount_type.as_str() {
            "percentage" => {
                let pct = self
                    .discount_value
                    .as_deref()
                    .and_then(parse_percent)
                    .unwrap_or_else(|| {
                        warn!(promotion_id = %self.id, "Malformed percentage, degrading to 0%");
                        Percent::zero()
                    });
                Discount::Percentage(pct)
            }
            "fixed_amount" => {
                let amount = self
                    .discount_value
                    .as_deref()
                    .and_then(parse_money)
                    .unwrap_or_else(|| {
                        warn!(promotion_id = %self.id, "Malformed fixed amount, degrading to $0");
                        Money::zero()
                    });
                Discount::FixedAmount(amount)
            }
            other => {
                warn!(
                    promotion_id = %self.id,
                    discount_type = other,
                    "Skipping promotion with unrecognized discount mechanism"
                );
                return None;
            }
        };

        let scope = PromotionScope::parse(&self.scope);
        if scope == PromotionScope::Unknown {
            warn!(promotion_id = %self.id, scope = %self.scope, "Unknown scope, fails closed");
        }

        let badge = self.badge_text.map(|text| Badge {
            text,
            color: self.badge_color,
        });

        Some(Promotion {
            id: self.id,
            vendor_id: self.vendor_id,
            name: self.name,
            scope,
            discount,
            product_ids: parse_string_list(&self.product_ids),
            categories: parse_string_list(&self.categories),
            tier_ids: parse_string_list(&self.tier_ids),
            min_grams: self.min_grams.filter(|g| g.is_finite()),
            max_grams: self.max_grams.filter(|g| g.is_finite()),
            badge,
            priority: i32::try_from(self.priority).unwrap_or(0),
            is_active: self.is_active,
            starts_at: self.starts_at.as_deref().and_then(parse_datetime),
            ends_at: self.ends_at.as_deref().and_then(parse_datetime),
            days_of_week: parse_day_list(&self.days_of_week),
            time_of_day_start: self.time_of_day_start.as_deref().and_then(parse_time_of_day),
            time_of_day_end: self.time_of_day_end.as_deref().and_then(parse_time_of_day),
            created_at: self.created_at,
        })
    }
}

// =============================================================================
// Lenient Parsers
// =============================================================================

/// Parses a decimal dollar string into money. `None` on anything that is
/// not a finite, non-negative number.
pub(crate) fn parse_money(text: &str) -> Option<Money> {
    let trimmed = text.trim().trim_start_matches('$');
    let value: f64 = trimmed.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(Money::from_cents((value * 100.0).round() as i64))
}

/// Parses a JSON number or decimal string into money.
pub(crate) fn parse_money_json(value: &Value) -> Option<Money> {
    match value {
        Value::Number(number) => {
            let value = number.as_f64()?;
            if !value.is_finite() || value < 0.0 {
                return None;
            }
            Some(Money::from_cents((value * 100.0).round() as i64))
        }
        Value::String(text) => parse_money(text),
        _ => None,
    }
}

/// Parses a decimal percent-points string (e.g. "20", "12.5") into basis
/// points. `None` on anything that is not a finite, non-negative number.
pub(crate) fn parse_percent(text: &str) -> Option<Percent> {
    let value: f64 = text.trim().trim_end_matches('%').parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(Percent::from_bps((value * 100.0).round() as u32))
}

/// Parses an RFC 3339 timestamp.
pub(crate) fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parses an 'HH:MM' (or 'HH:MM:SS') time of day.
pub(crate) fn parse_time_of_day(text: &str) -> Option<NaiveTime> {
    let trimmed = text.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()
}

/// Parses a JSON array column of strings; non-strings are skipped.
pub(crate) fn parse_string_list(raw: &Option<String>) -> Vec<String> {
    let Some(text) = raw.as_deref() else {
        return Vec::new();
    };
    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text) else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}

/// Parses a JSON array column of weekday numbers (0-6); out-of-range and
/// non-numeric entries are skipped. A missing or malformed column means
/// "no weekday restriction".
pub(crate) fn parse_day_list(raw: &Option<String>) -> Option<Vec<u8>> {
    let text = raw.as_deref()?;
    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text) else {
        return None;
    };
    Some(
        items
            .iter()
            .filter_map(Value::as_u64)
            .filter(|day| *day <= 6)
            .map(|day| day as u8)
            .collect(),
    )
}

// =============================================================================
// Column Writers
// =============================================================================
// The write path is strict where the read path is lenient: rows this
// crate persists are always well-formed.

/// Formats money as the decimal dollar string stored in price columns.
pub(crate) fn money_to_decimal(money: Money) -> String {
    format!("{}.{:02}", money.dollars(), money.cents_part())
}

/// Formats a percent as the decimal points string stored in
/// `discount_value`.
pub(crate) fn percent_to_decimal(pct: Percent) -> String {
    let percentage = pct.percentage();
    if percentage.fract() == 0.0 {
        format!("{}", percentage as i64)
    } else {
        format!("{}", percentage)
    }
}

/// Splits a discount into its (discount_type, discount_value) columns.
pub(crate) fn discount_to_columns(discount: &Discount) -> (&'static str, String) {
    match discount {
        Discount::Percentage(pct) => ("percentage", percent_to_decimal(*pct)),
        Discount::FixedAmount(amount) => ("fixed_amount", money_to_decimal(*amount)),
    }
}

/// Serializes a string list column; empty lists store NULL.
pub(crate) fn string_list_to_json(items: &[String]) -> Option<String> {
    if items.is_empty() {
        None
    } else {
        serde_json::to_string(items).ok()
    }
}

/// Serializes the tier price map; empty maps store NULL.
pub(crate) fn pricing_values_to_json(values: &HashMap<String, i64>) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    let map: serde_json::Map<String, Value> = values
        .iter()
        .map(|(tier_id, cents)| {
            (
                tier_id.clone(),
                Value::String(money_to_decimal(Money::from_cents(*cents))),
            )
        })
        .collect();
    serde_json::to_string(&Value::Object(map)).ok()
}

/// Serializes the blueprint column.
pub(crate) fn blueprint_to_json(blueprint: &Option<PricingBlueprint>) -> Option<String> {
    blueprint
        .as_ref()
        .and_then(|bp| serde_json::to_string(bp).ok())
}

/// Serializes the weekday allowlist column.
pub(crate) fn day_list_to_json(days: &Option<Vec<u8>>) -> Option<String> {
    days.as_ref().and_then(|d| serde_json::to_string(d).ok())
}

/// Formats a time-of-day bound as 'HH:MM'.
pub(crate) fn time_to_column(time: Option<NaiveTime>) -> Option<String> {
    time.map(|t| t.format("%H:%M").to_string())
}

/// Formats an optional timestamp as RFC 3339.
pub(crate) fn datetime_to_column(datetime: Option<DateTime<Utc>>) -> Option<String> {
    datetime.map(|dt| dt.to_rfc3339())
}

// =============================================================================
// Unit Tests
// =============================================================================
