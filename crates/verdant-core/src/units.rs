//! # Weight Units
//!
//! Weight tiers and gram conversions for cannabis retail pricing.
//!
//! ## The Retail Weight Ladder
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   Tier      │  Id      │  Grams  │  Typical Use                        │
//! │  ──────────-│──────────│─────────│──────────────────────────────────── │
//! │   Gram      │  "1g"    │   1.0   │  Single pre-roll, sample            │
//! │   Eighth    │  "3_5g"  │   3.5   │  The standard flower purchase       │
//! │   Quarter   │  "7g"    │   7.0   │                                     │
//! │   Half      │  "14g"   │  14.0   │                                     │
//! │   Ounce     │  "28g"   │  28.0   │  Common legal possession cap        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The retail ounce is 28 grams by convention (not the avoirdupois
//! 28.3495); every tier is an exact multiple, so conversions stay exact.
//!
//! Tier ids here are the canonical keys used by pricing blueprints and the
//! `pricing_values` maps on products. Vendors may define custom tiers in
//! their blueprints; this module covers the standard ladder.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Grams per retail ounce.
pub const GRAMS_PER_OUNCE: f64 = 28.0;

// =============================================================================
// Weight Unit
// =============================================================================

/// A standard retail weight tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    Gram,
    Eighth,
    Quarter,
    Half,
    Ounce,
}

impl WeightUnit {
    /// All standard tiers, smallest first.
    pub const ALL: [WeightUnit; 5] = [
        WeightUnit::Gram,
        WeightUnit::Eighth,
        WeightUnit::Quarter,
        WeightUnit::Half,
        WeightUnit::Ounce,
    ];

    /// Weight of this tier in grams.
    #[inline]
    pub const fn grams(&self) -> f64 {
        match self {
            WeightUnit::Gram => 1.0,
            WeightUnit::Eighth => 3.5,
            WeightUnit::Quarter => 7.0,
            WeightUnit::Half => 14.0,
            WeightUnit::Ounce => 28.0,
        }
    }

    /// Canonical tier id, as used in blueprints and `pricing_values`.
    pub const fn tier_id(&self) -> &'static str {
        match self {
            WeightUnit::Gram => "1g",
            WeightUnit::Eighth => "3_5g",
            WeightUnit::Quarter => "7g",
            WeightUnit::Half => "14g",
            WeightUnit::Ounce => "28g",
        }
    }

    /// Display label for menus.
    pub const fn label(&self) -> &'static str {
        match self {
            WeightUnit::Gram => "Gram",
            WeightUnit::Eighth => "Eighth",
            WeightUnit::Quarter => "Quarter",
            WeightUnit::Half => "Half Ounce",
            WeightUnit::Ounce => "Ounce",
        }
    }

    /// Looks up a standard tier by its canonical id.
    ///
    /// ## Example
    /// ```rust
    /// use verdant_core::units::WeightUnit;
    ///
    /// assert_eq!(WeightUnit::from_tier_id("3_5g"), Some(WeightUnit::Eighth));
    /// assert_eq!(WeightUnit::from_tier_id("custom"), None);
    /// ```
    pub fn from_tier_id(tier_id: &str) -> Option<WeightUnit> {
        WeightUnit::ALL
            .iter()
            .copied()
            .find(|unit| unit.tier_id() == tier_id)
    }

    /// Fraction of an ounce this tier represents.
    pub fn ounces(&self) -> f64 {
        self.grams() / GRAMS_PER_OUNCE
    }
}

// =============================================================================
// Conversions
// =============================================================================

/// Converts grams to retail ounces.
#[inline]
pub fn grams_to_ounces(grams: f64) -> f64 {
    grams / GRAMS_PER_OUNCE
}

/// Converts retail ounces to grams.
#[inline]
pub fn ounces_to_grams(ounces: f64) -> f64 {
    ounces * GRAMS_PER_OUNCE
}

/// Grams for a tier id: standard ladder first, then a lenient parse of
/// ids shaped like "3_5g" / "7g" for vendor-defined tiers.
///
/// ## Example
/// ```rust
/// use verdant_core::units::grams_for_tier;
///
/// assert_eq!(grams_for_tier("3_5g"), Some(3.5));
/// assert_eq!(grams_for_tier("2g"), Some(2.0));
/// assert_eq!(grams_for_tier("large"), None);
/// ```
pub fn grams_for_tier(tier_id: &str) -> Option<f64> {
    if let Some(unit) = WeightUnit::from_tier_id(tier_id) {
        return Some(unit.grams());
    }

    // Vendor-defined ids follow the same "<grams>g" shape with
    // underscores standing in for decimal points
    let digits = tier_id.strip_suffix('g')?;
    let normalized = digits.replace('_', ".");
    normalized.parse::<f64>().ok().filter(|g| *g > 0.0)
}

/// Formats a gram weight for display: whole grams drop the fraction.
///
/// ## Example
/// ```rust
/// use verdant_core::units::format_grams;
///
/// assert_eq!(format_grams(3.5), "3.5g");
/// assert_eq!(format_grams(7.0), "7g");
/// ```
pub fn format_grams(grams: f64) -> String {
    if grams.fract() == 0.0 {
        format!("{}g", grams as i64)
    } else {
        format!("{}g", grams)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ladder_is_exact() {
        assert_eq!(WeightUnit::Gram.grams(), 1.0);
        assert_eq!(WeightUnit::Eighth.grams(), 3.5);
        assert_eq!(WeightUnit::Quarter.grams(), 7.0);
        assert_eq!(WeightUnit::Half.grams(), 14.0);
        assert_eq!(WeightUnit::Ounce.grams(), 28.0);
    }

    #[test]
    fn test_tier_id_round_trip() {
        for unit in WeightUnit::ALL {
            assert_eq!(WeightUnit::from_tier_id(unit.tier_id()), Some(unit));
        }
        assert_eq!(WeightUnit::from_tier_id("500mg"), None);
    }

    #[test]
    fn test_ounce_fractions() {
        assert_eq!(WeightUnit::Eighth.ounces(), 0.125);
        assert_eq!(WeightUnit::Quarter.ounces(), 0.25);
        assert_eq!(WeightUnit::Ounce.ounces(), 1.0);
    }

    #[test]
    fn test_conversions_invert() {
        assert_eq!(grams_to_ounces(28.0), 1.0);
        assert_eq!(ounces_to_grams(0.5), 14.0);
        assert_eq!(ounces_to_grams(grams_to_ounces(3.5)), 3.5);
    }

    #[test]
    fn test_grams_for_tier_lenient_parse() {
        assert_eq!(grams_for_tier("1g"), Some(1.0));
        assert_eq!(grams_for_tier("3_5g"), Some(3.5));
        assert_eq!(grams_for_tier("2g"), Some(2.0));
        assert_eq!(grams_for_tier("10_5g"), Some(10.5));

        assert_eq!(grams_for_tier("large"), None);
        assert_eq!(grams_for_tier("0g"), None);
        assert_eq!(grams_for_tier("g"), None);
    }

    #[test]
    fn test_format_grams() {
        assert_eq!(format_grams(3.5), "3.5g");
        assert_eq!(format_grams(7.0), "7g");
        assert_eq!(format_grams(28.0), "28g");
    }
}
