//! # verdant-core: Pure Business Logic for Verdant
//!
//! This crate is the **heart** of Verdant. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Verdant Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                Storefront / POS Frontends                       │   │
//! │  │    Menu UI ──► Product Card ──► Tier Picker ──► Checkout        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ verdant-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │   units   │  │   │
//! │  │   │  Product  │  │   Money   │  │  resolver │  │  WeightUnit│ │   │
//! │  │   │ Promotion │  │  Percent  │  │  quoting  │  │  tiers    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  verdant-db (Storage Layer)                     │   │
//! │  │          SQLite catalog, row ingestion, catalog cache           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Promotion, PricingBlueprint, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - The promotion-aware pricing resolver
//! - [`units`] - Weight tiers and gram/ounce conversion
//! - [`format`] - Display formatting helpers
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Time**: Evaluation time is an argument, never read from the system
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use verdant_core::pricing::calculate_price;
//! use verdant_core::types::{Discount, Product, Promotion, PromotionScope};
//! use verdant_core::Percent;
//!
//! let mut product = Product::new("prod-1", "vendor-1", "Sunset Sherbet");
//! product.regular_price_cents = Some(4000);
//!
//! let promo = Promotion::new(
//!     "promo-1",
//!     "vendor-1",
//!     "20% Off Everything",
//!     PromotionScope::Global,
//!     Discount::Percentage(Percent::from_bps(2000)),
//! );
//!
//! let quote = calculate_price(&product, &[promo], 1.0, None, None, Utc::now());
//! assert_eq!(quote.final_price.cents(), 3200);
//! assert_eq!(quote.savings.cents(), 800);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod format;
pub mod money;
pub mod pricing;
pub mod types;
pub mod units;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use verdant_core::Money` instead of
// `use verdant_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::{Money, Percent};
pub use pricing::{calculate_price, calculate_tier_prices, PriceCalculation, TierQuote};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Neutral badge color used when a promotion declares badge text but no color.
///
/// Storefront and POS UIs render this as the fallback chip color.
pub const DEFAULT_BADGE_COLOR: &str = "#6b7280";

/// Maximum percentage discount, in basis points (10000 = 100%).
///
/// Enforced at authoring time by validation; the resolver additionally
/// floors the final price at zero so an out-of-range row cannot produce
/// a negative total.
pub const MAX_DISCOUNT_BPS: u32 = 10_000;

/// Maximum quantity for a single line, in grams.
///
/// Prevents accidental over-ordering (e.g. typing 1000 instead of 10).
pub const MAX_QUANTITY_GRAMS: f64 = 10_000.0;
