//! # verdant-db: Catalog Storage Layer for Verdant
//!
//! This crate provides database access for the Verdant catalog.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Verdant Data Flow                                │
//! │                                                                         │
//! │  Storefront render / POS lookup                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     verdant-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐  │   │
//! │  │   │ CatalogCache │──►│ Repositories │──►│ Row Ingestion    │  │   │
//! │  │   │ (cache.rs)   │   │ (repository/)│   │ (rows.rs)        │  │   │
//! │  │   │              │   │              │   │                  │  │   │
//! │  │   │ TTL + LRU +  │   │ ProductRepo  │   │ loose row →      │  │   │
//! │  │   │ coalescing   │   │ PromotionRepo│   │ typed domain     │  │   │
//! │  │   └──────────────┘   └──────┬───────┘   └──────────────────┘  │   │
//! │  │                            │                                   │   │
//! │  │   ┌──────────────┐   ┌─────▼────────┐                         │   │
//! │  │   │  Migrations  │   │   Database   │                         │   │
//! │  │   │  (embedded)  │   │  (pool.rs)   │                         │   │
//! │  │   └──────────────┘   └──────────────┘                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL mode)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`rows`] - Loose row structs and one-shot normalization
//! - [`repository`] - Repository implementations (product, promotion)
//! - [`cache`] - Per-instance catalog cache (TTL, LRU, de-duplication)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use verdant_db::{CatalogCache, Database, DbConfig, SystemClock, TtlCacheConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/verdant.db")).await?;
//! let cache = CatalogCache::new(db.clone(), TtlCacheConfig::default(), Arc::new(SystemClock));
//!
//! // One database round trip feeds every concurrent render of this vendor
//! let catalog = cache.vendor_catalog("vendor-1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cache;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod rows;

// =============================================================================
// Re-exports
// =============================================================================

pub use cache::{CatalogCache, Clock, ManualClock, SystemClock, TtlCache, TtlCacheConfig, VendorCatalog};
pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::promotion::PromotionRepository;
