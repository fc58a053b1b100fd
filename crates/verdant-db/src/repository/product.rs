//! # Product Repository
//!
//! Database operations for catalog products.
//!
//! Reads go through [`ProductRow::normalize`], so callers always receive
//! typed domain values no matter how loosely the stored row is populated.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::rows::{blueprint_to_json, money_to_decimal, pricing_values_to_json, ProductRow};
use verdant_core::money::Money;
use verdant_core::types::Product;
use verdant_core::validation::{validate_name, validate_price_cents};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// // List a vendor's active menu
/// let products = repo.list_for_vendor("vendor-1").await?;
///
/// // Get by ID
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

const SELECT_COLUMNS: &str = r#"
    id,
    vendor_id,
    name,
    category,
    regular_price,
    current_price,
    pricing_values,
    blueprint,
    is_active,
    created_at,
    updated_at
"#;

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product, stamping timestamps.
    ///
    /// The caller's `created_at`/`updated_at` are ignored; the store is
    /// the authority for persistence times.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        validate_name(&product.name)?;
        if let Some(cents) = product.regular_price_cents {
            validate_price_cents(cents)?;
        }
        if let Some(cents) = product.current_price_cents {
            validate_price_cents(cents)?;
        }

        debug!(id = %product.id, name = %product.name, "Inserting product");

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO products (
                id, vendor_id, name, category,
                regular_price, current_price, pricing_values, blueprint,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&product.id)
        .bind(&product.vendor_id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.regular_price_cents.map(|c| money_to_decimal(Money::from_cents(c))))
        .bind(product.current_price_cents.map(|c| money_to_decimal(Money::from_cents(c))))
        .bind(pricing_values_to_json(&product.pricing_values))
        .bind(blueprint_to_json(&product.blueprint))
        .bind(product.is_active)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ProductRow::normalize))
    }

    /// Lists a vendor's active products, ordered by name.
    pub async fn list_for_vendor(&self, vendor_id: &str) -> DbResult<Vec<Product>> {
        debug!(vendor_id, "Listing products");

        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM products
            WHERE vendor_id = ?1 AND is_active = 1
            ORDER BY name
            "#
        ))
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;

        let products = rows.into_iter().map(ProductRow::normalize).collect::<Vec<_>>();
        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Updates a product's prices and tier values.
    pub async fn update_prices(&self, product: &Product) -> DbResult<()> {
        if let Some(cents) = product.regular_price_cents {
            validate_price_cents(cents)?;
        }
        if let Some(cents) = product.current_price_cents {
            validate_price_cents(cents)?;
        }

        debug!(id = %product.id, "Updating product prices");

        sqlx::query(
            r#"
            UPDATE products
            SET regular_price = ?2,
                current_price = ?3,
                pricing_values = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(product.regular_price_cents.map(|c| money_to_decimal(Money::from_cents(c))))
        .bind(product.current_price_cents.map(|c| money_to_decimal(Money::from_cents(c))))
        .bind(pricing_values_to_json(&product.pricing_values))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Soft-deletes a product.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        debug!(id, "Deactivating product");

        let result = sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts all products (active and inactive).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
