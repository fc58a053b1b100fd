//! # Promotion Repository
//!
//! Database operations for promotions.
//!
//! Reads go through [`PromotionRow::normalize`]: unknown scopes come back
//! as fail-closed rows, and rows with unrecognized discount mechanisms
//! are dropped before they can reach the pricing resolver.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::rows::{
    datetime_to_column, day_list_to_json, discount_to_columns, string_list_to_json,
    time_to_column, PromotionRow,
};
use verdant_core::types::Promotion;
use verdant_core::validation::{validate_discount, validate_name, validate_promotion_schedule};

/// Repository for promotion database operations.
#[derive(Debug, Clone)]
pub struct PromotionRepository {
    pool: SqlitePool,
}

const SELECT_COLUMNS: &str = r#"
    id,
    vendor_id,
    name,
    scope,
    discount_type,
    discount_value,
    product_ids,
    categories,
    tier_ids,
    min_grams,
    max_grams,
    badge_text,
    badge_color,
    priority,
    is_active,
    starts_at,
    ends_at,
    days_of_week,
    time_of_day_start,
    time_of_day_end,
    created_at
"#;

impl PromotionRepository {
    /// Creates a new PromotionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PromotionRepository { pool }
    }

    /// Inserts a promotion, stamping `created_at`.
    ///
    /// Authoring rules run first: name, discount range, schedule shape.
    pub async fn insert(&self, promotion: &Promotion) -> DbResult<()> {
        validate_name(&promotion.name)?;
        validate_discount(&promotion.discount)?;
        validate_promotion_schedule(promotion)?;

        let (discount_type, discount_value) = discount_to_columns(&promotion.discount);
        let badge = promotion.badge.as_ref();

        debug!(id = %promotion.id, name = %promotion.name, "Inserting promotion");

        sqlx::query(
            r#"
            INSERT INTO promotions (
                id, vendor_id, name, scope,
                discount_type, discount_value,
                product_ids, categories, tier_ids,
                min_grams, max_grams,
                badge_text, badge_color,
                priority, is_active,
                starts_at, ends_at, days_of_week,
                time_of_day_start, time_of_day_end,
                created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
                ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21
            )
            "#,
        )
        .bind(&promotion.id)
        .bind(&promotion.vendor_id)
        .bind(&promotion.name)
        .bind(promotion.scope.as_str())
        .bind(discount_type)
        .bind(discount_value)
        .bind(string_list_to_json(&promotion.product_ids))
        .bind(string_list_to_json(&promotion.categories))
        .bind(string_list_to_json(&promotion.tier_ids))
        .bind(promotion.min_grams)
        .bind(promotion.max_grams)
        .bind(badge.map(|b| b.text.clone()))
        .bind(badge.and_then(|b| b.color.clone()))
        .bind(promotion.priority)
        .bind(promotion.is_active)
        .bind(datetime_to_column(promotion.starts_at))
        .bind(datetime_to_column(promotion.ends_at))
        .bind(day_list_to_json(&promotion.days_of_week))
        .bind(time_to_column(promotion.time_of_day_start))
        .bind(time_to_column(promotion.time_of_day_end))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a promotion by ID.
    ///
    /// Returns `None` for missing rows AND for rows whose discount
    /// mechanism this version cannot price.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Promotion>> {
        let row: Option<PromotionRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM promotions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(PromotionRow::normalize))
    }

    /// Lists a vendor's active promotions, highest priority first.
    ///
    /// "Active" here is the row flag only; schedule windows are evaluated
    /// by the pricing resolver at render time, so one fetched list stays
    /// valid across a render pass.
    pub async fn list_active_for_vendor(&self, vendor_id: &str) -> DbResult<Vec<Promotion>> {
        debug!(vendor_id, "Listing active promotions");

        let rows: Vec<PromotionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {SELECT_COLUMNS}
            FROM promotions
            WHERE vendor_id = ?1 AND is_active = 1
            ORDER BY priority DESC, created_at
            "#
        ))
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;

        let total = rows.len();
        let promotions: Vec<Promotion> = rows
            .into_iter()
            .filter_map(PromotionRow::normalize)
            .collect();

        debug!(
            count = promotions.len(),
            skipped = total - promotions.len(),
            "Listed promotions"
        );
        Ok(promotions)
    }

    /// Soft-deletes a promotion.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        debug!(id, "Deactivating promotion");

        let result = sqlx::query("UPDATE promotions SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Promotion", id));
        }

        Ok(())
    }

    /// Counts all promotions (active and inactive).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM promotions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
