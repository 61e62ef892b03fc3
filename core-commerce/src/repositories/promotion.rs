//! Promotion repository trait and implementation

use crate::error::{CommerceError, Result};
use crate::models::{NewPromotion, Promotion, PromotionUpdate};
use async_trait::async_trait;
use core_store::{Page, PageRequest};
use sqlx::{query, query_as, QueryBuilder, SqlitePool};

/// Promotion repository interface for data access operations
#[async_trait]
pub trait PromotionRepository: Send + Sync {
    /// Find a promotion by its ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Promotion>>;

    /// Find a promotion by its redemption code
    async fn find_by_code(&self, code: &str) -> Result<Option<Promotion>>;

    /// Insert a new promotion and return the generated id
    async fn insert(&self, new: &NewPromotion) -> Result<i64>;

    /// Apply a partial update to an existing promotion
    ///
    /// # Errors
    /// Returns `NotFound` if the promotion does not exist.
    async fn apply_update(&self, id: i64, update: &PromotionUpdate) -> Result<()>;

    /// Delete a promotion by ID
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Query promotions with pagination, newest first
    async fn list(&self, page_request: PageRequest) -> Result<Page<Promotion>>;

    /// Promotions with the active flag set whose window contains `now`
    async fn find_active(&self, now: i64) -> Result<Vec<Promotion>>;

    /// Add one redemption, guarded against passing the usage limit
    ///
    /// # Returns
    /// `Ok(true)` when the counter advanced; `Ok(false)` when the limit was
    /// already reached (the row is left untouched).
    async fn increment_usage(&self, id: i64) -> Result<bool>;
}

/// SQLite implementation of PromotionRepository
pub struct SqlitePromotionRepository {
    pool: SqlitePool,
}

impl SqlitePromotionRepository {
    /// Create a new SqlitePromotionRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PromotionRepository for SqlitePromotionRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Promotion>> {
        let promotion = query_as::<_, Promotion>("SELECT * FROM promotions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(promotion)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Promotion>> {
        let promotion = query_as::<_, Promotion>("SELECT * FROM promotions WHERE code = ? LIMIT 1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(promotion)
    }

    async fn insert(&self, new: &NewPromotion) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();
        let result = query(
            r#"
            INSERT INTO promotions (
                name, description, discount_kind, discount_value, starts_at,
                ends_at, code, usage_limit, usage_count, min_purchase_amount,
                applicable_products, active, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.discount_kind)
        .bind(new.discount_value)
        .bind(new.starts_at)
        .bind(new.ends_at)
        .bind(&new.code)
        .bind(new.usage_limit)
        .bind(new.min_purchase_amount)
        .bind(&new.applicable_products)
        .bind(new.active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn apply_update(&self, id: i64, update: &PromotionUpdate) -> Result<()> {
        if !update.has_changes() {
            return Ok(());
        }

        let mut builder = QueryBuilder::new("UPDATE promotions SET id = id");

        if let Some(name) = &update.name {
            builder.push(", name = ").push_bind(name);
        }
        if let Some(description) = &update.description {
            builder.push(", description = ").push_bind(description);
        }
        if let Some(kind) = update.discount_kind {
            builder.push(", discount_kind = ").push_bind(kind);
        }
        if let Some(value) = update.discount_value.as_resolved() {
            builder.push(", discount_value = ").push_bind(value.copied());
        }
        if let Some(starts_at) = update.starts_at {
            builder.push(", starts_at = ").push_bind(starts_at);
        }
        if let Some(ends_at) = update.ends_at {
            builder.push(", ends_at = ").push_bind(ends_at);
        }
        if let Some(value) = update.code.as_resolved() {
            builder.push(", code = ").push_bind(value.cloned());
        }
        if let Some(value) = update.usage_limit.as_resolved() {
            builder.push(", usage_limit = ").push_bind(value.copied());
        }
        if let Some(value) = update.min_purchase_amount.as_resolved() {
            builder
                .push(", min_purchase_amount = ")
                .push_bind(value.copied());
        }
        if let Some(value) = update.applicable_products.as_resolved() {
            builder
                .push(", applicable_products = ")
                .push_bind(value.cloned());
        }
        if let Some(active) = update.active {
            builder.push(", active = ").push_bind(active);
        }

        builder.push(" WHERE id = ").push_bind(id);
        let result = builder.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(CommerceError::NotFound {
                entity: "Promotion",
                id,
            });
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = query("DELETE FROM promotions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, page_request: PageRequest) -> Result<Page<Promotion>> {
        let total: i64 = query_as("SELECT COUNT(*) as count FROM promotions")
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        let promotions = query_as::<_, Promotion>(
            "SELECT * FROM promotions ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(page_request.limit())
        .bind(page_request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(promotions, total as u64, page_request))
    }

    async fn find_active(&self, now: i64) -> Result<Vec<Promotion>> {
        let promotions = query_as::<_, Promotion>(
            r#"
            SELECT * FROM promotions
            WHERE active = 1 AND starts_at <= ? AND ends_at >= ?
            ORDER BY ends_at ASC
            "#,
        )
        .bind(now)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(promotions)
    }

    async fn increment_usage(&self, id: i64) -> Result<bool> {
        // The guard runs inside the statement so concurrent redemptions
        // cannot push the counter past the limit.
        let result = query(
            r#"
            UPDATE promotions
            SET usage_count = usage_count + 1
            WHERE id = ? AND (usage_limit IS NULL OR usage_count < usage_limit)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
