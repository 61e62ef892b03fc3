//! Payment method repository trait and implementation

use crate::error::{CommerceError, Result};
use crate::models::PaymentMethod;
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};

/// Payment method repository interface
#[async_trait]
pub trait PaymentMethodRepository: Send + Sync {
    /// Find a payment method by its ID
    async fn find_by_id(&self, id: i64) -> Result<Option<PaymentMethod>>;

    /// Find a payment method by its exact name
    async fn find_by_name(&self, name: &str) -> Result<Option<PaymentMethod>>;

    /// List all payment methods, ordered by name
    async fn list(&self) -> Result<Vec<PaymentMethod>>;

    /// Insert a new payment method and return the generated id
    async fn insert(&self, name: &str, fee_percent: f64) -> Result<i64>;

    /// Update name and fee of an existing method
    async fn update(&self, id: i64, name: &str, fee_percent: f64) -> Result<()>;

    /// Delete a payment method by ID
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLite implementation of PaymentMethodRepository
pub struct SqlitePaymentMethodRepository {
    pool: SqlitePool,
}

impl SqlitePaymentMethodRepository {
    /// Create a new SqlitePaymentMethodRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentMethodRepository for SqlitePaymentMethodRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<PaymentMethod>> {
        let method = query_as::<_, PaymentMethod>("SELECT * FROM payment_methods WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(method)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<PaymentMethod>> {
        let method =
            query_as::<_, PaymentMethod>("SELECT * FROM payment_methods WHERE name = ? LIMIT 1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(method)
    }

    async fn list(&self) -> Result<Vec<PaymentMethod>> {
        let methods =
            query_as::<_, PaymentMethod>("SELECT * FROM payment_methods ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(methods)
    }

    async fn insert(&self, name: &str, fee_percent: f64) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();
        let result = query(
            "INSERT INTO payment_methods (name, fee_percent, created_at) VALUES (?, ?, ?)",
        )
        .bind(name)
        .bind(fee_percent)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn update(&self, id: i64, name: &str, fee_percent: f64) -> Result<()> {
        let result = query("UPDATE payment_methods SET name = ?, fee_percent = ? WHERE id = ?")
            .bind(name)
            .bind(fee_percent)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CommerceError::NotFound {
                entity: "PaymentMethod",
                id,
            });
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = query("DELETE FROM payment_methods WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
