//! Transaction repository trait and implementation

use crate::error::{CommerceError, Result};
use crate::models::{
    NewTransaction, Transaction, TransactionFilter, TransactionStatus, TransactionUpdate,
};
use async_trait::async_trait;
use core_store::{Page, PageRequest};
use sqlx::{query, query_as, QueryBuilder, SqlitePool};
use std::collections::HashMap;

/// Transaction repository interface
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Find a transaction by its ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Transaction>>;

    /// Insert a new transaction (status Pending) and return the generated id
    async fn insert(&self, new: &NewTransaction) -> Result<i64>;

    /// Apply a partial update to an existing transaction
    async fn apply_update(&self, id: i64, update: &TransactionUpdate) -> Result<()>;

    /// Overwrite status, optionally recording the processor reference and
    /// notes
    async fn set_status(
        &self,
        id: i64,
        status: TransactionStatus,
        external_reference: Option<&str>,
        notes: Option<&str>,
    ) -> Result<()>;

    /// Delete a transaction by ID
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Whether a completed transaction already exists for the sale
    async fn exists_completed_for_sale(&self, sale_id: i64) -> Result<bool>;

    /// Query one user's transactions, newest first
    async fn find_by_user(
        &self,
        user_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<Transaction>>;

    /// All transactions against one sale
    async fn find_by_sale(&self, sale_id: i64) -> Result<Vec<Transaction>>;

    /// Query transactions in one status
    async fn find_by_status(
        &self,
        status: TransactionStatus,
        page_request: PageRequest,
    ) -> Result<Page<Transaction>>;

    /// Filtered listing over date, amount, user, sale, and status bounds
    async fn list(
        &self,
        filter: &TransactionFilter,
        page_request: PageRequest,
    ) -> Result<Page<Transaction>>;

    /// Sum of completed amounts inside `[from, to]` (unix seconds)
    async fn completed_revenue(&self, from: i64, to: i64) -> Result<f64>;

    /// Count of transactions per status
    async fn status_summary(&self) -> Result<HashMap<TransactionStatus, i64>>;
}

/// SQLite implementation of TransactionRepository
pub struct SqliteTransactionRepository {
    pool: SqlitePool,
}

impl SqliteTransactionRepository {
    /// Create a new SqliteTransactionRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for SqliteTransactionRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Transaction>> {
        let transaction = query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(transaction)
    }

    async fn insert(&self, new: &NewTransaction) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();
        let result = query(
            r#"
            INSERT INTO transactions (
                user_id, sale_id, payment_method_id, promotion_id, amount,
                status, external_reference, notes, occurred_at
            )
            VALUES (?, ?, ?, ?, ?, ?, NULL, ?, ?)
            "#,
        )
        .bind(new.user_id)
        .bind(new.sale_id)
        .bind(new.payment_method_id)
        .bind(new.promotion_id)
        .bind(new.amount)
        .bind(TransactionStatus::Pending)
        .bind(&new.notes)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn apply_update(&self, id: i64, update: &TransactionUpdate) -> Result<()> {
        if !update.has_changes() {
            return Ok(());
        }

        let mut builder = QueryBuilder::new("UPDATE transactions SET id = id");

        if let Some(value) = update.payment_method_id.as_resolved() {
            builder
                .push(", payment_method_id = ")
                .push_bind(value.copied());
        }
        if let Some(value) = update.promotion_id.as_resolved() {
            builder.push(", promotion_id = ").push_bind(value.copied());
        }
        if let Some(amount) = update.amount {
            builder.push(", amount = ").push_bind(amount);
        }
        if let Some(value) = update.notes.as_resolved() {
            builder.push(", notes = ").push_bind(value.cloned());
        }

        builder.push(" WHERE id = ").push_bind(id);
        let result = builder.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(CommerceError::NotFound {
                entity: "Transaction",
                id,
            });
        }

        Ok(())
    }

    async fn set_status(
        &self,
        id: i64,
        status: TransactionStatus,
        external_reference: Option<&str>,
        notes: Option<&str>,
    ) -> Result<()> {
        let result = query(
            r#"
            UPDATE transactions
            SET status = ?,
                external_reference = COALESCE(?, external_reference),
                notes = COALESCE(?, notes)
            WHERE id = ?
            "#,
        )
        .bind(status)
        .bind(external_reference)
        .bind(notes)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CommerceError::NotFound {
                entity: "Transaction",
                id,
            });
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = query("DELETE FROM transactions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists_completed_for_sale(&self, sale_id: i64) -> Result<bool> {
        let count: i64 = query_as(
            "SELECT COUNT(*) as count FROM transactions WHERE sale_id = ? AND status = ?",
        )
        .bind(sale_id)
        .bind(TransactionStatus::Completed)
        .fetch_one(&self.pool)
        .await
        .map(|row: (i64,)| row.0)?;

        Ok(count > 0)
    }

    async fn find_by_user(
        &self,
        user_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<Transaction>> {
        let total: i64 = query_as("SELECT COUNT(*) as count FROM transactions WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        let transactions = query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE user_id = ? ORDER BY occurred_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(page_request.limit())
        .bind(page_request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(transactions, total as u64, page_request))
    }

    async fn find_by_sale(&self, sale_id: i64) -> Result<Vec<Transaction>> {
        let transactions = query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE sale_id = ? ORDER BY occurred_at ASC, id ASC",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    async fn find_by_status(
        &self,
        status: TransactionStatus,
        page_request: PageRequest,
    ) -> Result<Page<Transaction>> {
        let total: i64 = query_as("SELECT COUNT(*) as count FROM transactions WHERE status = ?")
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        let transactions = query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE status = ? ORDER BY occurred_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(status)
        .bind(page_request.limit())
        .bind(page_request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(transactions, total as u64, page_request))
    }

    async fn list(
        &self,
        filter: &TransactionFilter,
        page_request: PageRequest,
    ) -> Result<Page<Transaction>> {
        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM transactions WHERE 1 = 1");
        let mut list_builder = QueryBuilder::new("SELECT * FROM transactions WHERE 1 = 1");

        for builder in [&mut count_builder, &mut list_builder] {
            if let Some(user_id) = filter.user_id {
                builder.push(" AND user_id = ").push_bind(user_id);
            }
            if let Some(sale_id) = filter.sale_id {
                builder.push(" AND sale_id = ").push_bind(sale_id);
            }
            if let Some(status) = filter.status {
                builder.push(" AND status = ").push_bind(status);
            }
            if let Some(from) = filter.from {
                builder.push(" AND occurred_at >= ").push_bind(from);
            }
            if let Some(to) = filter.to {
                builder.push(" AND occurred_at <= ").push_bind(to);
            }
            if let Some(min) = filter.min_amount {
                builder.push(" AND amount >= ").push_bind(min);
            }
            if let Some(max) = filter.max_amount {
                builder.push(" AND amount <= ").push_bind(max);
            }
        }

        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        list_builder
            .push(" ORDER BY occurred_at DESC, id DESC LIMIT ")
            .push_bind(page_request.limit())
            .push(" OFFSET ")
            .push_bind(page_request.offset());

        let transactions = list_builder
            .build_query_as::<Transaction>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(transactions, total as u64, page_request))
    }

    async fn completed_revenue(&self, from: i64, to: i64) -> Result<f64> {
        let revenue: f64 = query_as(
            r#"
            SELECT COALESCE(SUM(amount), 0.0) as revenue
            FROM transactions
            WHERE status = ? AND occurred_at >= ? AND occurred_at <= ?
            "#,
        )
        .bind(TransactionStatus::Completed)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
        .map(|row: (f64,)| row.0)?;

        Ok(revenue)
    }

    async fn status_summary(&self) -> Result<HashMap<TransactionStatus, i64>> {
        let rows: Vec<(TransactionStatus, i64)> =
            query_as("SELECT status, COUNT(*) as count FROM transactions GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().collect())
    }
}
