//! Transaction service: payment lifecycle guards and summaries

use crate::error::{CommerceError, Result};
use crate::models::{
    NewTransaction, Transaction, TransactionFilter, TransactionStatus, TransactionUpdate,
};
use crate::repositories::{SaleRepository, TransactionRepository};
use chrono::NaiveDate;
use core_store::{Page, PageRequest};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Service over payment transactions
pub struct TransactionService {
    transactions: Arc<dyn TransactionRepository>,
    sales: Arc<dyn SaleRepository>,
}

impl TransactionService {
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        sales: Arc<dyn SaleRepository>,
    ) -> Self {
        Self {
            transactions,
            sales,
        }
    }

    pub async fn get(&self, id: i64) -> Result<Transaction> {
        self.transactions
            .find_by_id(id)
            .await?
            .ok_or(CommerceError::NotFound {
                entity: "Transaction",
                id,
            })
    }

    /// Record a payment attempt against a sale, starting Pending
    ///
    /// # Errors
    /// - `InvalidInput` when the amount is not positive
    /// - `NotFound` when the sale does not exist
    /// - `Conflict` when the sale already has a completed transaction
    pub async fn create(&self, new: NewTransaction) -> Result<Transaction> {
        if new.amount <= 0.0 {
            return Err(CommerceError::InvalidInput {
                field: "amount".to_string(),
                message: "Transaction amount must be positive".to_string(),
            });
        }

        if self.sales.find_by_id(new.sale_id).await?.is_none() {
            return Err(CommerceError::NotFound {
                entity: "Sale",
                id: new.sale_id,
            });
        }

        if self.transactions.exists_completed_for_sale(new.sale_id).await? {
            return Err(CommerceError::Conflict(format!(
                "Sale {} already has a completed transaction",
                new.sale_id
            )));
        }

        let id = self.transactions.insert(&new).await?;
        info!(transaction_id = id, sale_id = new.sale_id, "Created transaction");
        self.get(id).await
    }

    /// Apply a partial update; completed transactions are immutable
    pub async fn update(&self, id: i64, update: TransactionUpdate) -> Result<Transaction> {
        let current = self.get(id).await?;
        Self::check_mutable(&current)?;

        if let Some(amount) = update.amount {
            if amount <= 0.0 {
                return Err(CommerceError::InvalidInput {
                    field: "amount".to_string(),
                    message: "Transaction amount must be positive".to_string(),
                });
            }
        }

        self.transactions.apply_update(id, &update).await?;
        self.get(id).await
    }

    /// Remove a transaction; completed transactions are kept
    pub async fn remove(&self, id: i64) -> Result<()> {
        let current = self.get(id).await?;
        Self::check_mutable(&current)?;

        self.transactions.delete(id).await?;
        info!(transaction_id = id, "Removed transaction");
        Ok(())
    }

    /// Move a transaction to a new status, optionally recording the
    /// processor reference and notes
    ///
    /// Completing a transaction re-checks the one-completed-per-sale rule.
    pub async fn update_status(
        &self,
        id: i64,
        status: TransactionStatus,
        external_reference: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Transaction> {
        let current = self.get(id).await?;

        if current.status == TransactionStatus::Completed && status != TransactionStatus::Completed
        {
            return Err(CommerceError::InvalidInput {
                field: "status".to_string(),
                message: "Completed transactions cannot change status".to_string(),
            });
        }

        if status == TransactionStatus::Completed
            && current.status != TransactionStatus::Completed
            && self
                .transactions
                .exists_completed_for_sale(current.sale_id)
                .await?
        {
            return Err(CommerceError::Conflict(format!(
                "Sale {} already has a completed transaction",
                current.sale_id
            )));
        }

        self.transactions
            .set_status(id, status, external_reference, notes)
            .await?;
        self.get(id).await
    }

    pub async fn find_by_user(
        &self,
        user_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<Transaction>> {
        self.transactions.find_by_user(user_id, page_request).await
    }

    pub async fn find_by_sale(&self, sale_id: i64) -> Result<Vec<Transaction>> {
        self.transactions.find_by_sale(sale_id).await
    }

    pub async fn find_by_status(
        &self,
        status: TransactionStatus,
        page_request: PageRequest,
    ) -> Result<Page<Transaction>> {
        self.transactions.find_by_status(status, page_request).await
    }

    /// Filtered listing over date, amount, user, sale, and status bounds
    pub async fn list(
        &self,
        filter: &TransactionFilter,
        page_request: PageRequest,
    ) -> Result<Page<Transaction>> {
        self.transactions.list(filter, page_request).await
    }

    /// Completed revenue for one calendar day (UTC)
    pub async fn daily_revenue(&self, date: NaiveDate) -> Result<f64> {
        let start = date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp());
        let Some(start) = start else {
            return Ok(0.0);
        };
        let end = start + 86_399;

        self.transactions.completed_revenue(start, end).await
    }

    /// Count of transactions per status
    pub async fn status_summary(&self) -> Result<HashMap<TransactionStatus, i64>> {
        self.transactions.status_summary().await
    }

    fn check_mutable(transaction: &Transaction) -> Result<()> {
        if transaction.status == TransactionStatus::Completed {
            return Err(CommerceError::InvalidInput {
                field: "status".to_string(),
                message: "Completed transactions are immutable".to_string(),
            });
        }
        Ok(())
    }
}
