//! Sale repository trait and implementation
//!
//! Sale headers and their line items are written in one database
//! transaction; a sale never exists without its items.

use crate::error::{CommerceError, Result};
use crate::models::{Sale, SaleItem, SaleStatus};
use async_trait::async_trait;
use core_store::{Page, PageRequest};
use sqlx::{query, query_as, SqlitePool};

/// A sale header ready to persist, amounts already computed
pub struct SaleDraft {
    pub sale_number: String,
    pub user_id: i64,
    pub subtotal: f64,
    pub discount: f64,
    pub tax: f64,
    pub total: f64,
}

/// A line ready to persist with its draft header
pub struct SaleItemDraft {
    pub product_id: i64,
    pub product_kind: crate::models::ProductKind,
    pub quantity: i64,
    pub unit_price: f64,
    pub line_total: f64,
}

/// Sale repository interface
#[async_trait]
pub trait SaleRepository: Send + Sync {
    /// Find a sale header by its ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Sale>>;

    /// Find a sale header by its sale number
    async fn find_by_number(&self, sale_number: &str) -> Result<Option<Sale>>;

    /// Insert a sale header and its lines atomically; returns the header id
    async fn insert(&self, draft: SaleDraft, items: Vec<SaleItemDraft>) -> Result<i64>;

    /// Lines of one sale
    async fn items(&self, sale_id: i64) -> Result<Vec<SaleItem>>;

    /// Query one user's sales, newest first
    async fn find_by_user(&self, user_id: i64, page_request: PageRequest) -> Result<Page<Sale>>;

    /// Sales created inside `[from, to]` (unix seconds, inclusive)
    async fn find_by_date_range(&self, from: i64, to: i64) -> Result<Vec<Sale>>;

    /// Overwrite the status of a sale
    async fn set_status(&self, id: i64, status: SaleStatus) -> Result<()>;

    /// Delete a sale; lines go with it via the foreign key cascade
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLite implementation of SaleRepository
pub struct SqliteSaleRepository {
    pool: SqlitePool,
}

impl SqliteSaleRepository {
    /// Create a new SqliteSaleRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SaleRepository for SqliteSaleRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Sale>> {
        let sale = query_as::<_, Sale>("SELECT * FROM sales WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    async fn find_by_number(&self, sale_number: &str) -> Result<Option<Sale>> {
        let sale = query_as::<_, Sale>("SELECT * FROM sales WHERE sale_number = ? LIMIT 1")
            .bind(sale_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    async fn insert(&self, draft: SaleDraft, items: Vec<SaleItemDraft>) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        let result = query(
            r#"
            INSERT INTO sales (
                sale_number, user_id, subtotal, discount, tax, total, status, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&draft.sale_number)
        .bind(draft.user_id)
        .bind(draft.subtotal)
        .bind(draft.discount)
        .bind(draft.tax)
        .bind(draft.total)
        .bind(SaleStatus::Pending)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let sale_id = result.last_insert_rowid();

        for item in &items {
            query(
                r#"
                INSERT INTO sale_items (
                    sale_id, product_id, product_kind, quantity, unit_price, line_total
                )
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(sale_id)
            .bind(item.product_id)
            .bind(item.product_kind)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.line_total)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(sale_id)
    }

    async fn items(&self, sale_id: i64) -> Result<Vec<SaleItem>> {
        let items = query_as::<_, SaleItem>(
            "SELECT * FROM sale_items WHERE sale_id = ? ORDER BY id ASC",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn find_by_user(&self, user_id: i64, page_request: PageRequest) -> Result<Page<Sale>> {
        let total: i64 = query_as("SELECT COUNT(*) as count FROM sales WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        let sales = query_as::<_, Sale>(
            "SELECT * FROM sales WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(page_request.limit())
        .bind(page_request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(sales, total as u64, page_request))
    }

    async fn find_by_date_range(&self, from: i64, to: i64) -> Result<Vec<Sale>> {
        let sales = query_as::<_, Sale>(
            "SELECT * FROM sales WHERE created_at >= ? AND created_at <= ? ORDER BY created_at ASC",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    async fn set_status(&self, id: i64, status: SaleStatus) -> Result<()> {
        let result = query("UPDATE sales SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CommerceError::NotFound { entity: "Sale", id });
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = query("DELETE FROM sales WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductKind;
    use core_store::create_test_pool;

    fn draft(number: &str, user_id: i64) -> SaleDraft {
        SaleDraft {
            sale_number: number.to_string(),
            user_id,
            subtotal: 100.0,
            discount: 0.0,
            tax: 12.0,
            total: 112.0,
        }
    }

    fn line(product_id: i64) -> SaleItemDraft {
        SaleItemDraft {
            product_id,
            product_kind: ProductKind::Album,
            quantity: 1,
            unit_price: 100.0,
            line_total: 100.0,
        }
    }

    #[tokio::test]
    async fn test_insert_writes_header_and_items() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteSaleRepository::new(pool);

        let id = repo
            .insert(draft("SALE-0001", 1), vec![line(10), line(11)])
            .await
            .unwrap();

        let sale = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(sale.sale_number, "SALE-0001");
        assert_eq!(sale.status, SaleStatus::Pending);
        assert_eq!(sale.total, 112.0);

        let items = repo.items(id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_id, 10);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_items() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteSaleRepository::new(pool);

        let id = repo
            .insert(draft("SALE-0002", 1), vec![line(10)])
            .await
            .unwrap();

        assert!(repo.delete(id).await.unwrap());
        assert!(repo.items(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_status() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteSaleRepository::new(pool);

        let id = repo
            .insert(draft("SALE-0003", 1), vec![line(10)])
            .await
            .unwrap();

        repo.set_status(id, SaleStatus::Completed).await.unwrap();
        let sale = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(sale.status, SaleStatus::Completed);
    }

    #[tokio::test]
    async fn test_find_by_user_pagination() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteSaleRepository::new(pool);

        for i in 0..3 {
            repo.insert(draft(&format!("SALE-{}", i), 7), vec![line(10)])
                .await
                .unwrap();
        }
        repo.insert(draft("SALE-X", 8), vec![line(10)]).await.unwrap();

        let page = repo.find_by_user(7, PageRequest::new(0, 2)).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_pages, 2);
    }
}
