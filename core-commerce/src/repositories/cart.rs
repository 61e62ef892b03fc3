//! Cart item repository trait and implementation

use crate::error::Result;
use crate::models::CartItem;
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};

/// Cart item repository interface
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Find a cart item by its ID
    async fn find_by_id(&self, id: i64) -> Result<Option<CartItem>>;

    /// Find the line for one product in one cart, if present
    async fn find_line(
        &self,
        user_id: i64,
        cart_id: i64,
        product_id: i64,
    ) -> Result<Option<CartItem>>;

    /// Insert a new cart line and return the generated id
    async fn insert(
        &self,
        user_id: i64,
        cart_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> Result<i64>;

    /// Overwrite the quantity of an existing line
    ///
    /// # Returns
    /// `Ok(false)` if the line does not exist.
    async fn set_quantity(&self, id: i64, quantity: i64) -> Result<bool>;

    /// Delete one line by ID
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Delete every line of one product across the user's carts
    ///
    /// # Returns
    /// The number of lines removed.
    async fn delete_product(&self, user_id: i64, product_id: i64) -> Result<u64>;

    /// Delete every line in one cart
    async fn clear(&self, user_id: i64, cart_id: i64) -> Result<u64>;

    /// All lines in one cart, oldest first
    async fn items_for_cart(&self, user_id: i64, cart_id: i64) -> Result<Vec<CartItem>>;

    /// All of the user's lines across carts, newest first
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<CartItem>>;

    /// Sum of quantities in one cart
    async fn item_count(&self, user_id: i64, cart_id: i64) -> Result<i64>;

    /// The cart the user most recently added to
    async fn active_cart(&self, user_id: i64) -> Result<Option<i64>>;
}

/// SQLite implementation of CartRepository
pub struct SqliteCartRepository {
    pool: SqlitePool,
}

impl SqliteCartRepository {
    /// Create a new SqliteCartRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartRepository for SqliteCartRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<CartItem>> {
        let item = query_as::<_, CartItem>("SELECT * FROM cart_items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    async fn find_line(
        &self,
        user_id: i64,
        cart_id: i64,
        product_id: i64,
    ) -> Result<Option<CartItem>> {
        let item = query_as::<_, CartItem>(
            "SELECT * FROM cart_items WHERE user_id = ? AND cart_id = ? AND product_id = ? LIMIT 1",
        )
        .bind(user_id)
        .bind(cart_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn insert(
        &self,
        user_id: i64,
        cart_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();
        let result = query(
            r#"
            INSERT INTO cart_items (cart_id, user_id, product_id, quantity, added_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(cart_id)
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn set_quantity(&self, id: i64, quantity: i64) -> Result<bool> {
        let result = query("UPDATE cart_items SET quantity = ? WHERE id = ?")
            .bind(quantity)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = query("DELETE FROM cart_items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_product(&self, user_id: i64, product_id: i64) -> Result<u64> {
        let result = query("DELETE FROM cart_items WHERE user_id = ? AND product_id = ?")
            .bind(user_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn clear(&self, user_id: i64, cart_id: i64) -> Result<u64> {
        let result = query("DELETE FROM cart_items WHERE user_id = ? AND cart_id = ?")
            .bind(user_id)
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn items_for_cart(&self, user_id: i64, cart_id: i64) -> Result<Vec<CartItem>> {
        let items = query_as::<_, CartItem>(
            "SELECT * FROM cart_items WHERE user_id = ? AND cart_id = ? ORDER BY added_at ASC, id ASC",
        )
        .bind(user_id)
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<CartItem>> {
        let items = query_as::<_, CartItem>(
            "SELECT * FROM cart_items WHERE user_id = ? ORDER BY added_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn item_count(&self, user_id: i64, cart_id: i64) -> Result<i64> {
        let count: i64 = query_as(
            "SELECT COALESCE(SUM(quantity), 0) as count FROM cart_items WHERE user_id = ? AND cart_id = ?",
        )
        .bind(user_id)
        .bind(cart_id)
        .fetch_one(&self.pool)
        .await
        .map(|row: (i64,)| row.0)?;

        Ok(count)
    }

    async fn active_cart(&self, user_id: i64) -> Result<Option<i64>> {
        let cart: Option<(i64,)> = query_as(
            "SELECT cart_id FROM cart_items WHERE user_id = ? ORDER BY added_at DESC, id DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cart.map(|(id,)| id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_store::create_test_pool;

    #[tokio::test]
    async fn test_insert_and_find_line() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteCartRepository::new(pool);

        let id = repo.insert(1, 10, 100, 2).await.unwrap();

        let line = repo.find_line(1, 10, 100).await.unwrap().unwrap();
        assert_eq!(line.id, id);
        assert_eq!(line.quantity, 2);

        assert!(repo.find_line(1, 10, 999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_item_count_sums_quantities() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteCartRepository::new(pool);

        repo.insert(1, 10, 100, 2).await.unwrap();
        repo.insert(1, 10, 101, 3).await.unwrap();
        repo.insert(1, 11, 102, 7).await.unwrap();

        assert_eq!(repo.item_count(1, 10).await.unwrap(), 5);
        assert_eq!(repo.item_count(1, 99).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_product_across_carts() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteCartRepository::new(pool);

        repo.insert(1, 10, 100, 1).await.unwrap();
        repo.insert(1, 11, 100, 1).await.unwrap();
        repo.insert(2, 12, 100, 1).await.unwrap();

        let removed = repo.delete_product(1, 100).await.unwrap();
        assert_eq!(removed, 2);
        // Other users keep their lines.
        assert_eq!(repo.find_by_user(2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_cart() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteCartRepository::new(pool);

        repo.insert(1, 10, 100, 1).await.unwrap();
        repo.insert(1, 10, 101, 1).await.unwrap();

        assert_eq!(repo.clear(1, 10).await.unwrap(), 2);
        assert!(repo.items_for_cart(1, 10).await.unwrap().is_empty());
    }
}
