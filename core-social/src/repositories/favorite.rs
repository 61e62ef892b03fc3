//! Favorite repository trait and implementation

use crate::error::Result;
use crate::models::{Favorite, ProductKind};
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};

/// Favorite repository interface
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Find a favorite by its ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Favorite>>;

    /// Find the favorite a user holds on one product, if any
    async fn find(
        &self,
        user_id: i64,
        product_id: i64,
        product_kind: ProductKind,
    ) -> Result<Option<Favorite>>;

    /// Insert a new favorite and return the generated id
    async fn insert(
        &self,
        user_id: i64,
        product_id: i64,
        product_kind: ProductKind,
    ) -> Result<i64>;

    /// Delete a favorite by ID
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Delete a favorite by its user/product/kind key
    async fn delete_by_key(
        &self,
        user_id: i64,
        product_id: i64,
        product_kind: ProductKind,
    ) -> Result<bool>;

    /// All favorites one user holds, newest first
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Favorite>>;

    /// How many users favorited one product
    async fn count_for_product(&self, product_id: i64, product_kind: ProductKind) -> Result<i64>;
}

/// SQLite implementation of FavoriteRepository
pub struct SqliteFavoriteRepository {
    pool: SqlitePool,
}

impl SqliteFavoriteRepository {
    /// Create a new SqliteFavoriteRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteRepository for SqliteFavoriteRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Favorite>> {
        let favorite = query_as::<_, Favorite>("SELECT * FROM favorites WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(favorite)
    }

    async fn find(
        &self,
        user_id: i64,
        product_id: i64,
        product_kind: ProductKind,
    ) -> Result<Option<Favorite>> {
        let favorite = query_as::<_, Favorite>(
            "SELECT * FROM favorites WHERE user_id = ? AND product_id = ? AND product_kind = ?",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(product_kind)
        .fetch_optional(&self.pool)
        .await?;

        Ok(favorite)
    }

    async fn insert(
        &self,
        user_id: i64,
        product_id: i64,
        product_kind: ProductKind,
    ) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();
        let result = query(
            "INSERT INTO favorites (user_id, product_id, product_kind, added_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(product_kind)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = query("DELETE FROM favorites WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_key(
        &self,
        user_id: i64,
        product_id: i64,
        product_kind: ProductKind,
    ) -> Result<bool> {
        let result = query(
            "DELETE FROM favorites WHERE user_id = ? AND product_id = ? AND product_kind = ?",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(product_kind)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Favorite>> {
        let favorites = query_as::<_, Favorite>(
            "SELECT * FROM favorites WHERE user_id = ? ORDER BY added_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(favorites)
    }

    async fn count_for_product(&self, product_id: i64, product_kind: ProductKind) -> Result<i64> {
        let count: i64 = query_as(
            "SELECT COUNT(*) as count FROM favorites WHERE product_id = ? AND product_kind = ?",
        )
        .bind(product_id)
        .bind(product_kind)
        .fetch_one(&self.pool)
        .await
        .map(|row: (i64,)| row.0)?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_store::create_test_pool;

    #[tokio::test]
    async fn test_insert_find_delete() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteFavoriteRepository::new(pool);

        let id = repo.insert(1, 100, ProductKind::Album).await.unwrap();

        let found = repo.find(1, 100, ProductKind::Album).await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.product_kind, ProductKind::Album);

        // Same product id under a different kind is a different favorite
        assert!(repo.find(1, 100, ProductKind::Song).await.unwrap().is_none());

        assert!(repo.delete_by_key(1, 100, ProductKind::Album).await.unwrap());
        assert!(!repo.delete_by_key(1, 100, ProductKind::Album).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteFavoriteRepository::new(pool);

        repo.insert(1, 100, ProductKind::Album).await.unwrap();
        repo.insert(1, 200, ProductKind::Song).await.unwrap();
        repo.insert(2, 100, ProductKind::Album).await.unwrap();

        let favorites = repo.find_by_user(1).await.unwrap();
        assert_eq!(favorites.len(), 2);
    }

    #[tokio::test]
    async fn test_count_for_product() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteFavoriteRepository::new(pool);

        repo.insert(1, 100, ProductKind::Album).await.unwrap();
        repo.insert(2, 100, ProductKind::Album).await.unwrap();
        repo.insert(3, 100, ProductKind::Song).await.unwrap();

        assert_eq!(repo.count_for_product(100, ProductKind::Album).await.unwrap(), 2);
        assert_eq!(repo.count_for_product(100, ProductKind::Song).await.unwrap(), 1);
    }
}
