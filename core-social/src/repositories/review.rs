//! Review repository trait and implementation

use crate::error::{Result, SocialError};
use crate::models::{RatingSummary, Review};
use async_trait::async_trait;
use core_store::{Page, PageRequest};
use sqlx::{query, query_as, SqlitePool};

/// Review repository interface
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Find a review by its ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Review>>;

    /// Find the review a user left on one product, if any
    async fn find_by_user_and_product(
        &self,
        user_id: i64,
        product_id: i64,
    ) -> Result<Option<Review>>;

    /// Insert a new review and return the generated id
    async fn insert(&self, user_id: i64, product_id: i64, rating: i64, body: &str) -> Result<i64>;

    /// Overwrite the rating and body of an existing review
    async fn update(&self, id: i64, rating: i64, body: &str) -> Result<()>;

    /// Delete a review by ID
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Query reviews on one product, newest first
    async fn find_by_product(
        &self,
        product_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<Review>>;

    /// Query one user's reviews, newest first
    async fn find_by_user(&self, user_id: i64, page_request: PageRequest) -> Result<Page<Review>>;

    /// Aggregate the ratings left on one product
    async fn rating_summary(&self, product_id: i64) -> Result<RatingSummary>;
}

/// SQLite implementation of ReviewRepository
pub struct SqliteReviewRepository {
    pool: SqlitePool,
}

impl SqliteReviewRepository {
    /// Create a new SqliteReviewRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for SqliteReviewRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Review>> {
        let review = query_as::<_, Review>("SELECT * FROM reviews WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(review)
    }

    async fn find_by_user_and_product(
        &self,
        user_id: i64,
        product_id: i64,
    ) -> Result<Option<Review>> {
        let review =
            query_as::<_, Review>("SELECT * FROM reviews WHERE user_id = ? AND product_id = ?")
                .bind(user_id)
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(review)
    }

    async fn insert(&self, user_id: i64, product_id: i64, rating: i64, body: &str) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();
        let result = query(
            "INSERT INTO reviews (user_id, product_id, rating, body, posted_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(rating)
        .bind(body)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn update(&self, id: i64, rating: i64, body: &str) -> Result<()> {
        let result = query("UPDATE reviews SET rating = ?, body = ? WHERE id = ?")
            .bind(rating)
            .bind(body)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(SocialError::NotFound {
                entity: "Review",
                id,
            });
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = query("DELETE FROM reviews WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_product(
        &self,
        product_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<Review>> {
        let total: i64 = query_as("SELECT COUNT(*) as count FROM reviews WHERE product_id = ?")
            .bind(product_id)
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        let reviews = query_as::<_, Review>(
            "SELECT * FROM reviews WHERE product_id = ? ORDER BY posted_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(product_id)
        .bind(page_request.limit())
        .bind(page_request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(reviews, total as u64, page_request))
    }

    async fn find_by_user(&self, user_id: i64, page_request: PageRequest) -> Result<Page<Review>> {
        let total: i64 = query_as("SELECT COUNT(*) as count FROM reviews WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        let reviews = query_as::<_, Review>(
            "SELECT * FROM reviews WHERE user_id = ? ORDER BY posted_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(page_request.limit())
        .bind(page_request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(reviews, total as u64, page_request))
    }

    async fn rating_summary(&self, product_id: i64) -> Result<RatingSummary> {
        let buckets: Vec<(i64, i64)> = query_as(
            "SELECT rating, COUNT(*) FROM reviews WHERE product_id = ? GROUP BY rating",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        let mut distribution = [0i64; 5];
        let mut total = 0i64;
        let mut weighted = 0i64;
        for (rating, count) in buckets {
            if (1..=5).contains(&rating) {
                distribution[(rating - 1) as usize] = count;
                total += count;
                weighted += rating * count;
            }
        }

        let average = if total > 0 {
            weighted as f64 / total as f64
        } else {
            0.0
        };

        Ok(RatingSummary {
            product_id,
            total,
            average,
            distribution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_store::create_test_pool;

    #[tokio::test]
    async fn test_insert_update_delete() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteReviewRepository::new(pool);

        let id = repo.insert(1, 100, 4, "Muy bueno").await.unwrap();

        repo.update(id, 5, "Excelente").await.unwrap();
        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.rating, 5);
        assert_eq!(found.body, "Excelente");

        assert!(repo.delete(id).await.unwrap());
        assert!(repo.find_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_user_and_product() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteReviewRepository::new(pool);

        repo.insert(1, 100, 4, "Bien").await.unwrap();
        repo.insert(1, 200, 2, "Flojo").await.unwrap();

        let found = repo.find_by_user_and_product(1, 200).await.unwrap().unwrap();
        assert_eq!(found.rating, 2);
        assert!(repo.find_by_user_and_product(2, 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rating_summary() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteReviewRepository::new(pool);

        repo.insert(1, 100, 5, "Top").await.unwrap();
        repo.insert(2, 100, 5, "Top también").await.unwrap();
        repo.insert(3, 100, 2, "Meh").await.unwrap();
        repo.insert(4, 200, 1, "Otro producto").await.unwrap();

        let summary = repo.rating_summary(100).await.unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.distribution, [0, 1, 0, 0, 2]);
        assert!((summary.average - 4.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_rating_summary_empty() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteReviewRepository::new(pool);

        let summary = repo.rating_summary(999).await.unwrap();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average, 0.0);
        assert_eq!(summary.distribution, [0; 5]);
    }
}
