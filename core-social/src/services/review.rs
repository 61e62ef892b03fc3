//! Review service

use crate::error::{Result, SocialError};
use crate::models::{RatingSummary, Review};
use crate::repositories::ReviewRepository;
use crate::services::comment::check_owner;
use core_store::{Page, PageRequest};
use std::sync::Arc;
use tracing::{debug, info};

/// Service enforcing the one-review-per-user-and-product rule
pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
}

impl ReviewService {
    /// Create a new ReviewService
    pub fn new(reviews: Arc<dyn ReviewRepository>) -> Self {
        Self { reviews }
    }

    /// Post a review on a product.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the rating is outside 1..=5 and
    /// `Conflict` when the user already reviewed the product.
    pub async fn post(
        &self,
        user_id: i64,
        product_id: i64,
        rating: i64,
        body: &str,
    ) -> Result<Review> {
        check_rating(rating)?;

        if self
            .reviews
            .find_by_user_and_product(user_id, product_id)
            .await?
            .is_some()
        {
            return Err(SocialError::Conflict(format!(
                "User {} already reviewed product {}",
                user_id, product_id
            )));
        }

        let id = self.reviews.insert(user_id, product_id, rating, body.trim()).await?;
        info!(review_id = id, product_id, rating, "Posted review");

        self.load(id).await
    }

    /// Get a review by ID
    pub async fn get(&self, id: i64) -> Result<Review> {
        self.load(id).await
    }

    /// Replace the rating and body of an existing review.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` when `actor` is present and is not the review's
    /// author.
    pub async fn edit(
        &self,
        id: i64,
        actor: Option<i64>,
        rating: i64,
        body: &str,
    ) -> Result<Review> {
        let existing = self.load(id).await?;
        check_owner(actor, existing.user_id)?;
        check_rating(rating)?;

        self.reviews.update(id, rating, body.trim()).await?;
        debug!(review_id = id, rating, "Edited review");

        self.load(id).await
    }

    /// Remove a review.
    pub async fn remove(&self, id: i64, actor: Option<i64>) -> Result<()> {
        let existing = self.load(id).await?;
        check_owner(actor, existing.user_id)?;

        self.reviews.delete(id).await?;
        info!(review_id = id, "Removed review");

        Ok(())
    }

    /// The review one user left on one product, if any
    pub async fn find_by_user_and_product(
        &self,
        user_id: i64,
        product_id: i64,
    ) -> Result<Option<Review>> {
        self.reviews.find_by_user_and_product(user_id, product_id).await
    }

    /// Reviews on one product, newest first
    pub async fn find_by_product(
        &self,
        product_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<Review>> {
        self.reviews.find_by_product(product_id, page_request).await
    }

    /// One user's reviews, newest first
    pub async fn find_by_user(
        &self,
        user_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<Review>> {
        self.reviews.find_by_user(user_id, page_request).await
    }

    /// Aggregate ratings for one product
    pub async fn rating_summary(&self, product_id: i64) -> Result<RatingSummary> {
        self.reviews.rating_summary(product_id).await
    }

    async fn load(&self, id: i64) -> Result<Review> {
        self.reviews
            .find_by_id(id)
            .await?
            .ok_or(SocialError::NotFound {
                entity: "Review",
                id,
            })
    }
}

fn check_rating(rating: i64) -> Result<()> {
    if !(1..=5).contains(&rating) {
        return Err(SocialError::InvalidInput {
            field: "rating".to_string(),
            message: "Rating must be between 1 and 5".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::SqliteReviewRepository;
    use core_store::create_test_pool;

    async fn create_service() -> ReviewService {
        let pool = create_test_pool().await.unwrap();
        ReviewService::new(Arc::new(SqliteReviewRepository::new(pool)))
    }

    #[tokio::test]
    async fn test_rating_bounds() {
        let service = create_service().await;

        for bad in [0, 6, -1] {
            let err = service.post(1, 100, bad, "x").await.unwrap_err();
            assert!(matches!(err, SocialError::InvalidInput { .. }));
        }

        let review = service.post(1, 100, 5, "Perfecto").await.unwrap();
        assert_eq!(review.rating, 5);
    }

    #[tokio::test]
    async fn test_one_review_per_user_and_product() {
        let service = create_service().await;

        service.post(1, 100, 4, "Bien").await.unwrap();
        let err = service.post(1, 100, 5, "Segunda opinión").await.unwrap_err();
        assert!(matches!(err, SocialError::Conflict(_)));

        // Other users and other products are unaffected
        service.post(2, 100, 3, "Normal").await.unwrap();
        service.post(1, 200, 5, "Otro disco").await.unwrap();
    }

    #[tokio::test]
    async fn test_edit_checks_ownership_and_rating() {
        let service = create_service().await;
        let review = service.post(1, 100, 3, "Normal").await.unwrap();

        let err = service.edit(review.id, Some(2), 1, "Malo").await.unwrap_err();
        assert!(matches!(err, SocialError::Forbidden(_)));

        let err = service.edit(review.id, Some(1), 9, "Malo").await.unwrap_err();
        assert!(matches!(err, SocialError::InvalidInput { .. }));

        let edited = service.edit(review.id, Some(1), 4, "Mejoró").await.unwrap();
        assert_eq!(edited.rating, 4);
    }

    #[tokio::test]
    async fn test_summary_reflects_posts() {
        let service = create_service().await;

        service.post(1, 100, 5, "Top").await.unwrap();
        service.post(2, 100, 3, "Normal").await.unwrap();

        let summary = service.rating_summary(100).await.unwrap();
        assert_eq!(summary.total, 2);
        assert!((summary.average - 4.0).abs() < 1e-9);
    }
}
