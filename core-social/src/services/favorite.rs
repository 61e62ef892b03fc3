//! Favorite service

use crate::error::{Result, SocialError};
use crate::models::{Favorite, ProductKind};
use crate::repositories::FavoriteRepository;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Whether a toggle ended with the product favorited or not
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

/// Service for marking products as favorites
pub struct FavoriteService {
    favorites: Arc<dyn FavoriteRepository>,
}

impl FavoriteService {
    /// Create a new FavoriteService
    pub fn new(favorites: Arc<dyn FavoriteRepository>) -> Self {
        Self { favorites }
    }

    /// Mark a product as a favorite.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` when the user already favorited the product.
    pub async fn add(
        &self,
        user_id: i64,
        product_id: i64,
        product_kind: ProductKind,
    ) -> Result<Favorite> {
        if self
            .favorites
            .find(user_id, product_id, product_kind)
            .await?
            .is_some()
        {
            return Err(SocialError::Conflict(format!(
                "Product {} is already a favorite of user {}",
                product_id, user_id
            )));
        }

        let id = self.favorites.insert(user_id, product_id, product_kind).await?;
        info!(favorite_id = id, user_id, product_id, "Added favorite");

        self.favorites
            .find_by_id(id)
            .await?
            .ok_or(SocialError::NotFound {
                entity: "Favorite",
                id,
            })
    }

    /// Unmark a favorite.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the user holds no such favorite.
    pub async fn remove(
        &self,
        user_id: i64,
        product_id: i64,
        product_kind: ProductKind,
    ) -> Result<()> {
        let removed = self
            .favorites
            .delete_by_key(user_id, product_id, product_kind)
            .await?;

        if !removed {
            return Err(SocialError::NotFound {
                entity: "Favorite",
                id: product_id,
            });
        }

        info!(user_id, product_id, "Removed favorite");
        Ok(())
    }

    /// Add the favorite if absent, remove it if present.
    pub async fn toggle(
        &self,
        user_id: i64,
        product_id: i64,
        product_kind: ProductKind,
    ) -> Result<ToggleOutcome> {
        if self
            .favorites
            .delete_by_key(user_id, product_id, product_kind)
            .await?
        {
            info!(user_id, product_id, "Toggled favorite off");
            return Ok(ToggleOutcome::Removed);
        }

        self.favorites.insert(user_id, product_id, product_kind).await?;
        info!(user_id, product_id, "Toggled favorite on");
        Ok(ToggleOutcome::Added)
    }

    /// Whether the user favorited the product
    pub async fn is_favorite(
        &self,
        user_id: i64,
        product_id: i64,
        product_kind: ProductKind,
    ) -> Result<bool> {
        Ok(self
            .favorites
            .find(user_id, product_id, product_kind)
            .await?
            .is_some())
    }

    /// One user's favorites grouped by product kind
    pub async fn find_by_user(
        &self,
        user_id: i64,
    ) -> Result<HashMap<ProductKind, Vec<Favorite>>> {
        let favorites = self.favorites.find_by_user(user_id).await?;

        let mut grouped: HashMap<ProductKind, Vec<Favorite>> = HashMap::new();
        for favorite in favorites {
            grouped.entry(favorite.product_kind).or_default().push(favorite);
        }

        Ok(grouped)
    }

    /// How many users favorited one product
    pub async fn count_for_product(
        &self,
        product_id: i64,
        product_kind: ProductKind,
    ) -> Result<i64> {
        self.favorites.count_for_product(product_id, product_kind).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::SqliteFavoriteRepository;
    use core_store::create_test_pool;

    async fn create_service() -> FavoriteService {
        let pool = create_test_pool().await.unwrap();
        FavoriteService::new(Arc::new(SqliteFavoriteRepository::new(pool)))
    }

    #[tokio::test]
    async fn test_duplicate_add_conflicts() {
        let service = create_service().await;

        service.add(1, 100, ProductKind::Album).await.unwrap();
        let err = service.add(1, 100, ProductKind::Album).await.unwrap_err();
        assert!(matches!(err, SocialError::Conflict(_)));

        // Same product as a song is a distinct favorite
        service.add(1, 100, ProductKind::Song).await.unwrap();
    }

    #[tokio::test]
    async fn test_toggle_round_trip() {
        let service = create_service().await;

        let outcome = service.toggle(1, 100, ProductKind::Song).await.unwrap();
        assert_eq!(outcome, ToggleOutcome::Added);
        assert!(service.is_favorite(1, 100, ProductKind::Song).await.unwrap());

        let outcome = service.toggle(1, 100, ProductKind::Song).await.unwrap();
        assert_eq!(outcome, ToggleOutcome::Removed);
        assert!(!service.is_favorite(1, 100, ProductKind::Song).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_missing_not_found() {
        let service = create_service().await;

        let err = service.remove(1, 100, ProductKind::Album).await.unwrap_err();
        assert!(matches!(err, SocialError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_find_by_user_groups_by_kind() {
        let service = create_service().await;

        service.add(1, 100, ProductKind::Album).await.unwrap();
        service.add(1, 101, ProductKind::Album).await.unwrap();
        service.add(1, 200, ProductKind::Song).await.unwrap();

        let grouped = service.find_by_user(1).await.unwrap();
        assert_eq!(grouped[&ProductKind::Album].len(), 2);
        assert_eq!(grouped[&ProductKind::Song].len(), 1);
    }
}
