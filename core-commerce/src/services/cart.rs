//! Cart service: merging adds and cart-level operations

use crate::error::{CommerceError, Result};
use crate::models::CartItem;
use crate::repositories::CartRepository;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Service over a user's cart lines
pub struct CartService {
    carts: Arc<dyn CartRepository>,
}

impl CartService {
    pub fn new(carts: Arc<dyn CartRepository>) -> Self {
        Self { carts }
    }

    /// Add a product to a cart
    ///
    /// Adding a product already in the cart merges into the existing line by
    /// raising its quantity instead of creating a duplicate.
    pub async fn add(
        &self,
        user_id: i64,
        cart_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> Result<CartItem> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidInput {
                field: "quantity".to_string(),
                message: "Quantity must be positive".to_string(),
            });
        }

        if let Some(existing) = self.carts.find_line(user_id, cart_id, product_id).await? {
            let merged = existing.quantity + quantity;
            self.carts.set_quantity(existing.id, merged).await?;
            debug!(item_id = existing.id, quantity = merged, "Merged cart line");
            return self.get(existing.id).await;
        }

        let id = self.carts.insert(user_id, cart_id, product_id, quantity).await?;
        self.get(id).await
    }

    pub async fn get(&self, id: i64) -> Result<CartItem> {
        self.carts
            .find_by_id(id)
            .await?
            .ok_or(CommerceError::NotFound {
                entity: "CartItem",
                id,
            })
    }

    /// Overwrite a line's quantity; zero and below are rejected (removal is
    /// explicit)
    pub async fn update_quantity(&self, id: i64, quantity: i64) -> Result<CartItem> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidInput {
                field: "quantity".to_string(),
                message: "Quantity must be positive".to_string(),
            });
        }

        if !self.carts.set_quantity(id, quantity).await? {
            return Err(CommerceError::NotFound {
                entity: "CartItem",
                id,
            });
        }

        self.get(id).await
    }

    /// Remove one line
    pub async fn remove(&self, id: i64) -> Result<()> {
        if !self.carts.delete(id).await? {
            return Err(CommerceError::NotFound {
                entity: "CartItem",
                id,
            });
        }
        Ok(())
    }

    /// Remove a product everywhere in the user's carts
    ///
    /// # Errors
    /// Returns `NotFound` when the user holds no line for the product.
    pub async fn remove_product(&self, user_id: i64, product_id: i64) -> Result<u64> {
        let removed = self.carts.delete_product(user_id, product_id).await?;
        if removed == 0 {
            return Err(CommerceError::NotFound {
                entity: "CartItem",
                id: product_id,
            });
        }
        Ok(removed)
    }

    /// Empty one cart; emptying an already empty cart is fine
    pub async fn clear(&self, user_id: i64, cart_id: i64) -> Result<u64> {
        self.carts.clear(user_id, cart_id).await
    }

    /// All lines in one cart
    pub async fn items(&self, user_id: i64, cart_id: i64) -> Result<Vec<CartItem>> {
        self.carts.items_for_cart(user_id, cart_id).await
    }

    /// Sum of quantities in one cart
    pub async fn item_count(&self, user_id: i64, cart_id: i64) -> Result<i64> {
        self.carts.item_count(user_id, cart_id).await
    }

    /// The user's lines grouped per cart, ordered by cart id
    pub async fn find_by_user(&self, user_id: i64) -> Result<BTreeMap<i64, Vec<CartItem>>> {
        let items = self.carts.find_by_user(user_id).await?;

        let mut grouped: BTreeMap<i64, Vec<CartItem>> = BTreeMap::new();
        for item in items {
            grouped.entry(item.cart_id).or_default().push(item);
        }

        Ok(grouped)
    }

    /// The cart the user most recently added to
    pub async fn active_cart(&self, user_id: i64) -> Result<Option<i64>> {
        self.carts.active_cart(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::SqliteCartRepository;
    use core_store::create_test_pool;

    async fn setup_service() -> CartService {
        let pool = create_test_pool().await.unwrap();
        CartService::new(Arc::new(SqliteCartRepository::new(pool)))
    }

    #[tokio::test]
    async fn test_add_merges_same_product() {
        let service = setup_service().await;

        let first = service.add(1, 10, 100, 2).await.unwrap();
        let merged = service.add(1, 10, 100, 3).await.unwrap();

        assert_eq!(merged.id, first.id);
        assert_eq!(merged.quantity, 5);
        assert_eq!(service.items(1, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_rejects_non_positive_quantity() {
        let service = setup_service().await;

        assert!(matches!(
            service.add(1, 10, 100, 0).await,
            Err(CommerceError::InvalidInput { .. })
        ));
        assert!(matches!(
            service.add(1, 10, 100, -2).await,
            Err(CommerceError::InvalidInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_quantity_rejects_zero() {
        let service = setup_service().await;

        let item = service.add(1, 10, 100, 2).await.unwrap();
        let result = service.update_quantity(item.id, 0).await;
        assert!(matches!(result, Err(CommerceError::InvalidInput { .. })));

        // Line untouched.
        assert_eq!(service.get(item.id).await.unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn test_remove_product_requires_presence() {
        let service = setup_service().await;

        service.add(1, 10, 100, 1).await.unwrap();
        service.add(1, 11, 100, 1).await.unwrap();

        let removed = service.remove_product(1, 100).await.unwrap();
        assert_eq!(removed, 2);

        let result = service.remove_product(1, 100).await;
        assert!(matches!(result, Err(CommerceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_find_by_user_groups_per_cart() {
        let service = setup_service().await;

        service.add(1, 10, 100, 1).await.unwrap();
        service.add(1, 10, 101, 1).await.unwrap();
        service.add(1, 11, 102, 1).await.unwrap();

        let grouped = service.find_by_user(1).await.unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&10].len(), 2);
        assert_eq!(grouped[&11].len(), 1);
    }

    #[tokio::test]
    async fn test_active_cart_is_most_recent() {
        let service = setup_service().await;

        assert!(service.active_cart(1).await.unwrap().is_none());

        service.add(1, 10, 100, 1).await.unwrap();
        service.add(1, 11, 101, 1).await.unwrap();

        assert_eq!(service.active_cart(1).await.unwrap(), Some(11));
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let service = setup_service().await;

        service.add(1, 10, 100, 4).await.unwrap();
        assert_eq!(service.clear(1, 10).await.unwrap(), 1);
        assert_eq!(service.clear(1, 10).await.unwrap(), 0);
        assert_eq!(service.item_count(1, 10).await.unwrap(), 0);
    }
}
