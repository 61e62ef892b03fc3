//! Payment method service: plain CRUD with name uniqueness

use crate::error::{CommerceError, Result};
use crate::models::PaymentMethod;
use crate::repositories::PaymentMethodRepository;
use std::sync::Arc;
use tracing::info;

pub struct PaymentMethodService {
    methods: Arc<dyn PaymentMethodRepository>,
}

impl PaymentMethodService {
    pub fn new(methods: Arc<dyn PaymentMethodRepository>) -> Self {
        Self { methods }
    }

    pub async fn get(&self, id: i64) -> Result<PaymentMethod> {
        self.methods
            .find_by_id(id)
            .await?
            .ok_or(CommerceError::NotFound {
                entity: "PaymentMethod",
                id,
            })
    }

    pub async fn list(&self) -> Result<Vec<PaymentMethod>> {
        self.methods.list().await
    }

    /// Create a payment method
    ///
    /// # Errors
    /// - `InvalidInput` for an empty name or a negative fee
    /// - `Conflict` when the name is taken
    pub async fn create(&self, name: &str, fee_percent: f64) -> Result<PaymentMethod> {
        let name = name.trim();
        Self::check(name, fee_percent)?;

        if self.methods.find_by_name(name).await?.is_some() {
            return Err(CommerceError::Conflict(format!(
                "Payment method '{}' already exists",
                name
            )));
        }

        let id = self.methods.insert(name, fee_percent).await?;
        info!(payment_method_id = id, "Created payment method");
        self.get(id).await
    }

    pub async fn update(&self, id: i64, name: &str, fee_percent: f64) -> Result<PaymentMethod> {
        let name = name.trim();
        Self::check(name, fee_percent)?;
        let current = self.get(id).await?;

        if name != current.name {
            if let Some(other) = self.methods.find_by_name(name).await? {
                if other.id != id {
                    return Err(CommerceError::Conflict(format!(
                        "Payment method '{}' already exists",
                        name
                    )));
                }
            }
        }

        self.methods.update(id, name, fee_percent).await?;
        self.get(id).await
    }

    pub async fn remove(&self, id: i64) -> Result<()> {
        self.get(id).await?;
        self.methods.delete(id).await?;
        info!(payment_method_id = id, "Removed payment method");
        Ok(())
    }

    fn check(name: &str, fee_percent: f64) -> Result<()> {
        if name.is_empty() {
            return Err(CommerceError::InvalidInput {
                field: "name".to_string(),
                message: "Payment method name cannot be empty".to_string(),
            });
        }
        if fee_percent < 0.0 {
            return Err(CommerceError::InvalidInput {
                field: "fee_percent".to_string(),
                message: "Fee percentage cannot be negative".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::SqlitePaymentMethodRepository;
    use core_store::create_test_pool;

    async fn setup_service() -> PaymentMethodService {
        let pool = create_test_pool().await.unwrap();
        PaymentMethodService::new(Arc::new(SqlitePaymentMethodRepository::new(pool)))
    }

    #[tokio::test]
    async fn test_create_and_duplicate() {
        let service = setup_service().await;

        let created = service.create("PSE", 1.5).await.unwrap();
        assert_eq!(created.name, "PSE");

        let result = service.create("PSE", 2.0).await;
        assert!(matches!(result, Err(CommerceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_negative_fee_rejected() {
        let service = setup_service().await;
        let result = service.create("Gratis", -1.0).await;
        assert!(matches!(result, Err(CommerceError::InvalidInput { .. })));
    }
}
