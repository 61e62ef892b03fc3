//! Promotion service: window validation, redemption codes, usage counting

use crate::error::{CommerceError, Result};
use crate::models::{CodeValidation, DiscountKind, NewPromotion, Promotion, PromotionUpdate};
use crate::repositories::PromotionRepository;
use core_store::{Page, PageRequest};
use std::sync::Arc;
use tracing::{debug, info};

/// Service enforcing the promotion business rules
pub struct PromotionService {
    promotions: Arc<dyn PromotionRepository>,
}

impl PromotionService {
    pub fn new(promotions: Arc<dyn PromotionRepository>) -> Self {
        Self { promotions }
    }

    pub async fn get(&self, id: i64) -> Result<Promotion> {
        self.promotions
            .find_by_id(id)
            .await?
            .ok_or(CommerceError::NotFound {
                entity: "Promotion",
                id,
            })
    }

    pub async fn list(&self, page_request: PageRequest) -> Result<Page<Promotion>> {
        self.promotions.list(page_request).await
    }

    /// Promotions currently in effect: active flag set and window containing
    /// now
    pub async fn find_active(&self) -> Result<Vec<Promotion>> {
        self.promotions
            .find_active(chrono::Utc::now().timestamp())
            .await
    }

    /// Create a promotion
    ///
    /// # Errors
    /// - `InvalidInput` when the window is not ordered or a percentage
    ///   discount is missing or outside 0..=100
    /// - `Conflict` when the redemption code is already taken
    pub async fn create(&self, new: NewPromotion) -> Result<Promotion> {
        if new.name.trim().is_empty() {
            return Err(CommerceError::InvalidInput {
                field: "name".to_string(),
                message: "Promotion name cannot be empty".to_string(),
            });
        }
        Self::check_window(new.starts_at, new.ends_at)?;
        Self::check_discount(new.discount_kind, new.discount_value)?;

        if let Some(code) = &new.code {
            if self.promotions.find_by_code(code).await?.is_some() {
                return Err(CommerceError::Conflict(format!(
                    "Promotion code '{}' already exists",
                    code
                )));
            }
        }

        let id = self.promotions.insert(&new).await?;
        info!(promotion_id = id, "Created promotion");
        self.get(id).await
    }

    /// Apply a partial update
    ///
    /// When either window bound changes, the new bound is validated against
    /// the other bound's effective value before anything is written; a
    /// reordering attempt leaves the row unmodified.
    pub async fn update(&self, id: i64, update: PromotionUpdate) -> Result<Promotion> {
        let current = self.get(id).await?;

        if update.starts_at.is_some() || update.ends_at.is_some() {
            let starts_at = update.starts_at.unwrap_or(current.starts_at);
            let ends_at = update.ends_at.unwrap_or(current.ends_at);
            Self::check_window(starts_at, ends_at)?;
        }

        if let Some(Some(code)) = update.code.as_resolved() {
            if current.code.as_deref() != Some(code.as_str()) {
                if let Some(other) = self.promotions.find_by_code(code).await? {
                    if other.id != id {
                        return Err(CommerceError::Conflict(format!(
                            "Promotion code '{}' already exists",
                            code
                        )));
                    }
                }
            }
        }

        let kind = update.discount_kind.unwrap_or(current.discount_kind);
        let value = match update.discount_value.as_resolved() {
            Some(v) => v.copied(),
            None => current.discount_value,
        };
        Self::check_discount(kind, value)?;

        self.promotions.apply_update(id, &update).await?;
        debug!(promotion_id = id, "Updated promotion");
        self.get(id).await
    }

    pub async fn remove(&self, id: i64) -> Result<()> {
        self.get(id).await?;
        self.promotions.delete(id).await?;
        info!(promotion_id = id, "Removed promotion");
        Ok(())
    }

    /// Add one redemption
    ///
    /// # Errors
    /// `InvalidInput` when the promotion is outside its window or the usage
    /// limit is exhausted; the counter never passes the limit.
    pub async fn increment_usage(&self, id: i64) -> Result<Promotion> {
        let promotion = self.get(id).await?;

        if !promotion.is_current(chrono::Utc::now().timestamp()) {
            return Err(CommerceError::InvalidInput {
                field: "id".to_string(),
                message: "Promotion is not in effect".to_string(),
            });
        }

        if !self.promotions.increment_usage(id).await? {
            return Err(CommerceError::InvalidInput {
                field: "id".to_string(),
                message: "Promotion usage limit reached".to_string(),
            });
        }

        self.get(id).await
    }

    /// Validate a redemption code against a purchase amount
    ///
    /// Checks run in order and stop at the first failure: the code exists,
    /// the window contains now, the active flag is set, the usage limit has
    /// room, and the amount meets the minimum.
    pub async fn validate_code(&self, code: &str, amount: f64) -> Result<CodeValidation> {
        let Some(promotion) = self.promotions.find_by_code(code).await? else {
            return Ok(CodeValidation::Invalid {
                reason: "Invalid promotion code".to_string(),
            });
        };

        if !promotion.is_current(chrono::Utc::now().timestamp()) {
            return Ok(CodeValidation::Invalid {
                reason: "Promotion is not in effect".to_string(),
            });
        }

        if !promotion.active {
            return Ok(CodeValidation::Invalid {
                reason: "Promotion is not active".to_string(),
            });
        }

        if promotion.limit_reached() {
            return Ok(CodeValidation::Invalid {
                reason: "Promotion usage limit reached".to_string(),
            });
        }

        if let Some(minimum) = promotion.min_purchase_amount {
            if amount < minimum {
                return Ok(CodeValidation::Invalid {
                    reason: format!("Purchase amount is below the minimum of {}", minimum),
                });
            }
        }

        Ok(CodeValidation::Valid { promotion })
    }

    fn check_window(starts_at: i64, ends_at: i64) -> Result<()> {
        if ends_at <= starts_at {
            return Err(CommerceError::InvalidInput {
                field: "ends_at".to_string(),
                message: "Promotion end must be after its start".to_string(),
            });
        }
        Ok(())
    }

    fn check_discount(kind: DiscountKind, value: Option<f64>) -> Result<()> {
        if kind == DiscountKind::Percentage {
            match value {
                Some(v) if v > 0.0 && v <= 100.0 => {}
                _ => {
                    return Err(CommerceError::InvalidInput {
                        field: "discount_value".to_string(),
                        message: "Percentage discounts require a value in (0, 100]".to_string(),
                    })
                }
            }
        }
        Ok(())
    }
}
