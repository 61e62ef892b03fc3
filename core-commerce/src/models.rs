//! Domain models for the commerce crate

use core_store::Patch;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// =============================================================================
// Promotions
// =============================================================================

/// How a promotion discounts a purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum DiscountKind {
    Percentage,
    FixedAmount,
    FreeShipping,
    TwoForOne,
}

/// A commercial promotion with an effective window and optional redemption
/// code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Promotion {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub discount_kind: DiscountKind,
    /// Percentage or fixed amount depending on the kind; unused for
    /// free-shipping and two-for-one promotions
    pub discount_value: Option<f64>,
    /// Window start, unix seconds
    pub starts_at: i64,
    /// Window end, unix seconds
    pub ends_at: i64,
    /// Redemption code; promotions without one apply automatically
    pub code: Option<String>,
    /// Maximum redemptions; unlimited when absent
    pub usage_limit: Option<i64>,
    /// Redemptions so far, never past the limit
    pub usage_count: i64,
    /// Minimum purchase amount to qualify
    pub min_purchase_amount: Option<f64>,
    /// Free-text description of which products qualify
    pub applicable_products: Option<String>,
    pub active: bool,
    pub created_at: i64,
}

impl Promotion {
    /// Whether `now` falls inside the effective window (inclusive on both
    /// ends)
    pub fn is_current(&self, now: i64) -> bool {
        self.starts_at <= now && now <= self.ends_at
    }

    /// Whether the usage limit has been exhausted
    pub fn limit_reached(&self) -> bool {
        matches!(self.usage_limit, Some(limit) if self.usage_count >= limit)
    }
}

/// Create payload for a promotion
#[derive(Debug, Clone, Deserialize)]
pub struct NewPromotion {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub discount_kind: DiscountKind,
    #[serde(default)]
    pub discount_value: Option<f64>,
    pub starts_at: i64,
    pub ends_at: i64,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub usage_limit: Option<i64>,
    #[serde(default)]
    pub min_purchase_amount: Option<f64>,
    #[serde(default)]
    pub applicable_products: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial-update payload for a promotion
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromotionUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub discount_kind: Option<DiscountKind>,
    #[serde(default)]
    pub discount_value: Patch<f64>,
    #[serde(default)]
    pub starts_at: Option<i64>,
    #[serde(default)]
    pub ends_at: Option<i64>,
    #[serde(default)]
    pub code: Patch<String>,
    #[serde(default)]
    pub usage_limit: Patch<i64>,
    #[serde(default)]
    pub min_purchase_amount: Patch<f64>,
    #[serde(default)]
    pub applicable_products: Patch<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl PromotionUpdate {
    pub fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.description.is_some()
            || self.discount_kind.is_some()
            || self.discount_value.is_set()
            || self.starts_at.is_some()
            || self.ends_at.is_some()
            || self.code.is_set()
            || self.usage_limit.is_set()
            || self.min_purchase_amount.is_set()
            || self.applicable_products.is_set()
            || self.active.is_some()
    }
}

/// Outcome of validating a redemption code against a purchase amount
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CodeValidation {
    Valid { promotion: Promotion },
    Invalid { reason: String },
}

// =============================================================================
// Payment methods
// =============================================================================

/// A supported payment method and its processing fee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PaymentMethod {
    pub id: i64,
    pub name: String,
    pub fee_percent: f64,
    pub created_at: i64,
}

// =============================================================================
// Cart
// =============================================================================

/// One product line in a user's cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CartItem {
    pub id: i64,
    /// Carts are client-assigned groupings; one user may hold several
    pub cart_id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub added_at: i64,
}

// =============================================================================
// Sales
// =============================================================================

/// Lifecycle state of a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum SaleStatus {
    Pending,
    Completed,
    Cancelled,
    Refunded,
}

/// Which catalog table a sold product lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum ProductKind {
    Album,
    Song,
}

/// Sale header; amounts are fixed at creation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Sale {
    pub id: i64,
    /// Generated human-readable identifier, unique per sale
    pub sale_number: String,
    pub user_id: i64,
    pub subtotal: f64,
    pub discount: f64,
    pub tax: f64,
    pub total: f64,
    pub status: SaleStatus,
    pub created_at: i64,
}

/// One line of a sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    pub product_kind: ProductKind,
    pub quantity: i64,
    pub unit_price: f64,
    pub line_total: f64,
}

/// Create payload for one sale line
#[derive(Debug, Clone, Deserialize)]
pub struct NewSaleItem {
    pub product_id: i64,
    pub product_kind: ProductKind,
    pub quantity: i64,
    pub unit_price: f64,
}

/// Create payload for a sale
#[derive(Debug, Clone, Deserialize)]
pub struct NewSale {
    pub user_id: i64,
    pub items: Vec<NewSaleItem>,
    /// Discount already granted (promotion or manual), subtracted from the
    /// subtotal before tax
    #[serde(default)]
    pub discount: f64,
}

/// Sale header plus its lines
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Transactions
// =============================================================================

/// Lifecycle state of a payment transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

/// A payment attempt against a sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub sale_id: i64,
    pub payment_method_id: Option<i64>,
    pub promotion_id: Option<i64>,
    pub amount: f64,
    pub status: TransactionStatus,
    /// Reference from the external payment processor
    pub external_reference: Option<String>,
    pub notes: Option<String>,
    pub occurred_at: i64,
}

/// Create payload for a transaction
#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    pub user_id: i64,
    pub sale_id: i64,
    #[serde(default)]
    pub payment_method_id: Option<i64>,
    #[serde(default)]
    pub promotion_id: Option<i64>,
    pub amount: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial-update payload for a transaction; completed transactions refuse
/// all of these
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionUpdate {
    #[serde(default)]
    pub payment_method_id: Patch<i64>,
    #[serde(default)]
    pub promotion_id: Patch<i64>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub notes: Patch<String>,
}

impl TransactionUpdate {
    pub fn has_changes(&self) -> bool {
        self.payment_method_id.is_set()
            || self.promotion_id.is_set()
            || self.amount.is_some()
            || self.notes.is_set()
    }
}

/// Optional filters for transaction listings; absent fields match everything
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransactionFilter {
    pub user_id: Option<i64>,
    pub sale_id: Option<i64>,
    pub status: Option<TransactionStatus>,
    /// Inclusive `occurred_at` lower bound, unix seconds
    pub from: Option<i64>,
    /// Inclusive `occurred_at` upper bound, unix seconds
    pub to: Option<i64>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn promotion(starts_at: i64, ends_at: i64) -> Promotion {
        Promotion {
            id: 1,
            name: "Lanzamiento".to_string(),
            description: String::new(),
            discount_kind: DiscountKind::Percentage,
            discount_value: Some(20.0),
            starts_at,
            ends_at,
            code: Some("LAUNCH20".to_string()),
            usage_limit: Some(2),
            usage_count: 0,
            min_purchase_amount: None,
            applicable_products: None,
            active: true,
            created_at: 0,
        }
    }

    #[test]
    fn test_is_current_window_is_inclusive() {
        let promo = promotion(100, 200);
        assert!(!promo.is_current(99));
        assert!(promo.is_current(100));
        assert!(promo.is_current(150));
        assert!(promo.is_current(200));
        assert!(!promo.is_current(201));
    }

    #[test]
    fn test_limit_reached() {
        let mut promo = promotion(0, 10);
        assert!(!promo.limit_reached());

        promo.usage_count = 2;
        assert!(promo.limit_reached());

        promo.usage_limit = None;
        assert!(!promo.limit_reached());
    }

    #[test]
    fn test_promotion_update_tri_state() {
        let update: PromotionUpdate =
            serde_json::from_str(r#"{"code": null, "ends_at": 500}"#).unwrap();
        assert_eq!(update.code, Patch::Null);
        assert_eq!(update.usage_limit, Patch::Unset);
        assert_eq!(update.ends_at, Some(500));
        assert!(update.has_changes());
    }

    #[test]
    fn test_new_promotion_defaults_active() {
        let new: NewPromotion = serde_json::from_str(
            r#"{"name": "X", "discount_kind": "FreeShipping", "starts_at": 1, "ends_at": 2}"#,
        )
        .unwrap();
        assert!(new.active);
        assert!(new.code.is_none());
    }
}
