//! Domain models for the social crate

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user comment on a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub body: String,
    pub posted_at: i64,
}

/// A user review with a bounded rating, one per user and product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    /// Stars, 1 through 5
    pub rating: i64,
    pub body: String,
    pub posted_at: i64,
}

/// Which catalog table a favorited product lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum ProductKind {
    Album,
    Song,
}

/// A product a user marked as favorite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub product_kind: ProductKind,
    pub added_at: i64,
}

/// Aggregated ratings for one product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
    pub product_id: i64,
    pub total: i64,
    /// Mean rating; 0 when the product has no reviews
    pub average: f64,
    /// Review counts indexed by star count minus one
    pub distribution: [i64; 5],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_kind_serde_names() {
        let json = serde_json::to_string(&ProductKind::Album).unwrap();
        assert_eq!(json, "\"Album\"");
        let kind: ProductKind = serde_json::from_str("\"Song\"").unwrap();
        assert_eq!(kind, ProductKind::Song);
    }
}
