//! # Social Module
//!
//! Comments, reviews, and favorites that users attach to catalog products.
//! Ownership checks are enforced when the caller supplies an acting user id
//! and skipped when it does not; review ratings are bounded and unique per
//! user and product; favorites toggle.

pub mod error;
pub mod models;
pub mod repositories;
pub mod services;

pub use error::{Result, SocialError};
pub use services::favorite::ToggleOutcome;
pub use services::{CommentService, FavoriteService, ReviewService};
