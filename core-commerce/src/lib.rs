//! # Commerce Module
//!
//! Owns the commercial side of the platform: promotions with their code
//! validation rules and usage counter, payment methods, shopping cart items,
//! sales with line items, and payment transactions.
//!
//! Services enforce the business rules (promotion windows, usage limits,
//! one completed transaction per sale, completed transactions being
//! immutable); repositories stay thin over sqlx.

pub mod error;
pub mod models;
pub mod repositories;
pub mod services;

pub use error::{CommerceError, Result};
pub use services::{
    CartService, PaymentMethodService, PromotionService, SaleService, TransactionService,
};
