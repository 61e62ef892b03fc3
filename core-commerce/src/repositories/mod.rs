//! Repositories for the commerce tables
//!
//! Same shape as the catalog repositories: a trait per entity with a
//! `Sqlite*` implementation, thin over sqlx, rule enforcement left to the
//! services.

pub mod cart;
pub mod payment_method;
pub mod promotion;
pub mod sale;
pub mod transaction;

pub use cart::{CartRepository, SqliteCartRepository};
pub use payment_method::{PaymentMethodRepository, SqlitePaymentMethodRepository};
pub use promotion::{PromotionRepository, SqlitePromotionRepository};
pub use sale::{SaleRepository, SqliteSaleRepository};
pub use transaction::{SqliteTransactionRepository, TransactionRepository};
