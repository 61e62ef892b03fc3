//! # Commerce Services
//!
//! Business rules over the commerce repositories: promotion windows and
//! redemption codes, merging cart adds, sale totals with tax, and the
//! transaction lifecycle guards.

pub mod cart;
pub mod payment_method;
pub mod promotion;
pub mod sale;
pub mod transaction;

pub use cart::CartService;
pub use payment_method::PaymentMethodService;
pub use promotion::PromotionService;
pub use sale::SaleService;
pub use transaction::TransactionService;
