//! # Shared Storage Layer
//!
//! Owns the platform database and the storage primitives shared by every
//! domain crate.
//!
//! ## Overview
//!
//! This crate manages:
//! - SQLite connection pooling, schema, and migrations
//! - The document metadata store (one JSON document per parent entity)
//! - Pagination types for repository queries
//! - The tri-state `Patch` type for partial updates

pub mod db;
pub mod documents;
pub mod error;
pub mod pagination;
pub mod patch;

pub use db::{create_pool, create_test_pool, DatabaseConfig};
pub use documents::{DocumentStore, SqliteDocumentStore};
pub use error::{Result, StoreError};
pub use pagination::{Page, PageRequest};
pub use patch::Patch;
