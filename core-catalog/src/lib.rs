//! # Catalog Management Module
//!
//! Owns the label catalog: artists, events, managers, albums, and songs,
//! plus the id+label lookup entities they reference.
//!
//! ## Overview
//!
//! Artists, events, and managers are dual-store entities: a normalized
//! relational row holds the core fields and foreign-key relations, and an
//! optional companion document in the metadata store holds the open-ended
//! extensions. Services in this crate compose the two sides into one read
//! model and route mutations to the right store.

pub mod error;
pub mod models;
pub mod repositories;
pub mod services;

pub use error::{CatalogError, Result};
pub use services::{AlbumService, ArtistService, EventService, ManagerService, SongService};
