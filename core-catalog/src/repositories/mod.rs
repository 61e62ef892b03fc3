//! # Repository Pattern Implementation
//!
//! This module provides repository traits and implementations for catalog
//! data access. Each entity has a corresponding repository with CRUD
//! operations, querying, and pagination support.
//!
//! ## Architecture
//!
//! - Traits define the interface for each repository
//! - SQLite implementations use sqlx for async database access
//! - All operations return `Result<T>` for error handling
//! - Pagination is supported via the `Page<T>` wrapper
//!
//! ## Available Repositories
//!
//! - `ArtistRepository` - Artists with genre/country/status relations
//! - `EventRepository` - Live events with headline artist relation
//! - `ManagerRepository` - Artist managers
//! - `AlbumRepository` - Albums with artist relationships
//! - `SongRepository` - Songs with album and artist relationships
//! - `LookupRepository` - Shared id+label entities (genres, countries,
//!   statuses, genders)

pub mod album;
pub mod artist;
pub mod event;
pub mod lookup;
pub mod manager;
pub mod song;

pub use album::{AlbumRepository, SqliteAlbumRepository};
pub use artist::{ArtistRepository, SqliteArtistRepository};
pub use event::{EventRepository, SqliteEventRepository};
pub use lookup::{LookupKind, LookupRepository, SqliteLookupRepository};
pub use manager::{ManagerRepository, SqliteManagerRepository};
pub use song::{SongRepository, SqliteSongRepository};

use crate::models::Lookup;

/// Build a resolved lookup from an optional foreign key and its joined label
pub(crate) fn resolve_lookup(id: Option<i64>, label: Option<String>) -> Option<Lookup> {
    id.zip(label).map(|(id, label)| Lookup { id, label })
}
