//! # Catalog Services
//!
//! Domain services composing the relational rows with their document
//! companions into unified read models, and routing each mutation to the
//! store that owns the touched fields.
//!
//! ## Composition
//!
//! Reads fetch the relational record, then look up the companion document
//! once; list reads batch the document lookups for the whole page. An absent
//! document yields `metadata: None`, which serializes as an absent field
//! rather than an empty object, and is never an error.
//!
//! ## Mutation routing
//!
//! Creates pre-check the natural key, insert the core row, and write a
//! companion document only when the payload supplied at least one metadata
//! field. Updates split the payload: supplied core fields go to the
//! relational row, supplied metadata fields shallow-merge into the document.
//! Removes delete the document first, then the row; the two stores share no
//! transaction, so a failure between the deletes can orphan the row without
//! its document, which reads tolerate.

pub mod album;
pub mod artist;
pub mod event;
pub mod manager;
pub mod song;

pub use album::AlbumService;
pub use artist::ArtistService;
pub use event::EventService;
pub use manager::ManagerService;
pub use song::SongService;

use crate::error::Result;
use core_store::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Decode a stored companion document into its typed form
pub(crate) fn decode_metadata<T: DeserializeOwned>(doc: JsonValue) -> Result<T> {
    serde_json::from_value(doc)
        .map_err(|e| StoreError::Document(format!("Stored metadata does not decode: {}", e)).into())
}

/// Encode a metadata document or patch for the document store
pub(crate) fn encode_metadata<T: Serialize>(value: &T) -> Result<JsonValue> {
    serde_json::to_value(value)
        .map_err(|e| StoreError::Document(format!("Metadata does not encode: {}", e)).into())
}
