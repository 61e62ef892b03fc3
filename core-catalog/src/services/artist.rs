//! Artist service: dual-store composition and mutation routing

use crate::error::{CatalogError, Result};
use crate::models::{
    Artist, ArtistMetadata, ArtistRecord, ArtistResponse, ArtistStats, ArtistUpdate, KeyDate,
    NewArtist,
};
use crate::repositories::ArtistRepository;
use crate::services::{decode_metadata, encode_metadata};
use core_store::{DocumentStore, Page, PageRequest};
use serde_json::json;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Document collection holding artist companions
const COLLECTION: &str = "artist_metadata";

/// Service for artist reads and mutations across both stores
pub struct ArtistService {
    artists: Arc<dyn ArtistRepository>,
    documents: Arc<dyn DocumentStore>,
}

impl ArtistService {
    pub fn new(artists: Arc<dyn ArtistRepository>, documents: Arc<dyn DocumentStore>) -> Self {
        Self { artists, documents }
    }

    /// Get one artist with relations and metadata composed
    ///
    /// # Errors
    /// Returns `NotFound` if no artist has this id.
    pub async fn get(&self, id: i64) -> Result<ArtistResponse> {
        let record = self
            .artists
            .find_record(id)
            .await?
            .ok_or(CatalogError::NotFound {
                entity: "Artist",
                id,
            })?;

        self.compose(record).await
    }

    /// List artists with metadata composed, one batched document lookup per
    /// page
    pub async fn list(&self, page_request: PageRequest) -> Result<Page<ArtistResponse>> {
        let page = self.artists.list(page_request).await?;
        self.compose_page(page).await
    }

    /// Search artists by name or biography substring
    pub async fn search(
        &self,
        query: &str,
        page_request: PageRequest,
    ) -> Result<Page<ArtistResponse>> {
        let page = self.artists.search(query, page_request).await?;
        self.compose_page(page).await
    }

    /// List artists in one genre
    pub async fn find_by_genre(
        &self,
        genre_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<ArtistResponse>> {
        let page = self.artists.find_by_genre(genre_id, page_request).await?;
        self.compose_page(page).await
    }

    /// List artists from one country
    pub async fn find_by_country(
        &self,
        country_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<ArtistResponse>> {
        let page = self.artists.find_by_country(country_id, page_request).await?;
        self.compose_page(page).await
    }

    /// Create an artist, writing a companion document only when the payload
    /// supplied metadata fields
    ///
    /// # Errors
    /// Returns `Conflict` if an artist with the same name already exists.
    pub async fn create(&self, new: NewArtist) -> Result<ArtistResponse> {
        if self.artists.find_by_name(&new.name).await?.is_some() {
            return Err(CatalogError::Conflict(format!(
                "Artist '{}' already exists",
                new.name
            )));
        }

        let id = self.artists.insert(&new).await?;

        // An explicitly supplied empty array still counts as metadata.
        if !new.metadata.is_empty() {
            let document = new.metadata.into_document();
            self.documents
                .put(COLLECTION, id, encode_metadata(&document)?)
                .await?;
        }

        info!(artist_id = id, "Created artist");
        self.get(id).await
    }

    /// Apply a partial update, routing core fields to the relational row and
    /// metadata fields to a document merge; returns the re-read entity
    pub async fn update(&self, id: i64, update: ArtistUpdate) -> Result<ArtistResponse> {
        let current = self.load(id).await?;

        if let Some(name) = &update.name {
            if name != &current.name {
                if let Some(other) = self.artists.find_by_name(name).await? {
                    if other.id != id {
                        return Err(CatalogError::Conflict(format!(
                            "Artist '{}' already exists",
                            name
                        )));
                    }
                }
            }
        }

        if update.has_core_changes() {
            self.artists.apply_update(id, &update).await?;
        }

        if !update.metadata.is_empty() {
            self.documents
                .upsert_merge(COLLECTION, id, encode_metadata(&update.metadata)?)
                .await?;
        }

        debug!(artist_id = id, "Updated artist");
        self.get(id).await
    }

    /// Remove an artist and its companion document
    pub async fn remove(&self, id: i64) -> Result<()> {
        self.load(id).await?;

        // Document first; the row is the side other entities reference.
        self.documents.delete(COLLECTION, id).await?;
        self.artists.delete(id).await?;

        info!(artist_id = id, "Removed artist");
        Ok(())
    }

    /// Overwrite the stats section of the artist's metadata document
    pub async fn update_stats(&self, id: i64, stats: ArtistStats) -> Result<ArtistMetadata> {
        self.load(id).await?;

        let stored = self
            .documents
            .upsert_merge(COLLECTION, id, json!({ "stats": encode_metadata(&stats)? }))
            .await?;

        decode_metadata(stored)
    }

    /// Append one milestone to the artist's key date list
    pub async fn add_key_date(&self, id: i64, key_date: KeyDate) -> Result<ArtistMetadata> {
        self.load(id).await?;

        let mut metadata: ArtistMetadata = match self.documents.find(COLLECTION, id).await? {
            Some(doc) => decode_metadata(doc)?,
            None => ArtistMetadata::default(),
        };
        metadata.key_dates.push(key_date);

        let stored = self
            .documents
            .upsert_merge(
                COLLECTION,
                id,
                json!({ "key_dates": encode_metadata(&metadata.key_dates)? }),
            )
            .await?;

        decode_metadata(stored)
    }

    async fn load(&self, id: i64) -> Result<Artist> {
        self.artists
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound {
                entity: "Artist",
                id,
            })
    }

    async fn compose(&self, record: ArtistRecord) -> Result<ArtistResponse> {
        let metadata = self
            .documents
            .find(COLLECTION, record.artist.id)
            .await?
            .map(decode_metadata)
            .transpose()?;

        Ok(ArtistResponse { record, metadata })
    }

    async fn compose_page(&self, page: Page<ArtistRecord>) -> Result<Page<ArtistResponse>> {
        let ids: Vec<i64> = page.items.iter().map(|r| r.artist.id).collect();
        let mut docs: HashMap<i64, JsonValue> = self.documents.find_many(COLLECTION, &ids).await?;

        let Page {
            items,
            total,
            page,
            total_pages,
            page_size,
        } = page;

        let items = items
            .into_iter()
            .map(|record| {
                let metadata = docs
                    .remove(&record.artist.id)
                    .map(decode_metadata)
                    .transpose()?;
                Ok(ArtistResponse { record, metadata })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Page {
            items,
            total,
            page,
            total_pages,
            page_size,
        })
    }
}
