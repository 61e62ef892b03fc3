//! Event service: dual-store composition and mutation routing

use crate::error::{CatalogError, Result};
use crate::models::{Event, EventRecord, EventResponse, EventUpdate, NewEvent};
use crate::repositories::EventRepository;
use crate::services::{decode_metadata, encode_metadata};
use chrono::NaiveDate;
use core_store::{DocumentStore, Page, PageRequest};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

const COLLECTION: &str = "event_metadata";

/// Service for event reads and mutations across both stores
pub struct EventService {
    events: Arc<dyn EventRepository>,
    documents: Arc<dyn DocumentStore>,
}

impl EventService {
    pub fn new(events: Arc<dyn EventRepository>, documents: Arc<dyn DocumentStore>) -> Self {
        Self { events, documents }
    }

    /// Get one event with relations and metadata composed
    pub async fn get(&self, id: i64) -> Result<EventResponse> {
        let record = self
            .events
            .find_record(id)
            .await?
            .ok_or(CatalogError::NotFound { entity: "Event", id })?;

        self.compose(record).await
    }

    /// List events soonest first, metadata composed
    pub async fn list(&self, page_request: PageRequest) -> Result<Page<EventResponse>> {
        let page = self.events.list(page_request).await?;
        self.compose_page(page).await
    }

    /// List events on or after a calendar date
    pub async fn find_upcoming(
        &self,
        from: NaiveDate,
        page_request: PageRequest,
    ) -> Result<Page<EventResponse>> {
        let page = self.events.find_upcoming(from, page_request).await?;
        self.compose_page(page).await
    }

    /// List events headlined by one artist
    pub async fn find_by_artist(
        &self,
        artist_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<EventResponse>> {
        let page = self.events.find_by_artist(artist_id, page_request).await?;
        self.compose_page(page).await
    }

    /// Search events by name or venue substring
    pub async fn search(
        &self,
        query: &str,
        page_request: PageRequest,
    ) -> Result<Page<EventResponse>> {
        let page = self.events.search(query, page_request).await?;
        self.compose_page(page).await
    }

    /// Create an event, writing a companion document only when the payload
    /// supplied metadata fields
    ///
    /// # Errors
    /// Returns `Conflict` if an event with the same name already exists.
    pub async fn create(&self, new: NewEvent) -> Result<EventResponse> {
        if self.events.find_by_name(&new.name).await?.is_some() {
            return Err(CatalogError::Conflict(format!(
                "Event '{}' already exists",
                new.name
            )));
        }

        let id = self.events.insert(&new).await?;

        if !new.metadata.is_empty() {
            let document = new.metadata.into_document();
            self.documents
                .put(COLLECTION, id, encode_metadata(&document)?)
                .await?;
        }

        info!(event_id = id, "Created event");
        self.get(id).await
    }

    /// Apply a partial update across both stores; returns the re-read entity
    pub async fn update(&self, id: i64, update: EventUpdate) -> Result<EventResponse> {
        let current = self.load(id).await?;

        if let Some(name) = &update.name {
            if name != &current.name {
                if let Some(other) = self.events.find_by_name(name).await? {
                    if other.id != id {
                        return Err(CatalogError::Conflict(format!(
                            "Event '{}' already exists",
                            name
                        )));
                    }
                }
            }
        }

        if update.has_core_changes() {
            self.events.apply_update(id, &update).await?;
        }

        if !update.metadata.is_empty() {
            self.documents
                .upsert_merge(COLLECTION, id, encode_metadata(&update.metadata)?)
                .await?;
        }

        debug!(event_id = id, "Updated event");
        self.get(id).await
    }

    /// Remove an event and its companion document
    pub async fn remove(&self, id: i64) -> Result<()> {
        self.load(id).await?;

        self.documents.delete(COLLECTION, id).await?;
        self.events.delete(id).await?;

        info!(event_id = id, "Removed event");
        Ok(())
    }

    async fn load(&self, id: i64) -> Result<Event> {
        self.events
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound { entity: "Event", id })
    }

    async fn compose(&self, record: EventRecord) -> Result<EventResponse> {
        let metadata = self
            .documents
            .find(COLLECTION, record.event.id)
            .await?
            .map(decode_metadata)
            .transpose()?;

        Ok(EventResponse { record, metadata })
    }

    async fn compose_page(&self, page: Page<EventRecord>) -> Result<Page<EventResponse>> {
        let ids: Vec<i64> = page.items.iter().map(|r| r.event.id).collect();
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
                    .remove(&record.event.id)
                    .map(decode_metadata)
                    .transpose()?;
                Ok(EventResponse { record, metadata })
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
