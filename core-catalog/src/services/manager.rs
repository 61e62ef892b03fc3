//! Manager service: dual-store composition and mutation routing

use crate::error::{CatalogError, Result};
use crate::models::{
    Manager, ManagerMetadata, ManagerRecord, ManagerResponse, ManagerUpdate, NewManager,
};
use crate::repositories::ManagerRepository;
use crate::services::{decode_metadata, encode_metadata};
use core_store::{DocumentStore, Page, PageRequest};
use futures::future;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

const COLLECTION: &str = "manager_metadata";

/// Service for manager reads and mutations across both stores
pub struct ManagerService {
    managers: Arc<dyn ManagerRepository>,
    documents: Arc<dyn DocumentStore>,
}

impl ManagerService {
    pub fn new(managers: Arc<dyn ManagerRepository>, documents: Arc<dyn DocumentStore>) -> Self {
        Self { managers, documents }
    }

    /// Get one manager with relations and metadata composed
    pub async fn get(&self, id: i64) -> Result<ManagerResponse> {
        let record = self
            .managers
            .find_record(id)
            .await?
            .ok_or(CatalogError::NotFound {
                entity: "Manager",
                id,
            })?;

        self.compose(record).await
    }

    /// List managers with metadata composed
    pub async fn list(&self, page_request: PageRequest) -> Result<Page<ManagerResponse>> {
        let page = self.managers.list(page_request).await?;
        self.compose_page(page).await
    }

    /// Search managers by stage name substring
    pub async fn search(
        &self,
        query: &str,
        page_request: PageRequest,
    ) -> Result<Page<ManagerResponse>> {
        let page = self.managers.search(query, page_request).await?;
        self.compose_page(page).await
    }

    /// Find managers whose metadata lists a genre, service, or language
    /// matching the term (case-insensitive)
    ///
    /// Specialties live only on the document side, so this filters the
    /// collection's documents and resolves the matches back to records.
    pub async fn find_by_specialty(&self, term: &str) -> Result<Vec<ManagerResponse>> {
        let term = term.to_lowercase();
        let docs = self.documents.find_all(COLLECTION).await?;

        let mut matching = Vec::new();
        for (id, doc) in docs {
            let metadata: ManagerMetadata = decode_metadata(doc)?;
            let specialties = &metadata.specialties;
            let matches = specialties
                .music_genres
                .iter()
                .chain(&specialties.services_offered)
                .chain(&specialties.languages)
                .any(|s| s.to_lowercase().contains(&term));

            if matches {
                matching.push((id, metadata));
            }
        }

        let records = future::try_join_all(
            matching.iter().map(|(id, _)| self.managers.find_record(*id)),
        )
        .await?;

        // A document may outlive its row; skip orphans.
        let mut responses: Vec<ManagerResponse> = matching
            .into_iter()
            .zip(records)
            .filter_map(|((_, metadata), record)| {
                record.map(|record| ManagerResponse {
                    record,
                    metadata: Some(metadata),
                })
            })
            .collect();

        responses.sort_by(|a, b| a.record.manager.stage_name.cmp(&b.record.manager.stage_name));
        Ok(responses)
    }

    /// Create a manager, writing a companion document only when the payload
    /// supplied metadata fields
    ///
    /// # Errors
    /// Returns `Conflict` if a manager with the same stage name exists.
    pub async fn create(&self, new: NewManager) -> Result<ManagerResponse> {
        if self
            .managers
            .find_by_stage_name(&new.stage_name)
            .await?
            .is_some()
        {
            return Err(CatalogError::Conflict(format!(
                "Manager '{}' already exists",
                new.stage_name
            )));
        }

        let id = self.managers.insert(&new).await?;

        if !new.metadata.is_empty() {
            let document = new.metadata.into_document();
            self.documents
                .put(COLLECTION, id, encode_metadata(&document)?)
                .await?;
        }

        info!(manager_id = id, "Created manager");
        self.get(id).await
    }

    /// Apply a partial update across both stores; returns the re-read entity
    pub async fn update(&self, id: i64, update: ManagerUpdate) -> Result<ManagerResponse> {
        let current = self.load(id).await?;

        if let Some(stage_name) = &update.stage_name {
            if stage_name != &current.stage_name {
                if let Some(other) = self.managers.find_by_stage_name(stage_name).await? {
                    if other.id != id {
                        return Err(CatalogError::Conflict(format!(
                            "Manager '{}' already exists",
                            stage_name
                        )));
                    }
                }
            }
        }

        if update.has_core_changes() {
            self.managers.apply_update(id, &update).await?;
        }

        if !update.metadata.is_empty() {
            self.documents
                .upsert_merge(COLLECTION, id, encode_metadata(&update.metadata)?)
                .await?;
        }

        debug!(manager_id = id, "Updated manager");
        self.get(id).await
    }

    /// Remove a manager and its companion document
    pub async fn remove(&self, id: i64) -> Result<()> {
        self.load(id).await?;

        self.documents.delete(COLLECTION, id).await?;
        self.managers.delete(id).await?;

        info!(manager_id = id, "Removed manager");
        Ok(())
    }

    async fn load(&self, id: i64) -> Result<Manager> {
        self.managers
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound {
                entity: "Manager",
                id,
            })
    }

    async fn compose(&self, record: ManagerRecord) -> Result<ManagerResponse> {
        let metadata = self
            .documents
            .find(COLLECTION, record.manager.id)
            .await?
            .map(decode_metadata)
            .transpose()?;

        Ok(ManagerResponse { record, metadata })
    }

    async fn compose_page(&self, page: Page<ManagerRecord>) -> Result<Page<ManagerResponse>> {
        let ids: Vec<i64> = page.items.iter().map(|r| r.manager.id).collect();
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
                    .remove(&record.manager.id)
                    .map(decode_metadata)
                    .transpose()?;
                Ok(ManagerResponse { record, metadata })
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ManagerMetadataPatch, Specialties};
    use crate::repositories::SqliteManagerRepository;
    use core_store::{create_test_pool, SqliteDocumentStore};

    async fn setup_service() -> ManagerService {
        let pool = create_test_pool().await.unwrap();
        ManagerService::new(
            Arc::new(SqliteManagerRepository::new(pool.clone())),
            Arc::new(SqliteDocumentStore::new(pool)),
        )
    }

    fn new_manager(stage_name: &str) -> NewManager {
        NewManager {
            stage_name: stage_name.to_string(),
            ..Default::default()
        }
    }

    fn with_specialties(stage_name: &str, genres: &[&str]) -> NewManager {
        let mut new = new_manager(stage_name);
        new.metadata = ManagerMetadataPatch {
            specialties: Some(Specialties {
                music_genres: genres.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            }),
            ..Default::default()
        };
        new
    }

    #[tokio::test]
    async fn test_create_and_compose() {
        let service = setup_service().await;

        let mut new = new_manager("Gestora Uno");
        new.metadata = ManagerMetadataPatch {
            experience: Some("10 años en giras".to_string()),
            ..Default::default()
        };

        let created = service.create(new).await.unwrap();
        let metadata = created.metadata.unwrap();
        assert_eq!(metadata.experience, "10 años en giras");
        assert!(metadata.certifications.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_stage_name_conflicts() {
        let service = setup_service().await;

        service.create(new_manager("Repetida")).await.unwrap();
        let result = service.create(new_manager("Repetida")).await;
        assert!(matches!(result, Err(CatalogError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_find_by_specialty() {
        let service = setup_service().await;

        service
            .create(with_specialties("Zaira", &["Cumbia", "Vallenato"]))
            .await
            .unwrap();
        service
            .create(with_specialties("Andrés", &["Rock"]))
            .await
            .unwrap();
        service.create(new_manager("Sin Perfil")).await.unwrap();

        let found = service.find_by_specialty("cumbia").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].record.manager.stage_name, "Zaira");

        let none = service.find_by_specialty("jazz").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_metadata_merge_on_update() {
        let service = setup_service().await;

        let created = service
            .create(with_specialties("Mutable", &["Pop"]))
            .await
            .unwrap();
        let id = created.record.manager.id;

        let update = ManagerUpdate {
            metadata: ManagerMetadataPatch {
                extra_notes: Some("Disponible fines de semana".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let updated = service.update(id, update).await.unwrap();

        let metadata = updated.metadata.unwrap();
        assert_eq!(metadata.extra_notes, "Disponible fines de semana");
        assert_eq!(metadata.specialties.music_genres, vec!["Pop".to_string()]);
    }

    #[tokio::test]
    async fn test_remove_deletes_both_sides() {
        let service = setup_service().await;

        let created = service
            .create(with_specialties("Saliente", &["Indie"]))
            .await
            .unwrap();
        let id = created.record.manager.id;

        service.remove(id).await.unwrap();
        assert!(matches!(
            service.get(id).await,
            Err(CatalogError::NotFound { .. })
        ));
        assert!(service.find_by_specialty("indie").await.unwrap().is_empty());
    }
}
