//! Album service: relational CRUD with title uniqueness

use crate::error::{CatalogError, Result};
use crate::models::{Album, AlbumUpdate, NewAlbum};
use crate::repositories::AlbumRepository;
use core_store::{Page, PageRequest};
use std::sync::Arc;
use tracing::info;

/// Service for album reads and mutations
pub struct AlbumService {
    albums: Arc<dyn AlbumRepository>,
}

impl AlbumService {
    pub fn new(albums: Arc<dyn AlbumRepository>) -> Self {
        Self { albums }
    }

    pub async fn get(&self, id: i64) -> Result<Album> {
        self.albums
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound { entity: "Album", id })
    }

    pub async fn list(&self, page_request: PageRequest) -> Result<Page<Album>> {
        self.albums.list(page_request).await
    }

    pub async fn find_by_artist(&self, artist_id: i64) -> Result<Vec<Album>> {
        self.albums.find_by_artist(artist_id).await
    }

    /// Create an album
    ///
    /// # Errors
    /// Returns `Conflict` if an album with the same title already exists.
    pub async fn create(&self, new: NewAlbum) -> Result<Album> {
        if self.albums.find_by_title(&new.title).await?.is_some() {
            return Err(CatalogError::Conflict(format!(
                "Album '{}' already exists",
                new.title
            )));
        }

        let id = self.albums.insert(&new).await?;
        info!(album_id = id, "Created album");
        self.get(id).await
    }

    /// Apply a partial update; returns the re-read album
    pub async fn update(&self, id: i64, update: AlbumUpdate) -> Result<Album> {
        let current = self.get(id).await?;

        if let Some(title) = &update.title {
            if title != &current.title {
                if let Some(other) = self.albums.find_by_title(title).await? {
                    if other.id != id {
                        return Err(CatalogError::Conflict(format!(
                            "Album '{}' already exists",
                            title
                        )));
                    }
                }
            }
        }

        if update.has_changes() {
            self.albums.apply_update(id, &update).await?;
        }

        self.get(id).await
    }

    pub async fn remove(&self, id: i64) -> Result<()> {
        self.get(id).await?;
        self.albums.delete(id).await?;
        info!(album_id = id, "Removed album");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::SqliteAlbumRepository;
    use core_store::create_test_pool;

    async fn setup_service() -> AlbumService {
        let pool = create_test_pool().await.unwrap();
        AlbumService::new(Arc::new(SqliteAlbumRepository::new(pool)))
    }

    fn new_album(title: &str) -> NewAlbum {
        NewAlbum {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_get_and_remove() {
        let service = setup_service().await;

        let created = service.create(new_album("Raíces")).await.unwrap();
        assert_eq!(created.title, "Raíces");

        service.remove(created.id).await.unwrap();
        assert!(matches!(
            service.get(created.id).await,
            Err(CatalogError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_title_conflicts() {
        let service = setup_service().await;

        service.create(new_album("Igual")).await.unwrap();
        let result = service.create(new_album("Igual")).await;
        assert!(matches!(result, Err(CatalogError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_rename_conflict_excludes_self() {
        let service = setup_service().await;

        let a = service.create(new_album("Primero")).await.unwrap();
        service.create(new_album("Segundo")).await.unwrap();

        let same = AlbumUpdate {
            title: Some("Primero".to_string()),
            ..Default::default()
        };
        service.update(a.id, same).await.unwrap();

        let taken = AlbumUpdate {
            title: Some("Segundo".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.update(a.id, taken).await,
            Err(CatalogError::Conflict(_))
        ));
    }
}
