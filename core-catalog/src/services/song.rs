//! Song service: relational CRUD with title uniqueness

use crate::error::{CatalogError, Result};
use crate::models::{NewSong, Song, SongUpdate};
use crate::repositories::SongRepository;
use core_store::{Page, PageRequest};
use std::sync::Arc;
use tracing::info;

/// Service for song reads and mutations
pub struct SongService {
    songs: Arc<dyn SongRepository>,
}

impl SongService {
    pub fn new(songs: Arc<dyn SongRepository>) -> Self {
        Self { songs }
    }

    pub async fn get(&self, id: i64) -> Result<Song> {
        self.songs
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound { entity: "Song", id })
    }

    pub async fn list(&self, page_request: PageRequest) -> Result<Page<Song>> {
        self.songs.list(page_request).await
    }

    pub async fn find_by_album(&self, album_id: i64) -> Result<Vec<Song>> {
        self.songs.find_by_album(album_id).await
    }

    pub async fn find_by_artist(
        &self,
        artist_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<Song>> {
        self.songs.find_by_artist(artist_id, page_request).await
    }

    /// Create a song
    ///
    /// # Errors
    /// Returns `Conflict` if a song with the same title already exists.
    pub async fn create(&self, new: NewSong) -> Result<Song> {
        if self.songs.find_by_title(&new.title).await?.is_some() {
            return Err(CatalogError::Conflict(format!(
                "Song '{}' already exists",
                new.title
            )));
        }

        let id = self.songs.insert(&new).await?;
        info!(song_id = id, "Created song");
        self.get(id).await
    }

    /// Apply a partial update; returns the re-read song
    pub async fn update(&self, id: i64, update: SongUpdate) -> Result<Song> {
        let current = self.get(id).await?;

        if let Some(title) = &update.title {
            if title != &current.title {
                if let Some(other) = self.songs.find_by_title(title).await? {
                    if other.id != id {
                        return Err(CatalogError::Conflict(format!(
                            "Song '{}' already exists",
                            title
                        )));
                    }
                }
            }
        }

        if update.has_changes() {
            self.songs.apply_update(id, &update).await?;
        }

        self.get(id).await
    }

    pub async fn remove(&self, id: i64) -> Result<()> {
        self.get(id).await?;
        self.songs.delete(id).await?;
        info!(song_id = id, "Removed song");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::SqliteSongRepository;
    use core_store::create_test_pool;

    async fn setup_service() -> SongService {
        let pool = create_test_pool().await.unwrap();
        SongService::new(Arc::new(SqliteSongRepository::new(pool)))
    }

    fn new_song(title: &str) -> NewSong {
        NewSong {
            title: title.to_string(),
            duration_secs: 200,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_update() {
        let service = setup_service().await;

        let created = service.create(new_song("Amanecer")).await.unwrap();

        let update = SongUpdate {
            duration_secs: Some(215),
            ..Default::default()
        };
        let updated = service.update(created.id, update).await.unwrap();
        assert_eq!(updated.duration_secs, 215);
        assert_eq!(updated.title, "Amanecer");
    }

    #[tokio::test]
    async fn test_duplicate_title_conflicts() {
        let service = setup_service().await;

        service.create(new_song("Eco")).await.unwrap();
        assert!(matches!(
            service.create(new_song("Eco")).await,
            Err(CatalogError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_missing_song() {
        let service = setup_service().await;
        assert!(matches!(
            service.remove(99).await,
            Err(CatalogError::NotFound { .. })
        ));
    }
}
