//! Song repository trait and implementation

use crate::error::{CatalogError, Result};
use crate::models::{NewSong, Song, SongUpdate};
use async_trait::async_trait;
use core_store::{Page, PageRequest};
use sqlx::{query, query_as, QueryBuilder, SqlitePool};

/// Song repository interface for data access operations
#[async_trait]
pub trait SongRepository: Send + Sync {
    /// Find a song by its ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Song>>;

    /// Insert a new song row and return the generated id
    async fn insert(&self, new: &NewSong) -> Result<i64>;

    /// Apply a partial update to an existing song
    ///
    /// # Errors
    /// Returns `NotFound` if the song does not exist.
    async fn apply_update(&self, id: i64, update: &SongUpdate) -> Result<()>;

    /// Delete a song by ID
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Query songs with pagination
    async fn list(&self, page_request: PageRequest) -> Result<Page<Song>>;

    /// Find song by exact title
    async fn find_by_title(&self, title: &str) -> Result<Option<Song>>;

    /// Query songs on one album
    async fn find_by_album(&self, album_id: i64) -> Result<Vec<Song>>;

    /// Query songs by one artist
    async fn find_by_artist(&self, artist_id: i64, page_request: PageRequest)
        -> Result<Page<Song>>;

    /// Count total songs
    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of SongRepository
pub struct SqliteSongRepository {
    pool: SqlitePool,
}

impl SqliteSongRepository {
    /// Create a new SqliteSongRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SongRepository for SqliteSongRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Song>> {
        let song = query_as::<_, Song>("SELECT * FROM songs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(song)
    }

    async fn insert(&self, new: &NewSong) -> Result<i64> {
        if new.title.trim().is_empty() {
            return Err(CatalogError::InvalidInput {
                field: "title".to_string(),
                message: "Song title cannot be empty".to_string(),
            });
        }
        if new.duration_secs < 0 {
            return Err(CatalogError::InvalidInput {
                field: "duration_secs".to_string(),
                message: "Song duration cannot be negative".to_string(),
            });
        }

        let now = chrono::Utc::now().timestamp();
        let result = query(
            r#"
            INSERT INTO songs (
                title, album_id, artist_id, duration_secs, year, genre_id,
                status_id, cover_url, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.title)
        .bind(new.album_id)
        .bind(new.artist_id)
        .bind(new.duration_secs)
        .bind(new.year)
        .bind(new.genre_id)
        .bind(new.status_id)
        .bind(new.cover_url.as_deref().unwrap_or_default())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn apply_update(&self, id: i64, update: &SongUpdate) -> Result<()> {
        if let Some(title) = &update.title {
            if title.trim().is_empty() {
                return Err(CatalogError::InvalidInput {
                    field: "title".to_string(),
                    message: "Song title cannot be empty".to_string(),
                });
            }
        }

        let mut builder = QueryBuilder::new("UPDATE songs SET updated_at = ");
        builder.push_bind(chrono::Utc::now().timestamp());

        if let Some(title) = &update.title {
            builder.push(", title = ").push_bind(title);
        }
        if let Some(value) = update.album_id.as_resolved() {
            builder.push(", album_id = ").push_bind(value.copied());
        }
        if let Some(value) = update.artist_id.as_resolved() {
            builder.push(", artist_id = ").push_bind(value.copied());
        }
        if let Some(duration_secs) = update.duration_secs {
            builder.push(", duration_secs = ").push_bind(duration_secs);
        }
        if let Some(year) = update.year {
            builder.push(", year = ").push_bind(year);
        }
        if let Some(value) = update.genre_id.as_resolved() {
            builder.push(", genre_id = ").push_bind(value.copied());
        }
        if let Some(value) = update.status_id.as_resolved() {
            builder.push(", status_id = ").push_bind(value.copied());
        }
        if let Some(cover_url) = &update.cover_url {
            builder.push(", cover_url = ").push_bind(cover_url);
        }

        builder.push(" WHERE id = ").push_bind(id);
        let result = builder.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound { entity: "Song", id });
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = query("DELETE FROM songs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, page_request: PageRequest) -> Result<Page<Song>> {
        let total = self.count().await?;

        let songs = query_as::<_, Song>("SELECT * FROM songs ORDER BY title ASC LIMIT ? OFFSET ?")
            .bind(page_request.limit())
            .bind(page_request.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(songs, total as u64, page_request))
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Song>> {
        let song = query_as::<_, Song>("SELECT * FROM songs WHERE title = ? LIMIT 1")
            .bind(title)
            .fetch_optional(&self.pool)
            .await?;

        Ok(song)
    }

    async fn find_by_album(&self, album_id: i64) -> Result<Vec<Song>> {
        let songs = query_as::<_, Song>("SELECT * FROM songs WHERE album_id = ? ORDER BY id ASC")
            .bind(album_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(songs)
    }

    async fn find_by_artist(
        &self,
        artist_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<Song>> {
        let total: i64 = query_as("SELECT COUNT(*) as count FROM songs WHERE artist_id = ?")
            .bind(artist_id)
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        let songs = query_as::<_, Song>(
            "SELECT * FROM songs WHERE artist_id = ? ORDER BY title ASC LIMIT ? OFFSET ?",
        )
        .bind(artist_id)
        .bind(page_request.limit())
        .bind(page_request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(songs, total as u64, page_request))
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = query_as("SELECT COUNT(*) as count FROM songs")
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewAlbum;
    use crate::repositories::album::{AlbumRepository, SqliteAlbumRepository};
    use core_store::create_test_pool;

    async fn setup_test_pool() -> SqlitePool {
        create_test_pool().await.unwrap()
    }

    fn new_song(title: &str) -> NewSong {
        NewSong {
            title: title.to_string(),
            duration_secs: 180,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_song() {
        let pool = setup_test_pool().await;
        let repo = SqliteSongRepository::new(pool);

        let id = repo.insert(&new_song("Intro")).await.unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.title, "Intro");
        assert_eq!(found.duration_secs, 180);
    }

    #[tokio::test]
    async fn test_find_by_album() {
        let pool = setup_test_pool().await;
        let albums = SqliteAlbumRepository::new(pool.clone());
        let repo = SqliteSongRepository::new(pool);

        let album_id = albums
            .insert(&NewAlbum {
                title: "Conceptual".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        for title in ["Lado A", "Lado B"] {
            let mut new = new_song(title);
            new.album_id = Some(album_id);
            repo.insert(&new).await.unwrap();
        }
        repo.insert(&new_song("Suelto")).await.unwrap();

        let songs = repo.find_by_album(album_id).await.unwrap();
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].title, "Lado A");
    }

    #[tokio::test]
    async fn test_insert_rejects_negative_duration() {
        let pool = setup_test_pool().await;
        let repo = SqliteSongRepository::new(pool);

        let mut new = new_song("Inválida");
        new.duration_secs = -1;
        let result = repo.insert(&new).await;
        assert!(matches!(result, Err(CatalogError::InvalidInput { .. })));
    }

    #[tokio::test]
    async fn test_partial_update_and_delete() {
        let pool = setup_test_pool().await;
        let repo = SqliteSongRepository::new(pool);

        let id = repo.insert(&new_song("Demo")).await.unwrap();

        let update = SongUpdate {
            duration_secs: Some(240),
            ..Default::default()
        };
        repo.apply_update(id, &update).await.unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.duration_secs, 240);
        assert_eq!(found.title, "Demo");

        assert!(repo.delete(id).await.unwrap());
    }
}
