//! Album repository trait and implementation

use crate::error::{CatalogError, Result};
use crate::models::{Album, AlbumUpdate, NewAlbum};
use async_trait::async_trait;
use core_store::{Page, PageRequest};
use sqlx::{query, query_as, QueryBuilder, SqlitePool};

/// Album repository interface for data access operations
#[async_trait]
pub trait AlbumRepository: Send + Sync {
    /// Find an album by its ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Album>>;

    /// Insert a new album row and return the generated id
    async fn insert(&self, new: &NewAlbum) -> Result<i64>;

    /// Apply a partial update to an existing album
    ///
    /// # Errors
    /// Returns `NotFound` if the album does not exist.
    async fn apply_update(&self, id: i64, update: &AlbumUpdate) -> Result<()>;

    /// Delete an album by ID
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Query albums with pagination
    async fn list(&self, page_request: PageRequest) -> Result<Page<Album>>;

    /// Find album by exact title
    async fn find_by_title(&self, title: &str) -> Result<Option<Album>>;

    /// Query albums by one artist
    async fn find_by_artist(&self, artist_id: i64) -> Result<Vec<Album>>;

    /// Count total albums
    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of AlbumRepository
pub struct SqliteAlbumRepository {
    pool: SqlitePool,
}

impl SqliteAlbumRepository {
    /// Create a new SqliteAlbumRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlbumRepository for SqliteAlbumRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Album>> {
        let album = query_as::<_, Album>("SELECT * FROM albums WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(album)
    }

    async fn insert(&self, new: &NewAlbum) -> Result<i64> {
        if new.title.trim().is_empty() {
            return Err(CatalogError::InvalidInput {
                field: "title".to_string(),
                message: "Album title cannot be empty".to_string(),
            });
        }

        let now = chrono::Utc::now().timestamp();
        let result = query(
            r#"
            INSERT INTO albums (
                title, artist_id, year, genre_id, status_id, cover_url,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.title)
        .bind(new.artist_id)
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

    async fn apply_update(&self, id: i64, update: &AlbumUpdate) -> Result<()> {
        if let Some(title) = &update.title {
            if title.trim().is_empty() {
                return Err(CatalogError::InvalidInput {
                    field: "title".to_string(),
                    message: "Album title cannot be empty".to_string(),
                });
            }
        }

        let mut builder = QueryBuilder::new("UPDATE albums SET updated_at = ");
        builder.push_bind(chrono::Utc::now().timestamp());

        if let Some(title) = &update.title {
            builder.push(", title = ").push_bind(title);
        }
        if let Some(value) = update.artist_id.as_resolved() {
            builder.push(", artist_id = ").push_bind(value.copied());
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
            return Err(CatalogError::NotFound { entity: "Album", id });
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = query("DELETE FROM albums WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, page_request: PageRequest) -> Result<Page<Album>> {
        let total = self.count().await?;

        let albums =
            query_as::<_, Album>("SELECT * FROM albums ORDER BY title ASC LIMIT ? OFFSET ?")
                .bind(page_request.limit())
                .bind(page_request.offset())
                .fetch_all(&self.pool)
                .await?;

        Ok(Page::new(albums, total as u64, page_request))
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Album>> {
        let album = query_as::<_, Album>("SELECT * FROM albums WHERE title = ? LIMIT 1")
            .bind(title)
            .fetch_optional(&self.pool)
            .await?;

        Ok(album)
    }

    async fn find_by_artist(&self, artist_id: i64) -> Result<Vec<Album>> {
        let albums =
            query_as::<_, Album>("SELECT * FROM albums WHERE artist_id = ? ORDER BY year ASC")
                .bind(artist_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(albums)
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = query_as("SELECT COUNT(*) as count FROM albums")
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewArtist;
    use crate::repositories::artist::{ArtistRepository, SqliteArtistRepository};
    use core_store::create_test_pool;

    async fn setup_test_pool() -> SqlitePool {
        create_test_pool().await.unwrap()
    }

    fn new_album(title: &str) -> NewAlbum {
        NewAlbum {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_album() {
        let pool = setup_test_pool().await;
        let repo = SqliteAlbumRepository::new(pool);

        let mut new = new_album("Primer Disco");
        new.year = Some(2024);
        let id = repo.insert(&new).await.unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.title, "Primer Disco");
        assert_eq!(found.year, Some(2024));
    }

    #[tokio::test]
    async fn test_find_by_artist_ordered_by_year() {
        let pool = setup_test_pool().await;
        let artists = SqliteArtistRepository::new(pool.clone());
        let repo = SqliteAlbumRepository::new(pool);

        let artist_id = artists
            .insert(&NewArtist {
                name: "Prolífico".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        for (title, year) in [("Segundo", 2022), ("Primero", 2019)] {
            let mut new = new_album(title);
            new.artist_id = Some(artist_id);
            new.year = Some(year);
            repo.insert(&new).await.unwrap();
        }

        let albums = repo.find_by_artist(artist_id).await.unwrap();
        assert_eq!(albums.len(), 2);
        assert_eq!(albums[0].title, "Primero");
    }

    #[tokio::test]
    async fn test_partial_update() {
        let pool = setup_test_pool().await;
        let repo = SqliteAlbumRepository::new(pool);

        let id = repo.insert(&new_album("Borrador")).await.unwrap();

        let update = AlbumUpdate {
            title: Some("Final".to_string()),
            year: Some(2025),
            ..Default::default()
        };
        repo.apply_update(id, &update).await.unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.title, "Final");
        assert_eq!(found.year, Some(2025));
    }

    #[tokio::test]
    async fn test_delete_album() {
        let pool = setup_test_pool().await;
        let repo = SqliteAlbumRepository::new(pool);

        let id = repo.insert(&new_album("Descartado")).await.unwrap();
        assert!(repo.delete(id).await.unwrap());
        assert!(repo.find_by_id(id).await.unwrap().is_none());
    }
}
