//! Artist repository trait and implementation

use crate::error::{CatalogError, Result};
use crate::models::{Artist, ArtistRecord, ArtistUpdate, NewArtist};
use crate::repositories::resolve_lookup;
use async_trait::async_trait;
use core_store::{Page, PageRequest};
use sqlx::sqlite::SqliteRow;
use sqlx::{query, query_as, FromRow, QueryBuilder, Row, SqlitePool};

const RECORD_SELECT: &str = r#"
    SELECT a.*, g.label AS genre_label, c.label AS country_label, s.label AS status_label
    FROM artists a
    LEFT JOIN genres g ON g.id = a.genre_id
    LEFT JOIN countries c ON c.id = a.country_id
    LEFT JOIN statuses s ON s.id = a.status_id
"#;

/// Artist repository interface for data access operations
#[async_trait]
pub trait ArtistRepository: Send + Sync {
    /// Find an artist row by its ID
    ///
    /// # Returns
    /// - `Ok(Some(artist))` if found
    /// - `Ok(None)` if not found
    /// - `Err` if database error occurs
    async fn find_by_id(&self, id: i64) -> Result<Option<Artist>>;

    /// Find an artist with its lookup relations resolved
    async fn find_record(&self, id: i64) -> Result<Option<ArtistRecord>>;

    /// Insert a new artist row and return the generated id
    ///
    /// # Errors
    /// Returns error if:
    /// - Artist validation fails
    /// - A referenced lookup id does not exist
    /// - Database error occurs
    async fn insert(&self, new: &NewArtist) -> Result<i64>;

    /// Apply a partial update to an existing artist row
    ///
    /// Only supplied fields are written; `Patch::Null` clears a relation.
    ///
    /// # Errors
    /// Returns `NotFound` if the artist does not exist.
    async fn apply_update(&self, id: i64, update: &ArtistUpdate) -> Result<()>;

    /// Delete an artist by ID
    ///
    /// # Returns
    /// - `Ok(true)` if the artist was deleted
    /// - `Ok(false)` if the artist was not found
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Query artists with pagination, relations resolved
    async fn list(&self, page_request: PageRequest) -> Result<Page<ArtistRecord>>;

    /// Find artist by exact name
    async fn find_by_name(&self, name: &str) -> Result<Option<Artist>>;

    /// Query artists in one genre
    async fn find_by_genre(
        &self,
        genre_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<ArtistRecord>>;

    /// Query artists from one country
    async fn find_by_country(
        &self,
        country_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<ArtistRecord>>;

    /// Search artists by name or biography substring
    async fn search(
        &self,
        search_query: &str,
        page_request: PageRequest,
    ) -> Result<Page<ArtistRecord>>;

    /// Count total artists
    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of ArtistRepository
pub struct SqliteArtistRepository {
    pool: SqlitePool,
}

impl SqliteArtistRepository {
    /// Create a new SqliteArtistRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_record(row: SqliteRow) -> std::result::Result<ArtistRecord, sqlx::Error> {
    let artist = Artist::from_row(&row)?;
    let genre = resolve_lookup(artist.genre_id, row.try_get("genre_label")?);
    let country = resolve_lookup(artist.country_id, row.try_get("country_label")?);
    let status = resolve_lookup(artist.status_id, row.try_get("status_label")?);

    Ok(ArtistRecord {
        artist,
        genre,
        country,
        status,
    })
}

#[async_trait]
impl ArtistRepository for SqliteArtistRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Artist>> {
        let artist = query_as::<_, Artist>("SELECT * FROM artists WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(artist)
    }

    async fn find_record(&self, id: i64) -> Result<Option<ArtistRecord>> {
        let sql = format!("{} WHERE a.id = ?", RECORD_SELECT);
        let row = query(&sql).bind(id).fetch_optional(&self.pool).await?;

        row.map(map_record).transpose().map_err(CatalogError::from)
    }

    async fn insert(&self, new: &NewArtist) -> Result<i64> {
        if new.name.trim().is_empty() {
            return Err(CatalogError::InvalidInput {
                field: "name".to_string(),
                message: "Artist name cannot be empty".to_string(),
            });
        }

        let now = chrono::Utc::now().timestamp();
        let result = query(
            r#"
            INSERT INTO artists (
                name, biography, photo_url, genre_id, country_id, status_id,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.name)
        .bind(&new.biography)
        .bind(new.photo_url.as_deref().unwrap_or_default())
        .bind(new.genre_id)
        .bind(new.country_id)
        .bind(new.status_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn apply_update(&self, id: i64, update: &ArtistUpdate) -> Result<()> {
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(CatalogError::InvalidInput {
                    field: "name".to_string(),
                    message: "Artist name cannot be empty".to_string(),
                });
            }
        }

        let mut builder = QueryBuilder::new("UPDATE artists SET updated_at = ");
        builder.push_bind(chrono::Utc::now().timestamp());

        if let Some(name) = &update.name {
            builder.push(", name = ").push_bind(name);
        }
        if let Some(biography) = &update.biography {
            builder.push(", biography = ").push_bind(biography);
        }
        if let Some(photo_url) = &update.photo_url {
            builder.push(", photo_url = ").push_bind(photo_url);
        }
        if let Some(value) = update.genre_id.as_resolved() {
            builder.push(", genre_id = ").push_bind(value.copied());
        }
        if let Some(value) = update.country_id.as_resolved() {
            builder.push(", country_id = ").push_bind(value.copied());
        }
        if let Some(value) = update.status_id.as_resolved() {
            builder.push(", status_id = ").push_bind(value.copied());
        }

        builder.push(" WHERE id = ").push_bind(id);
        let result = builder.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound {
                entity: "Artist",
                id,
            });
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = query("DELETE FROM artists WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, page_request: PageRequest) -> Result<Page<ArtistRecord>> {
        let total = self.count().await?;

        let sql = format!("{} ORDER BY a.name ASC LIMIT ? OFFSET ?", RECORD_SELECT);
        let rows = query(&sql)
            .bind(page_request.limit())
            .bind(page_request.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(map_record)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Page::new(items, total as u64, page_request))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Artist>> {
        let artist = query_as::<_, Artist>("SELECT * FROM artists WHERE name = ? LIMIT 1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(artist)
    }

    async fn find_by_genre(
        &self,
        genre_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<ArtistRecord>> {
        let total: i64 = query_as("SELECT COUNT(*) as count FROM artists WHERE genre_id = ?")
            .bind(genre_id)
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        let sql = format!(
            "{} WHERE a.genre_id = ? ORDER BY a.name ASC LIMIT ? OFFSET ?",
            RECORD_SELECT
        );
        let rows = query(&sql)
            .bind(genre_id)
            .bind(page_request.limit())
            .bind(page_request.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(map_record)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Page::new(items, total as u64, page_request))
    }

    async fn find_by_country(
        &self,
        country_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<ArtistRecord>> {
        let total: i64 = query_as("SELECT COUNT(*) as count FROM artists WHERE country_id = ?")
            .bind(country_id)
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        let sql = format!(
            "{} WHERE a.country_id = ? ORDER BY a.name ASC LIMIT ? OFFSET ?",
            RECORD_SELECT
        );
        let rows = query(&sql)
            .bind(country_id)
            .bind(page_request.limit())
            .bind(page_request.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(map_record)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Page::new(items, total as u64, page_request))
    }

    async fn search(
        &self,
        search_query: &str,
        page_request: PageRequest,
    ) -> Result<Page<ArtistRecord>> {
        let pattern = format!("%{}%", search_query);

        let total: i64 = query_as(
            "SELECT COUNT(*) as count FROM artists WHERE name LIKE ? OR biography LIKE ?",
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map(|row: (i64,)| row.0)?;

        let sql = format!(
            "{} WHERE a.name LIKE ? OR a.biography LIKE ? ORDER BY a.name ASC LIMIT ? OFFSET ?",
            RECORD_SELECT
        );
        let rows = query(&sql)
            .bind(&pattern)
            .bind(&pattern)
            .bind(page_request.limit())
            .bind(page_request.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(map_record)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Page::new(items, total as u64, page_request))
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = query_as("SELECT COUNT(*) as count FROM artists")
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::lookup::{LookupKind, LookupRepository, SqliteLookupRepository};
    use core_store::{create_test_pool, Patch};

    async fn setup_test_pool() -> SqlitePool {
        create_test_pool().await.unwrap()
    }

    fn new_artist(name: &str) -> NewArtist {
        NewArtist {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_artist() {
        let pool = setup_test_pool().await;
        let repo = SqliteArtistRepository::new(pool);

        let mut new = new_artist("Luna Negra");
        new.biography = "Post-punk trio from Bogotá".to_string();
        let id = repo.insert(&new).await.unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.name, "Luna Negra");
        assert_eq!(found.biography, "Post-punk trio from Bogotá");
        assert_eq!(found.photo_url, "");
    }

    #[tokio::test]
    async fn test_record_resolves_relations() {
        let pool = setup_test_pool().await;
        let lookups = SqliteLookupRepository::new(pool.clone());
        let repo = SqliteArtistRepository::new(pool);

        let genre_id = lookups.insert(LookupKind::Genre, "Salsa").await.unwrap();
        let country_id = lookups.insert(LookupKind::Country, "Cuba").await.unwrap();

        let mut new = new_artist("Orquesta Faro");
        new.genre_id = Some(genre_id);
        new.country_id = Some(country_id);
        let id = repo.insert(&new).await.unwrap();

        let record = repo.find_record(id).await.unwrap().unwrap();
        assert_eq!(record.genre.unwrap().label, "Salsa");
        assert_eq!(record.country.unwrap().label, "Cuba");
        assert!(record.status.is_none());
    }

    #[tokio::test]
    async fn test_partial_update_and_clear_relation() {
        let pool = setup_test_pool().await;
        let lookups = SqliteLookupRepository::new(pool.clone());
        let repo = SqliteArtistRepository::new(pool);

        let genre_id = lookups.insert(LookupKind::Genre, "Jazz").await.unwrap();
        let mut new = new_artist("Trio Sur");
        new.genre_id = Some(genre_id);
        new.biography = "Original bio".to_string();
        let id = repo.insert(&new).await.unwrap();

        let update = ArtistUpdate {
            biography: Some("Updated bio".to_string()),
            genre_id: Patch::Null,
            ..Default::default()
        };
        repo.apply_update(id, &update).await.unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        // Untouched fields keep their values, the nulled relation clears.
        assert_eq!(found.name, "Trio Sur");
        assert_eq!(found.biography, "Updated bio");
        assert_eq!(found.genre_id, None);
    }

    #[tokio::test]
    async fn test_update_missing_artist() {
        let pool = setup_test_pool().await;
        let repo = SqliteArtistRepository::new(pool);

        let update = ArtistUpdate {
            name: Some("Ghost".to_string()),
            ..Default::default()
        };
        let result = repo.apply_update(404, &update).await;
        assert!(matches!(result, Err(CatalogError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_insert_rejects_unknown_relation() {
        let pool = setup_test_pool().await;
        let repo = SqliteArtistRepository::new(pool);

        let mut new = new_artist("Dangling");
        new.genre_id = Some(999);
        // No existence pre-check; the foreign key constraint reports it.
        let result = repo.insert(&new).await;
        assert!(matches!(result, Err(CatalogError::Database(_))));
    }

    #[tokio::test]
    async fn test_delete_artist() {
        let pool = setup_test_pool().await;
        let repo = SqliteArtistRepository::new(pool);

        let id = repo.insert(&new_artist("Temporal")).await.unwrap();
        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());
        assert!(repo.find_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_with_pagination() {
        let pool = setup_test_pool().await;
        let repo = SqliteArtistRepository::new(pool);

        for i in 1..=5 {
            repo.insert(&new_artist(&format!("Artist {}", i))).await.unwrap();
        }

        let page = repo
            .list(PageRequest {
                page: 1,
                page_size: 3,
            })
            .await
            .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn test_search_matches_name_and_biography() {
        let pool = setup_test_pool().await;
        let repo = SqliteArtistRepository::new(pool);

        let mut a = new_artist("Río Bravo");
        a.biography = "Folk fusion".to_string();
        repo.insert(&a).await.unwrap();

        let mut b = new_artist("Otra Banda");
        b.biography = "Electronic folk collective".to_string();
        repo.insert(&b).await.unwrap();

        repo.insert(&new_artist("Sin Relación")).await.unwrap();

        let page = repo.search("folk", PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_find_by_genre() {
        let pool = setup_test_pool().await;
        let lookups = SqliteLookupRepository::new(pool.clone());
        let repo = SqliteArtistRepository::new(pool);

        let rock = lookups.insert(LookupKind::Genre, "Rock").await.unwrap();
        let pop = lookups.insert(LookupKind::Genre, "Pop").await.unwrap();

        let mut a = new_artist("Rockers");
        a.genre_id = Some(rock);
        repo.insert(&a).await.unwrap();

        let mut b = new_artist("Poppers");
        b.genre_id = Some(pop);
        repo.insert(&b).await.unwrap();

        let page = repo.find_by_genre(rock, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].artist.name, "Rockers");
    }

    #[tokio::test]
    async fn test_insert_rejects_empty_name() {
        let pool = setup_test_pool().await;
        let repo = SqliteArtistRepository::new(pool);

        let result = repo.insert(&new_artist("   ")).await;
        assert!(matches!(result, Err(CatalogError::InvalidInput { .. })));
    }
}
