//! Event repository trait and implementation

use crate::error::{CatalogError, Result};
use crate::models::{Event, EventRecord, EventUpdate, NewEvent};
use crate::repositories::resolve_lookup;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_store::{Page, PageRequest};
use sqlx::sqlite::SqliteRow;
use sqlx::{query, query_as, FromRow, QueryBuilder, Row, SqlitePool};

const RECORD_SELECT: &str = r#"
    SELECT e.*, s.label AS status_label, g.label AS genre_label, a.name AS artist_name
    FROM events e
    LEFT JOIN statuses s ON s.id = e.status_id
    LEFT JOIN genres g ON g.id = e.genre_id
    LEFT JOIN artists a ON a.id = e.artist_id
"#;

/// Event repository interface for data access operations
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Find an event row by its ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Event>>;

    /// Find an event with its relations resolved
    async fn find_record(&self, id: i64) -> Result<Option<EventRecord>>;

    /// Insert a new event row and return the generated id
    async fn insert(&self, new: &NewEvent) -> Result<i64>;

    /// Apply a partial update to an existing event row
    ///
    /// # Errors
    /// Returns `NotFound` if the event does not exist.
    async fn apply_update(&self, id: i64, update: &EventUpdate) -> Result<()>;

    /// Delete an event by ID
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Query events with pagination, soonest first
    async fn list(&self, page_request: PageRequest) -> Result<Page<EventRecord>>;

    /// Find event by exact name
    async fn find_by_name(&self, name: &str) -> Result<Option<Event>>;

    /// Query events headlined by one artist
    async fn find_by_artist(
        &self,
        artist_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<EventRecord>>;

    /// Query events on or after a calendar date
    async fn find_upcoming(
        &self,
        from: NaiveDate,
        page_request: PageRequest,
    ) -> Result<Page<EventRecord>>;

    /// Search events by name or venue substring
    async fn search(
        &self,
        search_query: &str,
        page_request: PageRequest,
    ) -> Result<Page<EventRecord>>;

    /// Count total events
    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of EventRepository
pub struct SqliteEventRepository {
    pool: SqlitePool,
}

impl SqliteEventRepository {
    /// Create a new SqliteEventRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_record(row: SqliteRow) -> std::result::Result<EventRecord, sqlx::Error> {
    let event = Event::from_row(&row)?;
    let status = resolve_lookup(event.status_id, row.try_get("status_label")?);
    let genre = resolve_lookup(event.genre_id, row.try_get("genre_label")?);
    let artist_name = row.try_get("artist_name")?;

    Ok(EventRecord {
        event,
        status,
        genre,
        artist_name,
    })
}

#[async_trait]
impl EventRepository for SqliteEventRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Event>> {
        let event = query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    async fn find_record(&self, id: i64) -> Result<Option<EventRecord>> {
        let sql = format!("{} WHERE e.id = ?", RECORD_SELECT);
        let row = query(&sql).bind(id).fetch_optional(&self.pool).await?;

        row.map(map_record).transpose().map_err(CatalogError::from)
    }

    async fn insert(&self, new: &NewEvent) -> Result<i64> {
        if new.name.trim().is_empty() {
            return Err(CatalogError::InvalidInput {
                field: "name".to_string(),
                message: "Event name cannot be empty".to_string(),
            });
        }
        if new.capacity < 0 {
            return Err(CatalogError::InvalidInput {
                field: "capacity".to_string(),
                message: "Event capacity cannot be negative".to_string(),
            });
        }

        let now = chrono::Utc::now().timestamp();
        let result = query(
            r#"
            INSERT INTO events (
                name, description, venue, starts_on, starts_at_time, capacity,
                contact, flyer_url, status_id, genre_id, artist_id,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.venue)
        .bind(new.starts_on)
        .bind(&new.starts_at_time)
        .bind(new.capacity)
        .bind(&new.contact)
        .bind(new.flyer_url.as_deref().unwrap_or_default())
        .bind(new.status_id)
        .bind(new.genre_id)
        .bind(new.artist_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn apply_update(&self, id: i64, update: &EventUpdate) -> Result<()> {
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(CatalogError::InvalidInput {
                    field: "name".to_string(),
                    message: "Event name cannot be empty".to_string(),
                });
            }
        }
        if let Some(capacity) = update.capacity {
            if capacity < 0 {
                return Err(CatalogError::InvalidInput {
                    field: "capacity".to_string(),
                    message: "Event capacity cannot be negative".to_string(),
                });
            }
        }

        let mut builder = QueryBuilder::new("UPDATE events SET updated_at = ");
        builder.push_bind(chrono::Utc::now().timestamp());

        if let Some(name) = &update.name {
            builder.push(", name = ").push_bind(name);
        }
        if let Some(description) = &update.description {
            builder.push(", description = ").push_bind(description);
        }
        if let Some(venue) = &update.venue {
            builder.push(", venue = ").push_bind(venue);
        }
        if let Some(starts_on) = update.starts_on {
            builder.push(", starts_on = ").push_bind(starts_on);
        }
        if let Some(starts_at_time) = &update.starts_at_time {
            builder.push(", starts_at_time = ").push_bind(starts_at_time);
        }
        if let Some(capacity) = update.capacity {
            builder.push(", capacity = ").push_bind(capacity);
        }
        if let Some(contact) = &update.contact {
            builder.push(", contact = ").push_bind(contact);
        }
        if let Some(flyer_url) = &update.flyer_url {
            builder.push(", flyer_url = ").push_bind(flyer_url);
        }
        if let Some(value) = update.status_id.as_resolved() {
            builder.push(", status_id = ").push_bind(value.copied());
        }
        if let Some(value) = update.genre_id.as_resolved() {
            builder.push(", genre_id = ").push_bind(value.copied());
        }
        if let Some(value) = update.artist_id.as_resolved() {
            builder.push(", artist_id = ").push_bind(value.copied());
        }

        builder.push(" WHERE id = ").push_bind(id);
        let result = builder.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound { entity: "Event", id });
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, page_request: PageRequest) -> Result<Page<EventRecord>> {
        let total = self.count().await?;

        let sql = format!(
            "{} ORDER BY e.starts_on ASC, e.starts_at_time ASC LIMIT ? OFFSET ?",
            RECORD_SELECT
        );
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

    async fn find_by_name(&self, name: &str) -> Result<Option<Event>> {
        let event = query_as::<_, Event>("SELECT * FROM events WHERE name = ? LIMIT 1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    async fn find_by_artist(
        &self,
        artist_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<EventRecord>> {
        let total: i64 = query_as("SELECT COUNT(*) as count FROM events WHERE artist_id = ?")
            .bind(artist_id)
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        let sql = format!(
            "{} WHERE e.artist_id = ? ORDER BY e.starts_on ASC LIMIT ? OFFSET ?",
            RECORD_SELECT
        );
        let rows = query(&sql)
            .bind(artist_id)
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

    async fn find_upcoming(
        &self,
        from: NaiveDate,
        page_request: PageRequest,
    ) -> Result<Page<EventRecord>> {
        let total: i64 = query_as("SELECT COUNT(*) as count FROM events WHERE starts_on >= ?")
            .bind(from)
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        let sql = format!(
            "{} WHERE e.starts_on >= ? ORDER BY e.starts_on ASC, e.starts_at_time ASC LIMIT ? OFFSET ?",
            RECORD_SELECT
        );
        let rows = query(&sql)
            .bind(from)
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
    ) -> Result<Page<EventRecord>> {
        let pattern = format!("%{}%", search_query);

        let total: i64 =
            query_as("SELECT COUNT(*) as count FROM events WHERE name LIKE ? OR venue LIKE ?")
                .bind(&pattern)
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await
                .map(|row: (i64,)| row.0)?;

        let sql = format!(
            "{} WHERE e.name LIKE ? OR e.venue LIKE ? ORDER BY e.starts_on ASC LIMIT ? OFFSET ?",
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
        let count: i64 = query_as("SELECT COUNT(*) as count FROM events")
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
    use core_store::{create_test_pool, Patch};

    async fn setup_test_pool() -> SqlitePool {
        create_test_pool().await.unwrap()
    }

    fn new_event(name: &str, date: &str) -> NewEvent {
        NewEvent {
            name: name.to_string(),
            description: String::new(),
            venue: String::new(),
            starts_on: date.parse().unwrap(),
            starts_at_time: "20:00".to_string(),
            capacity: 100,
            contact: String::new(),
            flyer_url: None,
            status_id: None,
            genre_id: None,
            artist_id: None,
            metadata: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_event() {
        let pool = setup_test_pool().await;
        let repo = SqliteEventRepository::new(pool);

        let mut new = new_event("Festival del Sur", "2026-11-20");
        new.venue = "Parque Central".to_string();
        let id = repo.insert(&new).await.unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.name, "Festival del Sur");
        assert_eq!(found.venue, "Parque Central");
        assert_eq!(found.starts_on, "2026-11-20".parse::<NaiveDate>().unwrap());
        assert_eq!(found.capacity, 100);
    }

    #[tokio::test]
    async fn test_record_resolves_headline_artist() {
        let pool = setup_test_pool().await;
        let artists = SqliteArtistRepository::new(pool.clone());
        let repo = SqliteEventRepository::new(pool);

        let artist_id = artists
            .insert(&NewArtist {
                name: "Luna Negra".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let mut new = new_event("Noche Negra", "2026-12-01");
        new.artist_id = Some(artist_id);
        let id = repo.insert(&new).await.unwrap();

        let record = repo.find_record(id).await.unwrap().unwrap();
        assert_eq!(record.artist_name.as_deref(), Some("Luna Negra"));
        assert!(record.status.is_none());
    }

    #[tokio::test]
    async fn test_partial_update_clears_artist() {
        let pool = setup_test_pool().await;
        let artists = SqliteArtistRepository::new(pool.clone());
        let repo = SqliteEventRepository::new(pool);

        let artist_id = artists
            .insert(&NewArtist {
                name: "Headline".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let mut new = new_event("Cambiante", "2026-10-10");
        new.artist_id = Some(artist_id);
        let id = repo.insert(&new).await.unwrap();

        let update = EventUpdate {
            capacity: Some(250),
            artist_id: Patch::Null,
            ..Default::default()
        };
        repo.apply_update(id, &update).await.unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.capacity, 250);
        assert_eq!(found.artist_id, None);
        assert_eq!(found.name, "Cambiante");
    }

    #[tokio::test]
    async fn test_insert_rejects_negative_capacity() {
        let pool = setup_test_pool().await;
        let repo = SqliteEventRepository::new(pool);

        let mut new = new_event("Inválido", "2026-01-01");
        new.capacity = -5;
        let result = repo.insert(&new).await;
        assert!(matches!(result, Err(CatalogError::InvalidInput { .. })));
    }

    #[tokio::test]
    async fn test_find_upcoming_orders_soonest_first() {
        let pool = setup_test_pool().await;
        let repo = SqliteEventRepository::new(pool);

        repo.insert(&new_event("Pasado", "2025-01-01")).await.unwrap();
        repo.insert(&new_event("Lejano", "2027-06-01")).await.unwrap();
        repo.insert(&new_event("Cercano", "2026-09-15")).await.unwrap();

        let from = "2026-01-01".parse().unwrap();
        let page = repo.find_upcoming(from, PageRequest::default()).await.unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].event.name, "Cercano");
        assert_eq!(page.items[1].event.name, "Lejano");
    }

    #[tokio::test]
    async fn test_delete_event() {
        let pool = setup_test_pool().await;
        let repo = SqliteEventRepository::new(pool);

        let id = repo.insert(&new_event("Efímero", "2026-05-05")).await.unwrap();
        assert!(repo.delete(id).await.unwrap());
        assert!(repo.find_by_id(id).await.unwrap().is_none());
    }
}
