//! Lookup repository serving the id+label entities
//!
//! Genres, countries, statuses, and genders share one shape and one set of
//! operations; a table selector routes each call to the right table.

use crate::error::{CatalogError, Result};
use crate::models::Lookup;
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};

/// Which id+label table a call targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Genre,
    Country,
    Status,
    Gender,
}

impl LookupKind {
    /// Backing table name
    pub fn table(&self) -> &'static str {
        match self {
            LookupKind::Genre => "genres",
            LookupKind::Country => "countries",
            LookupKind::Status => "statuses",
            LookupKind::Gender => "genders",
        }
    }

    /// Entity name used in error messages
    pub fn entity(&self) -> &'static str {
        match self {
            LookupKind::Genre => "Genre",
            LookupKind::Country => "Country",
            LookupKind::Status => "Status",
            LookupKind::Gender => "Gender",
        }
    }
}

/// Lookup repository interface for the id+label entities
#[async_trait]
pub trait LookupRepository: Send + Sync {
    /// Find a lookup entry by its ID
    async fn find_by_id(&self, kind: LookupKind, id: i64) -> Result<Option<Lookup>>;

    /// Find a lookup entry by its exact label
    async fn find_by_label(&self, kind: LookupKind, label: &str) -> Result<Option<Lookup>>;

    /// List all entries of one kind, ordered by label
    async fn list(&self, kind: LookupKind) -> Result<Vec<Lookup>>;

    /// Insert a new entry and return its generated id
    ///
    /// # Errors
    /// Returns `Conflict` if an entry with the same label already exists.
    async fn insert(&self, kind: LookupKind, label: &str) -> Result<i64>;

    /// Rename an existing entry
    async fn rename(&self, kind: LookupKind, id: i64, label: &str) -> Result<()>;

    /// Delete an entry by ID
    ///
    /// # Returns
    /// - `Ok(true)` if the entry was deleted
    /// - `Ok(false)` if it was not found
    async fn delete(&self, kind: LookupKind, id: i64) -> Result<bool>;
}

/// SQLite implementation of LookupRepository
pub struct SqliteLookupRepository {
    pool: SqlitePool,
}

impl SqliteLookupRepository {
    /// Create a new SqliteLookupRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LookupRepository for SqliteLookupRepository {
    async fn find_by_id(&self, kind: LookupKind, id: i64) -> Result<Option<Lookup>> {
        let sql = format!("SELECT id, label FROM {} WHERE id = ?", kind.table());
        let entry = query_as::<_, Lookup>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(entry)
    }

    async fn find_by_label(&self, kind: LookupKind, label: &str) -> Result<Option<Lookup>> {
        let sql = format!(
            "SELECT id, label FROM {} WHERE label = ? LIMIT 1",
            kind.table()
        );
        let entry = query_as::<_, Lookup>(&sql)
            .bind(label)
            .fetch_optional(&self.pool)
            .await?;

        Ok(entry)
    }

    async fn list(&self, kind: LookupKind) -> Result<Vec<Lookup>> {
        let sql = format!("SELECT id, label FROM {} ORDER BY label ASC", kind.table());
        let entries = query_as::<_, Lookup>(&sql).fetch_all(&self.pool).await?;

        Ok(entries)
    }

    async fn insert(&self, kind: LookupKind, label: &str) -> Result<i64> {
        let label = label.trim();
        if label.is_empty() {
            return Err(CatalogError::InvalidInput {
                field: "label".to_string(),
                message: format!("{} label cannot be empty", kind.entity()),
            });
        }

        if self.find_by_label(kind, label).await?.is_some() {
            return Err(CatalogError::Conflict(format!(
                "{} '{}' already exists",
                kind.entity(),
                label
            )));
        }

        let sql = format!("INSERT INTO {} (label) VALUES (?)", kind.table());
        let result = query(&sql).bind(label).execute(&self.pool).await?;

        Ok(result.last_insert_rowid())
    }

    async fn rename(&self, kind: LookupKind, id: i64, label: &str) -> Result<()> {
        let sql = format!("UPDATE {} SET label = ? WHERE id = ?", kind.table());
        let result = query(&sql).bind(label).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound {
                entity: kind.entity(),
                id,
            });
        }

        Ok(())
    }

    async fn delete(&self, kind: LookupKind, id: i64) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?", kind.table());
        let result = query(&sql).bind(id).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_store::create_test_pool;

    async fn setup_test_pool() -> SqlitePool {
        create_test_pool().await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find_genre() {
        let pool = setup_test_pool().await;
        let repo = SqliteLookupRepository::new(pool);

        let id = repo.insert(LookupKind::Genre, "Rock").await.unwrap();

        let found = repo.find_by_id(LookupKind::Genre, id).await.unwrap();
        assert_eq!(found.unwrap().label, "Rock");

        let by_label = repo.find_by_label(LookupKind::Genre, "Rock").await.unwrap();
        assert_eq!(by_label.unwrap().id, id);
    }

    #[tokio::test]
    async fn test_duplicate_label_conflicts() {
        let pool = setup_test_pool().await;
        let repo = SqliteLookupRepository::new(pool);

        repo.insert(LookupKind::Country, "Colombia").await.unwrap();
        let result = repo.insert(LookupKind::Country, "Colombia").await;
        assert!(matches!(result, Err(CatalogError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_kinds_are_isolated() {
        let pool = setup_test_pool().await;
        let repo = SqliteLookupRepository::new(pool);

        repo.insert(LookupKind::Genre, "Active").await.unwrap();
        // Same label in a different table is fine.
        repo.insert(LookupKind::Status, "Active").await.unwrap();

        assert_eq!(repo.list(LookupKind::Genre).await.unwrap().len(), 1);
        assert_eq!(repo.list(LookupKind::Status).await.unwrap().len(), 1);
        assert!(repo.list(LookupKind::Gender).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let pool = setup_test_pool().await;
        let repo = SqliteLookupRepository::new(pool);

        let id = repo.insert(LookupKind::Status, "Draft").await.unwrap();
        repo.rename(LookupKind::Status, id, "Published").await.unwrap();

        let found = repo.find_by_id(LookupKind::Status, id).await.unwrap();
        assert_eq!(found.unwrap().label, "Published");

        assert!(repo.delete(LookupKind::Status, id).await.unwrap());
        assert!(!repo.delete(LookupKind::Status, id).await.unwrap());
    }

    #[tokio::test]
    async fn test_rename_missing_entry() {
        let pool = setup_test_pool().await;
        let repo = SqliteLookupRepository::new(pool);

        let result = repo.rename(LookupKind::Gender, 42, "Other").await;
        assert!(matches!(result, Err(CatalogError::NotFound { .. })));
    }
}
