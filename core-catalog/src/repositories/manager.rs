//! Manager repository trait and implementation

use crate::error::{CatalogError, Result};
use crate::models::{Manager, ManagerRecord, ManagerUpdate, NewManager};
use crate::repositories::resolve_lookup;
use async_trait::async_trait;
use core_store::{Page, PageRequest};
use sqlx::sqlite::SqliteRow;
use sqlx::{query, query_as, FromRow, QueryBuilder, Row, SqlitePool};

const RECORD_SELECT: &str = r#"
    SELECT m.*, g.label AS gender_label, s.label AS status_label
    FROM managers m
    LEFT JOIN genders g ON g.id = m.gender_id
    LEFT JOIN statuses s ON s.id = m.status_id
"#;

/// Manager repository interface for data access operations
#[async_trait]
pub trait ManagerRepository: Send + Sync {
    /// Find a manager row by its ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Manager>>;

    /// Find a manager with its relations resolved
    async fn find_record(&self, id: i64) -> Result<Option<ManagerRecord>>;

    /// Insert a new manager row and return the generated id
    async fn insert(&self, new: &NewManager) -> Result<i64>;

    /// Apply a partial update to an existing manager row
    ///
    /// # Errors
    /// Returns `NotFound` if the manager does not exist.
    async fn apply_update(&self, id: i64, update: &ManagerUpdate) -> Result<()>;

    /// Delete a manager by ID
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Query managers with pagination
    async fn list(&self, page_request: PageRequest) -> Result<Page<ManagerRecord>>;

    /// Find manager by exact stage name
    async fn find_by_stage_name(&self, stage_name: &str) -> Result<Option<Manager>>;

    /// Search managers by stage name substring
    async fn search(
        &self,
        search_query: &str,
        page_request: PageRequest,
    ) -> Result<Page<ManagerRecord>>;

    /// Count total managers
    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of ManagerRepository
pub struct SqliteManagerRepository {
    pool: SqlitePool,
}

impl SqliteManagerRepository {
    /// Create a new SqliteManagerRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_record(row: SqliteRow) -> std::result::Result<ManagerRecord, sqlx::Error> {
    let manager = Manager::from_row(&row)?;
    let gender = resolve_lookup(manager.gender_id, row.try_get("gender_label")?);
    let status = resolve_lookup(manager.status_id, row.try_get("status_label")?);

    Ok(ManagerRecord {
        manager,
        gender,
        status,
    })
}

#[async_trait]
impl ManagerRepository for SqliteManagerRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Manager>> {
        let manager = query_as::<_, Manager>("SELECT * FROM managers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(manager)
    }

    async fn find_record(&self, id: i64) -> Result<Option<ManagerRecord>> {
        let sql = format!("{} WHERE m.id = ?", RECORD_SELECT);
        let row = query(&sql).bind(id).fetch_optional(&self.pool).await?;

        row.map(map_record).transpose().map_err(CatalogError::from)
    }

    async fn insert(&self, new: &NewManager) -> Result<i64> {
        if new.stage_name.trim().is_empty() {
            return Err(CatalogError::InvalidInput {
                field: "stage_name".to_string(),
                message: "Manager stage name cannot be empty".to_string(),
            });
        }

        let now = chrono::Utc::now().timestamp();
        let result = query(
            r#"
            INSERT INTO managers (
                stage_name, gender_id, status_id, registered_at,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.stage_name)
        .bind(new.gender_id)
        .bind(new.status_id)
        .bind(now)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn apply_update(&self, id: i64, update: &ManagerUpdate) -> Result<()> {
        if let Some(stage_name) = &update.stage_name {
            if stage_name.trim().is_empty() {
                return Err(CatalogError::InvalidInput {
                    field: "stage_name".to_string(),
                    message: "Manager stage name cannot be empty".to_string(),
                });
            }
        }

        let mut builder = QueryBuilder::new("UPDATE managers SET updated_at = ");
        builder.push_bind(chrono::Utc::now().timestamp());

        if let Some(stage_name) = &update.stage_name {
            builder.push(", stage_name = ").push_bind(stage_name);
        }
        if let Some(value) = update.gender_id.as_resolved() {
            builder.push(", gender_id = ").push_bind(value.copied());
        }
        if let Some(value) = update.status_id.as_resolved() {
            builder.push(", status_id = ").push_bind(value.copied());
        }

        builder.push(" WHERE id = ").push_bind(id);
        let result = builder.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound {
                entity: "Manager",
                id,
            });
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = query("DELETE FROM managers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, page_request: PageRequest) -> Result<Page<ManagerRecord>> {
        let total = self.count().await?;

        let sql = format!("{} ORDER BY m.stage_name ASC LIMIT ? OFFSET ?", RECORD_SELECT);
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

    async fn find_by_stage_name(&self, stage_name: &str) -> Result<Option<Manager>> {
        let manager =
            query_as::<_, Manager>("SELECT * FROM managers WHERE stage_name = ? LIMIT 1")
                .bind(stage_name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(manager)
    }

    async fn search(
        &self,
        search_query: &str,
        page_request: PageRequest,
    ) -> Result<Page<ManagerRecord>> {
        let pattern = format!("%{}%", search_query);

        let total: i64 = query_as("SELECT COUNT(*) as count FROM managers WHERE stage_name LIKE ?")
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        let sql = format!(
            "{} WHERE m.stage_name LIKE ? ORDER BY m.stage_name ASC LIMIT ? OFFSET ?",
            RECORD_SELECT
        );
        let rows = query(&sql)
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
        let count: i64 = query_as("SELECT COUNT(*) as count FROM managers")
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
    use core_store::create_test_pool;

    async fn setup_test_pool() -> SqlitePool {
        create_test_pool().await.unwrap()
    }

    fn new_manager(stage_name: &str) -> NewManager {
        NewManager {
            stage_name: stage_name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_manager() {
        let pool = setup_test_pool().await;
        let repo = SqliteManagerRepository::new(pool);

        let id = repo.insert(&new_manager("DJ Promotor")).await.unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.stage_name, "DJ Promotor");
        assert!(found.registered_at > 0);
    }

    #[tokio::test]
    async fn test_record_resolves_relations() {
        let pool = setup_test_pool().await;
        let lookups = SqliteLookupRepository::new(pool.clone());
        let repo = SqliteManagerRepository::new(pool);

        let gender_id = lookups.insert(LookupKind::Gender, "Female").await.unwrap();
        let mut new = new_manager("La Mánager");
        new.gender_id = Some(gender_id);
        let id = repo.insert(&new).await.unwrap();

        let record = repo.find_record(id).await.unwrap().unwrap();
        assert_eq!(record.gender.unwrap().label, "Female");
        assert!(record.status.is_none());
    }

    #[tokio::test]
    async fn test_update_stage_name() {
        let pool = setup_test_pool().await;
        let repo = SqliteManagerRepository::new(pool);

        let id = repo.insert(&new_manager("Antes")).await.unwrap();

        let update = ManagerUpdate {
            stage_name: Some("Después".to_string()),
            ..Default::default()
        };
        repo.apply_update(id, &update).await.unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.stage_name, "Después");
    }

    #[tokio::test]
    async fn test_search_by_stage_name() {
        let pool = setup_test_pool().await;
        let repo = SqliteManagerRepository::new(pool);

        repo.insert(&new_manager("Manager Uno")).await.unwrap();
        repo.insert(&new_manager("Manager Dos")).await.unwrap();
        repo.insert(&new_manager("Agente Tres")).await.unwrap();

        let page = repo.search("Manager", PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_delete_manager() {
        let pool = setup_test_pool().await;
        let repo = SqliteManagerRepository::new(pool);

        let id = repo.insert(&new_manager("Pasajero")).await.unwrap();
        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());
    }
}
