//! Document metadata store
//!
//! Holds one schema-flexible JSON document per parent entity, keyed by
//! `(collection, parent_id)`. The relational side stays normalized while
//! open-ended extensions (social links, technical riders, statistics) live
//! here; there is no cross-document referential integrity and no shared
//! transaction with the relational store.

use crate::error::{Result, StoreError};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::debug;

/// Store of supplementary JSON documents, at most one per parent entity.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Find the document for a parent id.
    ///
    /// Absence is a valid, common state; `Ok(None)` is not an error.
    async fn find(&self, collection: &str, parent_id: i64) -> Result<Option<JsonValue>>;

    /// Find documents for many parent ids in one query.
    ///
    /// Used when composing lists so each entity does not cost a separate
    /// store read. Missing parents are simply absent from the map.
    async fn find_many(
        &self,
        collection: &str,
        parent_ids: &[i64],
    ) -> Result<HashMap<i64, JsonValue>>;

    /// Load every document in a collection, keyed by parent id.
    ///
    /// Collections hold at most one small document per parent entity, so a
    /// full scan stays cheap; used for content filters the relational side
    /// cannot answer.
    async fn find_all(&self, collection: &str) -> Result<HashMap<i64, JsonValue>>;

    /// Insert a whole document for a parent that has none yet.
    async fn put(&self, collection: &str, parent_id: i64, body: JsonValue) -> Result<()>;

    /// Find-by-parent-id, create-if-absent, else shallow-merge the supplied
    /// top-level fields into the stored document. Returns the stored
    /// document after the write.
    async fn upsert_merge(
        &self,
        collection: &str,
        parent_id: i64,
        patch: JsonValue,
    ) -> Result<JsonValue>;

    /// Delete the document for a parent id.
    ///
    /// Returns `Ok(true)` if a document was deleted, `Ok(false)` if none
    /// existed.
    async fn delete(&self, collection: &str, parent_id: i64) -> Result<bool>;
}

/// SQLite-backed document store; bodies are persisted as JSON text.
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_body(raw: String) -> Result<JsonValue> {
        serde_json::from_str(&raw)
            .map_err(|e| StoreError::Document(format!("Stored document is not valid JSON: {}", e)))
    }

    fn encode_body(body: &JsonValue) -> Result<String> {
        serde_json::to_string(body)
            .map_err(|e| StoreError::Document(format!("Failed to encode document: {}", e)))
    }

    /// Shallow merge: top-level fields of `patch` overwrite the same fields
    /// of `base`; all other stored fields are preserved.
    fn merge(base: JsonValue, patch: &JsonValue) -> Result<JsonValue> {
        let (JsonValue::Object(mut base_map), JsonValue::Object(patch_map)) = (base, patch.clone())
        else {
            return Err(StoreError::Document(
                "Documents and patches must be JSON objects".to_string(),
            ));
        };

        for (key, value) in patch_map {
            base_map.insert(key, value);
        }

        Ok(JsonValue::Object(base_map))
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn find(&self, collection: &str, parent_id: i64) -> Result<Option<JsonValue>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT body FROM documents WHERE collection = ? AND parent_id = ?")
                .bind(collection)
                .bind(parent_id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(body,)| Self::parse_body(body)).transpose()
    }

    async fn find_many(
        &self,
        collection: &str,
        parent_ids: &[i64],
    ) -> Result<HashMap<i64, JsonValue>> {
        if parent_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut builder = sqlx::QueryBuilder::new(
            "SELECT parent_id, body FROM documents WHERE collection = ",
        );
        builder.push_bind(collection);
        builder.push(" AND parent_id IN (");
        let mut separated = builder.separated(", ");
        for id in parent_ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let rows: Vec<(i64, String)> = builder.build_query_as().fetch_all(&self.pool).await?;

        let mut documents = HashMap::with_capacity(rows.len());
        for (parent_id, body) in rows {
            documents.insert(parent_id, Self::parse_body(body)?);
        }

        Ok(documents)
    }

    async fn find_all(&self, collection: &str) -> Result<HashMap<i64, JsonValue>> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT parent_id, body FROM documents WHERE collection = ?")
                .bind(collection)
                .fetch_all(&self.pool)
                .await?;

        let mut documents = HashMap::with_capacity(rows.len());
        for (parent_id, body) in rows {
            documents.insert(parent_id, Self::parse_body(body)?);
        }

        Ok(documents)
    }

    async fn put(&self, collection: &str, parent_id: i64, body: JsonValue) -> Result<()> {
        if !body.is_object() {
            return Err(StoreError::Document(
                "Documents and patches must be JSON objects".to_string(),
            ));
        }

        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO documents (collection, parent_id, body, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(collection)
        .bind(parent_id)
        .bind(Self::encode_body(&body)?)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(collection, parent_id, "Inserted document");
        Ok(())
    }

    async fn upsert_merge(
        &self,
        collection: &str,
        parent_id: i64,
        patch: JsonValue,
    ) -> Result<JsonValue> {
        let merged = match self.find(collection, parent_id).await? {
            Some(existing) => Self::merge(existing, &patch)?,
            None => {
                if !patch.is_object() {
                    return Err(StoreError::Document(
                        "Documents and patches must be JSON objects".to_string(),
                    ));
                }
                patch
            }
        };

        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO documents (collection, parent_id, body, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (collection, parent_id)
            DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at
            "#,
        )
        .bind(collection)
        .bind(parent_id)
        .bind(Self::encode_body(&merged)?)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(collection, parent_id, "Upserted document");
        Ok(merged)
    }

    async fn delete(&self, collection: &str, parent_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND parent_id = ?")
            .bind(collection)
            .bind(parent_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
