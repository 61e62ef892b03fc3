//! Comment repository trait and implementation

use crate::error::{Result, SocialError};
use crate::models::Comment;
use async_trait::async_trait;
use core_store::{Page, PageRequest};
use sqlx::{query, query_as, QueryBuilder, SqlitePool};

/// Comment repository interface
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Find a comment by its ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// Insert a new comment and return the generated id
    async fn insert(&self, user_id: i64, product_id: i64, body: &str) -> Result<i64>;

    /// Overwrite the body of an existing comment
    async fn update_body(&self, id: i64, body: &str) -> Result<()>;

    /// Delete a comment by ID
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Query comments on one product, newest first
    async fn find_by_product(
        &self,
        product_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<Comment>>;

    /// Query one user's comments, newest first
    async fn find_by_user(&self, user_id: i64, page_request: PageRequest)
        -> Result<Page<Comment>>;

    /// The most recent comments across all products
    async fn recent(&self, limit: u32) -> Result<Vec<Comment>>;

    /// Search comment bodies by substring
    async fn search(&self, term: &str, page_request: PageRequest) -> Result<Page<Comment>>;

    /// Paginated list, optionally bounded by posting time (unix seconds,
    /// inclusive)
    async fn list(
        &self,
        from: Option<i64>,
        to: Option<i64>,
        page_request: PageRequest,
    ) -> Result<Page<Comment>>;
}

/// SQLite implementation of CommentRepository
pub struct SqliteCommentRepository {
    pool: SqlitePool,
}

impl SqliteCommentRepository {
    /// Create a new SqliteCommentRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for SqliteCommentRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let comment = query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(comment)
    }

    async fn insert(&self, user_id: i64, product_id: i64, body: &str) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();
        let result = query(
            "INSERT INTO comments (user_id, product_id, body, posted_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(body)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn update_body(&self, id: i64, body: &str) -> Result<()> {
        let result = query("UPDATE comments SET body = ? WHERE id = ?")
            .bind(body)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(SocialError::NotFound {
                entity: "Comment",
                id,
            });
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_product(
        &self,
        product_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<Comment>> {
        let total: i64 = query_as("SELECT COUNT(*) as count FROM comments WHERE product_id = ?")
            .bind(product_id)
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        let comments = query_as::<_, Comment>(
            "SELECT * FROM comments WHERE product_id = ? ORDER BY posted_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(product_id)
        .bind(page_request.limit())
        .bind(page_request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(comments, total as u64, page_request))
    }

    async fn find_by_user(
        &self,
        user_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<Comment>> {
        let total: i64 = query_as("SELECT COUNT(*) as count FROM comments WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        let comments = query_as::<_, Comment>(
            "SELECT * FROM comments WHERE user_id = ? ORDER BY posted_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(page_request.limit())
        .bind(page_request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(comments, total as u64, page_request))
    }

    async fn recent(&self, limit: u32) -> Result<Vec<Comment>> {
        let comments = query_as::<_, Comment>(
            "SELECT * FROM comments ORDER BY posted_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn search(&self, term: &str, page_request: PageRequest) -> Result<Page<Comment>> {
        let pattern = format!("%{}%", term);

        let total: i64 = query_as("SELECT COUNT(*) as count FROM comments WHERE body LIKE ?")
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map(|row: (i64,)| row.0)?;

        let comments = query_as::<_, Comment>(
            "SELECT * FROM comments WHERE body LIKE ? ORDER BY posted_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(&pattern)
        .bind(page_request.limit())
        .bind(page_request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(comments, total as u64, page_request))
    }

    async fn list(
        &self,
        from: Option<i64>,
        to: Option<i64>,
        page_request: PageRequest,
    ) -> Result<Page<Comment>> {
        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM comments WHERE 1 = 1");
        let mut list_builder = QueryBuilder::new("SELECT * FROM comments WHERE 1 = 1");

        if let Some(from) = from {
            count_builder.push(" AND posted_at >= ").push_bind(from);
            list_builder.push(" AND posted_at >= ").push_bind(from);
        }
        if let Some(to) = to {
            count_builder.push(" AND posted_at <= ").push_bind(to);
            list_builder.push(" AND posted_at <= ").push_bind(to);
        }

        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        list_builder
            .push(" ORDER BY posted_at DESC, id DESC LIMIT ")
            .push_bind(page_request.limit())
            .push(" OFFSET ")
            .push_bind(page_request.offset());

        let comments = list_builder
            .build_query_as::<Comment>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(comments, total as u64, page_request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_store::create_test_pool;

    #[tokio::test]
    async fn test_insert_update_delete() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteCommentRepository::new(pool);

        let id = repo.insert(1, 100, "Tremendo disco").await.unwrap();

        repo.update_body(id, "Tremendo disco, lo recomiendo").await.unwrap();
        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.body, "Tremendo disco, lo recomiendo");

        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_product() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteCommentRepository::new(pool);

        repo.insert(1, 100, "Uno").await.unwrap();
        repo.insert(2, 100, "Dos").await.unwrap();
        repo.insert(1, 200, "Otro").await.unwrap();

        let page = repo.find_by_product(100, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_search_bodies() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteCommentRepository::new(pool);

        repo.insert(1, 100, "La mezcla suena increíble").await.unwrap();
        repo.insert(2, 100, "No me convenció").await.unwrap();

        let page = repo.search("mezcla", PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_list_with_date_filter() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteCommentRepository::new(pool);

        repo.insert(1, 100, "Reciente").await.unwrap();

        let now = chrono::Utc::now().timestamp();
        let within = repo
            .list(Some(now - 60), Some(now + 60), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(within.total, 1);

        let before = repo
            .list(None, Some(now - 3600), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(before.total, 0);
    }
}
