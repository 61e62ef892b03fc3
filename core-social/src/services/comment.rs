//! Comment service

use crate::error::{Result, SocialError};
use crate::models::Comment;
use crate::repositories::CommentRepository;
use core_store::{Page, PageRequest};
use std::sync::Arc;
use tracing::{debug, info};

/// Service for posting and moderating comments
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
}

impl CommentService {
    /// Create a new CommentService
    pub fn new(comments: Arc<dyn CommentRepository>) -> Self {
        Self { comments }
    }

    /// Post a comment on a product.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the body is empty after trimming.
    pub async fn post(&self, user_id: i64, product_id: i64, body: &str) -> Result<Comment> {
        let body = body.trim();
        if body.is_empty() {
            return Err(SocialError::InvalidInput {
                field: "body".to_string(),
                message: "Comment body must not be empty".to_string(),
            });
        }

        let id = self.comments.insert(user_id, product_id, body).await?;
        info!(comment_id = id, product_id, "Posted comment");

        self.load(id).await
    }

    /// Get a comment by ID
    pub async fn get(&self, id: i64) -> Result<Comment> {
        self.load(id).await
    }

    /// Edit a comment's body.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` when `actor` is present and is not the comment's
    /// author, and `InvalidInput` when the new body is empty.
    pub async fn edit(&self, id: i64, actor: Option<i64>, body: &str) -> Result<Comment> {
        let existing = self.load(id).await?;
        check_owner(actor, existing.user_id)?;

        let body = body.trim();
        if body.is_empty() {
            return Err(SocialError::InvalidInput {
                field: "body".to_string(),
                message: "Comment body must not be empty".to_string(),
            });
        }

        self.comments.update_body(id, body).await?;
        debug!(comment_id = id, "Edited comment");

        self.load(id).await
    }

    /// Remove a comment.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` when `actor` is present and is not the comment's
    /// author.
    pub async fn remove(&self, id: i64, actor: Option<i64>) -> Result<()> {
        let existing = self.load(id).await?;
        check_owner(actor, existing.user_id)?;

        self.comments.delete(id).await?;
        info!(comment_id = id, "Removed comment");

        Ok(())
    }

    /// Comments on one product, newest first
    pub async fn find_by_product(
        &self,
        product_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<Comment>> {
        self.comments.find_by_product(product_id, page_request).await
    }

    /// One user's comments, newest first
    pub async fn find_by_user(
        &self,
        user_id: i64,
        page_request: PageRequest,
    ) -> Result<Page<Comment>> {
        self.comments.find_by_user(user_id, page_request).await
    }

    /// The most recent comments across all products
    pub async fn recent(&self, limit: u32) -> Result<Vec<Comment>> {
        self.comments.recent(limit).await
    }

    /// Search comment bodies by substring
    pub async fn search(&self, term: &str, page_request: PageRequest) -> Result<Page<Comment>> {
        self.comments.search(term, page_request).await
    }

    /// Paginated listing, optionally bounded by posting time
    pub async fn list(
        &self,
        from: Option<i64>,
        to: Option<i64>,
        page_request: PageRequest,
    ) -> Result<Page<Comment>> {
        self.comments.list(from, to, page_request).await
    }

    async fn load(&self, id: i64) -> Result<Comment> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or(SocialError::NotFound {
                entity: "Comment",
                id,
            })
    }
}

pub(crate) fn check_owner(actor: Option<i64>, owner: i64) -> Result<()> {
    match actor {
        Some(actor) if actor != owner => Err(SocialError::Forbidden(
            "Only the author can modify this entry".to_string(),
        )),
        _ => Ok(()),
    }
}
