//! Repositories for the social tables

pub mod comment;
pub mod favorite;
pub mod review;

pub use comment::{CommentRepository, SqliteCommentRepository};
pub use favorite::{FavoriteRepository, SqliteFavoriteRepository};
pub use review::{ReviewRepository, SqliteReviewRepository};
