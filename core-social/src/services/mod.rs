//! Services enforcing the social rules on top of the repositories.
//!
//! Comments and reviews carry an optional acting-user check: mutations take
//! an `actor` and refuse with [`crate::SocialError::Forbidden`] when it is
//! present and does not match the row's owner. Passing `None` skips the
//! check, which is how trusted internal callers operate.

pub mod comment;
pub mod favorite;
pub mod review;

pub use comment::CommentService;
pub use favorite::FavoriteService;
pub use review::ReviewService;
