//! Repositories.
//!
//! Methods suffixed with `_in` run on a caller-supplied connection so they
//! can take part in a transaction; the others use the shared pool.

mod comment;
mod following;
mod notification;
mod post;
mod post_like;
mod user;

pub use comment::CommentRepository;
pub use following::FollowingRepository;
pub use notification::NotificationRepository;
pub use post::{PostListQuery, PostOrdering, PostRepository};
pub use post_like::PostLikeRepository;
pub use user::UserRepository;
