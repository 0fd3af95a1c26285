//! Business logic services.

pub mod comment;
pub mod feed;
pub mod following;
pub mod like;
pub mod notification;
pub mod post;
pub mod user;

pub use comment::{CommentService, CreateCommentInput, UpdateCommentInput};
pub use feed::{FeedPage, FeedService};
pub use following::{FollowAction, FollowOutcome, FollowingService};
pub use like::{LikeAction, LikeService};
pub use notification::{NotificationService, Target, TargetRef};
pub use post::{CreatePostInput, ListPostsInput, PostDetails, PostService, UpdatePostInput};
pub use user::{LoginInput, Profile, RegisterInput, UpdateProfileInput, UserService};
