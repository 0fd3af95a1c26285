//! Feed service.

use social_common::AppResult;
use social_db::{
    entities::post,
    repositories::{FollowingRepository, PostRepository},
};

/// Optional window into a feed. Both fields unset means the whole feed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedPage {
    /// Maximum number of posts.
    pub limit: Option<u64>,
    /// Posts to skip.
    pub offset: Option<u64>,
}

/// Composes a user's feed from the posts of the users they follow.
#[derive(Clone)]
pub struct FeedService {
    following_repo: FollowingRepository,
    post_repo: PostRepository,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub const fn new(following_repo: FollowingRepository, post_repo: PostRepository) -> Self {
        Self {
            following_repo,
            post_repo,
        }
    }

    /// Posts by the users `user_id` follows, newest first.
    ///
    /// Following nobody yields an empty feed; there is no global fallback.
    pub async fn get_feed(&self, user_id: &str, page: FeedPage) -> AppResult<Vec<post::Model>> {
        let followees = self.following_repo.followee_ids(user_id).await?;

        if followees.is_empty() {
            return Ok(vec![]);
        }

        self.post_repo
            .find_by_authors(&followees, page.limit, page.offset)
            .await
    }
}
