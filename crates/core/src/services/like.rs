//! Like service.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use social_common::{AppError, AppResult, IdGenerator};
use social_db::{
    entities::{notification::Verb, post_like},
    repositories::{PostLikeRepository, PostRepository},
};

use crate::services::notification::{NotificationService, TargetRef};

/// Which branch a like toggle took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeAction {
    /// The like was created.
    Liked,
    /// The like existed and was removed.
    Unliked,
}

impl LikeAction {
    /// Name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Liked => "liked",
            Self::Unliked => "unliked",
        }
    }

    /// Response message.
    #[must_use]
    pub const fn detail(self) -> &'static str {
        match self {
            Self::Liked => "Post liked.",
            Self::Unliked => "Post unliked.",
        }
    }
}

/// Like service for business logic.
#[derive(Clone)]
pub struct LikeService {
    db: Arc<DatabaseConnection>,
    like_repo: PostLikeRepository,
    post_repo: PostRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            like_repo: PostLikeRepository::new(Arc::clone(&db)),
            post_repo: PostRepository::new(Arc::clone(&db)),
            notifications: NotificationService::new(Arc::clone(&db)),
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Like `post_id` if not yet liked, otherwise remove the like.
    ///
    /// Liking someone else's post notifies its author. Unliking leaves any
    /// earlier notification in place.
    pub async fn toggle_like(&self, current_user_id: &str, post_id: &str) -> AppResult<LikeAction> {
        let txn = self.db.begin().await?;

        let post = self
            .post_repo
            .find_by_id_in(&txn, post_id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(post_id.to_string()))?;

        let like = post_like::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(current_user_id.to_string()),
            post_id: Set(post_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        let action = if self.like_repo.insert_if_absent_in(&txn, like).await? {
            if post.author_id != current_user_id {
                self.notifications
                    .notify_best_effort(
                        &txn,
                        current_user_id,
                        &post.author_id,
                        Verb::Liked,
                        TargetRef::post(post_id),
                    )
                    .await;
            }
            LikeAction::Liked
        } else {
            self.like_repo
                .delete_by_pair_in(&txn, current_user_id, post_id)
                .await?;
            LikeAction::Unliked
        };

        txn.commit().await?;

        tracing::info!(
            user_id = %current_user_id,
            post_id = %post_id,
            action = action.as_str(),
            "Toggled like"
        );

        Ok(action)
    }

    /// Whether a user has liked a post.
    pub async fn has_liked(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        self.like_repo.exists(user_id, post_id).await
    }

    /// Number of likes on a post.
    pub async fn count_likes(&self, post_id: &str) -> AppResult<u64> {
        self.like_repo.count_by_post(post_id).await
    }
}
