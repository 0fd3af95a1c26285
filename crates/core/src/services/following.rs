//! Following service.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::Serialize;
use social_common::{AppError, AppResult, IdGenerator};
use social_db::{
    entities::{following, notification::Verb},
    repositories::{FollowingRepository, UserRepository},
};

use crate::services::notification::{NotificationService, TargetRef};

/// Which branch a follow toggle took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowAction {
    /// The edge was created.
    Followed,
    /// The edge existed and was removed.
    Unfollowed,
}

impl FollowAction {
    /// Wire name, also used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Followed => "followed",
            Self::Unfollowed => "unfollowed",
        }
    }
}

/// Result of a follow toggle.
#[derive(Debug, Clone)]
pub struct FollowOutcome {
    /// Which way the toggle went.
    pub action: FollowAction,
    /// Username of the toggled user, for response messages.
    pub target_username: String,
}

impl FollowOutcome {
    /// Human-readable confirmation.
    #[must_use]
    pub fn detail(&self) -> String {
        match self.action {
            FollowAction::Followed => format!("You are now following {}.", self.target_username),
            FollowAction::Unfollowed => format!("You have unfollowed {}.", self.target_username),
        }
    }
}

/// Following service for business logic.
#[derive(Clone)]
pub struct FollowingService {
    db: Arc<DatabaseConnection>,
    following_repo: FollowingRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            following_repo: FollowingRepository::new(Arc::clone(&db)),
            user_repo: UserRepository::new(Arc::clone(&db)),
            notifications: NotificationService::new(Arc::clone(&db)),
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow `target_id` if not yet followed, otherwise unfollow.
    ///
    /// The unique `(follower_id, followee_id)` index decides the branch:
    /// an insert that hits the conflict means the edge is already there and
    /// gets removed instead. Only the follow branch notifies.
    pub async fn toggle_follow(
        &self,
        current_user_id: &str,
        target_id: &str,
    ) -> AppResult<FollowOutcome> {
        if current_user_id == target_id {
            return Err(AppError::SelfFollow);
        }

        let txn = self.db.begin().await?;

        let target = self
            .user_repo
            .find_by_id_in(&txn, target_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(target_id.to_string()))?;

        let edge = following::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(current_user_id.to_string()),
            followee_id: Set(target_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        let action = if self.following_repo.insert_if_absent_in(&txn, edge).await? {
            self.notifications
                .notify_best_effort(
                    &txn,
                    current_user_id,
                    target_id,
                    Verb::Followed,
                    TargetRef::user(target_id),
                )
                .await;
            FollowAction::Followed
        } else {
            self.following_repo
                .delete_by_pair_in(&txn, current_user_id, target_id)
                .await?;
            FollowAction::Unfollowed
        };

        txn.commit().await?;

        tracing::info!(
            follower_id = %current_user_id,
            followee_id = %target_id,
            action = action.as_str(),
            "Toggled follow"
        );

        Ok(FollowOutcome {
            action,
            target_username: target.username,
        })
    }

    /// Check if a user is following another user.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.following_repo
            .is_following(follower_id, followee_id)
            .await
    }

    /// IDs of the users following `user_id`.
    pub async fn followers(&self, user_id: &str) -> AppResult<Vec<String>> {
        self.following_repo.follower_ids(user_id).await
    }

    /// IDs of the users `user_id` follows.
    pub async fn following(&self, user_id: &str) -> AppResult<Vec<String>> {
        self.following_repo.followee_ids(user_id).await
    }
}
