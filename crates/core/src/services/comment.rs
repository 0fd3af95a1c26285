//! Comment service.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::Deserialize;
use social_common::{AppError, AppResult, IdGenerator};
use social_db::{
    entities::{
        comment,
        notification::{TargetType, Verb},
    },
    repositories::{CommentRepository, PostRepository},
};
use validator::Validate;

use crate::services::{
    notification::{NotificationService, TargetRef},
    post::ensure_author,
};

/// Input for creating a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentInput {
    /// Post being commented on.
    #[validate(length(min = 1))]
    pub post: String,

    /// Comment text.
    #[validate(length(min = 1, max = 300))]
    pub content: String,
}

/// Input for updating a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentInput {
    /// New comment text.
    #[validate(length(min = 1, max = 300))]
    pub content: Option<String>,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    db: Arc<DatabaseConnection>,
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            comment_repo: CommentRepository::new(Arc::clone(&db)),
            post_repo: PostRepository::new(Arc::clone(&db)),
            notifications: NotificationService::new(Arc::clone(&db)),
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comment on a post. The post's author is notified unless they wrote
    /// the comment themselves.
    pub async fn create(
        &self,
        author_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        let txn = self.db.begin().await?;

        let post = self
            .post_repo
            .find_by_id_in(&txn, &input.post)
            .await?
            .ok_or_else(|| AppError::PostNotFound(input.post.clone()))?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id.clone()),
            author_id: Set(author_id.to_string()),
            content: Set(input.content),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };
        let comment = self.comment_repo.create_in(&txn, model).await?;

        self.notifications
            .notify_best_effort(
                &txn,
                author_id,
                &post.author_id,
                Verb::Commented,
                TargetRef::comment(&comment.id),
            )
            .await;

        txn.commit().await?;

        tracing::info!(comment_id = %comment.id, post_id = %post.id, "Created comment");

        Ok(comment)
    }

    /// Get a comment by ID.
    pub async fn get(&self, id: &str) -> AppResult<comment::Model> {
        self.comment_repo.get_by_id(id).await
    }

    /// List comments, optionally for a single post, oldest first.
    pub async fn list(
        &self,
        post_id: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.list(post_id, limit, offset).await
    }

    /// Update a comment. Only its author may do this.
    pub async fn update(
        &self,
        user_id: &str,
        comment_id: &str,
        input: UpdateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        let comment = self.comment_repo.get_by_id(comment_id).await?;
        ensure_author(&comment.author_id, user_id)?;

        let mut active: comment::ActiveModel = comment.into();
        if let Some(content) = input.content {
            active.content = Set(content);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.comment_repo.update(active).await
    }

    /// Delete a comment and the notifications pointing at it.
    pub async fn delete(&self, user_id: &str, comment_id: &str) -> AppResult<()> {
        let txn = self.db.begin().await?;

        let comment = self
            .comment_repo
            .find_by_id_in(&txn, comment_id)
            .await?
            .ok_or_else(|| AppError::CommentNotFound(comment_id.to_string()))?;
        ensure_author(&comment.author_id, user_id)?;

        self.notifications
            .purge_targets_in(&txn, TargetType::Comment, &[comment.id.clone()])
            .await?;
        self.comment_repo.delete_in(&txn, &comment.id).await?;

        txn.commit().await?;

        tracing::info!(comment_id = %comment_id, "Deleted comment");

        Ok(())
    }
}
