//! Post service.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::Deserialize;
use social_common::{AppError, AppResult, IdGenerator};
use social_db::{
    entities::{comment, notification::TargetType, post},
    repositories::{
        CommentRepository, PostLikeRepository, PostListQuery, PostOrdering, PostRepository,
        UserRepository,
    },
};
use validator::Validate;

use crate::services::notification::NotificationService;

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostInput {
    /// Post title.
    #[validate(length(min = 1, max = 150))]
    pub title: String,

    /// Post body.
    #[validate(length(min = 1))]
    pub content: String,
}

/// Input for updating a post.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePostInput {
    /// New title.
    #[validate(length(min = 1, max = 150))]
    pub title: Option<String>,

    /// New body.
    #[validate(length(min = 1))]
    pub content: Option<String>,
}

/// Filters for listing posts.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListPostsInput {
    /// Author username.
    pub author: Option<String>,
    /// Substring matched against title and content.
    pub search: Option<String>,
    /// `created_at`, `-created_at`, `title` or `-title`; anything else falls
    /// back to newest first.
    pub ordering: Option<String>,
    /// Page size.
    pub limit: u64,
    /// Rows to skip.
    pub offset: u64,
}

/// A post with everything its representation needs.
#[derive(Debug, Clone)]
pub struct PostDetails {
    /// The post itself.
    pub post: post::Model,
    /// Username of the author.
    pub author_username: String,
    /// Number of likes.
    pub likes_count: u64,
    /// Comments, oldest first, with their authors' usernames.
    pub comments: Vec<(comment::Model, String)>,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    db: Arc<DatabaseConnection>,
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    like_repo: PostLikeRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            post_repo: PostRepository::new(Arc::clone(&db)),
            comment_repo: CommentRepository::new(Arc::clone(&db)),
            like_repo: PostLikeRepository::new(Arc::clone(&db)),
            user_repo: UserRepository::new(Arc::clone(&db)),
            notifications: NotificationService::new(Arc::clone(&db)),
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post authored by `author_id`.
    pub async fn create(&self, author_id: &str, input: CreatePostInput) -> AppResult<post::Model> {
        input.validate()?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author_id.to_string()),
            title: Set(input.title),
            content: Set(input.content),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let post = self.post_repo.create(model).await?;

        tracing::info!(post_id = %post.id, author_id = %author_id, "Created post");

        Ok(post)
    }

    /// Get a post by ID.
    pub async fn get(&self, id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(id).await
    }

    /// List posts.
    pub async fn list(&self, input: &ListPostsInput) -> AppResult<Vec<post::Model>> {
        let author_id = match input.author.as_deref() {
            Some(username) => match self.user_repo.find_by_username(username).await? {
                Some(user) => Some(user.id),
                // Unknown author matches nothing
                None => return Ok(vec![]),
            },
            None => None,
        };

        let query = PostListQuery {
            author_id,
            search: input.search.clone(),
            ordering: input
                .ordering
                .as_deref()
                .and_then(PostOrdering::parse)
                .unwrap_or_default(),
            limit: Some(input.limit),
            offset: Some(input.offset),
        };

        self.post_repo.list(&query).await
    }

    /// Update a post. Only its author may do this.
    pub async fn update(
        &self,
        user_id: &str,
        post_id: &str,
        input: UpdatePostInput,
    ) -> AppResult<post::Model> {
        input.validate()?;

        let post = self.post_repo.get_by_id(post_id).await?;
        ensure_author(&post.author_id, user_id)?;

        let mut active: post::ActiveModel = post.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(content) = input.content {
            active.content = Set(content);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.post_repo.update(active).await
    }

    /// Delete a post. Only its author may do this.
    ///
    /// Notifications about the post or its comments are removed in the same
    /// transaction; comments and likes go with the post through the foreign
    /// keys.
    pub async fn delete(&self, user_id: &str, post_id: &str) -> AppResult<()> {
        let txn = self.db.begin().await?;

        let post = self
            .post_repo
            .find_by_id_in(&txn, post_id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(post_id.to_string()))?;
        ensure_author(&post.author_id, user_id)?;

        let comment_ids = self.comment_repo.ids_by_post_in(&txn, post_id).await?;
        self.notifications
            .purge_targets_in(&txn, TargetType::Comment, &comment_ids)
            .await?;
        self.notifications
            .purge_targets_in(&txn, TargetType::Post, &[post_id.to_string()])
            .await?;
        self.post_repo.delete_in(&txn, post_id).await?;

        txn.commit().await?;

        tracing::info!(post_id = %post_id, "Deleted post");

        Ok(())
    }

    /// Gather author name, like count and comments for a post.
    pub async fn details(&self, post: post::Model) -> AppResult<PostDetails> {
        let comments = self.comment_repo.find_by_post(&post.id).await?;

        let mut user_ids: Vec<String> = comments.iter().map(|c| c.author_id.clone()).collect();
        user_ids.push(post.author_id.clone());
        user_ids.sort();
        user_ids.dedup();

        let names: std::collections::HashMap<String, String> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();
        let name_of = |id: &str| names.get(id).cloned().unwrap_or_default();

        let likes_count = self.like_repo.count_by_post(&post.id).await?;

        Ok(PostDetails {
            author_username: name_of(&post.author_id),
            likes_count,
            comments: comments
                .into_iter()
                .map(|c| {
                    let name = name_of(&c.author_id);
                    (c, name)
                })
                .collect(),
            post,
        })
    }

    /// [`Self::details`] for every post, preserving order.
    pub async fn details_many(&self, posts: Vec<post::Model>) -> AppResult<Vec<PostDetails>> {
        let mut out = Vec::with_capacity(posts.len());
        for post in posts {
            out.push(self.details(post).await?);
        }
        Ok(out)
    }
}

pub(crate) fn ensure_author(author_id: &str, user_id: &str) -> AppResult<()> {
    if author_id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You do not have permission to perform this action.".to_string(),
        ))
    }
}
