//! Comment repository.

use std::sync::Arc;

use crate::entities::{Comment, comment};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use social_common::{AppError, AppResult};

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        self.find_by_id_in(self.db.as_ref(), id).await
    }

    /// Find a comment by ID on the given connection.
    pub async fn find_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a comment by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<comment::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::CommentNotFound(id.to_string()))
    }

    /// List comments, optionally restricted to one post, oldest first.
    pub async fn list(
        &self,
        post_id: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<comment::Model>> {
        let mut query = Comment::find();

        if let Some(post_id) = post_id {
            query = query.filter(comment::Column::PostId.eq(post_id));
        }

        query
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All comments of a post, oldest first.
    pub async fn find_by_post(&self, post_id: &str) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// IDs of every comment on a post, on the given connection.
    pub async fn ids_by_post_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        post_id: &str,
    ) -> AppResult<Vec<String>> {
        let comments = Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(comments.into_iter().map(|c| c.id).collect())
    }

    /// Create a new comment on the given connection.
    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: comment::ActiveModel,
    ) -> AppResult<comment::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a comment.
    pub async fn update(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a comment on the given connection.
    pub async fn delete_in<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<()> {
        Comment::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
