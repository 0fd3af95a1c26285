//! Post like repository.

use std::sync::Arc;

use crate::entities::{PostLike, post_like};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    sea_query::OnConflict,
};
use social_common::{AppError, AppResult};

/// Post like repository for database operations.
#[derive(Clone)]
pub struct PostLikeRepository {
    db: Arc<DatabaseConnection>,
}

impl PostLikeRepository {
    /// Create a new post like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a like unless `(user_id, post_id)` already exists.
    ///
    /// Returns `true` when a row was written.
    pub async fn insert_if_absent_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: post_like::ActiveModel,
    ) -> AppResult<bool> {
        let inserted = PostLike::insert(model)
            .on_conflict(
                OnConflict::columns([post_like::Column::UserId, post_like::Column::PostId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted > 0)
    }

    /// Delete the like for a pair. Returns the number of rows removed.
    pub async fn delete_by_pair_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<u64> {
        let result = PostLike::delete_many()
            .filter(post_like::Column::UserId.eq(user_id))
            .filter(post_like::Column::PostId.eq(post_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Check whether a user has liked a post.
    pub async fn exists(&self, user_id: &str, post_id: &str) -> AppResult<bool> {
        let like = PostLike::find()
            .filter(post_like::Column::UserId.eq(user_id))
            .filter(post_like::Column::PostId.eq(post_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(like.is_some())
    }

    /// Count likes on a post.
    pub async fn count_by_post(&self, post_id: &str) -> AppResult<u64> {
        PostLike::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
