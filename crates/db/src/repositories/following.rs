//! Following repository.

use std::sync::Arc;

use crate::entities::{Following, following};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    sea_query::OnConflict,
};
use social_common::{AppError, AppResult};

/// Following repository for database operations.
#[derive(Clone)]
pub struct FollowingRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowingRepository {
    /// Create a new following repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert an edge unless `(follower_id, followee_id)` already exists.
    ///
    /// Returns `true` when a row was written. The unique index decides, so
    /// concurrent callers cannot both observe "absent".
    pub async fn insert_if_absent_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: following::ActiveModel,
    ) -> AppResult<bool> {
        let inserted = Following::insert(model)
            .on_conflict(
                OnConflict::columns([
                    following::Column::FollowerId,
                    following::Column::FolloweeId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted > 0)
    }

    /// Delete the edge for a pair. Returns the number of rows removed.
    pub async fn delete_by_pair_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        follower_id: &str,
        followee_id: &str,
    ) -> AppResult<u64> {
        let result = Following::delete_many()
            .filter(following::Column::FollowerId.eq(follower_id))
            .filter(following::Column::FolloweeId.eq(followee_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Find the edge for a pair.
    pub async fn find_by_pair(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> AppResult<Option<following::Model>> {
        Following::find()
            .filter(following::Column::FollowerId.eq(follower_id))
            .filter(following::Column::FolloweeId.eq(followee_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user is following another user.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(follower_id, followee_id).await?.is_some())
    }

    /// IDs of the users `user_id` follows.
    pub async fn followee_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        let edges = Following::find()
            .filter(following::Column::FollowerId.eq(user_id))
            .order_by_asc(following::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(edges.into_iter().map(|f| f.followee_id).collect())
    }

    /// IDs of the users following `user_id`.
    pub async fn follower_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        let edges = Following::find()
            .filter(following::Column::FolloweeId.eq(user_id))
            .order_by_asc(following::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(edges.into_iter().map(|f| f.follower_id).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn create_test_following(id: &str, follower_id: &str, followee_id: &str) -> following::Model {
        following::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            followee_id: followee_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn new_edge(follower_id: &str, followee_id: &str) -> following::ActiveModel {
        following::ActiveModel {
            id: Set("f1".to_string()),
            follower_id: Set(follower_id.to_string()),
            followee_id: Set(followee_id.to_string()),
            created_at: Set(Utc::now().into()),
        }
    }

    #[tokio::test]
    async fn test_insert_if_absent_inserted() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = FollowingRepository::new(Arc::clone(&db));
        let inserted = repo
            .insert_if_absent_in(db.as_ref(), new_edge("user1", "user2"))
            .await
            .unwrap();

        assert!(inserted);
    }

    #[tokio::test]
    async fn test_insert_if_absent_conflict() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = FollowingRepository::new(Arc::clone(&db));
        let inserted = repo
            .insert_if_absent_in(db.as_ref(), new_edge("user1", "user2"))
            .await
            .unwrap();

        assert!(!inserted);
    }

    #[tokio::test]
    async fn test_delete_by_pair() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = FollowingRepository::new(Arc::clone(&db));
        let removed = repo
            .delete_by_pair_in(db.as_ref(), "user1", "user2")
            .await
            .unwrap();

        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn test_is_following() {
        let edge = create_test_following("f1", "user1", "user2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![edge]])
                .append_query_results([Vec::<following::Model>::new()])
                .into_connection(),
        );

        let repo = FollowingRepository::new(db);
        assert!(repo.is_following("user1", "user2").await.unwrap());
        assert!(!repo.is_following("user2", "user1").await.unwrap());
    }

    #[tokio::test]
    async fn test_followee_ids() {
        let edges = vec![
            create_test_following("f1", "user1", "user2"),
            create_test_following("f2", "user1", "user3"),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([edges])
                .into_connection(),
        );

        let repo = FollowingRepository::new(db);
        let ids = repo.followee_ids("user1").await.unwrap();

        assert_eq!(ids, vec!["user2".to_string(), "user3".to_string()]);
    }

    #[tokio::test]
    async fn test_follower_ids() {
        let edges = vec![create_test_following("f1", "user2", "user1")];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([edges])
                .into_connection(),
        );

        let repo = FollowingRepository::new(db);
        let ids = repo.follower_ids("user1").await.unwrap();

        assert_eq!(ids, vec!["user2".to_string()]);
    }
}
