//! Notification repository.

use std::sync::Arc;

use crate::entities::{
    Notification,
    notification::{self, TargetType, Verb},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, sea_query::Expr,
};
use social_common::{AppError, AppResult};

/// Notification repository for database operations.
#[derive(Clone)]
pub struct NotificationRepository {
    db: Arc<DatabaseConnection>,
}

impl NotificationRepository {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new notification on the given connection.
    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: notification::ActiveModel,
    ) -> AppResult<notification::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether an unread `(actor, recipient, verb)` notification exists.
    pub async fn has_unread_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        actor_id: &str,
        recipient_id: &str,
        verb: Verb,
    ) -> AppResult<bool> {
        let count = Notification::find()
            .filter(notification::Column::ActorId.eq(actor_id))
            .filter(notification::Column::RecipientId.eq(recipient_id))
            .filter(notification::Column::Verb.eq(verb))
            .filter(notification::Column::IsRead.eq(false))
            .count(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// All notifications of a recipient, newest first.
    pub async fn find_by_recipient_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        recipient_id: &str,
    ) -> AppResult<Vec<notification::Model>> {
        Notification::find()
            .filter(notification::Column::RecipientId.eq(recipient_id))
            .order_by_desc(notification::Column::CreatedAt)
            .order_by_desc(notification::Column::Id)
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All notifications of a recipient, newest first.
    pub async fn find_by_recipient(
        &self,
        recipient_id: &str,
    ) -> AppResult<Vec<notification::Model>> {
        self.find_by_recipient_in(self.db.as_ref(), recipient_id)
            .await
    }

    /// Mark the given notifications read. Rows outside `ids` are untouched.
    pub async fn mark_as_read_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        ids: &[String],
    ) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = Notification::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::Id.is_in(ids.to_vec()))
            .filter(notification::Column::IsRead.eq(false))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Delete notifications pointing at any of `target_ids` of one kind.
    pub async fn delete_by_targets_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        target_type: TargetType,
        target_ids: &[String],
    ) -> AppResult<u64> {
        if target_ids.is_empty() {
            return Ok(0);
        }

        let result = Notification::delete_many()
            .filter(notification::Column::TargetType.eq(target_type))
            .filter(notification::Column::TargetId.is_in(target_ids.to_vec()))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Count unread notifications of a recipient.
    pub async fn count_unread(&self, recipient_id: &str) -> AppResult<u64> {
        Notification::find()
            .filter(notification::Column::RecipientId.eq(recipient_id))
            .filter(notification::Column::IsRead.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::test_utils::TestDatabase;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn create_test_notification(id: &str, recipient_id: &str, is_read: bool) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            recipient_id: recipient_id.to_string(),
            actor_id: "actor".to_string(),
            verb: Verb::Liked,
            target_type: TargetType::Post,
            target_id: "p1".to_string(),
            is_read,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_recipient() {
        let rows = vec![
            create_test_notification("n2", "user1", false),
            create_test_notification("n1", "user1", true),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([rows])
                .into_connection(),
        );

        let repo = NotificationRepository::new(db);
        let result = repo.find_by_recipient("user1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "n2");
        assert!(!result[0].is_read);
    }

    #[tokio::test]
    async fn test_mark_as_read() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let repo = NotificationRepository::new(Arc::clone(&db));
        let updated = repo
            .mark_as_read_in(db.as_ref(), &["n1".to_string(), "n2".to_string()])
            .await
            .unwrap();

        assert_eq!(updated, 2);
    }

    #[tokio::test]
    async fn test_mark_as_read_empty_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = NotificationRepository::new(Arc::clone(&db));
        let updated = repo.mark_as_read_in(db.as_ref(), &[]).await.unwrap();

        assert_eq!(updated, 0);
    }

    #[tokio::test]
    async fn test_mark_as_read_leaves_other_rows_unread() {
        let db = TestDatabase::new().await.unwrap();
        let alice = db.create_user("alice").await.unwrap();
        let bob = db.create_user("bob").await.unwrap();
        let repo = NotificationRepository::new(db.shared());

        let seed = |id: &str| notification::ActiveModel {
            id: Set(id.to_string()),
            recipient_id: Set(bob.id.clone()),
            actor_id: Set(alice.id.clone()),
            verb: Set(Verb::Followed),
            target_type: Set(TargetType::User),
            target_id: Set(bob.id.clone()),
            is_read: Set(false),
            created_at: Set(Utc::now().into()),
        };
        repo.create_in(db.connection(), seed("n1")).await.unwrap();
        repo.create_in(db.connection(), seed("n2")).await.unwrap();

        let updated = repo
            .mark_as_read_in(db.connection(), &["n1".to_string()])
            .await
            .unwrap();

        assert_eq!(updated, 1);
        assert_eq!(repo.count_unread(&bob.id).await.unwrap(), 1);
        let rows = repo.find_by_recipient(&bob.id).await.unwrap();
        let n2 = rows.iter().find(|n| n.id == "n2").unwrap();
        assert!(!n2.is_read);
    }

    #[tokio::test]
    async fn test_delete_by_targets_empty_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = NotificationRepository::new(Arc::clone(&db));
        let deleted = repo
            .delete_by_targets_in(db.as_ref(), TargetType::Comment, &[])
            .await
            .unwrap();

        assert_eq!(deleted, 0);
    }

    #[tokio::test]
    async fn test_create_in() {
        let created = create_test_notification("n1", "user1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[created.clone()]])
                .into_connection(),
        );

        let repo = NotificationRepository::new(Arc::clone(&db));
        let model: notification::ActiveModel = created.clone().into();
        let result = repo.create_in(db.as_ref(), model).await.unwrap();

        assert_eq!(result, created);
    }
}
