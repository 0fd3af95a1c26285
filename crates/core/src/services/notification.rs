//! Notification service.
//!
//! [`NotificationService::notify`] is the only place notifications are
//! created. Interaction sites (follow, like, comment) call
//! [`NotificationService::notify_best_effort`] from inside their own
//! transaction so a failed notification never undoes the interaction.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, Set, TransactionTrait};
use social_common::{AppError, AppResult, IdGenerator};
use social_db::{
    entities::{
        comment,
        notification::{self, TargetType, Verb},
        post, user,
    },
    repositories::{CommentRepository, NotificationRepository, PostRepository, UserRepository},
};

/// Typed reference to the entity a notification is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRef {
    /// Table the target lives in.
    pub kind: TargetType,
    /// Primary key of the target row.
    pub id: String,
}

impl TargetRef {
    /// Reference to a post.
    #[must_use]
    pub fn post(id: impl Into<String>) -> Self {
        Self {
            kind: TargetType::Post,
            id: id.into(),
        }
    }

    /// Reference to a comment.
    #[must_use]
    pub fn comment(id: impl Into<String>) -> Self {
        Self {
            kind: TargetType::Comment,
            id: id.into(),
        }
    }

    /// Reference to a user.
    #[must_use]
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            kind: TargetType::User,
            id: id.into(),
        }
    }
}

/// A resolved notification target.
#[derive(Debug, Clone)]
pub enum Target {
    /// A post that was liked.
    Post(post::Model),
    /// A comment left on the recipient's post.
    Comment(comment::Model),
    /// The followed user.
    User(user::Model),
}

impl Target {
    /// Human-readable kind, e.g. for "alice liked your Post".
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Post(_) => "Post",
            Self::Comment(_) => "Comment",
            Self::User(_) => "User",
        }
    }
}

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    db: Arc<DatabaseConnection>,
    notification_repo: NotificationRepository,
    user_repo: UserRepository,
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            notification_repo: NotificationRepository::new(Arc::clone(&db)),
            user_repo: UserRepository::new(Arc::clone(&db)),
            post_repo: PostRepository::new(Arc::clone(&db)),
            comment_repo: CommentRepository::new(Arc::clone(&db)),
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Resolve a target reference to the entity it points at.
    pub async fn resolve_target<C: ConnectionTrait>(
        &self,
        conn: &C,
        target: &TargetRef,
    ) -> AppResult<Target> {
        let resolved = match target.kind {
            TargetType::Post => self
                .post_repo
                .find_by_id_in(conn, &target.id)
                .await?
                .map(Target::Post),
            TargetType::Comment => self
                .comment_repo
                .find_by_id_in(conn, &target.id)
                .await?
                .map(Target::Comment),
            TargetType::User => self
                .user_repo
                .find_by_id_in(conn, &target.id)
                .await?
                .map(Target::User),
        };

        resolved.ok_or_else(|| {
            AppError::NotFound(format!(
                "Notification target {} {}",
                target.kind.as_str(),
                target.id
            ))
        })
    }

    /// Record that `actor_id` did `verb` to something of `recipient_id`'s.
    ///
    /// Returns `None` when nothing was written: self-notifications are
    /// dropped, and a `followed` event is dropped while an identical one is
    /// still unread.
    pub async fn notify<C: ConnectionTrait>(
        &self,
        conn: &C,
        actor_id: &str,
        recipient_id: &str,
        verb: Verb,
        target: &TargetRef,
    ) -> AppResult<Option<notification::Model>> {
        if actor_id == recipient_id {
            return Ok(None);
        }

        if verb == Verb::Followed
            && self
                .notification_repo
                .has_unread_in(conn, actor_id, recipient_id, verb)
                .await?
        {
            tracing::debug!(
                actor_id = %actor_id,
                recipient_id = %recipient_id,
                "Skipping duplicate follow notification"
            );
            return Ok(None);
        }

        self.resolve_target(conn, target).await?;

        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipient_id: Set(recipient_id.to_string()),
            actor_id: Set(actor_id.to_string()),
            verb: Set(verb),
            target_type: Set(target.kind),
            target_id: Set(target.id.clone()),
            is_read: Set(false),
            created_at: Set(Utc::now().into()),
        };

        let created = self.notification_repo.create_in(conn, model).await?;

        tracing::debug!(
            notification_id = %created.id,
            verb = verb.as_str(),
            recipient_id = %recipient_id,
            "Created notification"
        );

        Ok(Some(created))
    }

    /// Run [`Self::notify`] inside a savepoint of `txn`.
    ///
    /// Failures are logged and rolled back to the savepoint; the caller's
    /// transaction stays usable.
    pub async fn notify_best_effort(
        &self,
        txn: &DatabaseTransaction,
        actor_id: &str,
        recipient_id: &str,
        verb: Verb,
        target: TargetRef,
    ) -> Option<notification::Model> {
        let savepoint = match txn.begin().await {
            Ok(sp) => sp,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to open notification savepoint");
                return None;
            }
        };

        match self
            .notify(&savepoint, actor_id, recipient_id, verb, &target)
            .await
        {
            Ok(created) => match savepoint.commit().await {
                Ok(()) => created,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to release notification savepoint");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    verb = verb.as_str(),
                    actor_id = %actor_id,
                    recipient_id = %recipient_id,
                    "Failed to create notification"
                );
                if let Err(e) = savepoint.rollback().await {
                    tracing::warn!(error = %e, "Failed to roll back notification savepoint");
                }
                None
            }
        }
    }

    /// List a user's notifications (newest first) and mark them read.
    ///
    /// Rows come back as they were before the update, so unread items
    /// show `is_read = false` exactly once. Only the returned rows are
    /// marked.
    pub async fn list_and_mark_read(&self, user_id: &str) -> AppResult<Vec<notification::Model>> {
        let txn = self.db.begin().await?;

        let notifications = self
            .notification_repo
            .find_by_recipient_in(&txn, user_id)
            .await?;
        // Only rows this call returned; anything inserted since stays unread
        let unread: Vec<String> = notifications
            .iter()
            .filter(|n| !n.is_read)
            .map(|n| n.id.clone())
            .collect();
        let marked = self
            .notification_repo
            .mark_as_read_in(&txn, &unread)
            .await?;

        txn.commit().await?;

        if marked > 0 {
            tracing::debug!(user_id = %user_id, marked, "Marked notifications as read");
        }

        Ok(notifications)
    }

    /// Count unread notifications.
    pub async fn unread_count(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }

    /// Delete notifications that point at the given targets.
    pub async fn purge_targets_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        kind: TargetType,
        ids: &[String],
    ) -> AppResult<u64> {
        self.notification_repo
            .delete_by_targets_in(conn, kind, ids)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use social_db::test_utils::TestDatabase;

    #[test]
    fn test_target_ref_constructors() {
        assert_eq!(TargetRef::post("p1").kind, TargetType::Post);
        assert_eq!(TargetRef::comment("c1").kind, TargetType::Comment);
        let user = TargetRef::user("u1");
        assert_eq!(user.kind, TargetType::User);
        assert_eq!(user.id, "u1");
    }

    #[tokio::test]
    async fn test_notify_self_is_noop() {
        // No results appended: any query would fail
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = NotificationService::new(Arc::clone(&db));

        let result = service
            .notify(
                db.as_ref(),
                "user1",
                "user1",
                Verb::Liked,
                &TargetRef::post("p1"),
            )
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_notify_creates_unread_notification() {
        let db = TestDatabase::new().await.unwrap();
        let alice = db.create_user("alice").await.unwrap();
        let bob = db.create_user("bob").await.unwrap();
        let post = db.create_post(&bob.id, "Hello", db.at(0)).await.unwrap();
        let service = NotificationService::new(db.shared());

        let created = service
            .notify(
                db.connection(),
                &alice.id,
                &bob.id,
                Verb::Liked,
                &TargetRef::post(&post.id),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(created.actor_id, alice.id);
        assert_eq!(created.recipient_id, bob.id);
        assert_eq!(created.target_type, TargetType::Post);
        assert_eq!(created.target_id, post.id);
        assert!(!created.is_read);
    }

    #[tokio::test]
    async fn test_notify_dangling_target_is_not_found() {
        let db = TestDatabase::new().await.unwrap();
        let alice = db.create_user("alice").await.unwrap();
        let bob = db.create_user("bob").await.unwrap();
        let service = NotificationService::new(db.shared());

        let result = service
            .notify(
                db.connection(),
                &alice.id,
                &bob.id,
                Verb::Liked,
                &TargetRef::post("missing"),
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_followed_deduplicated_while_unread() {
        let db = TestDatabase::new().await.unwrap();
        let alice = db.create_user("alice").await.unwrap();
        let bob = db.create_user("bob").await.unwrap();
        let service = NotificationService::new(db.shared());
        let target = TargetRef::user(&bob.id);

        let first = service
            .notify(db.connection(), &alice.id, &bob.id, Verb::Followed, &target)
            .await
            .unwrap();
        let second = service
            .notify(db.connection(), &alice.id, &bob.id, Verb::Followed, &target)
            .await
            .unwrap();

        assert!(first.is_some());
        assert!(second.is_none());

        // Once read, a new follow event notifies again
        service.list_and_mark_read(&bob.id).await.unwrap();
        let third = service
            .notify(db.connection(), &alice.id, &bob.id, Verb::Followed, &target)
            .await
            .unwrap();
        assert!(third.is_some());
    }

    #[tokio::test]
    async fn test_liked_never_deduplicated() {
        let db = TestDatabase::new().await.unwrap();
        let alice = db.create_user("alice").await.unwrap();
        let bob = db.create_user("bob").await.unwrap();
        let post = db.create_post(&bob.id, "Hello", db.at(0)).await.unwrap();
        let service = NotificationService::new(db.shared());
        let target = TargetRef::post(&post.id);

        for _ in 0..2 {
            let created = service
                .notify(db.connection(), &alice.id, &bob.id, Verb::Liked, &target)
                .await
                .unwrap();
            assert!(created.is_some());
        }

        assert_eq!(service.unread_count(&bob.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_of_read_rows_issues_no_update() {
        let read = notification::Model {
            id: "n1".to_string(),
            recipient_id: "user1".to_string(),
            actor_id: "user2".to_string(),
            verb: Verb::Liked,
            target_type: TargetType::Post,
            target_id: "p1".to_string(),
            is_read: true,
            created_at: Utc::now().into(),
        };
        // No exec results appended: an UPDATE would fail
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![read]])
                .into_connection(),
        );
        let service = NotificationService::new(db);

        let listed = service.list_and_mark_read("user1").await.unwrap();

        assert_eq!(listed.len(), 1);
        assert!(listed[0].is_read);
    }

    #[tokio::test]
    async fn test_list_and_mark_read_transition() {
        let db = TestDatabase::new().await.unwrap();
        let alice = db.create_user("alice").await.unwrap();
        let bob = db.create_user("bob").await.unwrap();
        let post = db.create_post(&bob.id, "Hello", db.at(0)).await.unwrap();
        let service = NotificationService::new(db.shared());

        service
            .notify(
                db.connection(),
                &alice.id,
                &bob.id,
                Verb::Followed,
                &TargetRef::user(&bob.id),
            )
            .await
            .unwrap();
        service
            .notify(
                db.connection(),
                &alice.id,
                &bob.id,
                Verb::Liked,
                &TargetRef::post(&post.id),
            )
            .await
            .unwrap();

        let first = service.list_and_mark_read(&bob.id).await.unwrap();
        let second = service.list_and_mark_read(&bob.id).await.unwrap();

        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|n| !n.is_read));
        // Newest first
        assert_eq!(first[0].verb, Verb::Liked);

        let first_ids: Vec<_> = first.iter().map(|n| n.id.clone()).collect();
        let second_ids: Vec<_> = second.iter().map(|n| n.id.clone()).collect();
        assert_eq!(first_ids, second_ids);
        assert!(second.iter().all(|n| n.is_read));
        assert_eq!(service.unread_count(&bob.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_best_effort_failure_keeps_transaction_usable() {
        let db = TestDatabase::new().await.unwrap();
        let alice = db.create_user("alice").await.unwrap();
        let bob = db.create_user("bob").await.unwrap();
        let service = NotificationService::new(db.shared());

        let txn = db.connection().begin().await.unwrap();
        let created = service
            .notify_best_effort(
                &txn,
                &alice.id,
                &bob.id,
                Verb::Liked,
                TargetRef::post("missing"),
            )
            .await;
        assert!(created.is_none());

        // The outer transaction still works after the savepoint rollback
        let created = service
            .notify_best_effort(
                &txn,
                &alice.id,
                &bob.id,
                Verb::Followed,
                TargetRef::user(&bob.id),
            )
            .await;
        assert!(created.is_some());
        txn.commit().await.unwrap();

        assert_eq!(service.unread_count(&bob.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_resolve_target_user() {
        let db = TestDatabase::new().await.unwrap();
        let alice = db.create_user("alice").await.unwrap();
        let service = NotificationService::new(db.shared());

        let target = service
            .resolve_target(db.connection(), &TargetRef::user(&alice.id))
            .await
            .unwrap();

        assert!(matches!(&target, Target::User(u) if u.username == "alice"));
        assert_eq!(target.label(), "User");
    }
}
