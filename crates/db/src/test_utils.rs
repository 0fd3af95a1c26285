//! Test utilities for database operations.
//!
//! Provides an in-memory `SQLite` database with the real migrations applied,
//! plus a few seeding helpers for behavioural tests.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, DbErr, Set,
};
use sea_orm_migration::MigratorTrait;
use social_common::IdGenerator;
use std::sync::Arc;
use tracing::info;

use crate::entities::{comment, post, user};
use crate::migrations::Migrator;

/// In-memory `SQLite` URL.
pub const SQLITE_MEMORY_URL: &str = "sqlite::memory:";

/// A migrated, throwaway test database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
    base_time: DateTime<Utc>,
}

impl TestDatabase {
    /// Create a fresh in-memory database and run all migrations.
    ///
    /// The pool is pinned to a single connection because every `SQLite`
    /// memory connection owns a separate database.
    pub async fn new() -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new(SQLITE_MEMORY_URL);
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        Migrator::up(&conn, None).await?;

        info!("Created in-memory test database");

        Ok(Self {
            conn: Arc::new(conn),
            id_gen: IdGenerator::new(),
            base_time: Utc::now(),
        })
    }

    /// Get the database connection.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        self.conn.as_ref()
    }

    /// Shared handle for services and repositories.
    #[must_use]
    pub fn shared(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    /// Timestamp `seconds` after this database was created.
    ///
    /// Seeding with explicit offsets keeps newest-first assertions stable.
    #[must_use]
    pub fn at(&self, seconds: i64) -> DateTime<FixedOffset> {
        (self.base_time + Duration::seconds(seconds)).fixed_offset()
    }

    /// Insert a user with a placeholder password hash.
    pub async fn create_user(&self, username: &str) -> Result<user::Model, DbErr> {
        user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(username.to_string()),
            email: Set(format!("{username}@example.com")),
            password_hash: Set("!".to_string()),
            token: Set(Some(self.id_gen.generate_token())),
            bio: Set(None),
            profile_picture: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        }
        .insert(self.connection())
        .await
    }

    /// Insert a post authored by `author_id` at the given time.
    pub async fn create_post(
        &self,
        author_id: &str,
        title: &str,
        created_at: DateTime<FixedOffset>,
    ) -> Result<post::Model, DbErr> {
        post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author_id.to_string()),
            title: Set(title.to_string()),
            content: Set(format!("{title} body")),
            created_at: Set(created_at),
            updated_at: Set(None),
        }
        .insert(self.connection())
        .await
    }

    /// Insert a comment on `post_id`.
    pub async fn create_comment(
        &self,
        post_id: &str,
        author_id: &str,
        content: &str,
    ) -> Result<comment::Model, DbErr> {
        comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post_id.to_string()),
            author_id: Set(author_id.to_string()),
            content: Set(content.to_string()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        }
        .insert(self.connection())
        .await
    }
}
