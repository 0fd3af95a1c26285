//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, post};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Select,
};
use social_common::{AppError, AppResult};

/// Sort order for post listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostOrdering {
    /// Oldest first.
    CreatedAtAsc,
    /// Newest first.
    #[default]
    CreatedAtDesc,
    /// Title A-Z.
    TitleAsc,
    /// Title Z-A.
    TitleDesc,
}

impl PostOrdering {
    /// Parse a query-string ordering (`created_at`, `-created_at`, `title`, `-title`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created_at" => Some(Self::CreatedAtAsc),
            "-created_at" => Some(Self::CreatedAtDesc),
            "title" => Some(Self::TitleAsc),
            "-title" => Some(Self::TitleDesc),
            _ => None,
        }
    }

    fn apply(self, query: Select<Post>) -> Select<Post> {
        match self {
            Self::CreatedAtAsc => query
                .order_by_asc(post::Column::CreatedAt)
                .order_by_asc(post::Column::Id),
            Self::CreatedAtDesc => query
                .order_by_desc(post::Column::CreatedAt)
                .order_by_desc(post::Column::Id),
            Self::TitleAsc => query
                .order_by_asc(post::Column::Title)
                .order_by_desc(post::Column::CreatedAt),
            Self::TitleDesc => query
                .order_by_desc(post::Column::Title)
                .order_by_desc(post::Column::CreatedAt),
        }
    }
}

/// Filters for [`PostRepository::list`].
#[derive(Debug, Clone, Default)]
pub struct PostListQuery {
    /// Only posts by this author.
    pub author_id: Option<String>,
    /// Substring match on title or content.
    pub search: Option<String>,
    pub ordering: PostOrdering,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        self.find_by_id_in(self.db.as_ref(), id).await
    }

    /// Find a post by ID on the given connection.
    pub async fn find_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// List posts with optional filters.
    pub async fn list(&self, query: &PostListQuery) -> AppResult<Vec<post::Model>> {
        let mut select = Post::find();

        if let Some(author_id) = &query.author_id {
            select = select.filter(post::Column::AuthorId.eq(author_id.as_str()));
        }

        if let Some(term) = query.search.as_deref().filter(|t| !t.is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(post::Column::Title.contains(term))
                    .add(post::Column::Content.contains(term)),
            );
        }

        select = query.ordering.apply(select);

        if let Some(limit) = query.limit {
            select = select.limit(limit);
        }
        if let Some(offset) = query.offset {
            select = select.offset(offset);
        }

        select
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Posts whose author is in `author_ids`, newest first.
    ///
    /// An empty author set yields an empty list without touching the database.
    pub async fn find_by_authors(
        &self,
        author_ids: &[String],
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> AppResult<Vec<post::Model>> {
        if author_ids.is_empty() {
            return Ok(vec![]);
        }

        let mut select = Post::find()
            .filter(post::Column::AuthorId.is_in(author_ids.to_vec()))
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id);

        if let Some(limit) = limit {
            select = select.limit(limit);
        }
        if let Some(offset) = offset {
            select = select.offset(offset);
        }

        select
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post on the given connection. Comments and likes cascade.
    pub async fn delete_in<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
