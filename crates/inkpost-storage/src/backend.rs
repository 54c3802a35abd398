// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects
//
// Unified StorageBackend enum that can work with either PostgreSQL
// (production) or in-memory (dev mode) storage.

use anyhow::Result;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::memory::InMemoryDatabase;
use crate::models::*;
use crate::repositories::Database;

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory database (dev mode)
    InMemory(Arc<InMemoryDatabase>),
}

impl StorageBackend {
    /// Create a PostgreSQL storage backend from a database URL
    pub async fn postgres(database_url: &str) -> Result<Self> {
        let db = Database::from_url(database_url).await?;
        Ok(Self::Postgres(db))
    }

    /// Create an in-memory storage backend
    pub fn in_memory() -> Self {
        Self::InMemory(Arc::new(InMemoryDatabase::new()))
    }

    /// Check if this is dev mode (in-memory)
    pub fn is_dev_mode(&self) -> bool {
        matches!(self, Self::InMemory(_))
    }

    /// Get the PostgreSQL pool if using the PostgreSQL backend
    pub fn pool(&self) -> Option<&PgPool> {
        match self {
            Self::Postgres(db) => Some(db.pool()),
            Self::InMemory(_) => None,
        }
    }

    /// Run migrations (no-op for in-memory)
    pub async fn migrate(&self) -> Result<()> {
        match self {
            Self::Postgres(db) => db.migrate().await,
            Self::InMemory(_) => Ok(()),
        }
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        match self {
            Self::Postgres(db) => db.create_user(input).await,
            Self::InMemory(db) => db.create_user(input).await,
        }
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user(id).await,
            Self::InMemory(db) => db.get_user(id).await,
        }
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user_by_email(email).await,
            Self::InMemory(db) => db.get_user_by_email(email).await,
        }
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user_by_username(username).await,
            Self::InMemory(db) => db.get_user_by_username(username).await,
        }
    }

    pub async fn update_user(&self, id: Uuid, input: UpdateUser) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.update_user(id, input).await,
            Self::InMemory(db) => db.update_user(id, input).await,
        }
    }

    pub async fn update_user_password(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.update_user_password(id, password_hash).await,
            Self::InMemory(db) => db.update_user_password(id, password_hash).await,
        }
    }

    // ============================================
    // Posts
    // ============================================

    pub async fn create_post(&self, input: CreatePostRow) -> Result<PostRow> {
        match self {
            Self::Postgres(db) => db.create_post(input).await,
            Self::InMemory(db) => db.create_post(input).await,
        }
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Option<PostWithRefsRow>> {
        match self {
            Self::Postgres(db) => db.get_post(id).await,
            Self::InMemory(db) => db.get_post(id).await,
        }
    }

    pub async fn get_post_by_slug(&self, slug: &str) -> Result<Option<PostWithRefsRow>> {
        match self {
            Self::Postgres(db) => db.get_post_by_slug(slug).await,
            Self::InMemory(db) => db.get_post_by_slug(slug).await,
        }
    }

    pub async fn get_post_row(&self, id: Uuid) -> Result<Option<PostRow>> {
        match self {
            Self::Postgres(db) => db.get_post_row(id).await,
            Self::InMemory(db) => db.get_post_row(id).await,
        }
    }

    pub async fn list_posts(
        &self,
        filter: &PostFilter,
        sort: PostSort,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostWithRefsRow>> {
        match self {
            Self::Postgres(db) => db.list_posts(filter, sort, limit, offset).await,
            Self::InMemory(db) => db.list_posts(filter, sort, limit, offset).await,
        }
    }

    pub async fn count_posts(&self, filter: &PostFilter) -> Result<i64> {
        match self {
            Self::Postgres(db) => db.count_posts(filter).await,
            Self::InMemory(db) => db.count_posts(filter).await,
        }
    }

    pub async fn update_post(&self, id: Uuid, input: UpdatePost) -> Result<Option<PostRow>> {
        match self {
            Self::Postgres(db) => db.update_post(id, input).await,
            Self::InMemory(db) => db.update_post(id, input).await,
        }
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_post(id).await,
            Self::InMemory(db) => db.delete_post(id).await,
        }
    }

    pub async fn increment_post_views(&self, id: Uuid) -> Result<Option<i64>> {
        match self {
            Self::Postgres(db) => db.increment_post_views(id).await,
            Self::InMemory(db) => db.increment_post_views(id).await,
        }
    }

    pub async fn toggle_post_like(&self, id: Uuid, user_id: Uuid) -> Result<Option<PostRow>> {
        match self {
            Self::Postgres(db) => db.toggle_post_like(id, user_id).await,
            Self::InMemory(db) => db.toggle_post_like(id, user_id).await,
        }
    }

    pub async fn post_slug_exists(&self, slug: &str) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.post_slug_exists(slug).await,
            Self::InMemory(db) => db.post_slug_exists(slug).await,
        }
    }

    // ============================================
    // Categories
    // ============================================

    pub async fn create_category(&self, input: CreateCategoryRow) -> Result<CategoryRow> {
        match self {
            Self::Postgres(db) => db.create_category(input).await,
            Self::InMemory(db) => db.create_category(input).await,
        }
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Option<CategoryRow>> {
        match self {
            Self::Postgres(db) => db.get_category(id).await,
            Self::InMemory(db) => db.get_category(id).await,
        }
    }

    pub async fn get_category_by_name(&self, name: &str) -> Result<Option<CategoryRow>> {
        match self {
            Self::Postgres(db) => db.get_category_by_name(name).await,
            Self::InMemory(db) => db.get_category_by_name(name).await,
        }
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryRow>> {
        match self {
            Self::Postgres(db) => db.list_categories().await,
            Self::InMemory(db) => db.list_categories().await,
        }
    }

    pub async fn category_slug_exists(&self, slug: &str) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.category_slug_exists(slug).await,
            Self::InMemory(db) => db.category_slug_exists(slug).await,
        }
    }
}
