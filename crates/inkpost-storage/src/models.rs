// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================
// Users
// ============================================

/// Raw user row. Carries the password hash; never serialize this type.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUserRow {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

// ============================================
// Posts
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub tags: Vec<String>,
    pub status: String,
    pub views: i64,
    pub likes: Vec<Uuid>,
    pub featured_image: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post row with author and category populated (one join query)
#[derive(Debug, Clone, FromRow)]
pub struct PostWithRefsRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub tags: Vec<String>,
    pub status: String,
    pub views: i64,
    pub likes: Vec<Uuid>,
    pub featured_image: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_username: String,
    pub author_email: String,
    pub author_first_name: Option<String>,
    pub author_last_name: Option<String>,
    pub author_avatar: Option<String>,
    pub category_name: String,
    pub category_slug: String,
}

#[derive(Debug, Clone)]
pub struct CreatePostRow {
    pub title: String,
    pub content: String,
    pub slug: String,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<Uuid>,
    pub tags: Option<Vec<String>>,
    pub status: Option<String>,
    pub featured_image: Option<String>,
    pub published: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Filter for post listing; all fields are conjunctive when present
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub status: Option<String>,
    pub category_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
}

/// Whitelisted sort orders for post listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostSort {
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
    ViewsDesc,
    ViewsAsc,
    TitleAsc,
    TitleDesc,
}

impl PostSort {
    /// SQL ORDER BY clause for this sort. Values are fixed strings, never
    /// interpolated from user input.
    pub fn order_by(&self) -> &'static str {
        match self {
            PostSort::CreatedAtDesc => "created_at DESC",
            PostSort::CreatedAtAsc => "created_at ASC",
            PostSort::ViewsDesc => "views DESC",
            PostSort::ViewsAsc => "views ASC",
            PostSort::TitleAsc => "title ASC",
            PostSort::TitleDesc => "title DESC",
        }
    }

    /// Parse the original API's sort parameter form ("-createdAt" etc.)
    pub fn from_param(param: &str) -> Option<Self> {
        match param {
            "-createdAt" => Some(PostSort::CreatedAtDesc),
            "createdAt" => Some(PostSort::CreatedAtAsc),
            "-views" => Some(PostSort::ViewsDesc),
            "views" => Some(PostSort::ViewsAsc),
            "title" => Some(PostSort::TitleAsc),
            "-title" => Some(PostSort::TitleDesc),
            _ => None,
        }
    }
}

// ============================================
// Categories
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateCategoryRow {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}
