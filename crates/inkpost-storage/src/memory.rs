// In-memory storage implementation for dev mode
//
// Provides the same API as the Postgres repository backed by HashMaps, so the
// server can run (and tests can exercise the full stack) without a database.
// All data is lost on restart.

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::*;

#[derive(Default)]
pub struct InMemoryDatabase {
    users: RwLock<HashMap<Uuid, UserRow>>,
    posts: RwLock<HashMap<Uuid, PostRow>>,
    categories: RwLock<HashMap<Uuid, CategoryRow>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn with_refs(&self, post: PostRow) -> Option<PostWithRefsRow> {
        let users = self.users.read();
        let categories = self.categories.read();
        let author = users.get(&post.author_id)?;
        let category = categories.get(&post.category_id)?;
        Some(PostWithRefsRow {
            id: post.id,
            title: post.title,
            content: post.content,
            slug: post.slug,
            author_id: post.author_id,
            category_id: post.category_id,
            tags: post.tags,
            status: post.status,
            views: post.views,
            likes: post.likes,
            featured_image: post.featured_image,
            published: post.published,
            published_at: post.published_at,
            created_at: post.created_at,
            updated_at: post.updated_at,
            author_username: author.username.clone(),
            author_email: author.email.clone(),
            author_first_name: author.first_name.clone(),
            author_last_name: author.last_name.clone(),
            author_avatar: author.avatar.clone(),
            category_name: category.name.clone(),
            category_slug: category.slug.clone(),
        })
    }

    fn matches(post: &PostRow, filter: &PostFilter) -> bool {
        if let Some(status) = &filter.status {
            if &post.status != status {
                return false;
            }
        }
        if let Some(category_id) = filter.category_id {
            if post.category_id != category_id {
                return false;
            }
        }
        if let Some(author_id) = filter.author_id {
            if post.author_id != author_id {
                return false;
            }
        }
        true
    }

    fn sort_posts(posts: &mut [PostRow], sort: PostSort) {
        match sort {
            PostSort::CreatedAtDesc => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            PostSort::CreatedAtAsc => posts.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            PostSort::ViewsDesc => posts.sort_by(|a, b| b.views.cmp(&a.views)),
            PostSort::ViewsAsc => posts.sort_by(|a, b| a.views.cmp(&b.views)),
            PostSort::TitleAsc => posts.sort_by(|a, b| a.title.cmp(&b.title)),
            PostSort::TitleDesc => posts.sort_by(|a, b| b.title.cmp(&a.title)),
        }
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let now = Self::now();
        let id = Uuid::now_v7();
        let row = UserRow {
            id,
            username: input.username,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            avatar: None,
            role: "user".to_string(),
            is_active: true,
            password_hash: input.password_hash,
            created_at: now,
            updated_at: now,
        };
        self.users.write().insert(id, row.clone());
        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        Ok(self.users.read().get(&id).cloned())
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    pub async fn update_user(&self, id: Uuid, input: UpdateUser) -> Result<Option<UserRow>> {
        let mut users = self.users.write();
        if let Some(user) = users.get_mut(&id) {
            if let Some(first_name) = input.first_name {
                user.first_name = Some(first_name);
            }
            if let Some(last_name) = input.last_name {
                user.last_name = Some(last_name);
            }
            if let Some(avatar) = input.avatar {
                user.avatar = Some(avatar);
            }
            if let Some(role) = input.role {
                user.role = role;
            }
            if let Some(is_active) = input.is_active {
                user.is_active = is_active;
            }
            user.updated_at = Self::now();
            return Ok(Some(user.clone()));
        }
        Ok(None)
    }

    pub async fn update_user_password(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        let mut users = self.users.write();
        if let Some(user) = users.get_mut(&id) {
            user.password_hash = password_hash.to_string();
            user.updated_at = Self::now();
            return Ok(true);
        }
        Ok(false)
    }

    // ============================================
    // Posts
    // ============================================

    pub async fn create_post(&self, input: CreatePostRow) -> Result<PostRow> {
        let now = Self::now();
        let id = Uuid::now_v7();
        let row = PostRow {
            id,
            title: input.title,
            content: input.content,
            slug: input.slug,
            author_id: input.author_id,
            category_id: input.category_id,
            tags: input.tags,
            status: "draft".to_string(),
            views: 0,
            likes: Vec::new(),
            featured_image: input.featured_image,
            published: false,
            published_at: None,
            created_at: now,
            updated_at: now,
        };
        self.posts.write().insert(id, row.clone());
        Ok(row)
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Option<PostWithRefsRow>> {
        let post = self.posts.read().get(&id).cloned();
        Ok(post.and_then(|p| self.with_refs(p)))
    }

    pub async fn get_post_by_slug(&self, slug: &str) -> Result<Option<PostWithRefsRow>> {
        let post = self
            .posts
            .read()
            .values()
            .find(|p| p.slug == slug)
            .cloned();
        Ok(post.and_then(|p| self.with_refs(p)))
    }

    pub async fn get_post_row(&self, id: Uuid) -> Result<Option<PostRow>> {
        Ok(self.posts.read().get(&id).cloned())
    }

    pub async fn list_posts(
        &self,
        filter: &PostFilter,
        sort: PostSort,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostWithRefsRow>> {
        let mut posts: Vec<PostRow> = self
            .posts
            .read()
            .values()
            .filter(|p| Self::matches(p, filter))
            .cloned()
            .collect();
        Self::sort_posts(&mut posts, sort);

        Ok(posts
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .filter_map(|p| self.with_refs(p))
            .collect())
    }

    pub async fn count_posts(&self, filter: &PostFilter) -> Result<i64> {
        Ok(self
            .posts
            .read()
            .values()
            .filter(|p| Self::matches(p, filter))
            .count() as i64)
    }

    pub async fn update_post(&self, id: Uuid, input: UpdatePost) -> Result<Option<PostRow>> {
        let mut posts = self.posts.write();
        if let Some(post) = posts.get_mut(&id) {
            if let Some(title) = input.title {
                post.title = title;
            }
            if let Some(content) = input.content {
                post.content = content;
            }
            if let Some(category_id) = input.category_id {
                post.category_id = category_id;
            }
            if let Some(tags) = input.tags {
                post.tags = tags;
            }
            if let Some(status) = input.status {
                post.status = status;
            }
            if let Some(featured_image) = input.featured_image {
                post.featured_image = Some(featured_image);
            }
            if let Some(published) = input.published {
                post.published = published;
            }
            if let Some(published_at) = input.published_at {
                post.published_at = Some(published_at);
            }
            post.updated_at = Self::now();
            return Ok(Some(post.clone()));
        }
        Ok(None)
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<bool> {
        Ok(self.posts.write().remove(&id).is_some())
    }

    pub async fn increment_post_views(&self, id: Uuid) -> Result<Option<i64>> {
        let mut posts = self.posts.write();
        if let Some(post) = posts.get_mut(&id) {
            post.views += 1;
            return Ok(Some(post.views));
        }
        Ok(None)
    }

    pub async fn toggle_post_like(&self, id: Uuid, user_id: Uuid) -> Result<Option<PostRow>> {
        let mut posts = self.posts.write();
        if let Some(post) = posts.get_mut(&id) {
            if let Some(pos) = post.likes.iter().position(|l| *l == user_id) {
                post.likes.remove(pos);
            } else {
                post.likes.push(user_id);
            }
            post.updated_at = Self::now();
            return Ok(Some(post.clone()));
        }
        Ok(None)
    }

    pub async fn post_slug_exists(&self, slug: &str) -> Result<bool> {
        Ok(self.posts.read().values().any(|p| p.slug == slug))
    }

    // ============================================
    // Categories
    // ============================================

    pub async fn create_category(&self, input: CreateCategoryRow) -> Result<CategoryRow> {
        let now = Self::now();
        let id = Uuid::now_v7();
        let row = CategoryRow {
            id,
            name: input.name,
            slug: input.slug,
            description: input.description,
            icon: input.icon,
            color: input.color.unwrap_or_else(|| "#007bff".to_string()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.categories.write().insert(id, row.clone());
        Ok(row)
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Option<CategoryRow>> {
        Ok(self.categories.read().get(&id).cloned())
    }

    pub async fn get_category_by_name(&self, name: &str) -> Result<Option<CategoryRow>> {
        Ok(self
            .categories
            .read()
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryRow>> {
        let mut rows: Vec<CategoryRow> = self
            .categories
            .read()
            .values()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    pub async fn category_slug_exists(&self, slug: &str) -> Result<bool> {
        Ok(self.categories.read().values().any(|c| c.slug == slug))
    }
}
