// Post service: CRUD, view counting, like toggling

use chrono::Utc;
use inkpost_core::{slugify, CategoryRef, Post, PostAuthor, PostStatus};
use inkpost_storage::{
    models::{CreatePostRow, PostFilter, PostSort, PostWithRefsRow, UpdatePost},
    StorageBackend,
};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::auth::middleware::AuthUser;

pub struct PostService {
    db: StorageBackend,
}

pub struct CreatePostInput {
    pub title: String,
    pub content: String,
    pub category_id: Uuid,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
}

#[derive(Default)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<Uuid>,
    pub tags: Option<Vec<String>>,
    pub status: Option<PostStatus>,
    pub featured_image: Option<String>,
}

pub struct ListPostsInput {
    pub filter: PostFilter,
    pub sort: PostSort,
    pub page: i64,
    pub limit: i64,
}

impl PostService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    pub async fn list(&self, input: ListPostsInput) -> Result<(Vec<Post>, i64), ApiError> {
        let offset = (input.page - 1) * input.limit;
        let rows = self
            .db
            .list_posts(&input.filter, input.sort, input.limit, offset)
            .await
            .map_err(ApiError::internal)?;
        let total = self
            .db
            .count_posts(&input.filter)
            .await
            .map_err(ApiError::internal)?;

        Ok((rows.into_iter().map(row_to_post).collect(), total))
    }

    /// Fetch a post and count the view; the returned post reflects the
    /// incremented counter.
    pub async fn get(&self, id: Uuid) -> Result<Post, ApiError> {
        let row = self
            .db
            .get_post(id)
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::not_found("Post not found"))?;

        let views = self
            .db
            .increment_post_views(id)
            .await
            .map_err(ApiError::internal)?
            .unwrap_or(row.views);

        let mut post = row_to_post(row);
        post.views = views;
        Ok(post)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Post, ApiError> {
        let row = self
            .db
            .get_post_by_slug(slug)
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::not_found("Post not found"))?;

        let views = self
            .db
            .increment_post_views(row.id)
            .await
            .map_err(ApiError::internal)?
            .unwrap_or(row.views);

        let mut post = row_to_post(row);
        post.views = views;
        Ok(post)
    }

    pub async fn create(&self, author: &AuthUser, input: CreatePostInput) -> Result<Post, ApiError> {
        self.db
            .get_category(input.category_id)
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::not_found("Category not found"))?;

        let slug = self.unique_slug(&input.title).await?;
        let row = self
            .db
            .create_post(CreatePostRow {
                title: input.title,
                content: input.content,
                slug,
                author_id: author.id,
                category_id: input.category_id,
                tags: input.tags,
                featured_image: input.featured_image,
            })
            .await
            .map_err(ApiError::internal)?;

        tracing::info!(post_id = %row.id, author_id = %author.id, "post created");

        let joined = self
            .db
            .get_post(row.id)
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::internal(anyhow::anyhow!("created post missing")))?;
        Ok(row_to_post(joined))
    }

    pub async fn update(
        &self,
        user: &AuthUser,
        id: Uuid,
        input: UpdatePostInput,
    ) -> Result<Post, ApiError> {
        let row = self
            .db
            .get_post_row(id)
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::not_found("Post not found"))?;

        if row.author_id != user.id && !user.is_admin() {
            return Err(ApiError::forbidden("Not authorized to update this post"));
        }

        if let Some(category_id) = input.category_id {
            self.db
                .get_category(category_id)
                .await
                .map_err(ApiError::internal)?
                .ok_or_else(|| ApiError::not_found("Category not found"))?;
        }

        // Transitioning to published stamps the publication exactly once;
        // a post published before keeps its original timestamp
        let (published, published_at) = match input.status {
            Some(PostStatus::Published) if !row.published => (Some(true), Some(Utc::now())),
            _ => (None, None),
        };

        self.db
            .update_post(
                id,
                UpdatePost {
                    title: input.title,
                    content: input.content,
                    category_id: input.category_id,
                    tags: input.tags,
                    status: input.status.map(|s| s.to_string()),
                    featured_image: input.featured_image,
                    published,
                    published_at,
                },
            )
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::not_found("Post not found"))?;

        let joined = self
            .db
            .get_post(id)
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::not_found("Post not found"))?;
        Ok(row_to_post(joined))
    }

    pub async fn delete(&self, user: &AuthUser, id: Uuid) -> Result<(), ApiError> {
        let row = self
            .db
            .get_post_row(id)
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::not_found("Post not found"))?;

        if row.author_id != user.id && !user.is_admin() {
            return Err(ApiError::forbidden("Not authorized to delete this post"));
        }

        self.db.delete_post(id).await.map_err(ApiError::internal)?;
        tracing::info!(post_id = %id, user_id = %user.id, "post deleted");
        Ok(())
    }

    /// Toggle the caller's like, returning the new count and whether the
    /// caller now likes the post.
    pub async fn toggle_like(&self, user_id: Uuid, id: Uuid) -> Result<(i64, bool), ApiError> {
        let row = self
            .db
            .toggle_post_like(id, user_id)
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::not_found("Post not found"))?;

        let is_liked = row.likes.contains(&user_id);
        Ok((row.likes.len() as i64, is_liked))
    }

    async fn unique_slug(&self, title: &str) -> Result<String, ApiError> {
        let base = {
            let s = slugify(title);
            if s.is_empty() {
                "post".to_string()
            } else {
                s
            }
        };
        let mut slug = base.clone();
        let mut n = 2;
        while self
            .db
            .post_slug_exists(&slug)
            .await
            .map_err(ApiError::internal)?
        {
            slug = format!("{base}-{n}");
            n += 1;
        }
        Ok(slug)
    }
}

fn row_to_post(row: PostWithRefsRow) -> Post {
    Post {
        id: row.id,
        title: row.title,
        content: row.content,
        slug: row.slug,
        author: PostAuthor {
            id: row.author_id,
            username: row.author_username,
            email: row.author_email,
            first_name: row.author_first_name,
            last_name: row.author_last_name,
            avatar: row.author_avatar,
        },
        category: CategoryRef {
            id: row.category_id,
            name: row.category_name,
            slug: row.category_slug,
        },
        tags: row.tags,
        status: PostStatus::from(row.status.as_str()),
        views: row.views,
        like_count: row.likes.len() as i64,
        featured_image: row.featured_image,
        published: row.published,
        published_at: row.published_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
