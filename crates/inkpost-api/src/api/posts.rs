// Post CRUD HTTP routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use inkpost_core::{Post, PostStatus};
use inkpost_storage::models::{PostFilter, PostSort};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{Envelope, Pagination};
use super::error::ApiError;
use super::validation::{normalize, Validator};
use crate::auth::middleware::{AuthUser, MaybeUser};
use crate::services::post::{CreatePostInput, ListPostsInput, UpdatePostInput};
use crate::services::PostService;
use crate::AppState;

const POST_STATUSES: &[&str] = &["draft", "published", "archived"];
const POST_SORTS: &[&str] = &["createdAt", "-createdAt", "views", "-views", "title", "-title"];

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ListPostsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<String>,
    pub featured_image: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostsPage {
    pub posts: Vec<Post>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeData {
    pub likes: i64,
    pub is_liked: bool,
}

/// Create post routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route(
            "/api/posts/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/api/posts/slug/:slug", get(get_post_by_slug))
        .route("/api/posts/:id/like", post(like_post))
}

/// GET /api/posts - List posts with filters and pagination
#[utoipa::path(
    get,
    path = "/api/posts",
    params(
        ("page" = Option<i64>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<i64>, Query, description = "Page size, 1-100"),
        ("category" = Option<Uuid>, Query, description = "Filter by category ID"),
        ("author" = Option<Uuid>, Query, description = "Filter by author ID"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("sort" = Option<String>, Query, description = "Sort order, e.g. -createdAt")
    ),
    responses(
        (status = 200, description = "Paginated posts", body = Envelope<PostsPage>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "posts"
)]
pub async fn list_posts(
    State(state): State<AppState>,
    user: MaybeUser,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<Envelope<PostsPage>>, ApiError> {
    let mut v = Validator::new();
    let category_id = query
        .category
        .as_deref()
        .and_then(|c| v.uuid("category", c));
    let author_id = query.author.as_deref().and_then(|a| v.uuid("author", a));
    if let Some(status) = query.status.as_deref() {
        v.one_of("status", status, POST_STATUSES);
    }
    if let Some(sort) = query.sort.as_deref() {
        v.one_of("sort", sort, POST_SORTS);
    }
    v.finish()?;

    // Anonymous requests only ever see published posts
    let status = if user.0.is_some() {
        query.status.or_else(|| Some("published".to_string()))
    } else {
        Some("published".to_string())
    };

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let sort = query
        .sort
        .as_deref()
        .and_then(PostSort::from_param)
        .unwrap_or_default();

    let service = PostService::new(state.db.clone());
    let (posts, total) = service
        .list(ListPostsInput {
            filter: PostFilter {
                status,
                category_id,
                author_id,
            },
            sort,
            page,
            limit,
        })
        .await?;

    Ok(Json(Envelope::data(PostsPage {
        posts,
        pagination: Pagination::new(page, limit, total),
    })))
}

/// GET /api/posts/{id} - Fetch a post and count the view
#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post found", body = Envelope<Post>),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
pub async fn get_post(
    State(state): State<AppState>,
    _user: MaybeUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Post>>, ApiError> {
    let service = PostService::new(state.db.clone());
    let post = service.get(id).await?;
    Ok(Json(Envelope::data(post)))
}

/// GET /api/posts/slug/{slug} - Fetch a post by slug and count the view
#[utoipa::path(
    get,
    path = "/api/posts/slug/{slug}",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Post found", body = Envelope<Post>),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
pub async fn get_post_by_slug(
    State(state): State<AppState>,
    _user: MaybeUser,
    Path(slug): Path<String>,
) -> Result<Json<Envelope<Post>>, ApiError> {
    let service = PostService::new(state.db.clone());
    let post = service.get_by_slug(&slug).await?;
    Ok(Json(Envelope::data(post)))
}

/// POST /api/posts - Create a post authored by the caller
#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = Envelope<Post>),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Category not found")
    ),
    security(("bearer" = [])),
    tag = "posts"
)]
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Envelope<Post>>), ApiError> {
    let title = normalize(req.title.as_deref());
    let content = normalize(req.content.as_deref());

    let mut v = Validator::new();
    if let Some(title) = v.require("title", title.as_deref()) {
        v.length("title", title, 5, 200);
    }
    if let Some(content) = v.require("content", content.as_deref()) {
        v.min_len("content", content, 10);
    }
    let category_id = v
        .require("category", req.category.as_deref())
        .and_then(|c| v.uuid("category", c));
    v.finish()?;

    let service = PostService::new(state.db.clone());
    let post = service
        .create(
            &user,
            CreatePostInput {
                title: title.unwrap_or_default(),
                content: content.unwrap_or_default(),
                // validation guarantees presence past this point
                category_id: category_id.unwrap_or_default(),
                tags: req.tags.unwrap_or_default(),
                featured_image: normalize(req.featured_image.as_deref()),
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message("Post created successfully", post)),
    ))
}

/// PUT /api/posts/{id} - Update a post (author or admin only)
#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = Envelope<Post>),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    ),
    security(("bearer" = [])),
    tag = "posts"
)]
pub async fn update_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<Json<Envelope<Post>>, ApiError> {
    let title = normalize(req.title.as_deref());
    let content = normalize(req.content.as_deref());

    let mut v = Validator::new();
    if let Some(title) = title.as_deref() {
        v.length("title", title, 5, 200);
    }
    if let Some(content) = content.as_deref() {
        v.min_len("content", content, 10);
    }
    let category_id = req.category.as_deref().and_then(|c| v.uuid("category", c));
    if let Some(status) = req.status.as_deref() {
        v.one_of("status", status, POST_STATUSES);
    }
    v.finish()?;

    let service = PostService::new(state.db.clone());
    let post = service
        .update(
            &user,
            id,
            UpdatePostInput {
                title,
                content,
                category_id,
                tags: req.tags,
                status: req.status.as_deref().map(PostStatus::from),
                featured_image: normalize(req.featured_image.as_deref()),
            },
        )
        .await?;

    Ok(Json(Envelope::with_message("Post updated successfully", post)))
}

/// DELETE /api/posts/{id} - Delete a post (author or admin only)
#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    ),
    security(("bearer" = [])),
    tag = "posts"
)]
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let service = PostService::new(state.db.clone());
    service.delete(&user, id).await?;
    Ok(Json(Envelope::message("Post deleted successfully")))
}

/// POST /api/posts/{id}/like - Toggle the caller's like
#[utoipa::path(
    post,
    path = "/api/posts/{id}/like",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Like toggled", body = Envelope<LikeData>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Post not found")
    ),
    security(("bearer" = [])),
    tag = "posts"
)]
pub async fn like_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<LikeData>>, ApiError> {
    let service = PostService::new(state.db.clone());
    let (likes, is_liked) = service.toggle_like(user.id, id).await?;
    Ok(Json(Envelope::data(LikeData { likes, is_liked })))
}
