// Category HTTP routes

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use inkpost_core::Category;
use serde::Deserialize;
use utoipa::ToSchema;

use super::common::Envelope;
use super::error::ApiError;
use super::validation::{normalize, Validator};
use crate::auth::middleware::AdminUser;
use crate::services::category::CreateCategoryInput;
use crate::services::CategoryService;
use crate::AppState;

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

/// Create category routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/categories", get(list_categories).post(create_category))
}

/// GET /api/categories - List active categories
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Active categories", body = Envelope<Vec<Category>>)
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<Category>>>, ApiError> {
    let service = CategoryService::new(state.db.clone());
    let categories = service.list().await?;
    Ok(Json(Envelope::data(categories)))
}

/// POST /api/categories - Create a category (admin only)
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Envelope<Category>),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin"),
        (status = 409, description = "Category already exists")
    ),
    security(("bearer" = [])),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Envelope<Category>>), ApiError> {
    let name = normalize(req.name.as_deref());
    let description = normalize(req.description.as_deref());

    let mut v = Validator::new();
    if let Some(name) = v.require("name", name.as_deref()) {
        v.length("name", name, 2, 50);
    }
    if let Some(description) = description.as_deref() {
        v.max_len("description", description, 500);
    }
    v.finish()?;

    tracing::debug!(admin_id = %user.id, "admin creating category");

    let service = CategoryService::new(state.db.clone());
    let category = service
        .create(CreateCategoryInput {
            name: name.unwrap_or_default(),
            description,
            icon: normalize(req.icon.as_deref()),
            color: normalize(req.color.as_deref()),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message("Category created successfully", category)),
    ))
}
