// Inkpost HTTP API
//
// Router assembly, shared application state, and the OpenAPI document.
// The binary in main.rs wires this up with config and storage.

pub mod api;
pub mod auth;
pub mod config;
pub mod services;

use axum::{extract::State, routing::get, Json, Router};
use inkpost_storage::StorageBackend;
use serde::Serialize;
use std::sync::Arc;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use auth::{AuthConfig, TokenService};

/// App state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub db: StorageBackend,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(db: StorageBackend, auth: AuthConfig) -> Self {
        Self {
            db,
            tokens: Arc::new(TokenService::new(auth.jwt)),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    storage: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: if state.db.is_dev_mode() {
            "memory"
        } else {
            "postgres"
        },
    })
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::routes::register,
        auth::routes::login,
        auth::routes::me,
        auth::routes::update_profile,
        auth::routes::change_password,
        api::posts::list_posts,
        api::posts::get_post,
        api::posts::get_post_by_slug,
        api::posts::create_post,
        api::posts::update_post,
        api::posts::delete_post,
        api::posts::like_post,
        api::categories::list_categories,
        api::categories::create_category,
    ),
    components(
        schemas(
            inkpost_core::User, inkpost_core::Role,
            inkpost_core::Post, inkpost_core::PostStatus,
            inkpost_core::PostAuthor, inkpost_core::CategoryRef,
            inkpost_core::Category,
            auth::routes::RegisterRequest, auth::routes::LoginRequest,
            auth::routes::UpdateProfileRequest, auth::routes::ChangePasswordRequest,
            auth::routes::AuthData,
            api::posts::CreatePostRequest, api::posts::UpdatePostRequest,
            api::posts::PostsPage, api::posts::LikeData,
            api::categories::CreateCategoryRequest,
            api::common::Pagination,
            api::error::FieldError, api::error::ErrorBody,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login, and profile endpoints"),
        (name = "posts", description = "Post CRUD, likes, and views"),
        (name = "categories", description = "Category endpoints")
    ),
    info(
        title = "Inkpost API",
        version = "0.1.0",
        description = "Blog platform API: authentication, posts, and categories",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

/// Assemble the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(auth::routes())
        .merge(api::posts::routes())
        .merge(api::categories::routes())
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
}
