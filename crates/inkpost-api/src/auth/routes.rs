// Authentication HTTP routes

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use inkpost_core::User;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::middleware::AuthUser;
use crate::api::common::Envelope;
use crate::api::error::ApiError;
use crate::api::validation::{normalize, normalize_email, Validator};
use crate::services::user::{RegisterInput, UpdateProfileInput};
use crate::services::UserService;
use crate::AppState;

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// User plus a freshly issued token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthData {
    pub user: User,
    pub token: String,
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me).put(update_profile))
        .route("/api/auth/change-password", put(change_password))
}

/// POST /api/auth/register - Create a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = Envelope<AuthData>),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email or username already taken")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Envelope<AuthData>>), ApiError> {
    let username = normalize(req.username.as_deref());
    let email = normalize_email(req.email.as_deref());

    let mut v = Validator::new();
    if let Some(username) = v.require("username", username.as_deref()) {
        v.length("username", username, 3, 30);
        v.username("username", username);
    }
    if let Some(email) = v.require("email", email.as_deref()) {
        v.email("email", email);
    }
    if let Some(password) = v.require("password", req.password.as_deref()) {
        v.min_len("password", password, 6);
    }
    v.finish()?;

    let service = UserService::new(state.db.clone());
    let user = service
        .register(RegisterInput {
            username: username.unwrap_or_default(),
            email: email.unwrap_or_default(),
            password: req.password.unwrap_or_default(),
            first_name: normalize(req.first_name.as_deref()),
            last_name: normalize(req.last_name.as_deref()),
        })
        .await?;

    let token = state
        .tokens
        .issue(user.id, &user.email, user.role)
        .map_err(ApiError::internal)?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "User registered successfully",
            AuthData { user, token },
        )),
    ))
}

/// POST /api/auth/login - Authenticate and obtain a token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = Envelope<AuthData>),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account is inactive")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Envelope<AuthData>>, ApiError> {
    let email = normalize_email(req.email.as_deref());

    let mut v = Validator::new();
    if let Some(email) = v.require("email", email.as_deref()) {
        v.email("email", email);
    }
    v.require("password", req.password.as_deref());
    v.finish()?;

    let service = UserService::new(state.db.clone());
    let user = service
        .login(&email.unwrap_or_default(), &req.password.unwrap_or_default())
        .await?;

    let token = state
        .tokens
        .issue(user.id, &user.email, user.role)
        .map_err(ApiError::internal)?;

    Ok(Json(Envelope::with_message(
        "Login successful",
        AuthData { user, token },
    )))
}

/// GET /api/auth/me - Current user profile
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = Envelope<User>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Envelope<User>>, ApiError> {
    let service = UserService::new(state.db.clone());
    let profile = service.get(user.id).await?;
    Ok(Json(Envelope::data(profile)))
}

/// PUT /api/auth/me - Update profile fields
#[utoipa::path(
    put,
    path = "/api/auth/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = Envelope<User>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Envelope<User>>, ApiError> {
    let service = UserService::new(state.db.clone());
    let profile = service
        .update_profile(
            user.id,
            UpdateProfileInput {
                first_name: normalize(req.first_name.as_deref()),
                last_name: normalize(req.last_name.as_deref()),
                avatar: normalize(req.avatar.as_deref()),
            },
        )
        .await?;
    Ok(Json(Envelope::with_message(
        "Profile updated successfully",
        profile,
    )))
}

/// PUT /api/auth/change-password - Rotate the account password
#[utoipa::path(
    put,
    path = "/api/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Wrong current password or not authenticated")
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let mut v = Validator::new();
    v.require("currentPassword", req.current_password.as_deref());
    if let Some(new_password) = v.require("newPassword", req.new_password.as_deref()) {
        v.min_len("newPassword", new_password, 6);
    }
    v.finish()?;

    let service = UserService::new(state.db.clone());
    service
        .change_password(
            user.id,
            &req.current_password.unwrap_or_default(),
            &req.new_password.unwrap_or_default(),
        )
        .await?;

    Ok(Json(Envelope::message("Password changed successfully")))
}
