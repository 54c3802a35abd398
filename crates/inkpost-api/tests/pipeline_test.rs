// End-to-end tests for the request pipeline: authentication, authorization,
// validation, and the resource handlers behind them. Everything runs against
// the in-memory storage backend.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use inkpost_api::auth::config::{AuthConfig, JwtConfig};
use inkpost_api::{build_router, AppState};
use inkpost_core::Role;
use inkpost_storage::{models::UpdateUser, StorageBackend};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

fn test_state() -> AppState {
    let auth = AuthConfig {
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            token_lifetime: Duration::from_secs(3600),
        },
    };
    AppState::new(StorageBackend::in_memory(), auth)
}

fn app(state: &AppState) -> Router {
    build_router(state.clone())
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    json_request("POST", uri, token, body)
}

fn put_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    json_request("PUT", uri, token, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Register a user and return (user id, token)
async fn register(state: &AppState, username: &str, email: &str) -> (Uuid, String) {
    let (status, body) = send(
        app(state),
        post_json(
            "/api/auth/register",
            None,
            json!({"username": username, "email": email, "password": "password123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    let id = Uuid::parse_str(body["data"]["user"]["id"].as_str().unwrap()).unwrap();
    let token = body["data"]["token"].as_str().unwrap().to_string();
    (id, token)
}

/// Register a user and promote them to admin; returns their token
async fn make_admin(state: &AppState, username: &str, email: &str) -> String {
    let (id, token) = register(state, username, email).await;
    state
        .db
        .update_user(
            id,
            UpdateUser {
                role: Some(Role::Admin.as_str().to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    token
}

async fn create_category(state: &AppState, admin_token: &str, name: &str) -> String {
    let (status, body) = send(
        app(state),
        post_json(
            "/api/categories",
            Some(admin_token),
            json!({"name": name}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "category create failed: {body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn create_post(state: &AppState, token: &str, title: &str, category: &str) -> String {
    let (status, body) = send(
        app(state),
        post_json(
            "/api/posts",
            Some(token),
            json!({
                "title": title,
                "content": "This is a long enough body for a post.",
                "category": category,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "post create failed: {body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

// ============================================
// Auth flow
// ============================================

#[tokio::test]
async fn test_register_login_me_flow() {
    let state = test_state();
    register(&state, "alice", "alice@example.com").await;

    let (status, body) = send(
        app(&state),
        post_json(
            "/api/auth/login",
            None,
            json!({"email": "alice@example.com", "password": "password123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let token = body["data"]["token"].as_str().unwrap();

    let (status, body) = send(app(&state), get("/api/auth/me", Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["role"], "user");
    // The password hash never appears on the wire
    assert!(body["data"].get("passwordHash").is_none());
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_accumulates_all_validation_errors_in_order() {
    let state = test_state();
    let (status, body) = send(
        app(&state),
        post_json(
            "/api/auth/register",
            None,
            json!({"username": "ab", "email": "bad", "password": "123"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 3);
    assert_eq!(errors[0]["field"], "username");
    assert_eq!(errors[1]["field"], "email");
    assert_eq!(errors[2]["field"], "password");
}

#[tokio::test]
async fn test_register_rejects_duplicates() {
    let state = test_state();
    register(&state, "alice", "alice@example.com").await;

    let (status, body) = send(
        app(&state),
        post_json(
            "/api/auth/register",
            None,
            json!({"username": "alice2", "email": "alice@example.com", "password": "password123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already registered");

    let (status, body) = send(
        app(&state),
        post_json(
            "/api/auth/register",
            None,
            json!({"username": "alice", "email": "other@example.com", "password": "password123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Username already taken");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let state = test_state();
    register(&state, "alice", "alice@example.com").await;

    let (status, body) = send(
        app(&state),
        post_json(
            "/api/auth/login",
            None,
            json!({"email": "alice@example.com", "password": "wrong-password"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");

    let (status, body) = send(
        app(&state),
        post_json(
            "/api/auth/login",
            None,
            json!({"email": "nobody@example.com", "password": "password123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_change_password_requires_current() {
    let state = test_state();
    let (_, token) = register(&state, "alice", "alice@example.com").await;

    let (status, body) = send(
        app(&state),
        put_json(
            "/api/auth/change-password",
            Some(&token),
            json!({"currentPassword": "wrong", "newPassword": "new-password"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Current password is incorrect");

    let (status, _) = send(
        app(&state),
        put_json(
            "/api/auth/change-password",
            Some(&token),
            json!({"currentPassword": "password123", "newPassword": "new-password"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Old password no longer works, new one does
    let (status, _) = send(
        app(&state),
        post_json(
            "/api/auth/login",
            None,
            json!({"email": "alice@example.com", "password": "password123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        app(&state),
        post_json(
            "/api/auth/login",
            None,
            json!({"email": "alice@example.com", "password": "new-password"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================
// Authentication gate
// ============================================

#[tokio::test]
async fn test_missing_token_rejected() {
    let state = test_state();
    let (status, body) = send(app(&state), get("/api/auth/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Access denied. No token provided.");
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_lowercase_bearer_scheme_counts_as_no_token() {
    let state = test_state();
    let (_, token) = register(&state, "alice", "alice@example.com").await;

    let req = Request::builder()
        .uri("/api/auth/me")
        .header("authorization", format!("bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(&state), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Access denied. No token provided.");
}

#[tokio::test]
async fn test_garbage_token_rejected_generically() {
    let state = test_state();
    let (status, body) = send(app(&state), get("/api/auth/me", Some("not.a.token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token.");
}

#[tokio::test]
async fn test_valid_token_for_unknown_user_rejected() {
    let state = test_state();
    // Well-formed token whose subject was never stored
    let token = state
        .tokens
        .issue(Uuid::now_v7(), "ghost@example.com", Role::User)
        .unwrap();

    let (status, body) = send(app(&state), get("/api/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token. User not found.");
}

#[tokio::test]
async fn test_deactivated_user_rejected_with_valid_token() {
    let state = test_state();
    let (id, token) = register(&state, "alice", "alice@example.com").await;

    state
        .db
        .update_user(
            id,
            UpdateUser {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    let (status, body) = send(app(&state), get("/api/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Account is inactive.");
}

#[tokio::test]
async fn test_deactivated_user_cannot_log_in() {
    let state = test_state();
    let (id, _) = register(&state, "alice", "alice@example.com").await;
    state
        .db
        .update_user(
            id,
            UpdateUser {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    let (status, body) = send(
        app(&state),
        post_json(
            "/api/auth/login",
            None,
            json!({"email": "alice@example.com", "password": "password123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Account is inactive. Please contact support.");
}

#[tokio::test]
async fn test_optional_auth_degrades_to_anonymous() {
    let state = test_state();
    // An invalid token on an optional-auth route must not reject the request
    let (status, body) = send(app(&state), get("/api/posts", Some("garbage"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["pagination"]["total"], 0);
}

// ============================================
// Authorization gate
// ============================================

#[tokio::test]
async fn test_admin_route_rejects_regular_user_until_promoted() {
    let state = test_state();
    let (id, token) = register(&state, "alice", "alice@example.com").await;

    let (status, body) = send(
        app(&state),
        post_json("/api/categories", Some(&token), json!({"name": "Tech"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied. Insufficient permissions.");

    // Promote; the same token now passes because the role is read from the
    // store on every request
    state
        .db
        .update_user(
            id,
            UpdateUser {
                role: Some("admin".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    let (status, body) = send(
        app(&state),
        post_json("/api/categories", Some(&token), json!({"name": "Tech"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["slug"], "tech");
}

#[tokio::test]
async fn test_admin_route_without_token_is_401_not_403() {
    let state = test_state();
    let (status, body) = send(
        app(&state),
        post_json("/api/categories", None, json!({"name": "Tech"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Access denied. No token provided.");
}

// ============================================
// Posts
// ============================================

#[tokio::test]
async fn test_post_lifecycle() {
    let state = test_state();
    let admin_token = make_admin(&state, "admin", "admin@example.com").await;
    let category = create_category(&state, &admin_token, "Tech").await;
    let (_, author_token) = register(&state, "alice", "alice@example.com").await;

    let post_id = create_post(&state, &author_token, "My first post", &category).await;

    // Draft posts are invisible to anonymous listing
    let (status, body) = send(app(&state), get("/api/posts", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["total"], 0);

    // Publish
    let (status, body) = send(
        app(&state),
        put_json(
            &format!("/api/posts/{post_id}"),
            Some(&author_token),
            json!({"status": "published"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "published");
    assert_eq!(body["data"]["published"], true);
    assert!(body["data"]["publishedAt"].is_string());

    // Now visible, with author and category populated
    let (status, body) = send(app(&state), get("/api/posts", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["total"], 1);
    let listed = &body["data"]["posts"][0];
    assert_eq!(listed["author"]["username"], "alice");
    assert_eq!(listed["category"]["name"], "Tech");
    assert_eq!(listed["slug"], "my-first-post");

    // Each fetch counts a view
    let (_, body) = send(app(&state), get(&format!("/api/posts/{post_id}"), None)).await;
    assert_eq!(body["data"]["views"], 1);
    let (_, body) = send(app(&state), get("/api/posts/slug/my-first-post", None)).await;
    assert_eq!(body["data"]["views"], 2);

    // Delete
    let (status, _) = send(
        app(&state),
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/posts/{post_id}"))
            .header("authorization", format!("Bearer {author_token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app(&state), get(&format!("/api/posts/{post_id}"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Post not found");
}

#[tokio::test]
async fn test_non_author_cannot_update_but_admin_can() {
    let state = test_state();
    let admin_token = make_admin(&state, "admin", "admin@example.com").await;
    let category = create_category(&state, &admin_token, "Tech").await;
    let (_, author_token) = register(&state, "alice", "alice@example.com").await;
    let (_, other_token) = register(&state, "bob", "bob@example.com").await;

    let post_id = create_post(&state, &author_token, "A post of mine", &category).await;

    let (status, body) = send(
        app(&state),
        put_json(
            &format!("/api/posts/{post_id}"),
            Some(&other_token),
            json!({"title": "Hijacked title"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized to update this post");

    let (status, body) = send(
        app(&state),
        put_json(
            &format!("/api/posts/{post_id}"),
            Some(&admin_token),
            json!({"title": "Moderated title"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Moderated title");
}

#[tokio::test]
async fn test_create_post_with_unknown_category_is_404() {
    let state = test_state();
    let (_, token) = register(&state, "alice", "alice@example.com").await;

    let (status, body) = send(
        app(&state),
        post_json(
            "/api/posts",
            Some(&token),
            json!({
                "title": "A valid title",
                "content": "A long enough post body here.",
                "category": Uuid::now_v7().to_string(),
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Category not found");
}

#[tokio::test]
async fn test_create_post_validation_accumulates() {
    let state = test_state();
    let (_, token) = register(&state, "alice", "alice@example.com").await;

    let (status, body) = send(
        app(&state),
        post_json(
            "/api/posts",
            Some(&token),
            json!({"title": "Hi", "content": "short", "category": "not-a-uuid"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 3);
    assert_eq!(errors[0]["field"], "title");
    assert_eq!(errors[1]["field"], "content");
    assert_eq!(errors[2]["field"], "category");
}

#[tokio::test]
async fn test_slug_collisions_get_suffixed() {
    let state = test_state();
    let admin_token = make_admin(&state, "admin", "admin@example.com").await;
    let category = create_category(&state, &admin_token, "Tech").await;
    let (_, token) = register(&state, "alice", "alice@example.com").await;

    let first = create_post(&state, &token, "Same title here", &category).await;
    let second = create_post(&state, &token, "Same title here", &category).await;

    let (_, body) = send(
        app(&state),
        get(&format!("/api/posts/{first}"), None),
    )
    .await;
    assert_eq!(body["data"]["slug"], "same-title-here");

    let (_, body) = send(
        app(&state),
        get(&format!("/api/posts/{second}"), None),
    )
    .await;
    assert_eq!(body["data"]["slug"], "same-title-here-2");
}

#[tokio::test]
async fn test_like_toggle() {
    let state = test_state();
    let admin_token = make_admin(&state, "admin", "admin@example.com").await;
    let category = create_category(&state, &admin_token, "Tech").await;
    let (_, token) = register(&state, "alice", "alice@example.com").await;
    let post_id = create_post(&state, &token, "A likeable post", &category).await;

    let uri = format!("/api/posts/{post_id}/like");
    let (status, body) = send(app(&state), post_json(&uri, Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["likes"], 1);
    assert_eq!(body["data"]["isLiked"], true);

    let (status, body) = send(app(&state), post_json(&uri, Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["likes"], 0);
    assert_eq!(body["data"]["isLiked"], false);

    // Liking requires authentication
    let (status, _) = send(app(&state), post_json(&uri, None, json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_pagination_and_sort() {
    let state = test_state();
    let admin_token = make_admin(&state, "admin", "admin@example.com").await;
    let category = create_category(&state, &admin_token, "Tech").await;
    let (_, token) = register(&state, "alice", "alice@example.com").await;

    for i in 1..=5 {
        let id = create_post(&state, &token, &format!("Post number {i}"), &category).await;
        send(
            app(&state),
            put_json(
                &format!("/api/posts/{id}"),
                Some(&token),
                json!({"status": "published"}),
            ),
        )
        .await;
    }

    let (status, body) = send(
        app(&state),
        get("/api/posts?page=2&limit=2&sort=title", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let page = &body["data"];
    assert_eq!(page["pagination"]["total"], 5);
    assert_eq!(page["pagination"]["pages"], 3);
    assert_eq!(page["posts"].as_array().unwrap().len(), 2);
    assert_eq!(page["posts"][0]["title"], "Post number 3");

    // Invalid sort value is a validation failure
    let (status, _) = send(app(&state), get("/api/posts?sort=nope", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================
// Categories and health
// ============================================

#[tokio::test]
async fn test_duplicate_category_conflict() {
    let state = test_state();
    let admin_token = make_admin(&state, "admin", "admin@example.com").await;
    create_category(&state, &admin_token, "Tech").await;

    let (status, body) = send(
        app(&state),
        post_json("/api/categories", Some(&admin_token), json!({"name": "tech"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Category already exists");
}

#[tokio::test]
async fn test_list_categories_is_public() {
    let state = test_state();
    let admin_token = make_admin(&state, "admin", "admin@example.com").await;
    create_category(&state, &admin_token, "Tech").await;
    create_category(&state, &admin_token, "Life").await;

    let (status, body) = send(app(&state), get("/api/categories", None)).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Life", "Tech"]);
}

#[tokio::test]
async fn test_health() {
    let state = test_state();
    let (status, body) = send(app(&state), get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}
