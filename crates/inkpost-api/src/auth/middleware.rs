// Authentication and authorization extractors
//
// Each gate is an axum extractor: it either yields an identity into the
// handler or short-circuits the request with a terminal error response.
// Rejection messages match the public API contract and deliberately do not
// reveal why a token failed.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use inkpost_core::Role;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::AppState;

/// Authenticated user context extracted from the request.
/// Never carries the password hash.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Check membership in the permitted role set fixed at route
    /// registration. Denials are logged for audit.
    pub fn authorize(&self, permitted: &[Role]) -> Result<(), ApiError> {
        if permitted.contains(&self.role) {
            return Ok(());
        }
        tracing::warn!(
            user_id = %self.id,
            role = %self.role,
            permitted = ?permitted,
            "authorization denied"
        );
        Err(ApiError::forbidden(
            "Access denied. Insufficient permissions.",
        ))
    }
}

/// Extract the bearer token from the Authorization header.
/// The "Bearer " prefix is matched exactly and case-sensitively; any other
/// scheme (including a lowercase "bearer") counts as no token at all.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

async fn authenticate(parts: &Parts, state: &AppState) -> Result<AuthUser, ApiError> {
    let token = extract_bearer(&parts.headers)
        .ok_or_else(|| ApiError::unauthenticated("Access denied. No token provided."))?;

    let claims = state.tokens.verify(token).map_err(|e| {
        tracing::debug!("token verification failed: {}", e);
        ApiError::unauthenticated("Invalid or expired token.")
    })?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::unauthenticated("Invalid or expired token."))?;

    // Exactly one store lookup per authenticated request
    let user = state
        .db
        .get_user(user_id)
        .await
        .map_err(|e| {
            tracing::error!("failed to fetch user during authentication: {}", e);
            ApiError::internal(e)
        })?
        .ok_or_else(|| ApiError::unauthenticated("Invalid token. User not found."))?;

    if !user.is_active {
        return Err(ApiError::forbidden("Account is inactive."));
    }

    Ok(AuthUser {
        id: user.id,
        username: user.username,
        email: user.email,
        role: Role::from(user.role.as_str()),
    })
}

/// Required authentication gate - rejects the request if no valid identity
/// can be established.
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        authenticate(parts, &state).await
    }
}

/// Optional authentication gate - any failure degrades to an anonymous
/// request instead of rejecting it.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthUser>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        match authenticate(parts, &state).await {
            Ok(user) => Ok(MaybeUser(Some(user))),
            Err(e) => {
                tracing::debug!("optional authentication degraded to anonymous: {}", e);
                Ok(MaybeUser(None))
            }
        }
    }
}

/// Admin-only gate. Authentication runs first by construction; a request
/// with no identity fails with 401 before the role is ever checked.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        user.authorize(&[Role::Admin])?;
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer_exact_prefix() {
        let headers = headers_with_auth("Bearer abc.def.ghi");
        assert_eq!(extract_bearer(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_bearer_lowercase_scheme_is_absent() {
        let headers = headers_with_auth("bearer abc.def.ghi");
        assert_eq!(extract_bearer(&headers), None);
    }

    #[test]
    fn test_extract_bearer_other_scheme_is_absent() {
        let headers = headers_with_auth("Basic dXNlcjpwYXNz");
        assert_eq!(extract_bearer(&headers), None);
    }

    #[test]
    fn test_extract_bearer_missing_header() {
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }

    #[test]
    fn test_extract_bearer_empty_token_is_absent() {
        let headers = headers_with_auth("Bearer ");
        assert_eq!(extract_bearer(&headers), None);
    }

    #[test]
    fn test_authorize_permitted_role() {
        let user = AuthUser {
            id: Uuid::nil(),
            username: "test".to_string(),
            email: "test@example.com".to_string(),
            role: Role::User,
        };
        assert!(user.authorize(&[Role::User, Role::Admin]).is_ok());
        assert!(user.authorize(&[Role::Admin]).is_err());
        assert!(!user.is_admin());
    }

    #[test]
    fn test_authorize_admin() {
        let admin = AuthUser {
            id: Uuid::nil(),
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
        };
        assert!(admin.authorize(&[Role::Admin]).is_ok());
        assert!(admin.is_admin());
    }
}
