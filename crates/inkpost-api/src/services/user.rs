// User service: registration, login, profile management

use inkpost_core::{Role, User};
use inkpost_storage::{
    hash_password, verify_password,
    models::{CreateUserRow, UpdateUser, UserRow},
    StorageBackend,
};
use uuid::Uuid;

use crate::api::error::ApiError;

pub struct UserService {
    db: StorageBackend,
}

pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub struct UpdateProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
}

impl UserService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    pub async fn register(&self, input: RegisterInput) -> Result<User, ApiError> {
        if self
            .db
            .get_user_by_email(&input.email)
            .await
            .map_err(ApiError::internal)?
            .is_some()
        {
            return Err(ApiError::conflict("Email already registered"));
        }
        if self
            .db
            .get_user_by_username(&input.username)
            .await
            .map_err(ApiError::internal)?
            .is_some()
        {
            return Err(ApiError::conflict("Username already taken"));
        }

        let password_hash = hash_password(&input.password).map_err(ApiError::internal)?;
        let row = self
            .db
            .create_user(CreateUserRow {
                username: input.username,
                email: input.email,
                password_hash,
                first_name: input.first_name,
                last_name: input.last_name,
            })
            .await
            .map_err(ApiError::internal)?;

        tracing::info!(user_id = %row.id, "user registered");
        Ok(row_to_user(row))
    }

    /// Authenticate by email and password. Unknown email and wrong password
    /// are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let row = self
            .db
            .get_user_by_email(email)
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::unauthenticated("Invalid email or password"))?;

        let valid = verify_password(password, &row.password_hash).map_err(ApiError::internal)?;
        if !valid {
            return Err(ApiError::unauthenticated("Invalid email or password"));
        }

        if !row.is_active {
            return Err(ApiError::forbidden(
                "Account is inactive. Please contact support.",
            ));
        }

        Ok(row_to_user(row))
    }

    pub async fn get(&self, id: Uuid) -> Result<User, ApiError> {
        let row = self
            .db
            .get_user(id)
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        Ok(row_to_user(row))
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        input: UpdateProfileInput,
    ) -> Result<User, ApiError> {
        let row = self
            .db
            .update_user(
                id,
                UpdateUser {
                    first_name: input.first_name,
                    last_name: input.last_name,
                    avatar: input.avatar,
                    ..Default::default()
                },
            )
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        Ok(row_to_user(row))
    }

    pub async fn change_password(
        &self,
        id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let row = self
            .db
            .get_user(id)
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        let valid =
            verify_password(current_password, &row.password_hash).map_err(ApiError::internal)?;
        if !valid {
            return Err(ApiError::unauthenticated("Current password is incorrect"));
        }

        let password_hash = hash_password(new_password).map_err(ApiError::internal)?;
        self.db
            .update_user_password(id, &password_hash)
            .await
            .map_err(ApiError::internal)?;

        tracing::info!(user_id = %id, "password changed");
        Ok(())
    }
}

/// Map a storage row to the public DTO. The password hash stays behind.
pub fn row_to_user(row: UserRow) -> User {
    User {
        id: row.id,
        username: row.username,
        email: row.email,
        first_name: row.first_name,
        last_name: row.last_name,
        avatar: row.avatar,
        role: Role::from(row.role.as_str()),
        is_active: row.is_active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
