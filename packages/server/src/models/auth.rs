use serde::{Deserialize, Serialize};

use crate::entity::user;
use crate::error::AppError;

/// Request body for user registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Unique username (1-32 chars, alphanumeric and underscores).
    #[schema(example = "tifosi_77")]
    pub username: String,
    /// Password (8-128 characters).
    #[schema(example = "box_box_box!")]
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let username = self.username.trim();
        if username.is_empty() || username.chars().count() > 32 {
            return Err(AppError::Validation(
                "Username must be 1-32 characters".into(),
            ));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AppError::Validation(
                "Username must contain only letters, digits, and underscores".into(),
            ));
        }
        if !(8..=128).contains(&self.password.len()) {
            return Err(AppError::Validation(
                "Password must be 8-128 characters".into(),
            ));
        }
        Ok(())
    }
}

/// Request body for user login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "tifosi_77")]
    pub username: String,
    #[schema(example = "box_box_box!")]
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(AppError::Validation(
                "Username and password are required".into(),
            ));
        }
        Ok(())
    }
}

/// A registered account.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "tifosi_77")]
    pub username: String,
    #[schema(example = "player")]
    pub role: String,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub user: UserResponse,
    /// Permissions granted by the user's role.
    #[schema(example = json!(["prediction:submit", "crazy:vote"]))]
    pub permissions: Vec<String>,
}

/// Current authenticated user's profile, as carried by the token.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "tifosi_77")]
    pub username: String,
    #[schema(example = "player")]
    pub role: String,
    #[schema(example = json!(["prediction:submit", "crazy:vote"]))]
    pub permissions: Vec<String>,
}
