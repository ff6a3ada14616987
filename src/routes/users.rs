/// Account Routes

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::hash_password;
use crate::db::User;
use crate::error::{AppError, ErrorContext};
use crate::state::AppState;
use crate::validators::{is_valid_email, is_valid_password};

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
}

/// Public view of an account
#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email.clone(),
        }
    }
}

/// POST /api/users
///
/// # Errors
/// - 400: Invalid email or empty password
/// - 409: Email already registered
/// - 500: Hashing or database failure
pub async fn create_user(
    body: web::Json<CreateUserRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let email = is_valid_email(&body.email)?;
    is_valid_password(&body.password)?;
    let hashed_password = hash_password(&body.password).map_err(|e| context.log_error(e.into()))?;

    let user = state.db.create_user(&User::new(email, hashed_password)).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User registered"
    );

    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}
