/// Authentication Routes
///
/// Login, access token refresh and refresh token revocation.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::get_bearer_token;
use crate::error::{AppError, ErrorContext, ValidationError};
use crate::state::AppState;

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Requested access token lifetime; ignored unless within the allowed range
    pub expires_in_seconds: Option<i64>,
}

/// Account summary plus both tokens
#[derive(Serialize)]
pub struct LoginResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/login
///
/// # Errors
/// - 401: Unknown email or wrong password (same response for both)
/// - 500: Storage or signing failure
pub async fn login(
    body: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");

    let user = state
        .db
        .get_user_by_email(body.email.trim())
        .await?
        .ok_or_else(|| {
            let rejection = state.sessions.reject_unknown_account(&body.password);
            context.log_error(AppError::Auth(rejection))
        })?;

    let session = state
        .sessions
        .login(user.id, &body.password, &user.hashed_password, body.expires_in_seconds)
        .await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User logged in successfully"
    );

    Ok(HttpResponse::Ok().json(LoginResponse {
        id: user.id,
        created_at: user.created_at,
        updated_at: user.updated_at,
        email: user.email,
        token: session.access_token,
        refresh_token: session.refresh_token.token,
    }))
}

/// POST /api/refresh
///
/// Expects `Authorization: Bearer <refresh token>`. The refresh token is not
/// rotated.
///
/// # Errors
/// - 400: Missing or malformed authorization header
/// - 401: Unknown, revoked or expired refresh token
/// - 500: Signing or storage failure
pub async fn refresh(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = bearer_token(&req)?;
    let token = state.sessions.refresh(refresh_token).await?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// POST /api/revoke
///
/// # Errors
/// - 400: Missing or malformed authorization header
/// - 401: Unknown refresh token
/// - 500: Storage failure
pub async fn revoke(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = bearer_token(&req)?;
    state.sessions.revoke(refresh_token).await?;

    Ok(HttpResponse::NoContent().finish())
}

// A missing header here is a malformed request rather than a failed login.
fn bearer_token(req: &HttpRequest) -> Result<&str, AppError> {
    get_bearer_token(req.headers()).map_err(|_| {
        AppError::Validation(ValidationError::InvalidFormat(
            "authorization header".to_string(),
        ))
    })
}
