/// Chirp Routes

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::db::Chirp;
use crate::error::{AppError, AuthError, DatabaseError, ValidationError};
use crate::state::AppState;
use crate::validators::validate_chirp;

#[derive(Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

/// POST /api/chirps
///
/// Requires an access token. The author is taken from the token, never
/// from the request body.
///
/// # Errors
/// - 400: Empty or longer than 140 characters
/// - 401: Missing or invalid access token, or its account no longer exists
pub async fn create_chirp(
    user: AuthenticatedUser,
    body: web::Json<CreateChirpRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let cleaned = validate_chirp(&body.body)?;
    let chirp = state
        .db
        .create_chirp(&Chirp::new(cleaned, user.id()))
        .await
        .map_err(|e| match e {
            // The token outlived its account.
            DatabaseError::MissingReference(_) => AppError::Auth(AuthError::UnknownAccount),
            other => other.into(),
        })?;

    tracing::info!(chirp_id = %chirp.id, user_id = %user.id(), "Chirp created");
    Ok(HttpResponse::Created().json(chirp))
}

/// GET /api/chirps
pub async fn get_chirps(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let chirps = state.db.get_chirps().await?;
    Ok(HttpResponse::Ok().json(chirps))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_chirp_id(&path)?;
    let chirp = state
        .db
        .get_chirp(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chirp".to_string()))?;

    Ok(HttpResponse::Ok().json(chirp))
}

/// DELETE /api/chirps/{chirp_id}
///
/// # Errors
/// - 401: Missing or invalid access token
/// - 403: Caller is not the author
/// - 404: No such chirp
pub async fn delete_chirp(
    user: AuthenticatedUser,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_chirp_id(&path)?;
    let chirp = state
        .db
        .get_chirp(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chirp".to_string()))?;

    if chirp.user_id != user.id() {
        tracing::warn!(chirp_id = %chirp_id, user_id = %user.id(), "Delete attempt by non-author");
        return Err(AppError::Forbidden("You can only delete your own chirps".to_string()));
    }

    if !state.db.delete_chirp(chirp_id).await? {
        return Err(AppError::NotFound("Chirp".to_string()));
    }

    tracing::info!(chirp_id = %chirp_id, user_id = %user.id(), "Chirp deleted");
    Ok(HttpResponse::NoContent().finish())
}

fn parse_chirp_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::Validation(ValidationError::InvalidFormat("chirp id".to_string())))
}
