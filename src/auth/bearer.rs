use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::AuthError;

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the token out of an `Authorization: Bearer <token>` header
///
/// # Errors
/// Returns `AuthError::MissingToken` when the header is absent, is not a
/// bearer credential, or carries an empty token
pub fn get_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .ok_or(AuthError::MissingToken)?;

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token)
}
