/// Authenticated caller extractor
///
/// Handlers that take an `AuthenticatedUser` argument only run when the
/// request carries a valid access token. Anything else is rejected with 401
/// before the handler body executes.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::auth::bearer::get_bearer_token;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuthenticatedUser(pub Uuid);

impl AuthenticatedUser {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("application state is not registered".to_string()))?;

    let token = get_bearer_token(req.headers())?;
    let user_id = state.sessions.authenticate(token)?;

    tracing::debug!(user_id = %user_id, "Access token validated");
    Ok(AuthenticatedUser(user_id))
}
