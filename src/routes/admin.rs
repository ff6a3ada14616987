/// Admin Routes
///
/// Visit metrics and the development-only reset.

use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::state::AppState;

/// GET /admin/metrics
pub async fn metrics(state: web::Data<AppState>) -> HttpResponse {
    let hits = state.file_server_hits.hits();

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(format!(
            "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {} times!</p>\n  </body>\n</html>",
            hits
        ))
}

/// POST /admin/reset
///
/// Deletes every user (and with them all chirps and refresh tokens) and
/// zeroes the visit counter. Only allowed when the platform is `dev`.
///
/// # Errors
/// - 403: Platform is not `dev`
/// - 500: Database failure
pub async fn reset(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    if !state.is_dev() {
        return Err(AppError::Forbidden(
            "Reset is only allowed in dev environment".to_string(),
        ));
    }

    state.db.reset().await?;
    state.file_server_hits.reset();

    tracing::warn!("Database and metrics reset");

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hits reset to 0"))
}
