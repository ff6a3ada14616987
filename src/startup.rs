use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::SessionService;
use crate::configuration::Settings;
use crate::db::{ChirpyRepository, RefreshTokenRepository};
use crate::error::{AppError, ValidationError};
use crate::metrics::HitCounter;
use crate::middleware::{FileServerHits, RequestLogger};
use crate::routes::{
    create_chirp, create_user, delete_chirp, get_chirp, get_chirps, health_check, login, metrics,
    refresh, reset, revoke,
};
use crate::state::AppState;

/// Build the shared state for one storage backend
pub fn build_state<S>(store: Arc<S>, settings: &Settings) -> AppState
where
    S: ChirpyRepository + RefreshTokenRepository + 'static,
{
    let refresh_tokens: Arc<dyn RefreshTokenRepository> = store.clone();
    if settings.application.is_dev() {
        tracing::warn!("Platform is dev; /admin/reset is enabled");
    }

    AppState {
        db: store,
        sessions: SessionService::from_settings(&settings.jwt, refresh_tokens),
        file_server_hits: HitCounter::new(),
        platform: settings.application.platform.clone(),
    }
}

pub fn run<S>(
    listener: TcpListener,
    store: Arc<S>,
    settings: &Settings,
) -> Result<Server, std::io::Error>
where
    S: ChirpyRepository + RefreshTokenRepository + 'static,
{
    let state = web::Data::new(build_state(store, settings));
    let static_dir = settings.application.static_dir.clone();

    let server = HttpServer::new(move || {
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            tracing::debug!(error = %err, "Rejected request body");
            AppError::Validation(ValidationError::InvalidFormat("request body".to_string())).into()
        });

        App::new()
            .wrap(RequestLogger)
            .app_data(state.clone())
            .app_data(json_config)

            .route("/api/healthz", web::get().to(health_check))

            .route("/api/users", web::post().to(create_user))
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))

            .service(
                web::resource("/api/chirps")
                    .route(web::get().to(get_chirps))
                    .route(web::post().to(create_chirp)),
            )
            .service(
                web::resource("/api/chirps/{chirp_id}")
                    .route(web::get().to(get_chirp))
                    .route(web::delete().to(delete_chirp)),
            )

            .route("/admin/metrics", web::get().to(metrics))
            .route("/admin/reset", web::post().to(reset))

            .service(
                web::scope("/app")
                    .wrap(FileServerHits::new(state.file_server_hits.clone()))
                    .service(fs::Files::new("/", &static_dir).index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
