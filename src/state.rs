use std::sync::Arc;

use crate::auth::SessionService;
use crate::db::ChirpyRepository;
use crate::metrics::HitCounter;

/// Shared state handed to every handler through `web::Data<AppState>`
#[derive(Clone)]
pub struct AppState {
    /// Accounts and chirps
    pub db: Arc<dyn ChirpyRepository>,
    /// Login, refresh, revoke and access token checks
    pub sessions: SessionService,
    /// Requests served under `/app`
    pub file_server_hits: HitCounter,
    /// Deployment platform; `dev` unlocks the admin reset
    pub platform: String,
}

impl AppState {
    pub fn is_dev(&self) -> bool {
        self.platform == "dev"
    }
}
