use std::net::TcpListener;
use std::sync::Arc;

use chirpy::configuration::get_configuration;
use chirpy::db::{MemoryStore, PgStore};
use chirpy::startup::run;
use chirpy::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    let configuration = get_configuration().map_err(|e| {
        tracing::error!("Failed to read configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Configuration error")
    })?;
    tracing::info!(jwt = ?configuration.jwt, "Configuration loaded");

    let address = configuration.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = if configuration.database.in_memory {
        tracing::warn!("Using in-memory storage; data is lost on restart");
        run(listener, Arc::new(MemoryStore::new()), &configuration)?
    } else {
        let store = PgStore::connect(&configuration.database).await.map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Database connection error")
        })?;
        tracing::info!("Database connection pool created and migrated");
        run(listener, Arc::new(store), &configuration)?
    };

    server.await
}
