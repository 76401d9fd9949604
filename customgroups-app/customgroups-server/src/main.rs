use axum::http::{header, HeaderName, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
};
use tracing::info;

use customgroups_api::{router, AppState};
use customgroups_core::repositories::GroupStore;
use customgroups_infrastructure::{create_pool, run_migrations, InMemoryGroupStore, PgGroupStore};
use customgroups_shared::config::{AppConfig, StoreBackend};
use customgroups_shared::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize telemetry; the guard flushes the file writer on exit
    let _log_guard = init_telemetry(&config.log)?;

    info!("{} starting ({})...", config.app.name, config.app.env);

    let store = build_store(&config).await?;
    let state = AppState::new(store, config.auth.clone());

    let request_id = HeaderName::from_static("x-request-id");
    let user_header = HeaderName::try_from(config.auth.user_header.as_str())?;

    let app = router(state)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::HEAD,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, user_header]),
        );

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn GroupStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory group store");
            Ok(Arc::new(InMemoryGroupStore::new()))
        }
        StoreBackend::Postgres => {
            info!("Connecting to database...");
            let pool = create_pool(&config.database).await?;
            run_migrations(&pool).await?;
            info!("Database connection established, migrations applied.");
            Ok(Arc::new(PgGroupStore::new(pool)))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
