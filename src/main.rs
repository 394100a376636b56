//! APK Depot - Main Entry Point

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Method;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use apk_depot_backend::{
    api,
    config::Config,
    error::Result,
    registry::RegistryStore,
    storage::ChannelStorage,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("apk_depot_backend={},tower_http=info", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting APK Depot");

    // Load the registry document
    let registry = Arc::new(RegistryStore::open(&config.registry_path).await?);
    tracing::info!(
        path = %config.registry_path,
        packages = registry.all().await.len(),
        "Registry loaded"
    );

    // Ensure channel partitions exist
    let storage = Arc::new(ChannelStorage::init(&config.storage_path).await?);
    tracing::info!(path = %config.storage_path, "Channel storage ready");

    // Create application state
    let state = Arc::new(api::AppState::new(config.clone(), registry, storage));

    // Build router. The service is consumed by native mobile clients from
    // arbitrary origins, so CORS stays permissive.
    let app = Router::new()
        .merge(api::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config.bind_address.parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
