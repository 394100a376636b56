//! Route definitions for the API.

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use utoipa_swagger_ui::SwaggerUi;

use super::handlers;
use super::SharedState;

/// Create the main API router
pub fn create_router(state: SharedState) -> Router {
    // Build OpenAPI spec once at startup
    let openapi = super::openapi::build_openapi();

    let router = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/healthz", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // OpenAPI spec and Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", openapi))
        // Package and maintenance routes
        .nest(
            "/apk",
            handlers::packages::router().merge(handlers::maintenance::router()),
        );

    // Disable the global body limit; the upload route carries its own bound
    // and everything else is small JSON.
    let router = router.layer(DefaultBodyLimit::disable());

    router.with_state(state)
}
