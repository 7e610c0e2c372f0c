//! Route configuration.

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{health_routes, story_routes};
use super::openapi::ApiDoc;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/", get(root))
        // Health check
        .nest("/health", health_routes())
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Story routes
        .nest("/stories", story_routes().layer(upload_limit))
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Story service"
}
