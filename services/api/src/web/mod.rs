pub mod extract;
pub mod records;
pub mod report;
pub mod rest;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use records::{
    create_record_handler, get_records_handler, health_handler, update_record_handler,
};
pub use report::generate_report_handler;
pub use rest::ApiDoc;
pub use state::AppState;

/// Builds the complete application: the API routes behind a permissive CORS
/// layer, merged with the Swagger UI.
pub fn router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route(
            "/api/records",
            post(create_record_handler)
                .put(update_record_handler)
                .get(get_records_handler),
        )
        .route("/api/ai", post(generate_report_handler))
        .route("/api/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
