//! Router assembly for the maintenance HTTP API.
//!
//! [`build_router`] wires all handler functions to their routes with
//! CORS and tracing middleware layers.

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router with all API routes.
///
/// Routes use axum 0.8 `/{param}` path syntax. The static `settingitem`
/// segment takes precedence over the `{id}` capture.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        // Maintenance aggregate
        .route(
            "/api/maintenance",
            get(handlers::maintenance::list_maintenances)
                .post(handlers::maintenance::create_maintenance),
        )
        .route(
            "/api/maintenance/{id}",
            get(handlers::maintenance::get_maintenance)
                .put(handlers::maintenance::update_maintenance)
                .delete(handlers::maintenance::delete_maintenance),
        )
        // Setting items
        .route(
            "/api/maintenance/settingitem",
            axum::routing::post(handlers::setting_items::create_setting_item),
        )
        .route(
            "/api/maintenance/settingitem/{id}",
            get(handlers::setting_items::get_setting_item)
                .patch(handlers::setting_items::patch_setting_item)
                .delete(handlers::setting_items::delete_setting_item),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
