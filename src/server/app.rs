use anyhow::{Context, Result};
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{dataflows, diagram, export, health, statistics, systems};
use super::openapi::ApiDoc;
use crate::app_context::AppContext;

#[derive(Clone)]
pub struct AppState {
    pub ctx: AppContext,
}

pub fn create_app(ctx: AppContext, cors_origin: Option<&str>) -> Result<Router> {
    let state = AppState { ctx };

    let cors = match cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin '{}'", origin))?,
            )
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        // Health check endpoint
        .route("/health", get(health::health_check))
        // API v1 routes
        .nest("/api/v1", api_v1_routes())
        // Interactive documentation
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    Ok(app)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // System routes
        .route(
            "/systems",
            get(systems::list_systems).post(systems::create_system),
        )
        .route(
            "/systems/:id",
            get(systems::get_system)
                .put(systems::update_system)
                .delete(systems::delete_system),
        )
        .route("/systems/:id/activate", post(systems::activate_system))
        .route("/systems/:id/deprecate", post(systems::deprecate_system))
        .route("/systems/:id/hierarchy", get(systems::system_hierarchy))
        .route("/search", get(systems::search_systems))
        // Data flow routes
        .route(
            "/dataflows",
            get(dataflows::list_dataflows).post(dataflows::create_dataflow),
        )
        .route(
            "/dataflows/:id",
            get(dataflows::get_dataflow)
                .put(dataflows::update_dataflow)
                .delete(dataflows::delete_dataflow),
        )
        // Read models
        .route("/statistics", get(statistics::get_statistics))
        .route("/diagram/dataflow", get(diagram::get_dataflow_diagram))
        .route("/export/excel", get(export::export_excel))
}
