use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::server::app::AppState;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and record store are reachable"),
        (status = 503, description = "Record store unreachable")
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let (status, database) = match state.ctx.db().ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(err) => {
            tracing::error!("Health check failed to reach the record store: {}", err);
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    (
        status,
        Json(json!({
            "status": if status == StatusCode::OK { "healthy" } else { "degraded" },
            "service": "landscape-registry",
            "database": database,
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}
