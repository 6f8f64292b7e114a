use axum::{extract::State, response::Json};

use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::services::statistics::SystemStatistics;

#[utoipa::path(
    get,
    path = "/api/v1/statistics",
    responses(
        (status = 200, description = "Dashboard statistics", body = SystemStatistics),
        (status = 503, description = "Record store unavailable", body = crate::server::error::ErrorBody)
    )
)]
pub async fn get_statistics(
    State(state): State<AppState>,
) -> Result<Json<SystemStatistics>, ApiError> {
    Ok(Json(state.ctx.statistics().await?))
}
