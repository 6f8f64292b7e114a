use axum::{extract::State, response::Json};

use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::services::diagram::DataflowDiagram;

#[utoipa::path(
    get,
    path = "/api/v1/diagram/dataflow",
    responses(
        (status = 200, description = "Systems as nodes, data flows as edges", body = DataflowDiagram),
        (status = 409, description = "Stored data flows reference missing systems", body = crate::server::error::ErrorBody)
    )
)]
pub async fn get_dataflow_diagram(
    State(state): State<AppState>,
) -> Result<Json<DataflowDiagram>, ApiError> {
    Ok(Json(state.ctx.dataflow_diagram().await?))
}
