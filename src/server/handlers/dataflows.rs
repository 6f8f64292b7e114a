use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::common::text::non_blank;
use crate::model::DataFlow;
use crate::server::app::AppState;
use crate::server::error::{parse_path_id, ApiError};
use crate::services::validation::DataFlowInput;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DataFlowListQuery {
    /// Only flows where this system is the source or the target
    pub system_id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/dataflows",
    params(DataFlowListQuery),
    responses(
        (status = 200, description = "Data flows in creation order", body = [DataFlow]),
        (status = 404, description = "Filter system not found", body = crate::server::error::ErrorBody)
    )
)]
pub async fn list_dataflows(
    State(state): State<AppState>,
    query: Result<Query<DataFlowListQuery>, QueryRejection>,
) -> Result<Json<Vec<DataFlow>>, ApiError> {
    let Query(query) = query?;
    let system_id = match non_blank(query.system_id.as_deref()) {
        Some(raw) => Some(parse_path_id("System", &raw)?),
        None => None,
    };
    Ok(Json(state.ctx.list_dataflows(system_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/dataflows/{id}",
    params(("id" = String, Path, description = "Data flow id")),
    responses(
        (status = 200, description = "Data flow", body = DataFlow),
        (status = 404, description = "Data flow not found", body = crate::server::error::ErrorBody)
    )
)]
pub async fn get_dataflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataFlow>, ApiError> {
    let id = parse_path_id("DataFlow", &id)?;
    Ok(Json(state.ctx.get_dataflow(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/dataflows",
    request_body = DataFlowInput,
    responses(
        (status = 201, description = "Data flow created", body = DataFlow),
        (status = 400, description = "Validation failed", body = crate::server::error::ErrorBody),
        (status = 409, description = "Unknown source or target system", body = crate::server::error::ErrorBody)
    )
)]
pub async fn create_dataflow(
    State(state): State<AppState>,
    payload: Result<Json<DataFlowInput>, JsonRejection>,
) -> Result<(StatusCode, Json<DataFlow>), ApiError> {
    let Json(input) = payload?;
    let flow = state.ctx.create_dataflow(&input).await?;
    Ok((StatusCode::CREATED, Json(flow)))
}

#[utoipa::path(
    put,
    path = "/api/v1/dataflows/{id}",
    params(("id" = String, Path, description = "Data flow id")),
    request_body = DataFlowInput,
    responses(
        (status = 200, description = "Data flow updated", body = DataFlow),
        (status = 400, description = "Validation failed", body = crate::server::error::ErrorBody),
        (status = 404, description = "Data flow not found", body = crate::server::error::ErrorBody),
        (status = 409, description = "Unknown source or target system", body = crate::server::error::ErrorBody)
    )
)]
pub async fn update_dataflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<DataFlowInput>, JsonRejection>,
) -> Result<Json<DataFlow>, ApiError> {
    let id = parse_path_id("DataFlow", &id)?;
    let Json(input) = payload?;
    Ok(Json(state.ctx.update_dataflow(id, &input).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/dataflows/{id}",
    params(("id" = String, Path, description = "Data flow id")),
    responses(
        (status = 204, description = "Data flow deleted"),
        (status = 404, description = "Data flow not found", body = crate::server::error::ErrorBody)
    )
)]
pub async fn delete_dataflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_path_id("DataFlow", &id)?;
    state.ctx.delete_dataflow(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
