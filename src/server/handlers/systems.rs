use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};

use crate::model::InformationSystem;
use crate::server::app::AppState;
use crate::server::error::{parse_path_id, ApiError};
use crate::services::query::{SystemPage, SystemQuery};
use crate::services::validation::SystemInput;
use crate::services::{SystemDetail, SystemHierarchy};

#[utoipa::path(
    get,
    path = "/api/v1/systems",
    params(SystemQuery),
    responses(
        (status = 200, description = "One page of systems", body = SystemPage),
        (status = 400, description = "Invalid filter or paging parameters", body = crate::server::error::ErrorBody)
    )
)]
pub async fn list_systems(
    State(state): State<AppState>,
    query: Result<Query<SystemQuery>, QueryRejection>,
) -> Result<Json<SystemPage>, ApiError> {
    let Query(query) = query?;
    Ok(Json(state.ctx.list_systems(&query).await?))
}

/// Same contract as the list; `q` carries the free-text search.
#[utoipa::path(
    get,
    path = "/api/v1/search",
    params(SystemQuery),
    responses(
        (status = 200, description = "One page of matching systems", body = SystemPage),
        (status = 400, description = "Invalid filter or paging parameters", body = crate::server::error::ErrorBody)
    )
)]
pub async fn search_systems(
    state: State<AppState>,
    query: Result<Query<SystemQuery>, QueryRejection>,
) -> Result<Json<SystemPage>, ApiError> {
    list_systems(state, query).await
}

#[utoipa::path(
    get,
    path = "/api/v1/systems/{id}",
    params(("id" = String, Path, description = "System id")),
    responses(
        (status = 200, description = "System with its data flows", body = SystemDetail),
        (status = 404, description = "System not found", body = crate::server::error::ErrorBody)
    )
)]
pub async fn get_system(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SystemDetail>, ApiError> {
    let id = parse_path_id("System", &id)?;
    Ok(Json(state.ctx.get_system(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/systems",
    request_body = SystemInput,
    responses(
        (status = 201, description = "System created", body = InformationSystem),
        (status = 400, description = "Validation failed", body = crate::server::error::ErrorBody),
        (status = 409, description = "Duplicate code or unknown references", body = crate::server::error::ErrorBody)
    )
)]
pub async fn create_system(
    State(state): State<AppState>,
    payload: Result<Json<SystemInput>, JsonRejection>,
) -> Result<(StatusCode, Json<InformationSystem>), ApiError> {
    let Json(input) = payload?;
    let system = state.ctx.create_system(&input).await?;
    Ok((StatusCode::CREATED, Json(system)))
}

#[utoipa::path(
    put,
    path = "/api/v1/systems/{id}",
    params(("id" = String, Path, description = "System id")),
    request_body = SystemInput,
    responses(
        (status = 200, description = "System updated", body = InformationSystem),
        (status = 400, description = "Validation failed", body = crate::server::error::ErrorBody),
        (status = 404, description = "System not found", body = crate::server::error::ErrorBody),
        (status = 409, description = "Duplicate code, unknown references or hierarchy cycle", body = crate::server::error::ErrorBody)
    )
)]
pub async fn update_system(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SystemInput>, JsonRejection>,
) -> Result<Json<InformationSystem>, ApiError> {
    let id = parse_path_id("System", &id)?;
    let Json(input) = payload?;
    Ok(Json(state.ctx.update_system(id, &input).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/systems/{id}",
    params(("id" = String, Path, description = "System id")),
    responses(
        (status = 204, description = "System deleted"),
        (status = 404, description = "System not found", body = crate::server::error::ErrorBody),
        (status = 409, description = "System still referenced by data flows or child systems", body = crate::server::error::ErrorBody)
    )
)]
pub async fn delete_system(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_path_id("System", &id)?;
    state.ctx.delete_system(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/systems/{id}/activate",
    params(("id" = String, Path, description = "System id")),
    responses(
        (status = 200, description = "System is in production", body = InformationSystem),
        (status = 404, description = "System not found", body = crate::server::error::ErrorBody)
    )
)]
pub async fn activate_system(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InformationSystem>, ApiError> {
    let id = parse_path_id("System", &id)?;
    Ok(Json(state.ctx.activate_system(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/systems/{id}/deprecate",
    params(("id" = String, Path, description = "System id")),
    responses(
        (status = 200, description = "System is deprecated", body = InformationSystem),
        (status = 404, description = "System not found", body = crate::server::error::ErrorBody)
    )
)]
pub async fn deprecate_system(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InformationSystem>, ApiError> {
    let id = parse_path_id("System", &id)?;
    Ok(Json(state.ctx.deprecate_system(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/systems/{id}/hierarchy",
    params(("id" = String, Path, description = "System id")),
    responses(
        (status = 200, description = "Ancestors and direct children", body = SystemHierarchy),
        (status = 404, description = "System not found", body = crate::server::error::ErrorBody)
    )
)]
pub async fn system_hierarchy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SystemHierarchy>, ApiError> {
    let id = parse_path_id("System", &id)?;
    Ok(Json(state.ctx.system_hierarchy(id).await?))
}
