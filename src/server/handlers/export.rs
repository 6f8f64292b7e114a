use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::services::query::SystemQuery;
use crate::services::XLSX_CONTENT_TYPE;

#[utoipa::path(
    get,
    path = "/api/v1/export/excel",
    params(SystemQuery),
    responses(
        (status = 200, description = "XLSX workbook of the filtered systems, sent as an attachment"),
        (status = 400, description = "Invalid filters or too many rows", body = crate::server::error::ErrorBody),
        (status = 500, description = "Spreadsheet generation failed", body = crate::server::error::ErrorBody)
    )
)]
pub async fn export_excel(
    State(state): State<AppState>,
    query: Result<Query<SystemQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let export = state.ctx.export_systems(&query).await?;

    let headers = [
        (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.filename),
        ),
    ];
    Ok((headers, export.bytes).into_response())
}
