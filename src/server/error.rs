use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::{RegistryError, RegistryErrorKind};

/// JSON body returned for every failed request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable summary
    pub error: String,
    /// VALIDATION_FAILED, NOT_FOUND, CONFLICT, SERVICE_ERROR or INTERNAL_ERROR
    pub code: String,
    /// Offending field → message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

/// Registry error on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub RegistryError);

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(RegistryError::validation("body", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(RegistryError::validation("query", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if err.kind() == RegistryErrorKind::Export {
            tracing::error!("Export failed: {}", err);
        }

        let body = ErrorBody {
            error: err.public_message(),
            code: err.kind().code().to_string(),
            fields: err.fields().map(|fields| fields.as_map().clone()),
        };
        (status, Json(body)).into_response()
    }
}

/// Path ids that are not UUIDs cannot name a stored record.
pub fn parse_path_id(entity: &'static str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError(RegistryError::not_found(entity, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_body_carries_fields() {
        let response = ApiError(RegistryError::validation("name", "Name is required")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn malformed_path_id_is_not_found() {
        let err = parse_path_id("System", "not-a-uuid").unwrap_err();
        assert_eq!(err.0.kind(), RegistryErrorKind::NotFound);
    }
}
