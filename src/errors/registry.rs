//! Registry error taxonomy
//!
//! ```rust
//! use landscape::errors::RegistryError;
//!
//! let err = RegistryError::integrity("code", "Code 'SYS-1' is already in use");
//! assert_eq!(err.http_status_code(), 409);
//! ```

use sea_orm::DbErr;
use thiserror::Error;

use super::FieldErrors;
use crate::common::db_errors::DbErrorKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryErrorKind {
    Validation,
    NotFound,
    Integrity,
    Upstream,
    Export,
}

impl RegistryErrorKind {
    /// Stable machine-readable code for API consumers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_FAILED",
            Self::NotFound => "NOT_FOUND",
            Self::Integrity => "CONFLICT",
            Self::Upstream => "SERVICE_ERROR",
            Self::Export => "INTERNAL_ERROR",
        }
    }
}

/// Errors raised by registry operations
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Field-level validation failed; nothing was written
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Referenced record does not exist
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// Entity name, e.g. "System"
        entity: &'static str,
        /// Identifier as supplied by the caller
        id: String,
    },

    /// Record conflicts with stored data
    #[error("Integrity violation: {message}")]
    Integrity {
        /// Summary of the conflict
        message: String,
        /// Offending input fields
        fields: FieldErrors,
    },

    /// Record store failed
    #[error("Record store error during {operation}: {source}")]
    Upstream {
        /// Operation that was running
        operation: String,
        #[source]
        source: DbErr,
    },

    /// Spreadsheet generation failed
    #[error("Export failed: {0}")]
    Export(String),
}

impl RegistryError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }

    pub fn integrity(field: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Integrity {
            fields: FieldErrors::single(field, message.clone()),
            message,
        }
    }

    pub fn integrity_fields(message: impl Into<String>, fields: FieldErrors) -> Self {
        Self::Integrity {
            message: message.into(),
            fields,
        }
    }

    /// Classify a record-store error raised while running `operation`.
    ///
    /// Unique and foreign-key violations that slip past the pre-write checks
    /// (for example two concurrent creates with the same code) are reported as
    /// integrity errors; everything else is an upstream failure.
    pub fn from_db(operation: impl Into<String>, err: DbErr) -> Self {
        let operation = operation.into();
        match DbErrorKind::from_db_err(&err) {
            DbErrorKind::UniqueViolation => Self::integrity_fields(
                format!("Duplicate value during {}", operation),
                FieldErrors::single("code", "Code is already in use"),
            ),
            DbErrorKind::ForeignKeyViolation => Self::integrity_fields(
                format!("Referenced record missing or still in use during {}", operation),
                FieldErrors::new(),
            ),
            _ => Self::Upstream {
                operation,
                source: err,
            },
        }
    }

    pub fn kind(&self) -> RegistryErrorKind {
        match self {
            Self::Validation(_) => RegistryErrorKind::Validation,
            Self::NotFound { .. } => RegistryErrorKind::NotFound,
            Self::Integrity { .. } => RegistryErrorKind::Integrity,
            Self::Upstream { .. } => RegistryErrorKind::Upstream,
            Self::Export(_) => RegistryErrorKind::Export,
        }
    }

    /// Field map for validation and integrity errors.
    pub fn fields(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(fields) => Some(fields),
            Self::Integrity { fields, .. } if !fields.is_empty() => Some(fields),
            _ => None,
        }
    }

    /// Check if this is a client error (400-series)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound { .. } | Self::Integrity { .. }
        )
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Integrity { .. } => 409,
            Self::Upstream { .. } => 503,
            Self::Export(_) => 500,
        }
    }

    /// Message safe to show to an end user. Upstream details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(_) => "Validation failed".to_string(),
            Self::Upstream { operation, .. } => {
                format!("Record store unavailable while trying to {}", operation)
            }
            other => other.to_string(),
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for RegistryError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Export(err.to_string())
    }
}
