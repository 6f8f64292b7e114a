//! Record-store error categorization
//!
//! Classifies `sea_orm::DbErr` values so that the registry can tell a
//! constraint violation (caller's fault) from a store outage.
//!
//! ```rust
//! use landscape::common::db_errors::DbErrorKind;
//! use sea_orm::DbErr;
//!
//! let err = DbErr::RecordNotFound("system".to_string());
//! assert_eq!(DbErrorKind::from_db_err(&err), DbErrorKind::NotFound);
//! ```

use sea_orm::{DbErr, SqlErr};

/// Categories of record-store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorKind {
    /// Query returned no results, or the row to update is gone
    NotFound,

    /// Unique constraint violation
    UniqueViolation,

    /// Foreign key constraint violation
    ForeignKeyViolation,

    /// Store unreachable or pool exhausted
    ConnectionError,

    /// Stored row could not be decoded
    CorruptRecord,

    Unknown,
}

impl DbErrorKind {
    pub fn from_db_err(err: &DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => return Self::UniqueViolation,
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => return Self::ForeignKeyViolation,
            _ => {}
        }

        match err {
            DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => Self::NotFound,
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => Self::ConnectionError,
            DbErr::Json(_) | DbErr::Type(_) => Self::CorruptRecord,
            DbErr::Exec(_) | DbErr::Query(_) => {
                let msg_lower = err.to_string().to_lowercase();
                if msg_lower.contains("unique") || msg_lower.contains("duplicate") {
                    Self::UniqueViolation
                } else if msg_lower.contains("foreign key") {
                    Self::ForeignKeyViolation
                } else {
                    Self::Unknown
                }
            }
            _ => Self::Unknown,
        }
    }

    /// Constraint violations are caused by the submitted data, not the store.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation | Self::ForeignKeyViolation)
    }
}
