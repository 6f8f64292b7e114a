pub mod dataflow_service;
pub mod diagram;
pub mod export_service;
pub mod hierarchy;
pub mod query;
pub mod statistics;
pub mod system_service;
pub mod validation;

pub use dataflow_service::*;
pub use export_service::*;
pub use system_service::*;

use sea_orm::DbErr;
use uuid::Uuid;

use crate::common::db_errors::DbErrorKind;
use crate::errors::RegistryError;

/// Log a record-store failure and classify it for the caller.
pub(crate) fn store_error(operation: &'static str) -> impl FnOnce(DbErr) -> RegistryError {
    move |err| {
        if DbErrorKind::from_db_err(&err).is_constraint_violation() {
            tracing::warn!("Constraint violation during {}: {}", operation, err);
        } else {
            tracing::error!("Record store error during {}: {}", operation, err);
        }
        RegistryError::from_db(operation, err)
    }
}

/// Like `store_error`, but a row that disappeared before the write lands is
/// reported as missing rather than as a store failure.
pub(crate) fn write_error(
    operation: &'static str,
    entity: &'static str,
    id: Uuid,
) -> impl FnOnce(DbErr) -> RegistryError {
    move |err| {
        if DbErrorKind::from_db_err(&err) == DbErrorKind::NotFound {
            tracing::warn!("{} {} vanished during {}", entity, id, operation);
            RegistryError::not_found(entity, id)
        } else {
            store_error(operation)(err)
        }
    }
}
