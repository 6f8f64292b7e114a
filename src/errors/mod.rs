//! Error types for the system registry
//!
//! Every operation exposed by the services returns [`RegistryResult`]. The
//! variants of [`RegistryError`] map one-to-one onto how a caller is expected
//! to react:
//!
//! - **Validation**: field-level problems with the submitted record, detected
//!   before anything is written.
//! - **NotFound**: the referenced system or data flow does not exist.
//! - **Integrity**: the record is well formed but conflicts with stored data
//!   (duplicate code, dangling reference, hierarchy cycle, blocked delete).
//! - **Upstream**: the record store failed; surfaced as-is, never retried.
//! - **Export**: the spreadsheet encoder failed.
//!
//! # Examples
//!
//! ```rust
//! use landscape::errors::{FieldErrors, RegistryError, RegistryErrorKind};
//!
//! let mut fields = FieldErrors::new();
//! fields.insert("name", "Name is required");
//! let err = RegistryError::Validation(fields);
//!
//! assert_eq!(err.kind(), RegistryErrorKind::Validation);
//! assert!(err.is_client_error());
//! ```

pub mod fields;
pub mod registry;

pub use fields::FieldErrors;
pub use registry::{RegistryError, RegistryErrorKind};

/// Result type alias for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_result_alias() {
        let result: RegistryResult<()> = Err(RegistryError::not_found("System", "42"));
        assert!(result.is_err());
    }
}
