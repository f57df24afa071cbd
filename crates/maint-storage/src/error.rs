//! Storage error types for maint-storage.
//!
//! [`StorageError`] carries the four domain outcomes callers act on
//! (not found, validation, patch, id mismatch) and keeps backend failures
//! in separate variants so they can never be mistaken for a missing entity.

use thiserror::Error;

use maint_core::{MaintenanceId, PatchError, SettingItemId, ValidationError};

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A maintenance task with the given ID was not found.
    #[error("maintenance not found: {0}")]
    MaintenanceNotFound(MaintenanceId),

    /// A setting item with the given ID was not found.
    #[error("setting item not found: {0}")]
    SettingItemNotFound(SettingItemId),

    /// A full update named one ID in its address and another in its body.
    #[error("id mismatch: path id {path} does not match body id {body}")]
    IdMismatch {
        path: MaintenanceId,
        body: MaintenanceId,
    },

    /// The write would break a domain rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The patch document was malformed.
    #[error(transparent)]
    Patch(#[from] PatchError),

    /// The SQLite backend failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Applying schema migrations failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// Stored rows are inconsistent (e.g. a child index pointing nowhere).
    #[error("integrity error: {reason}")]
    Integrity { reason: String },
}

impl StorageError {
    /// `true` for the not-found variants.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::MaintenanceNotFound(_) | StorageError::SettingItemNotFound(_)
        )
    }
}
