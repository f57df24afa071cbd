//! The [`MaintenanceStore`] trait defining the repository contract.
//!
//! The surface mirrors what callers can actually address: the Maintenance
//! aggregate as a whole, and SettingItems individually. Settings and
//! DataVariants are only reachable through their owners.
//!
//! All backends (InMemoryStore, SqliteStore) implement this trait and are
//! swappable without changing the service layer. Each mutating method is a
//! single transaction: it validates first and commits everything or nothing.

use maint_core::{
    Maintenance, MaintenanceDraft, MaintenanceId, MaintenanceUpdate, PatchOperation, SettingItem,
    SettingItemDraft, SettingItemId,
};

use crate::error::StorageError;

/// The storage contract for maintenance configuration trees.
///
/// The trait is synchronous; callers that share a store across tasks wrap
/// it in a lock, which also gives each call its transaction isolation.
pub trait MaintenanceStore: Send {
    // -------------------------------------------------------------------
    // Maintenance aggregate
    // -------------------------------------------------------------------

    /// Lists every maintenance task, fully hydrated, in ID order.
    fn list_maintenances(&self) -> Result<Vec<Maintenance>, StorageError>;

    /// Number of stored maintenance tasks.
    fn count_maintenances(&self) -> Result<usize, StorageError>;

    /// Loads one maintenance task with its whole subtree.
    fn get_maintenance(&self, id: MaintenanceId) -> Result<Maintenance, StorageError>;

    /// Creates a maintenance task and every nested setting, item and variant.
    ///
    /// Every nested item is validated before anything is written. Returns
    /// the hydrated aggregate with freshly assigned IDs.
    fn create_maintenance(&mut self, draft: &MaintenanceDraft)
        -> Result<Maintenance, StorageError>;

    /// Replaces a maintenance task's own fields (`number`, `description`).
    ///
    /// Nested settings are untouched. Fails with
    /// [`StorageError::IdMismatch`] before touching storage when `update.id`
    /// differs from `id`.
    fn update_maintenance(
        &mut self,
        id: MaintenanceId,
        update: &MaintenanceUpdate,
    ) -> Result<(), StorageError>;

    /// Deletes a maintenance task and everything it transitively owns.
    fn delete_maintenance(&mut self, id: MaintenanceId) -> Result<(), StorageError>;

    // -------------------------------------------------------------------
    // SettingItem
    // -------------------------------------------------------------------

    /// Loads one setting item with its variants.
    fn get_setting_item(&self, id: SettingItemId) -> Result<SettingItem, StorageError>;

    /// Creates a setting item under the setting named by `draft.setting_id`.
    ///
    /// A missing or unknown parent is a validation error, as is an
    /// `item_data` outside the declared variants.
    fn create_setting_item(&mut self, draft: &SettingItemDraft)
        -> Result<SettingItem, StorageError>;

    /// Applies a patch document to a setting item.
    ///
    /// Load, patch, validate and write happen in one transaction; on any
    /// failure the stored item is unchanged. Returns the updated item.
    fn patch_setting_item(
        &mut self,
        id: SettingItemId,
        operations: &[PatchOperation],
    ) -> Result<SettingItem, StorageError>;

    /// Deletes a setting item and its variants.
    fn delete_setting_item(&mut self, id: SettingItemId) -> Result<(), StorageError>;
}

/// Rejects an update whose body ID disagrees with the addressed ID.
pub(crate) fn ensure_ids_match(
    id: MaintenanceId,
    update: &MaintenanceUpdate,
) -> Result<(), StorageError> {
    if update.id != id {
        return Err(StorageError::IdMismatch {
            path: id,
            body: update.id,
        });
    }
    Ok(())
}
