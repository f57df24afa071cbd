//! In-memory implementation of [`MaintenanceStore`].
//!
//! [`InMemoryStore`] is a first-class backend for tests and for running the
//! server without a database file. Each entity type lives in its own arena
//! keyed by ID, and parent→children index tables record ownership and child
//! order. Cascading deletes walk those index tables.
//!
//! Writes validate everything up front and only then mutate, so a failed
//! operation never leaves partial rows behind. Nothing survives a restart.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use maint_core::patch::apply_patch;
use maint_core::validate::{
    validate_maintenance_draft, validate_setting_item, validate_setting_item_draft,
};
use maint_core::{
    DataVariant, DataVariantDraft, DataVariantId, Maintenance, MaintenanceDraft, MaintenanceId,
    MaintenanceUpdate, PatchOperation, Setting, SettingId, SettingItem, SettingItemDraft,
    SettingItemId, ValidationError,
};

use crate::error::StorageError;
use crate::traits::{ensure_ids_match, MaintenanceStore};

#[derive(Debug, Clone)]
struct MaintenanceRow {
    number: i32,
    description: String,
}

#[derive(Debug, Clone)]
struct SettingRow {
    maintenance_id: MaintenanceId,
    name: String,
    description: String,
}

#[derive(Debug, Clone)]
struct SettingItemRow {
    setting_id: SettingId,
    name: String,
    description: String,
    item_data: i32,
}

#[derive(Debug, Clone)]
struct DataVariantRow {
    setting_item_id: SettingItemId,
    value: i32,
    description: String,
}

/// Per-table ID counters. IDs start at 1 and are never handed out twice.
#[derive(Debug, Default)]
struct IdCounters {
    maintenance: i64,
    setting: i64,
    setting_item: i64,
    data_variant: i64,
}

impl IdCounters {
    fn next_maintenance(&mut self) -> MaintenanceId {
        self.maintenance += 1;
        MaintenanceId(self.maintenance)
    }

    fn next_setting(&mut self) -> SettingId {
        self.setting += 1;
        SettingId(self.setting)
    }

    fn next_setting_item(&mut self) -> SettingItemId {
        self.setting_item += 1;
        SettingItemId(self.setting_item)
    }

    fn next_data_variant(&mut self) -> DataVariantId {
        self.data_variant += 1;
        DataVariantId(self.data_variant)
    }
}

/// In-memory implementation of [`MaintenanceStore`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    maintenances: BTreeMap<MaintenanceId, MaintenanceRow>,
    settings: HashMap<SettingId, SettingRow>,
    setting_items: HashMap<SettingItemId, SettingItemRow>,
    data_variants: HashMap<DataVariantId, DataVariantRow>,
    /// Settings owned by each maintenance, in insertion order.
    settings_of: HashMap<MaintenanceId, Vec<SettingId>>,
    /// Items owned by each setting, in insertion order.
    items_of: HashMap<SettingId, Vec<SettingItemId>>,
    /// Variants owned by each item, in insertion order.
    variants_of: HashMap<SettingItemId, Vec<DataVariantId>>,
    ids: IdCounters,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Hydration
    // -----------------------------------------------------------------------

    fn hydrate_maintenance(&self, id: MaintenanceId) -> Result<Maintenance, StorageError> {
        let row = self
            .maintenances
            .get(&id)
            .ok_or(StorageError::MaintenanceNotFound(id))?;
        let settings = self
            .settings_of
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|&setting_id| self.hydrate_setting(setting_id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Maintenance {
            id,
            number: row.number,
            description: row.description.clone(),
            settings,
        })
    }

    fn hydrate_setting(&self, id: SettingId) -> Result<Setting, StorageError> {
        let row = self.settings.get(&id).ok_or_else(|| dangling("setting", id.0))?;
        let items = self
            .items_of
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|&item_id| {
                self.hydrate_setting_item(item_id)?
                    .ok_or_else(|| dangling("setting item", item_id.0))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Setting {
            id,
            maintenance_id: row.maintenance_id,
            name: row.name.clone(),
            description: row.description.clone(),
            items,
        })
    }

    fn hydrate_setting_item(&self, id: SettingItemId) -> Result<Option<SettingItem>, StorageError> {
        let Some(row) = self.setting_items.get(&id) else {
            return Ok(None);
        };
        let data_variants = self
            .variants_of
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|&variant_id| {
                let variant = self
                    .data_variants
                    .get(&variant_id)
                    .ok_or_else(|| dangling("data variant", variant_id.0))?;
                Ok(DataVariant {
                    id: variant_id,
                    setting_item_id: variant.setting_item_id,
                    value: variant.value,
                    description: variant.description.clone(),
                })
            })
            .collect::<Result<Vec<_>, StorageError>>()?;
        Ok(Some(SettingItem {
            id,
            setting_id: row.setting_id,
            name: row.name.clone(),
            description: row.description.clone(),
            item_data: row.item_data,
            data_variants,
        }))
    }

    // -----------------------------------------------------------------------
    // Infallible writes (callers validate first)
    // -----------------------------------------------------------------------

    fn insert_setting_item(&mut self, setting_id: SettingId, draft: &SettingItemDraft) -> SettingItemId {
        let id = self.ids.next_setting_item();
        self.setting_items.insert(
            id,
            SettingItemRow {
                setting_id,
                name: draft.name.clone(),
                description: draft.description.clone(),
                item_data: draft.item_data,
            },
        );
        self.items_of.entry(setting_id).or_default().push(id);
        self.insert_variants(id, &draft.data_variants);
        id
    }

    fn insert_variants(&mut self, item_id: SettingItemId, drafts: &[DataVariantDraft]) {
        let mut ids = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id = self.ids.next_data_variant();
            self.data_variants.insert(
                id,
                DataVariantRow {
                    setting_item_id: item_id,
                    value: draft.value,
                    description: draft.description.clone(),
                },
            );
            ids.push(id);
        }
        self.variants_of.entry(item_id).or_default().extend(ids);
    }

    fn remove_variants(&mut self, item_id: SettingItemId) {
        for variant_id in self.variants_of.remove(&item_id).unwrap_or_default() {
            self.data_variants.remove(&variant_id);
        }
    }

    /// Removes an item row and its variants. Leaves the parent index alone.
    fn remove_setting_item_rows(&mut self, item_id: SettingItemId) {
        self.remove_variants(item_id);
        self.setting_items.remove(&item_id);
    }
}

fn dangling(entity: &str, id: i64) -> StorageError {
    StorageError::Integrity {
        reason: format!("{entity} {id} is indexed but has no row"),
    }
}

impl MaintenanceStore for InMemoryStore {
    // -------------------------------------------------------------------
    // Maintenance aggregate
    // -------------------------------------------------------------------

    fn list_maintenances(&self) -> Result<Vec<Maintenance>, StorageError> {
        self.maintenances
            .keys()
            .map(|&id| self.hydrate_maintenance(id))
            .collect()
    }

    fn count_maintenances(&self) -> Result<usize, StorageError> {
        Ok(self.maintenances.len())
    }

    fn get_maintenance(&self, id: MaintenanceId) -> Result<Maintenance, StorageError> {
        self.hydrate_maintenance(id)
    }

    fn create_maintenance(
        &mut self,
        draft: &MaintenanceDraft,
    ) -> Result<Maintenance, StorageError> {
        validate_maintenance_draft(draft)?;

        let id = self.ids.next_maintenance();
        self.maintenances.insert(
            id,
            MaintenanceRow {
                number: draft.number,
                description: draft.description.clone(),
            },
        );
        let mut setting_ids = Vec::with_capacity(draft.settings.len());
        for setting in &draft.settings {
            let setting_id = self.ids.next_setting();
            self.settings.insert(
                setting_id,
                SettingRow {
                    maintenance_id: id,
                    name: setting.name.clone(),
                    description: setting.description.clone(),
                },
            );
            self.items_of.entry(setting_id).or_default();
            for item in &setting.items {
                self.insert_setting_item(setting_id, item);
            }
            setting_ids.push(setting_id);
        }
        self.settings_of.insert(id, setting_ids);

        debug!(maintenance = %id, "created maintenance in memory");
        self.hydrate_maintenance(id)
    }

    fn update_maintenance(
        &mut self,
        id: MaintenanceId,
        update: &MaintenanceUpdate,
    ) -> Result<(), StorageError> {
        ensure_ids_match(id, update)?;
        let row = self
            .maintenances
            .get_mut(&id)
            .ok_or(StorageError::MaintenanceNotFound(id))?;
        row.number = update.number;
        row.description = update.description.clone();
        Ok(())
    }

    fn delete_maintenance(&mut self, id: MaintenanceId) -> Result<(), StorageError> {
        self.maintenances
            .remove(&id)
            .ok_or(StorageError::MaintenanceNotFound(id))?;
        for setting_id in self.settings_of.remove(&id).unwrap_or_default() {
            for item_id in self.items_of.remove(&setting_id).unwrap_or_default() {
                self.remove_setting_item_rows(item_id);
            }
            self.settings.remove(&setting_id);
        }
        debug!(maintenance = %id, "deleted maintenance subtree from memory");
        Ok(())
    }

    // -------------------------------------------------------------------
    // SettingItem
    // -------------------------------------------------------------------

    fn get_setting_item(&self, id: SettingItemId) -> Result<SettingItem, StorageError> {
        self.hydrate_setting_item(id)?
            .ok_or(StorageError::SettingItemNotFound(id))
    }

    fn create_setting_item(
        &mut self,
        draft: &SettingItemDraft,
    ) -> Result<SettingItem, StorageError> {
        let setting_id = draft.setting_id.ok_or(ValidationError::MissingParent)?;
        if !self.settings.contains_key(&setting_id) {
            return Err(ValidationError::UnknownParent(setting_id).into());
        }
        validate_setting_item_draft(draft)?;

        let id = self.insert_setting_item(setting_id, draft);
        self.get_setting_item(id)
    }

    fn patch_setting_item(
        &mut self,
        id: SettingItemId,
        operations: &[PatchOperation],
    ) -> Result<SettingItem, StorageError> {
        let current = self.get_setting_item(id)?;
        let candidate = apply_patch(&current, operations)?;
        validate_setting_item(&candidate)?;

        let row = self
            .setting_items
            .get_mut(&id)
            .ok_or(StorageError::SettingItemNotFound(id))?;
        row.name = candidate.name.clone();
        row.description = candidate.description.clone();
        row.item_data = candidate.item_data;

        if candidate.data_variants != current.data_variants {
            let drafts: Vec<DataVariantDraft> =
                candidate.data_variants.iter().map(DataVariantDraft::from).collect();
            self.remove_variants(id);
            self.insert_variants(id, &drafts);
        }

        self.get_setting_item(id)
    }

    fn delete_setting_item(&mut self, id: SettingItemId) -> Result<(), StorageError> {
        let row = self
            .setting_items
            .get(&id)
            .ok_or(StorageError::SettingItemNotFound(id))?;
        if let Some(siblings) = self.items_of.get_mut(&row.setting_id) {
            siblings.retain(|&sibling| sibling != id);
        }
        self.remove_setting_item_rows(id);
        Ok(())
    }
}
