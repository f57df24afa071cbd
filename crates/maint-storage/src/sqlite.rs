//! SQLite implementation of [`MaintenanceStore`].
//!
//! [`SqliteStore`] persists maintenance trees in four tables (one per entity
//! type) linked by foreign keys. Every write runs inside a transaction;
//! validation happens inside that transaction, before any row changes, so a
//! rejected write rolls back with nothing applied.
//!
//! Cascading deletes are explicit (children first). The schema also declares
//! `ON DELETE CASCADE`, but the store does not rely on it.

use rusqlite::{params, Connection, OptionalExtension};
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

/// SQLite-backed implementation of [`MaintenanceStore`].
///
/// Every write operation is wrapped in a transaction for atomicity.
/// The database uses WAL mode for performance and foreign keys for integrity.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) a SQLite database at `path`.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteStore { conn })
    }

    /// Opens an in-memory SQLite database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteStore { conn })
    }
}

// ---------------------------------------------------------------------------
// Row helpers. They take `&Connection` so they run equally on the store's
// connection and inside a `Transaction` (which derefs to one).
// ---------------------------------------------------------------------------

fn maintenance_exists(conn: &Connection, id: MaintenanceId) -> Result<bool, StorageError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM maintenances WHERE id = ?1)",
        params![id.0],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn setting_exists(conn: &Connection, id: SettingId) -> Result<bool, StorageError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM settings WHERE id = ?1)",
        params![id.0],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn load_maintenance(
    conn: &Connection,
    id: MaintenanceId,
) -> Result<Option<Maintenance>, StorageError> {
    let row = conn
        .query_row(
            "SELECT number, description FROM maintenances WHERE id = ?1",
            params![id.0],
            |row| Ok((row.get::<_, i32>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()?;
    let Some((number, description)) = row else {
        return Ok(None);
    };
    Ok(Some(Maintenance {
        id,
        number,
        description,
        settings: load_settings(conn, id)?,
    }))
}

fn load_settings(
    conn: &Connection,
    maintenance_id: MaintenanceId,
) -> Result<Vec<Setting>, StorageError> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, description FROM settings WHERE maintenance_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![maintenance_id.0], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;
    let mut result = Vec::new();
    for row in rows {
        let (id, name, description) = row?;
        let id = SettingId(id);
        result.push(Setting {
            id,
            maintenance_id,
            name,
            description,
            items: load_items(conn, id)?,
        });
    }
    Ok(result)
}

type ItemRow = (i64, i64, String, String, i32);

fn item_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ItemRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn hydrate_item(conn: &Connection, row: ItemRow) -> Result<SettingItem, StorageError> {
    let (id, setting_id, name, description, item_data) = row;
    let id = SettingItemId(id);
    Ok(SettingItem {
        id,
        setting_id: SettingId(setting_id),
        name,
        description,
        item_data,
        data_variants: load_variants(conn, id)?,
    })
}

fn load_items(conn: &Connection, setting_id: SettingId) -> Result<Vec<SettingItem>, StorageError> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, setting_id, name, description, item_data
         FROM setting_items WHERE setting_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![setting_id.0], item_from_row)?;
    let mut result = Vec::new();
    for row in rows {
        result.push(hydrate_item(conn, row?)?);
    }
    Ok(result)
}

fn load_item(conn: &Connection, id: SettingItemId) -> Result<Option<SettingItem>, StorageError> {
    let row = conn
        .query_row(
            "SELECT id, setting_id, name, description, item_data
             FROM setting_items WHERE id = ?1",
            params![id.0],
            item_from_row,
        )
        .optional()?;
    row.map(|row| hydrate_item(conn, row)).transpose()
}

fn load_variants(
    conn: &Connection,
    setting_item_id: SettingItemId,
) -> Result<Vec<DataVariant>, StorageError> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, value, description FROM data_variants WHERE setting_item_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![setting_item_id.0], |row| {
        Ok(DataVariant {
            id: DataVariantId(row.get(0)?),
            setting_item_id,
            value: row.get(1)?,
            description: row.get(2)?,
        })
    })?;
    let mut result = Vec::new();
    for row in rows {
        result.push(row?);
    }
    Ok(result)
}

fn insert_item(
    conn: &Connection,
    setting_id: SettingId,
    draft: &SettingItemDraft,
) -> Result<SettingItemId, StorageError> {
    conn.execute(
        "INSERT INTO setting_items (setting_id, name, description, item_data) VALUES (?1, ?2, ?3, ?4)",
        params![setting_id.0, draft.name, draft.description, draft.item_data],
    )?;
    let id = SettingItemId(conn.last_insert_rowid());
    insert_variants(conn, id, &draft.data_variants)?;
    Ok(id)
}

fn insert_variants(
    conn: &Connection,
    setting_item_id: SettingItemId,
    drafts: &[DataVariantDraft],
) -> Result<(), StorageError> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO data_variants (setting_item_id, value, description) VALUES (?1, ?2, ?3)",
    )?;
    for draft in drafts {
        stmt.execute(params![setting_item_id.0, draft.value, draft.description])?;
    }
    Ok(())
}

impl MaintenanceStore for SqliteStore {
    // -------------------------------------------------------------------
    // Maintenance aggregate
    // -------------------------------------------------------------------

    fn list_maintenances(&self) -> Result<Vec<Maintenance>, StorageError> {
        let ids = {
            let mut stmt = self
                .conn
                .prepare_cached("SELECT id FROM maintenances ORDER BY id")?;
            let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;
            let mut ids = Vec::new();
            for row in rows {
                ids.push(MaintenanceId(row?));
            }
            ids
        };
        let mut result = Vec::with_capacity(ids.len());
        for id in ids {
            let maintenance = load_maintenance(&self.conn, id)?.ok_or_else(|| {
                StorageError::Integrity {
                    reason: format!("maintenance {id} vanished while listing"),
                }
            })?;
            result.push(maintenance);
        }
        Ok(result)
    }

    fn count_maintenances(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM maintenances", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn get_maintenance(&self, id: MaintenanceId) -> Result<Maintenance, StorageError> {
        load_maintenance(&self.conn, id)?.ok_or(StorageError::MaintenanceNotFound(id))
    }

    fn create_maintenance(
        &mut self,
        draft: &MaintenanceDraft,
    ) -> Result<Maintenance, StorageError> {
        validate_maintenance_draft(draft)?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO maintenances (number, description) VALUES (?1, ?2)",
            params![draft.number, draft.description],
        )?;
        let id = MaintenanceId(tx.last_insert_rowid());
        for setting in &draft.settings {
            tx.execute(
                "INSERT INTO settings (maintenance_id, name, description) VALUES (?1, ?2, ?3)",
                params![id.0, setting.name, setting.description],
            )?;
            let setting_id = SettingId(tx.last_insert_rowid());
            for item in &setting.items {
                insert_item(&tx, setting_id, item)?;
            }
        }
        tx.commit()?;

        debug!(maintenance = %id, "created maintenance in sqlite");
        self.get_maintenance(id)
    }

    fn update_maintenance(
        &mut self,
        id: MaintenanceId,
        update: &MaintenanceUpdate,
    ) -> Result<(), StorageError> {
        ensure_ids_match(id, update)?;

        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE maintenances SET number = ?1, description = ?2 WHERE id = ?3",
            params![update.number, update.description, id.0],
        )?;
        if changed == 0 {
            return Err(StorageError::MaintenanceNotFound(id));
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_maintenance(&mut self, id: MaintenanceId) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        if !maintenance_exists(&tx, id)? {
            return Err(StorageError::MaintenanceNotFound(id));
        }
        // Children first, then the maintenance row itself.
        tx.execute(
            "DELETE FROM data_variants WHERE setting_item_id IN (
                 SELECT si.id FROM setting_items si
                 JOIN settings s ON si.setting_id = s.id
                 WHERE s.maintenance_id = ?1)",
            params![id.0],
        )?;
        tx.execute(
            "DELETE FROM setting_items WHERE setting_id IN (
                 SELECT id FROM settings WHERE maintenance_id = ?1)",
            params![id.0],
        )?;
        tx.execute(
            "DELETE FROM settings WHERE maintenance_id = ?1",
            params![id.0],
        )?;
        tx.execute("DELETE FROM maintenances WHERE id = ?1", params![id.0])?;
        tx.commit()?;

        debug!(maintenance = %id, "deleted maintenance subtree from sqlite");
        Ok(())
    }

    // -------------------------------------------------------------------
    // SettingItem
    // -------------------------------------------------------------------

    fn get_setting_item(&self, id: SettingItemId) -> Result<SettingItem, StorageError> {
        load_item(&self.conn, id)?.ok_or(StorageError::SettingItemNotFound(id))
    }

    fn create_setting_item(
        &mut self,
        draft: &SettingItemDraft,
    ) -> Result<SettingItem, StorageError> {
        let setting_id = draft.setting_id.ok_or(ValidationError::MissingParent)?;

        let tx = self.conn.transaction()?;
        if !setting_exists(&tx, setting_id)? {
            return Err(ValidationError::UnknownParent(setting_id).into());
        }
        validate_setting_item_draft(draft)?;
        let id = insert_item(&tx, setting_id, draft)?;
        tx.commit()?;

        self.get_setting_item(id)
    }

    fn patch_setting_item(
        &mut self,
        id: SettingItemId,
        operations: &[PatchOperation],
    ) -> Result<SettingItem, StorageError> {
        let tx = self.conn.transaction()?;
        let current = load_item(&tx, id)?.ok_or(StorageError::SettingItemNotFound(id))?;
        let candidate = apply_patch(&current, operations)?;
        validate_setting_item(&candidate)?;

        tx.execute(
            "UPDATE setting_items SET name = ?1, description = ?2, item_data = ?3 WHERE id = ?4",
            params![candidate.name, candidate.description, candidate.item_data, id.0],
        )?;
        if candidate.data_variants != current.data_variants {
            let drafts: Vec<DataVariantDraft> =
                candidate.data_variants.iter().map(DataVariantDraft::from).collect();
            tx.execute(
                "DELETE FROM data_variants WHERE setting_item_id = ?1",
                params![id.0],
            )?;
            insert_variants(&tx, id, &drafts)?;
        }
        tx.commit()?;

        self.get_setting_item(id)
    }

    fn delete_setting_item(&mut self, id: SettingItemId) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM data_variants WHERE setting_item_id = ?1",
            params![id.0],
        )?;
        let removed = tx.execute("DELETE FROM setting_items WHERE id = ?1", params![id.0])?;
        if removed == 0 {
            return Err(StorageError::SettingItemNotFound(id));
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::fixtures;
    use maint_core::SettingDraft;
    use proptest::prelude::*;
    use serde_json::json;

    fn heater_maintenance() -> MaintenanceDraft {
        MaintenanceDraft {
            number: 101,
            description: "Main maintenance task".into(),
            settings: vec![SettingDraft {
                name: "Temperature".into(),
                description: "Temperature settings".into(),
                items: vec![SettingItemDraft {
                    name: "Heater".into(),
                    description: "Heater control".into(),
                    item_data: 25,
                    data_variants: [(20, "Low"), (25, "Normal"), (30, "High")]
                        .iter()
                        .map(|&(value, description)| DataVariantDraft {
                            value,
                            description: description.into(),
                        })
                        .collect(),
                    ..Default::default()
                }],
            }],
        }
    }

    fn row_count(store: &SqliteStore, table: &str) -> i64 {
        store
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_create_and_get_roundtrip() {
        let mut store = SqliteStore::in_memory().unwrap();
        let created = store.create_maintenance(&heater_maintenance()).unwrap();

        assert!(created.id.0 > 0);
        assert_eq!(created.settings[0].items[0].item_data, 25);
        assert_eq!(store.get_maintenance(created.id).unwrap(), created);
        assert_eq!(store.list_maintenances().unwrap(), vec![created]);
    }

    #[test]
    fn test_child_order_is_preserved() {
        let mut store = SqliteStore::in_memory().unwrap();
        let created = store.create_maintenance(&fixtures()[1]).unwrap();

        let setting_names: Vec<&str> = created.settings.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(setting_names, vec!["HeadCleaning", "InkCharge"]);
        let item_names: Vec<&str> = created.settings[0]
            .items
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(item_names, vec!["Heater", "NozzleCheck", "HeadAlign"]);
    }

    #[test]
    fn test_invalid_create_writes_nothing() {
        let mut store = SqliteStore::in_memory().unwrap();
        let mut draft = heater_maintenance();
        draft.settings[0].items[0].item_data = 99;

        assert!(matches!(
            store.create_maintenance(&draft),
            Err(StorageError::Validation(_))
        ));
        for table in ["maintenances", "settings", "setting_items", "data_variants"] {
            assert_eq!(row_count(&store, table), 0, "{table}");
        }
    }

    #[test]
    fn test_update_and_mismatch() {
        let mut store = SqliteStore::in_memory().unwrap();
        let m = store.create_maintenance(&heater_maintenance()).unwrap();

        let err = store
            .update_maintenance(
                m.id,
                &MaintenanceUpdate {
                    id: MaintenanceId(m.id.0 + 10),
                    number: 1,
                    description: "x".into(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, StorageError::IdMismatch { .. }));

        store
            .update_maintenance(
                m.id,
                &MaintenanceUpdate {
                    id: m.id,
                    number: 555,
                    description: "updated".into(),
                },
            )
            .unwrap();
        let loaded = store.get_maintenance(m.id).unwrap();
        assert_eq!(loaded.number, 555);
        assert_eq!(loaded.settings, m.settings);

        let missing = MaintenanceId(999);
        assert!(matches!(
            store.update_maintenance(
                missing,
                &MaintenanceUpdate {
                    id: missing,
                    number: 0,
                    description: String::new(),
                }
            ),
            Err(StorageError::MaintenanceNotFound(_))
        ));
    }

    #[test]
    fn test_delete_maintenance_cascades() {
        let mut store = SqliteStore::in_memory().unwrap();
        let m = store.create_maintenance(&heater_maintenance()).unwrap();
        let item_id = m.settings[0].items[0].id;

        store.delete_maintenance(m.id).unwrap();

        assert!(matches!(
            store.get_setting_item(item_id),
            Err(StorageError::SettingItemNotFound(_))
        ));
        for table in ["maintenances", "settings", "setting_items", "data_variants"] {
            assert_eq!(row_count(&store, table), 0, "{table}");
        }
        assert!(store.delete_maintenance(m.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let mut store = SqliteStore::in_memory().unwrap();
        let first = store.create_maintenance(&heater_maintenance()).unwrap();
        store.delete_maintenance(first.id).unwrap();
        let second = store.create_maintenance(&heater_maintenance()).unwrap();

        assert!(second.id > first.id);
        assert!(second.settings[0].items[0].id > first.settings[0].items[0].id);
    }

    #[test]
    fn test_setting_item_create_patch_delete() {
        let mut store = SqliteStore::in_memory().unwrap();
        let m = store.create_maintenance(&heater_maintenance()).unwrap();

        let item = store
            .create_setting_item(&SettingItemDraft {
                setting_id: Some(m.settings[0].id),
                name: "Fan".into(),
                item_data: 1,
                data_variants: vec![
                    DataVariantDraft {
                        value: 0,
                        description: "Off".into(),
                    },
                    DataVariantDraft {
                        value: 1,
                        description: "On".into(),
                    },
                ],
                ..Default::default()
            })
            .unwrap();
        assert_eq!(item.variant_values().collect::<Vec<_>>(), vec![0, 1]);

        let err = store
            .patch_setting_item(item.id, &[PatchOperation::replace("/itemData", json!(2))])
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
        assert_eq!(store.get_setting_item(item.id).unwrap(), item);

        let patched = store
            .patch_setting_item(
                item.id,
                &[
                    PatchOperation::replace("/itemData", json!(0)),
                    PatchOperation::replace("/description", json!("cooling fan")),
                ],
            )
            .unwrap();
        assert_eq!(patched.item_data, 0);
        assert_eq!(patched.description, "cooling fan");
        assert_eq!(patched.data_variants, item.data_variants);

        store.delete_setting_item(item.id).unwrap();
        assert!(store.get_setting_item(item.id).unwrap_err().is_not_found());
        assert_eq!(row_count(&store, "data_variants"), 3);
    }

    #[test]
    fn test_create_setting_item_unknown_parent() {
        let mut store = SqliteStore::in_memory().unwrap();
        let err = store
            .create_setting_item(&SettingItemDraft {
                setting_id: Some(SettingId(77)),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::Validation(ValidationError::UnknownParent(SettingId(77)))
        ));
    }

    #[test]
    fn test_patch_replaces_variant_rows() {
        let mut store = SqliteStore::in_memory().unwrap();
        let m = store.create_maintenance(&heater_maintenance()).unwrap();
        let item_id = m.settings[0].items[0].id;

        let patched = store
            .patch_setting_item(
                item_id,
                &[PatchOperation::replace(
                    "/dataVariants",
                    json!([{ "value": 25, "description": "Only" }]),
                )],
            )
            .unwrap();

        assert_eq!(patched.data_variants.len(), 1);
        assert_eq!(row_count(&store, "data_variants"), 1);
        assert!(patched.data_variants[0].id > m.settings[0].items[0].data_variants[2].id);
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maint.db");
        let path = path.to_str().unwrap();

        let created = {
            let mut store = SqliteStore::new(path).unwrap();
            store.create_maintenance(&heater_maintenance()).unwrap()
        };

        let store = SqliteStore::new(path).unwrap();
        assert_eq!(store.get_maintenance(created.id).unwrap(), created);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn created_tree_reads_back_identically(
            number in any::<i32>(),
            items in proptest::collection::vec((any::<i32>(), proptest::collection::vec(-5i32..5, 0..4)), 0..4),
        ) {
            let draft = MaintenanceDraft {
                number,
                description: "generated".into(),
                settings: vec![SettingDraft {
                    name: "group".into(),
                    description: String::new(),
                    items: items
                        .iter()
                        .map(|(free, values)| SettingItemDraft {
                            name: "item".into(),
                            // Pick a member when variants exist, otherwise anything.
                            item_data: values.first().copied().unwrap_or(*free),
                            data_variants: values
                                .iter()
                                .map(|&value| DataVariantDraft { value, description: String::new() })
                                .collect(),
                            ..Default::default()
                        })
                        .collect(),
                }],
            };

            let mut store = SqliteStore::in_memory().unwrap();
            let created = store.create_maintenance(&draft).unwrap();
            prop_assert_eq!(store.get_maintenance(created.id).unwrap(), created.clone());
            prop_assert_eq!(created.settings[0].items.len(), items.len());
        }
    }
}
