//! MaintenanceService: the single coordinator between HTTP handlers and the
//! storage backend.
//!
//! All business logic flows through [`MaintenanceService`]. Handlers are thin
//! wrappers that delegate to these methods. The service owns exactly one
//! store for the life of the process; which backend it is depends on
//! [`ServerConfig`].

use tracing::{info, warn};

use maint_core::{
    Maintenance, MaintenanceDraft, MaintenanceId, MaintenanceUpdate, PatchOperation, SettingItem,
    SettingItemDraft, SettingItemId,
};
use maint_storage::{seed, InMemoryStore, MaintenanceStore, SeedOutcome, SqliteStore};

use crate::config::ServerConfig;
use crate::error::ApiError;

/// The central service owning the maintenance store.
pub struct MaintenanceService {
    store: Box<dyn MaintenanceStore>,
}

impl MaintenanceService {
    /// Wraps an already-opened store.
    pub fn new(store: Box<dyn MaintenanceStore>) -> Self {
        MaintenanceService { store }
    }

    /// Creates a service over an empty, unseeded in-memory store (for testing).
    pub fn in_memory() -> Self {
        Self::new(Box::new(InMemoryStore::default()))
    }

    /// Opens the backend named by `config` and seeds it when enabled.
    pub fn open(config: &ServerConfig) -> Result<Self, ApiError> {
        let store: Box<dyn MaintenanceStore> = match &config.db_path {
            Some(path) => {
                info!(path = %path, "opening sqlite store");
                let store = SqliteStore::new(path).map_err(|e| {
                    ApiError::InternalError(format!("failed to open database: {}", e))
                })?;
                Box::new(store)
            }
            None => {
                info!("using in-memory store");
                Box::new(InMemoryStore::default())
            }
        };

        let mut service = Self::new(store);
        if config.seed {
            service.seed()?;
        }
        Ok(service)
    }

    /// Loads the fixture set into an empty store.
    pub fn seed(&mut self) -> Result<SeedOutcome, ApiError> {
        Ok(seed(self.store.as_mut())?)
    }

    // -------------------------------------------------------------------
    // Maintenance
    // -------------------------------------------------------------------

    pub fn list_maintenances(&self) -> Result<Vec<Maintenance>, ApiError> {
        Ok(self.store.list_maintenances()?)
    }

    pub fn get_maintenance(&self, id: MaintenanceId) -> Result<Maintenance, ApiError> {
        Ok(self.store.get_maintenance(id)?)
    }

    pub fn create_maintenance(
        &mut self,
        draft: &MaintenanceDraft,
    ) -> Result<Maintenance, ApiError> {
        match self.store.create_maintenance(draft) {
            Ok(created) => {
                info!(maintenance = %created.id, number = created.number, "maintenance created");
                Ok(created)
            }
            Err(err) => {
                warn!(error = %err, "maintenance create rejected");
                Err(err.into())
            }
        }
    }

    pub fn update_maintenance(
        &mut self,
        id: MaintenanceId,
        update: &MaintenanceUpdate,
    ) -> Result<(), ApiError> {
        match self.store.update_maintenance(id, update) {
            Ok(()) => {
                info!(maintenance = %id, "maintenance updated");
                Ok(())
            }
            Err(err) => {
                warn!(maintenance = %id, error = %err, "maintenance update rejected");
                Err(err.into())
            }
        }
    }

    pub fn delete_maintenance(&mut self, id: MaintenanceId) -> Result<(), ApiError> {
        match self.store.delete_maintenance(id) {
            Ok(()) => {
                info!(maintenance = %id, "maintenance deleted");
                Ok(())
            }
            Err(err) => {
                warn!(maintenance = %id, error = %err, "maintenance delete rejected");
                Err(err.into())
            }
        }
    }

    // -------------------------------------------------------------------
    // SettingItem
    // -------------------------------------------------------------------

    pub fn get_setting_item(&self, id: SettingItemId) -> Result<SettingItem, ApiError> {
        Ok(self.store.get_setting_item(id)?)
    }

    pub fn create_setting_item(
        &mut self,
        draft: &SettingItemDraft,
    ) -> Result<SettingItem, ApiError> {
        match self.store.create_setting_item(draft) {
            Ok(created) => {
                info!(item = %created.id, setting = %created.setting_id, "setting item created");
                Ok(created)
            }
            Err(err) => {
                warn!(error = %err, "setting item create rejected");
                Err(err.into())
            }
        }
    }

    pub fn patch_setting_item(
        &mut self,
        id: SettingItemId,
        operations: &[PatchOperation],
    ) -> Result<SettingItem, ApiError> {
        match self.store.patch_setting_item(id, operations) {
            Ok(patched) => {
                info!(item = %id, ops = operations.len(), "setting item patched");
                Ok(patched)
            }
            Err(err) => {
                warn!(item = %id, error = %err, "setting item patch rejected");
                Err(err.into())
            }
        }
    }

    pub fn delete_setting_item(&mut self, id: SettingItemId) -> Result<(), ApiError> {
        match self.store.delete_setting_item(id) {
            Ok(()) => {
                info!(item = %id, "setting item deleted");
                Ok(())
            }
            Err(err) => {
                warn!(item = %id, error = %err, "setting item delete rejected");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_in_memory_seeds_by_default() {
        let service = MaintenanceService::open(&ServerConfig::default()).unwrap();
        let all = service.list_maintenances().unwrap();
        assert_eq!(
            all.iter().map(|m| m.number).collect::<Vec<_>>(),
            vec![101, 102]
        );
    }

    #[test]
    fn open_without_seed_is_empty() {
        let config = ServerConfig {
            seed: false,
            ..ServerConfig::default()
        };
        let service = MaintenanceService::open(&config).unwrap();
        assert!(service.list_maintenances().unwrap().is_empty());
    }

    #[test]
    fn reseeding_sqlite_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            db_path: Some(dir.path().join("maint.db").to_string_lossy().into_owned()),
            ..ServerConfig::default()
        };
        MaintenanceService::open(&config).unwrap();
        let mut reopened = MaintenanceService::open(&config).unwrap();
        assert_eq!(
            reopened.seed().unwrap(),
            SeedOutcome::Skipped { existing: 2 }
        );
    }

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn rejected_updates_and_deletes_are_logged() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut service = MaintenanceService::in_memory();
            let missing = MaintenanceId(9);
            assert!(service
                .update_maintenance(
                    missing,
                    &MaintenanceUpdate {
                        id: missing,
                        number: 1,
                        description: String::new(),
                    },
                )
                .is_err());
            assert!(service.delete_maintenance(missing).is_err());
            assert!(service.delete_setting_item(SettingItemId(9)).is_err());
        });

        let text = logs.text();
        assert!(text.contains("maintenance update rejected"), "{text}");
        assert!(text.contains("maintenance delete rejected"), "{text}");
        assert!(text.contains("setting item delete rejected"), "{text}");
    }

    #[test]
    fn missing_maintenance_is_not_found() {
        let service = MaintenanceService::in_memory();
        assert!(matches!(
            service.get_maintenance(MaintenanceId(42)),
            Err(ApiError::NotFound(_))
        ));
    }
}
