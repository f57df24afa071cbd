//! Application state with a shared `MaintenanceService` for concurrent access.
//!
//! [`AppState`] wraps the service in `Arc<tokio::sync::Mutex<>>` for use with
//! axum handlers. Uses `tokio::sync::Mutex` (async-aware) instead of
//! `std::sync::Mutex` (blocking) so handlers await the lock without blocking
//! the tokio runtime.
//!
//! Note: `tokio::sync::RwLock` would allow concurrent reads, but the SQLite
//! backend holds a `rusqlite::Connection`, which is `!Sync`, so the service
//! cannot sit behind an `RwLock`. Every handler holds the lock for its whole
//! read-validate-write sequence, which also serializes concurrent patches to
//! the same setting item.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::service::MaintenanceService;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// The shared maintenance service (async Mutex, non-blocking await).
    pub service: Arc<tokio::sync::Mutex<MaintenanceService>>,
}

impl AppState {
    /// Creates a new `AppState` over the backend selected by `config`.
    pub fn new(config: &ServerConfig) -> Result<Self, ApiError> {
        let service = MaintenanceService::open(config)?;
        Ok(Self::from_service(service))
    }

    /// Creates a new `AppState` with an empty in-memory store (for testing).
    pub fn in_memory() -> Self {
        Self::from_service(MaintenanceService::in_memory())
    }

    fn from_service(service: MaintenanceService) -> Self {
        AppState {
            service: Arc::new(tokio::sync::Mutex::new(service)),
        }
    }
}
