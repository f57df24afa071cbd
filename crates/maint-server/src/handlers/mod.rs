//! HTTP handler modules for the maintenance API.
//!
//! Each sub-module implements thin handlers that parse requests, acquire the
//! service lock, delegate to [`MaintenanceService`](crate::service::MaintenanceService),
//! and return JSON responses. No business logic lives in handlers.

pub mod health;
pub mod maintenance;
pub mod setting_items;
