//! HTTP/JSON API server for maintenance configuration trees.
//!
//! Exposes the maintenance aggregate and individual setting items over REST.
//! This crate contains the service layer, configuration, error mapping and
//! route definitions; storage and domain rules live in `maint-storage` and
//! `maint-core`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod router;
pub mod service;
pub mod state;
