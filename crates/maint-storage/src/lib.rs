//! Storage abstraction for maintenance configuration trees.
//!
//! Provides the [`MaintenanceStore`] trait defining the repository contract
//! that all backends implement, plus [`InMemoryStore`] and [`SqliteStore`] as
//! first-class backends.
//!
//! # Architecture
//!
//! The store is the transaction boundary. Every mutating operation runs the
//! validation engine (and, for patches, the patch engine) before it writes,
//! and either commits all of its rows or none of them. Cascading deletes are
//! enforced here rather than left to the caller.
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`traits`]: MaintenanceStore trait definition
//! - [`memory`]: InMemoryStore implementation (arena + child index tables)
//! - [`schema`]: SQL schema migrations and connection setup
//! - [`sqlite`]: SqliteStore implementation
//! - [`seed`]: idempotent fixture loader

pub mod error;
pub mod memory;
pub mod schema;
pub mod seed;
pub mod sqlite;
pub mod traits;

// Re-export key types for ergonomic use.
pub use error::StorageError;
pub use memory::InMemoryStore;
pub use seed::{seed, SeedOutcome};
pub use sqlite::SqliteStore;
pub use traits::MaintenanceStore;
