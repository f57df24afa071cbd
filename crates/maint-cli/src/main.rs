//! Maintenance store CLI.
//!
//! Provides the `maint` binary for operating a SQLite-backed maintenance
//! store without running the HTTP server: seed the fixtures, list or show
//! maintenance trees, and delete a maintenance task with its subtree.
//!
//! Results go to stdout as JSON; errors go to stderr.
//! Exit codes: 0 = success, 1 = not found or rejected by a domain rule,
//! 3 = I/O or database error.

use std::process;

use clap::{Parser, Subcommand};
use serde_json::Value;

use maint_core::MaintenanceId;
use maint_storage::{seed, MaintenanceStore, SqliteStore, StorageError};

/// Maintenance configuration store tools.
#[derive(Parser)]
#[command(name = "maint", about = "Maintenance configuration store tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Load the built-in fixtures into an empty database.
    Seed {
        /// Path to the database file.
        #[arg(short, long)]
        db: String,
    },
    /// Print every maintenance task with its full tree.
    List {
        #[arg(short, long)]
        db: String,
    },
    /// Print one maintenance task.
    Show {
        #[arg(short, long)]
        db: String,

        /// Maintenance ID.
        #[arg(long)]
        id: i64,
    },
    /// Delete a maintenance task and everything it owns.
    Delete {
        #[arg(short, long)]
        db: String,

        #[arg(long)]
        id: i64,
    },
}

impl Commands {
    fn db(&self) -> &str {
        match self {
            Commands::Seed { db }
            | Commands::List { db }
            | Commands::Show { db, .. }
            | Commands::Delete { db, .. } => db,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    process::exit(run(&cli.command));
}

/// Opens the database, executes `command` and reports the outcome.
///
/// Returns the process exit code.
fn run(command: &Commands) -> i32 {
    let db_path = command.db();
    let mut store = match SqliteStore::new(db_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: failed to open database '{}': {}", db_path, e);
            return 3;
        }
    };

    match execute(&mut store, command) {
        Ok(output) => {
            let json = serde_json::to_string_pretty(&output).unwrap_or_else(|e| {
                format!("{{\"error\": \"failed to serialize result: {}\"}}", e)
            });
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code(&e)
        }
    }
}

/// Runs one subcommand against an open store.
fn execute<S: MaintenanceStore>(store: &mut S, command: &Commands) -> Result<Value, StorageError> {
    let value = match command {
        Commands::Seed { .. } => to_json(&seed(store)?),
        Commands::List { .. } => to_json(&store.list_maintenances()?),
        Commands::Show { id, .. } => to_json(&store.get_maintenance(MaintenanceId(*id))?),
        Commands::Delete { id, .. } => {
            store.delete_maintenance(MaintenanceId(*id))?;
            serde_json::json!({ "deleted": id })
        }
    };
    Ok(value)
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value)
        .unwrap_or_else(|e| serde_json::json!({ "error": format!("failed to serialize result: {e}") }))
}

fn exit_code(err: &StorageError) -> i32 {
    match err {
        StorageError::MaintenanceNotFound(_)
        | StorageError::SettingItemNotFound(_)
        | StorageError::IdMismatch { .. }
        | StorageError::Validation(_)
        | StorageError::Patch(_) => 1,
        StorageError::Database(_)
        | StorageError::Migration(_)
        | StorageError::Integrity { .. } => 3,
    }
}
