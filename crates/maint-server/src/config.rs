//! Server configuration read from environment variables.
//!
//! - `MAINT_DB_PATH`: SQLite database path. Unset, empty or `:memory:`
//!   selects the in-memory store.
//! - `MAINT_PORT`: listen port (default 3000).
//! - `MAINT_SEED`: `false`/`0`/`no`/`off` disables startup seeding.
//!
//! Invalid values fall back to the default with a warning.

use tracing::warn;

pub const DB_PATH_VAR: &str = "MAINT_DB_PATH";
pub const PORT_VAR: &str = "MAINT_PORT";
pub const SEED_VAR: &str = "MAINT_SEED";

const DEFAULT_PORT: u16 = 3000;

/// Runtime configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// SQLite path, or `None` for the in-memory store.
    pub db_path: Option<String>,
    pub port: u16,
    /// Whether to load fixtures into an empty store at startup.
    pub seed: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            db_path: None,
            port: DEFAULT_PORT,
            seed: true,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup(DB_PATH_VAR)
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty() && p != ":memory:");

        let port = match lookup(PORT_VAR) {
            None => DEFAULT_PORT,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "invalid {PORT_VAR}, using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
        };

        let seed = match lookup(SEED_VAR) {
            None => true,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "" | "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    warn!(value = %raw, "invalid {SEED_VAR}, seeding enabled");
                    true
                }
            },
        };

        ServerConfig {
            db_path,
            port,
            seed,
        }
    }

    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
