//! Local libSQL store configuration.

use serde::{Deserialize, Serialize};

/// Path understood by libSQL as a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

fn default_path() -> String {
    ".trustai/trustai.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the database file, or `:memory:`.
    #[serde(default = "default_path")]
    pub path: String,
}

impl DatabaseConfig {
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}
