//! # trust-db
//!
//! libSQL store and governance orchestration for TrustAI.
//!
//! Holds all relational state (decisions, explanations, bias alerts,
//! overrides, audit log, notification preferences, consents) in a local
//! libSQL database. `TrustService` wraps the store together with the engine
//! components and implements every governed operation.
//!
//! Concurrency: one connection, one write gate. Writes happen only inside a
//! [`Transaction`] from [`TrustDb::begin`]; reads use the connection directly.

pub mod error;
pub mod governance;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod transaction;
pub mod updates;

#[cfg(test)]
mod test_support;

use std::path::Path;

use error::DatabaseError;
use libsql::Builder;
use tokio::sync::Mutex;
use trust_config::IN_MEMORY;

pub use service::TrustService;
pub use transaction::{Savepoint, Transaction};

/// How long a write waits on another connection's lock before giving up.
pub const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Central database handle for all TrustAI state.
///
/// Wraps a libSQL database and its single connection, plus the gate that
/// serializes write transactions.
pub struct TrustDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    write_gate: Mutex<()>,
}

impl TrustDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Creates the parent directory for file paths, enables foreign keys, and
    /// runs migrations.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        if path != IN_MEMORY {
            if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DatabaseError::Migration(format!("create {}: {e}", parent.display()))
                })?;
            }
        }

        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        // Wait out other connections' write locks.
        let mut pragma = conn
            .query(&format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"), ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA busy_timeout: {e}")))?;
        pragma
            .next()
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA busy_timeout: {e}")))?;
        drop(pragma);

        let trust_db = Self {
            db,
            conn,
            write_gate: Mutex::new(()),
        };
        trust_db.run_migrations().await?;
        tracing::debug!(path, "store opened");
        Ok(trust_db)
    }

    /// Access the underlying libSQL connection for reads.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Acquire the write gate and open a `BEGIN IMMEDIATE` transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if BEGIN fails.
    pub async fn begin(&self) -> Result<Transaction<'_>, DatabaseError> {
        let gate = self.write_gate.lock().await;
        Transaction::begin(&self.conn, gate).await
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"dec-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}
