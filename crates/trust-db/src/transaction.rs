//! Write transactions.
//!
//! Every write goes through a [`Transaction`] obtained from
//! [`TrustDb::begin`](crate::TrustDb::begin). The transaction holds the
//! store's write gate for its whole lifetime, so write transactions never
//! interleave on the shared connection. Boundary write operations take
//! `&Transaction`, which makes un-transacted writes a type error.

use libsql::TransactionBehavior;
use libsql::params::IntoParams;
use tokio::sync::MutexGuard;

use crate::error::DatabaseError;

/// An open `BEGIN IMMEDIATE` transaction.
///
/// Finish with [`commit`](Self::commit) or [`rollback`](Self::rollback).
/// Dropping an unfinished transaction rolls it back.
pub struct Transaction<'a> {
    // Declared before the guard so the rollback-on-drop runs while the gate
    // is still held.
    tx: libsql::Transaction,
    _gate: MutexGuard<'a, ()>,
}

impl<'a> Transaction<'a> {
    pub(crate) async fn begin(
        conn: &libsql::Connection,
        gate: MutexGuard<'a, ()>,
    ) -> Result<Self, DatabaseError> {
        if !conn.is_autocommit() {
            tracing::warn!("found a transaction left open on the connection; rolling it back");
            conn.execute("ROLLBACK", ()).await?;
        }
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await?;
        Ok(Self { tx, _gate: gate })
    }

    /// Execute a write statement, returning the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if the statement fails.
    pub async fn execute(&self, sql: &str, params: impl IntoParams) -> Result<u64, DatabaseError> {
        Ok(self.tx.execute(sql, params).await?)
    }

    /// Run a query inside the transaction (sees uncommitted writes).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if the query fails.
    pub async fn query(
        &self,
        sql: &str,
        params: impl IntoParams,
    ) -> Result<libsql::Rows, DatabaseError> {
        Ok(self.tx.query(sql, params).await?)
    }

    /// Commit and release the write gate.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if COMMIT fails. The next `begin`
    /// rolls back whatever the failed commit left open.
    pub async fn commit(self) -> Result<(), DatabaseError> {
        let Self { tx, _gate } = self;
        tx.commit().await.map_err(DatabaseError::from)
    }

    /// Roll back and release the write gate.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if ROLLBACK fails.
    pub async fn rollback(self) -> Result<(), DatabaseError> {
        let Self { tx, _gate } = self;
        tx.rollback().await.map_err(DatabaseError::from)
    }

    /// Roll back, logging instead of returning a failure. Used on error paths
    /// where the original error is the one worth reporting.
    pub async fn abandon(self) {
        if let Err(e) = self.rollback().await {
            tracing::error!(error = %e, "rollback failed");
        }
    }

    /// Open a named savepoint inside this transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if the SAVEPOINT statement fails.
    pub async fn savepoint(&self, name: &'static str) -> Result<Savepoint<'_, 'a>, DatabaseError> {
        self.tx.execute(&format!("SAVEPOINT {name}"), ()).await?;
        Ok(Savepoint {
            tx: self,
            name,
            finished: false,
        })
    }
}

/// A savepoint isolating one degradable step of a larger transaction.
pub struct Savepoint<'t, 'a> {
    tx: &'t Transaction<'a>,
    name: &'static str,
    finished: bool,
}

impl Savepoint<'_, '_> {
    /// Keep the step's writes.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if RELEASE fails.
    pub async fn release(mut self) -> Result<(), DatabaseError> {
        self.finished = true;
        self.tx.execute(&format!("RELEASE {}", self.name), ()).await?;
        Ok(())
    }

    /// Discard the step's writes; the enclosing transaction stays usable.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if ROLLBACK TO or RELEASE fails.
    pub async fn rollback(mut self) -> Result<(), DatabaseError> {
        self.finished = true;
        self.tx
            .execute(&format!("ROLLBACK TO {}", self.name), ())
            .await?;
        self.tx.execute(&format!("RELEASE {}", self.name), ()).await?;
        Ok(())
    }
}

impl Drop for Savepoint<'_, '_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(savepoint = self.name, "savepoint dropped without release or rollback");
        }
    }
}
