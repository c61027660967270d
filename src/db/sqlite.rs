// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite connection handle.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::anyhow;
use rusqlite::Connection;

use super::schema;
use crate::error::{AppError, Result};

/// Cloneable handle to the single SQLite connection.
///
/// All access is serialized through the mutex; transactions are the only
/// consistency boundary.
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl Db {
    /// Open (or create) the database at `path` and ensure all tables exist.
    pub fn open(path: &str) -> rusqlite::Result<Self> {
        if path == ":memory:" {
            return Self::open_in_memory();
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
        Self::initialize(conn)
    }

    /// Open a private in-memory database (for testing).
    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(conn: Connection) -> rusqlite::Result<Self> {
        apply_pragmas(&conn)?;
        for (table, result) in schema::ensure_tables(&conn) {
            if let Err(e) = result {
                tracing::error!(table, error = %e, "Failed to create table");
                return Err(e);
            }
        }
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` with exclusive access to the connection on the current thread.
    pub fn with_conn<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Connection) -> std::result::Result<T, E>,
    {
        // Open transactions roll back on drop, so a poisoned lock is still usable.
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut conn)
    }

    /// Run `f` on the blocking pool.
    pub async fn call<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.with_conn(f))
            .await
            .map_err(|e| AppError::Internal(anyhow!("database task failed: {e}")))?
    }

    /// Drop the requested table groups and recreate them empty.
    pub fn reset_tables(
        &self,
        clear_auth: bool,
        clear_data: bool,
    ) -> rusqlite::Result<Vec<(&'static str, rusqlite::Result<()>)>> {
        self.with_conn(|conn| {
            let mut results = schema::drop_tables(conn, clear_auth, clear_data);
            results.extend(schema::ensure_tables(conn));
            Ok(results)
        })
    }
}

/// Apply connection-level pragmas.
fn apply_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        PRAGMA busy_timeout = 5000;
        PRAGMA foreign_keys = ON;
        ",
    )
}
