// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Table DDL run at startup.

use rusqlite::Connection;

use super::items;
use super::tables;
use crate::models::EntityKind;

const CREATE_USERS: &str = "CREATE TABLE IF NOT EXISTS users (
        user_id INTEGER PRIMARY KEY AUTOINCREMENT,
        username BLOB NOT NULL UNIQUE,
        password_hash_hash BLOB NOT NULL,
        salt INTEGER NOT NULL,
        encrypted_private_key BLOB NOT NULL,
        encrypted_private_key2 BLOB NOT NULL,
        last_updated INTEGER NOT NULL,
        last_login INTEGER NOT NULL
    )";

const CREATE_TOKENS: &str = "CREATE TABLE IF NOT EXISTS tokens (
        user_id INTEGER NOT NULL,
        creation_time INTEGER NOT NULL,
        expiration_time INTEGER NOT NULL,
        token BLOB NOT NULL,
        PRIMARY KEY (user_id, token)
    ) WITHOUT ROWID;
    CREATE INDEX IF NOT EXISTS idx_tokens_expiration ON tokens (expiration_time);";

const CREATE_LAST_UPDATED: &str = "CREATE TABLE IF NOT EXISTS last_updated (
        user_id INTEGER PRIMARY KEY,
        notes INTEGER NOT NULL DEFAULT 0,
        reminders INTEGER NOT NULL DEFAULT 0,
        reminders_daily INTEGER NOT NULL DEFAULT 0,
        reminders_weekly INTEGER NOT NULL DEFAULT 0,
        reminders_monthly INTEGER NOT NULL DEFAULT 0,
        reminders_yearly INTEGER NOT NULL DEFAULT 0,
        extensions INTEGER NOT NULL DEFAULT 0,
        overrides INTEGER NOT NULL DEFAULT 0,
        folders INTEGER NOT NULL DEFAULT 0,
        deleted INTEGER NOT NULL DEFAULT 0
    )";

const AUTH_TABLES: [(&str, &str); 3] = [
    (tables::USERS, CREATE_USERS),
    (tables::TOKENS, CREATE_TOKENS),
    (tables::LAST_UPDATED, CREATE_LAST_UPDATED),
];

/// Create every table that does not exist yet, auth tables first.
///
/// One failing table does not stop the others; callers decide what to do with
/// the per-table results.
pub fn ensure_tables(conn: &Connection) -> Vec<(&'static str, rusqlite::Result<()>)> {
    let auth = AUTH_TABLES
        .iter()
        .map(|&(table, ddl)| (table, conn.execute_batch(ddl)));
    let data = EntityKind::ALL.iter().map(|&kind| {
        let sql = items::sql(kind);
        (sql.table, conn.execute_batch(sql.create))
    });
    auth.chain(data).collect()
}

/// Drop the auth tables, the entity tables, or both.
pub fn drop_tables(
    conn: &Connection,
    auth: bool,
    data: bool,
) -> Vec<(&'static str, rusqlite::Result<()>)> {
    let mut results = Vec::new();
    if auth {
        for (table, _) in AUTH_TABLES {
            let result = conn.execute_batch(&format!("DROP TABLE IF EXISTS {table}"));
            tracing::warn!(table, ok = result.is_ok(), "Dropped auth table");
            results.push((table, result));
        }
    }
    if data {
        for kind in EntityKind::ALL {
            let sql = items::sql(kind);
            let result = conn.execute_batch(sql.drop);
            tracing::warn!(table = sql.table, ok = result.is_ok(), "Dropped data table");
            results.push((sql.table, result));
        }
    }
    results
}
