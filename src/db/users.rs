// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account and cursor-row queries.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::blob32;
use crate::models::entity::KIND_COUNT;
use crate::models::{EntityKind, KeyPair, LastUpdated, User, Username};

const USER_COLUMNS: &str = "user_id, username, password_hash_hash, salt,
    encrypted_private_key, encrypted_private_key2, last_updated, last_login";

fn read_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        user_id: row.get(0)?,
        username: Username::from_bytes(blob32(row, 1)?),
        password_hash_hash: blob32(row, 2)?,
        salt: row.get(3)?,
        keys: KeyPair {
            key1: blob32(row, 4)?,
            key2: blob32(row, 5)?,
        },
        last_updated: row.get(6)?,
        last_login: row.get(7)?,
    })
}

/// Fields of a user row before the id is assigned.
pub struct NewUser<'a> {
    pub username: &'a Username,
    pub password_hash_hash: &'a [u8; 32],
    pub salt: i32,
    pub keys: &'a KeyPair,
    pub now: i64,
}

/// Insert a user and return its assigned id. A taken username surfaces as a
/// constraint violation.
pub fn insert_user(conn: &Connection, user: &NewUser<'_>) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO users (username, password_hash_hash, salt,
            encrypted_private_key, encrypted_private_key2, last_updated, last_login)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            &user.username.as_bytes()[..],
            &user.password_hash_hash[..],
            user.salt,
            &user.keys.key1[..],
            &user.keys.key2[..],
            user.now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_by_username(conn: &Connection, username: &Username) -> rusqlite::Result<Option<User>> {
    conn.prepare_cached(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = ?1"
    ))?
    .query_row(params![&username.as_bytes()[..]], read_user)
    .optional()
}

pub fn set_last_login(conn: &Connection, user_id: i64, now: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE users SET last_login = ?2 WHERE user_id = ?1",
        params![user_id, now],
    )
}

/// Replace username, password material, and keys in one write.
pub fn update_credentials(
    conn: &Connection,
    user_id: i64,
    user: &NewUser<'_>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE users SET username = ?2, password_hash_hash = ?3, salt = ?4,
            encrypted_private_key = ?5, encrypted_private_key2 = ?6, last_updated = ?7
         WHERE user_id = ?1",
        params![
            user_id,
            &user.username.as_bytes()[..],
            &user.password_hash_hash[..],
            user.salt,
            &user.keys.key1[..],
            &user.keys.key2[..],
            user.now,
        ],
    )
}

pub fn delete_user(conn: &Connection, user_id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM users WHERE user_id = ?1", params![user_id])
}

/// Create the all-zero cursor row for a new account.
pub fn insert_cursors(conn: &Connection, user_id: i64) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO last_updated (user_id) VALUES (?1)",
        params![user_id],
    )?;
    Ok(())
}

pub fn get_cursors(conn: &Connection, user_id: i64) -> rusqlite::Result<Option<LastUpdated>> {
    conn.prepare_cached(
        "SELECT notes, reminders, reminders_daily, reminders_weekly, reminders_monthly,
            reminders_yearly, extensions, overrides, folders, deleted
         FROM last_updated WHERE user_id = ?1",
    )?
    .query_row(params![user_id], |row| {
        let mut values = [0i64; KIND_COUNT];
        for (i, value) in values.iter_mut().enumerate() {
            *value = row.get(i)?;
        }
        Ok(LastUpdated::from_values(user_id, values))
    })
    .optional()
}

pub fn set_cursor(
    conn: &Connection,
    user_id: i64,
    kind: EntityKind,
    value: i64,
) -> rusqlite::Result<usize> {
    let sql = match kind {
        EntityKind::Notes => "UPDATE last_updated SET notes = ?2 WHERE user_id = ?1",
        EntityKind::Reminders => "UPDATE last_updated SET reminders = ?2 WHERE user_id = ?1",
        EntityKind::Daily => "UPDATE last_updated SET reminders_daily = ?2 WHERE user_id = ?1",
        EntityKind::Weekly => "UPDATE last_updated SET reminders_weekly = ?2 WHERE user_id = ?1",
        EntityKind::Monthly => {
            "UPDATE last_updated SET reminders_monthly = ?2 WHERE user_id = ?1"
        }
        EntityKind::Yearly => "UPDATE last_updated SET reminders_yearly = ?2 WHERE user_id = ?1",
        EntityKind::Extensions => "UPDATE last_updated SET extensions = ?2 WHERE user_id = ?1",
        EntityKind::Overrides => "UPDATE last_updated SET overrides = ?2 WHERE user_id = ?1",
        EntityKind::Folders => "UPDATE last_updated SET folders = ?2 WHERE user_id = ?1",
        EntityKind::Deleted => "UPDATE last_updated SET deleted = ?2 WHERE user_id = ?1",
    };
    conn.prepare_cached(sql)?.execute(params![user_id, value])
}

pub fn delete_cursors(conn: &Connection, user_id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM last_updated WHERE user_id = ?1",
        params![user_id],
    )
}
