// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entity table queries.
//!
//! Each kind owns a fixed set of static SQL statements. Table and column
//! names never come from request data.

use rusqlite::{params, Connection, Row};

use crate::models::{EntityKind, RecordExtra, RecordShape, SyncRecord};

/// Static SQL for one entity table.
pub struct KindSql {
    pub table: &'static str,
    pub create: &'static str,
    pub drop: &'static str,
    /// Insert, or overwrite when any stored column differs. Changes 0 rows for
    /// an identical upload.
    pub upsert: &'static str,
    pub select_range: &'static str,
    pub delete_item: &'static str,
    pub delete_user: &'static str,
}

/// Notes, reminders, and folders share one layout; only the id column differs.
macro_rules! plain_sql {
    ($table:literal, $id:literal) => {
        KindSql {
            table: $table,
            create: concat!(
                "CREATE TABLE IF NOT EXISTS ", $table, " (
                    user_id INTEGER NOT NULL,
                    ", $id, " INTEGER NOT NULL,
                    last_modified INTEGER NOT NULL,
                    last_updated INTEGER NOT NULL,
                    encrypted_data BLOB NOT NULL,
                    PRIMARY KEY (user_id, ", $id, ")
                ) WITHOUT ROWID;
                CREATE INDEX IF NOT EXISTS idx_", $table, "_updated
                    ON ", $table, " (user_id, last_updated);"
            ),
            drop: concat!("DROP TABLE IF EXISTS ", $table),
            upsert: concat!(
                "INSERT INTO ", $table, " (user_id, ", $id, ", last_modified, last_updated, encrypted_data)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (user_id, ", $id, ") DO UPDATE SET
                    last_modified = excluded.last_modified,
                    last_updated = excluded.last_updated,
                    encrypted_data = excluded.encrypted_data
                 WHERE ", $table, ".last_modified IS NOT excluded.last_modified
                    OR ", $table, ".encrypted_data IS NOT excluded.encrypted_data"
            ),
            select_range: concat!(
                "SELECT ", $id, ", last_modified, encrypted_data FROM ", $table, "
                 WHERE user_id = ?1 AND last_updated BETWEEN ?2 AND ?3
                 ORDER BY last_updated, ", $id
            ),
            delete_item: concat!("DELETE FROM ", $table, " WHERE user_id = ?1 AND ", $id, " = ?2"),
            delete_user: concat!("DELETE FROM ", $table, " WHERE user_id = ?1"),
        }
    };
}

static NOTES: KindSql = plain_sql!("notes", "item_id");
static REMINDERS: KindSql = plain_sql!("reminders", "item_id");
static DAILY: KindSql = plain_sql!("reminders_daily", "item_id");
static WEEKLY: KindSql = plain_sql!("reminders_weekly", "item_id");
static MONTHLY: KindSql = plain_sql!("reminders_monthly", "item_id");
static YEARLY: KindSql = plain_sql!("reminders_yearly", "item_id");
static FOLDERS: KindSql = plain_sql!("folders", "folder_id");

static EXTENSIONS: KindSql = KindSql {
    table: "extensions",
    create: "CREATE TABLE IF NOT EXISTS extensions (
            user_id INTEGER NOT NULL,
            item_id INTEGER NOT NULL,
            sequence_num INTEGER NOT NULL,
            last_modified INTEGER NOT NULL,
            last_updated INTEGER NOT NULL,
            encrypted_data BLOB NOT NULL,
            PRIMARY KEY (user_id, item_id, sequence_num)
        ) WITHOUT ROWID;
        CREATE INDEX IF NOT EXISTS idx_extensions_updated
            ON extensions (user_id, last_updated);",
    drop: "DROP TABLE IF EXISTS extensions",
    upsert: "INSERT INTO extensions
            (user_id, item_id, last_modified, last_updated, encrypted_data, sequence_num)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (user_id, item_id, sequence_num) DO UPDATE SET
            last_modified = excluded.last_modified,
            last_updated = excluded.last_updated,
            encrypted_data = excluded.encrypted_data
         WHERE extensions.last_modified IS NOT excluded.last_modified
            OR extensions.encrypted_data IS NOT excluded.encrypted_data",
    select_range: "SELECT item_id, last_modified, sequence_num, encrypted_data FROM extensions
         WHERE user_id = ?1 AND last_updated BETWEEN ?2 AND ?3
         ORDER BY last_updated, item_id, sequence_num",
    delete_item: "DELETE FROM extensions WHERE user_id = ?1 AND item_id = ?2",
    delete_user: "DELETE FROM extensions WHERE user_id = ?1",
};

static OVERRIDES: KindSql = KindSql {
    table: "overrides",
    create: "CREATE TABLE IF NOT EXISTS overrides (
            user_id INTEGER NOT NULL,
            item_id INTEGER NOT NULL,
            linked_item_id INTEGER NOT NULL,
            last_modified INTEGER NOT NULL,
            last_updated INTEGER NOT NULL,
            encrypted_data BLOB NOT NULL,
            PRIMARY KEY (user_id, item_id)
        ) WITHOUT ROWID;
        CREATE INDEX IF NOT EXISTS idx_overrides_updated
            ON overrides (user_id, last_updated);",
    drop: "DROP TABLE IF EXISTS overrides",
    upsert: "INSERT INTO overrides
            (user_id, item_id, last_modified, last_updated, encrypted_data, linked_item_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (user_id, item_id) DO UPDATE SET
            linked_item_id = excluded.linked_item_id,
            last_modified = excluded.last_modified,
            last_updated = excluded.last_updated,
            encrypted_data = excluded.encrypted_data
         WHERE overrides.linked_item_id IS NOT excluded.linked_item_id
            OR overrides.last_modified IS NOT excluded.last_modified
            OR overrides.encrypted_data IS NOT excluded.encrypted_data",
    select_range: "SELECT item_id, last_modified, linked_item_id, encrypted_data FROM overrides
         WHERE user_id = ?1 AND last_updated BETWEEN ?2 AND ?3
         ORDER BY last_updated, item_id",
    delete_item: "DELETE FROM overrides WHERE user_id = ?1 AND item_id = ?2",
    delete_user: "DELETE FROM overrides WHERE user_id = ?1",
};

static DELETED: KindSql = KindSql {
    table: "deleted",
    create: "CREATE TABLE IF NOT EXISTS deleted (
            user_id INTEGER NOT NULL,
            item_id INTEGER NOT NULL,
            item_table INTEGER NOT NULL,
            last_modified INTEGER NOT NULL,
            last_updated INTEGER NOT NULL,
            PRIMARY KEY (user_id, item_id, item_table)
        ) WITHOUT ROWID;
        CREATE INDEX IF NOT EXISTS idx_deleted_updated
            ON deleted (user_id, last_updated);",
    drop: "DROP TABLE IF EXISTS deleted",
    upsert: "INSERT INTO deleted (user_id, item_id, last_modified, last_updated, item_table)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (user_id, item_id, item_table) DO UPDATE SET
            last_modified = excluded.last_modified,
            last_updated = excluded.last_updated
         WHERE deleted.last_modified IS NOT excluded.last_modified",
    select_range: "SELECT item_id, last_modified, item_table FROM deleted
         WHERE user_id = ?1 AND last_updated BETWEEN ?2 AND ?3
         ORDER BY last_updated, item_id, item_table",
    delete_item: "DELETE FROM deleted WHERE user_id = ?1 AND item_id = ?2",
    delete_user: "DELETE FROM deleted WHERE user_id = ?1",
};

pub fn sql(kind: EntityKind) -> &'static KindSql {
    match kind {
        EntityKind::Notes => &NOTES,
        EntityKind::Reminders => &REMINDERS,
        EntityKind::Daily => &DAILY,
        EntityKind::Weekly => &WEEKLY,
        EntityKind::Monthly => &MONTHLY,
        EntityKind::Yearly => &YEARLY,
        EntityKind::Extensions => &EXTENSIONS,
        EntityKind::Overrides => &OVERRIDES,
        EntityKind::Folders => &FOLDERS,
        EntityKind::Deleted => &DELETED,
    }
}

/// Insert or overwrite one record stamped with `last_updated`.
///
/// Returns `false` when the stored row already held identical contents.
pub fn upsert(
    conn: &Connection,
    kind: EntityKind,
    user_id: i64,
    record: &SyncRecord,
    last_updated: i64,
) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare_cached(sql(kind).upsert)?;
    let data = record.encrypted_data.as_slice();
    let changed = match record.extra {
        RecordExtra::None => stmt.execute(params![
            user_id,
            record.item_id,
            record.last_modified,
            last_updated,
            data
        ])?,
        RecordExtra::SequenceNum(seq) => stmt.execute(params![
            user_id,
            record.item_id,
            record.last_modified,
            last_updated,
            data,
            seq
        ])?,
        RecordExtra::LinkedItemId(linked) => stmt.execute(params![
            user_id,
            record.item_id,
            record.last_modified,
            last_updated,
            data,
            linked
        ])?,
        RecordExtra::ItemTable(table) => stmt.execute(params![
            user_id,
            record.item_id,
            record.last_modified,
            last_updated,
            table
        ])?,
    };
    Ok(changed > 0)
}

/// Records whose `last_updated` lies in `[start, end]`, oldest first.
pub fn select_range(
    conn: &Connection,
    kind: EntityKind,
    user_id: i64,
    start: i64,
    end: i64,
) -> rusqlite::Result<Vec<SyncRecord>> {
    let mut stmt = conn.prepare_cached(sql(kind).select_range)?;
    let shape = kind.shape();
    let rows = stmt.query_map(params![user_id, start, end], |row| read_record(row, shape))?;
    rows.collect()
}

fn read_record(row: &Row<'_>, shape: RecordShape) -> rusqlite::Result<SyncRecord> {
    let item_id = row.get(0)?;
    let last_modified = row.get(1)?;
    let record = match shape {
        RecordShape::Plain => SyncRecord::item(item_id, last_modified, row.get(2)?),
        RecordShape::Extension => {
            SyncRecord::extension(item_id, last_modified, row.get(2)?, row.get(3)?)
        }
        RecordShape::Override => {
            SyncRecord::override_of(item_id, last_modified, row.get(2)?, row.get(3)?)
        }
        RecordShape::Deleted => SyncRecord::deleted(item_id, last_modified, row.get(2)?),
    };
    Ok(record)
}

/// Delete rows of `kind` keyed by `item_id` (every sequence number for
/// extensions). Absent rows are not an error.
pub fn delete_item(
    conn: &Connection,
    kind: EntityKind,
    user_id: i64,
    item_id: i64,
) -> rusqlite::Result<usize> {
    conn.prepare_cached(sql(kind).delete_item)?
        .execute(params![user_id, item_id])
}

/// Remove every entity row owned by a user.
pub fn delete_all_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<usize> {
    let mut total = 0;
    for kind in EntityKind::ALL {
        total += conn.execute(sql(kind).delete_user, params![user_id])?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        for (table, result) in schema::ensure_tables(&conn) {
            result.unwrap_or_else(|e| panic!("{table}: {e}"));
        }
        conn
    }

    #[test]
    fn test_identical_upload_changes_nothing() {
        let conn = conn();
        let note = SyncRecord::item(1, 10, vec![1; 128]);
        assert!(upsert(&conn, EntityKind::Notes, 7, &note, 100).unwrap());
        assert!(!upsert(&conn, EntityKind::Notes, 7, &note, 200).unwrap());

        // The stamp of the untouched row stays at the first write.
        assert_eq!(select_range(&conn, EntityKind::Notes, 7, 100, 100).unwrap(), vec![note]);
    }

    #[test]
    fn test_changed_upload_overwrites() {
        let conn = conn();
        let first = SyncRecord::item(1, 10, vec![1; 96]);
        let second = SyncRecord::item(1, 5, vec![2; 96]);
        upsert(&conn, EntityKind::Weekly, 7, &first, 100).unwrap();
        assert!(upsert(&conn, EntityKind::Weekly, 7, &second, 200).unwrap());

        let rows = select_range(&conn, EntityKind::Weekly, 7, i64::MIN, i64::MAX).unwrap();
        assert_eq!(rows, vec![second]);
        assert!(select_range(&conn, EntityKind::Weekly, 7, 0, 199)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_range_is_inclusive_and_per_user() {
        let conn = conn();
        for (id, stamp) in [(1, 100), (2, 200), (3, 300)] {
            let folder = SyncRecord::item(id, 0, vec![id as u8; 64]);
            upsert(&conn, EntityKind::Folders, 1, &folder, stamp).unwrap();
        }
        upsert(&conn, EntityKind::Folders, 2, &SyncRecord::item(9, 0, vec![0; 64]), 200).unwrap();

        let ids: Vec<i64> = select_range(&conn, EntityKind::Folders, 1, 100, 200)
            .unwrap()
            .iter()
            .map(|r| r.item_id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_extensions_keyed_by_sequence() {
        let conn = conn();
        for seq in 0..3 {
            let ext = SyncRecord::extension(5, 1, seq, vec![seq as u8; 64]);
            assert!(upsert(&conn, EntityKind::Extensions, 1, &ext, 10).unwrap());
        }
        assert_eq!(delete_item(&conn, EntityKind::Extensions, 1, 5).unwrap(), 3);
        assert_eq!(delete_item(&conn, EntityKind::Extensions, 1, 5).unwrap(), 0);
    }

    #[test]
    fn test_override_linked_id_change_is_stored() {
        let conn = conn();
        let first = SyncRecord::override_of(4, 1, 100, vec![0; 64]);
        let relinked = SyncRecord::override_of(4, 1, 101, vec![0; 64]);
        upsert(&conn, EntityKind::Overrides, 1, &first, 10).unwrap();
        assert!(upsert(&conn, EntityKind::Overrides, 1, &relinked, 11).unwrap());
    }

    #[test]
    fn test_delete_all_for_user() {
        let conn = conn();
        upsert(&conn, EntityKind::Notes, 1, &SyncRecord::item(1, 0, vec![0; 128]), 1).unwrap();
        upsert(&conn, EntityKind::Deleted, 1, &SyncRecord::deleted(2, 0, 11), 1).unwrap();
        upsert(&conn, EntityKind::Notes, 2, &SyncRecord::item(1, 0, vec![0; 128]), 1).unwrap();

        assert_eq!(delete_all_for_user(&conn, 1).unwrap(), 2);
        assert_eq!(
            select_range(&conn, EntityKind::Notes, 2, i64::MIN, i64::MAX)
                .unwrap()
                .len(),
            1
        );
    }
}
