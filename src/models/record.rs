// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Synchronized entity records.

use crate::models::entity::RecordShape;

/// Kind-specific column stored next to the item identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordExtra {
    None,
    SequenceNum(i32),
    LinkedItemId(i64),
    ItemTable(i16),
}

impl RecordExtra {
    pub fn shape(&self) -> RecordShape {
        match self {
            RecordExtra::None => RecordShape::Plain,
            RecordExtra::SequenceNum(_) => RecordShape::Extension,
            RecordExtra::LinkedItemId(_) => RecordShape::Override,
            RecordExtra::ItemTable(_) => RecordShape::Deleted,
        }
    }
}

/// One record as uploaded by a client and returned by syncdown.
///
/// `item_id` holds the folder ID for folders. `last_updated` is not part of
/// the record: the server stamps it at ingestion and only exposes it through
/// the cursor row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRecord {
    pub item_id: i64,
    /// Client-authored logical clock (ms)
    pub last_modified: i64,
    pub extra: RecordExtra,
    /// Opaque encrypted payload; empty for deletion markers
    pub encrypted_data: Vec<u8>,
}

impl SyncRecord {
    /// Plain item (notes, reminders, folders).
    pub fn item(item_id: i64, last_modified: i64, encrypted_data: Vec<u8>) -> Self {
        Self {
            item_id,
            last_modified,
            extra: RecordExtra::None,
            encrypted_data,
        }
    }

    pub fn extension(
        item_id: i64,
        last_modified: i64,
        sequence_num: i32,
        encrypted_data: Vec<u8>,
    ) -> Self {
        Self {
            item_id,
            last_modified,
            extra: RecordExtra::SequenceNum(sequence_num),
            encrypted_data,
        }
    }

    pub fn override_of(
        item_id: i64,
        last_modified: i64,
        linked_item_id: i64,
        encrypted_data: Vec<u8>,
    ) -> Self {
        Self {
            item_id,
            last_modified,
            extra: RecordExtra::LinkedItemId(linked_item_id),
            encrypted_data,
        }
    }

    pub fn deleted(item_id: i64, last_modified: i64, item_table: i16) -> Self {
        Self {
            item_id,
            last_modified,
            extra: RecordExtra::ItemTable(item_table),
            encrypted_data: Vec::new(),
        }
    }
}
