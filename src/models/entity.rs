// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entity kinds synchronized per user.
//!
//! Every kind maps at compile time to its URL path segment, its fixed record
//! layout on the wire, and its slot in the per-user cursor row.

/// Shape of the kind-specific column carried next to `itemID`/`lastModified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// `itemID`, `lastModified`, payload
    Plain,
    /// `itemID`, `lastModified`, `sequenceNum: i32`, payload
    Extension,
    /// `itemID`, `lastModified`, `linkedItemID: i64`, payload
    Override,
    /// `itemID`, `lastModified`, `itemTable: i16`, no payload
    Deleted,
}

/// Number of synchronized tables.
pub const KIND_COUNT: usize = 10;

/// A synchronized table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Notes,
    Reminders,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Extensions,
    Overrides,
    Folders,
    Deleted,
}

impl EntityKind {
    /// All kinds, in cursor-row order.
    pub const ALL: [EntityKind; KIND_COUNT] = [
        EntityKind::Notes,
        EntityKind::Reminders,
        EntityKind::Daily,
        EntityKind::Weekly,
        EntityKind::Monthly,
        EntityKind::Yearly,
        EntityKind::Extensions,
        EntityKind::Overrides,
        EntityKind::Folders,
        EntityKind::Deleted,
    ];

    /// Resolve the path segment following `/syncup/` or `/syncdown/`.
    pub fn from_path(path: &str) -> Option<Self> {
        let kind = match path.trim_matches('/') {
            "notes" => EntityKind::Notes,
            "reminders" => EntityKind::Reminders,
            "reminders/daily" => EntityKind::Daily,
            "reminders/weekly" => EntityKind::Weekly,
            "reminders/monthly" => EntityKind::Monthly,
            "reminders/yearly" => EntityKind::Yearly,
            "extensions" => EntityKind::Extensions,
            "overrides" => EntityKind::Overrides,
            "folders" => EntityKind::Folders,
            "deleted" => EntityKind::Deleted,
            _ => return None,
        };
        Some(kind)
    }

    pub fn path(self) -> &'static str {
        match self {
            EntityKind::Notes => "notes",
            EntityKind::Reminders => "reminders",
            EntityKind::Daily => "reminders/daily",
            EntityKind::Weekly => "reminders/weekly",
            EntityKind::Monthly => "reminders/monthly",
            EntityKind::Yearly => "reminders/yearly",
            EntityKind::Extensions => "extensions",
            EntityKind::Overrides => "overrides",
            EntityKind::Folders => "folders",
            EntityKind::Deleted => "deleted",
        }
    }

    pub fn shape(self) -> RecordShape {
        match self {
            EntityKind::Extensions => RecordShape::Extension,
            EntityKind::Overrides => RecordShape::Override,
            EntityKind::Deleted => RecordShape::Deleted,
            _ => RecordShape::Plain,
        }
    }

    /// Length of the opaque encrypted payload (0 for deletion markers).
    pub fn payload_size(self) -> usize {
        match self {
            EntityKind::Notes => 128,
            EntityKind::Reminders
            | EntityKind::Daily
            | EntityKind::Weekly
            | EntityKind::Monthly
            | EntityKind::Yearly => 96,
            EntityKind::Extensions | EntityKind::Overrides | EntityKind::Folders => 64,
            EntityKind::Deleted => 0,
        }
    }

    /// Size in bytes of one record on the wire.
    pub fn record_size(self) -> usize {
        let extra = match self.shape() {
            RecordShape::Plain => 0,
            RecordShape::Extension => 4,
            RecordShape::Override => 8,
            RecordShape::Deleted => 2,
        };
        16 + extra + self.payload_size()
    }

    /// Position of this kind's field in the cursor row.
    pub fn cursor_index(self) -> usize {
        match self {
            EntityKind::Notes => 0,
            EntityKind::Reminders => 1,
            EntityKind::Daily => 2,
            EntityKind::Weekly => 3,
            EntityKind::Monthly => 4,
            EntityKind::Yearly => 5,
            EntityKind::Extensions => 6,
            EntityKind::Overrides => 7,
            EntityKind::Folders => 8,
            EntityKind::Deleted => 9,
        }
    }

    /// `itemTable` code used by deletion markers, for kinds that can be deleted.
    pub fn table_code(self) -> Option<i16> {
        match self {
            EntityKind::Notes => Some(11),
            EntityKind::Reminders => Some(12),
            EntityKind::Daily => Some(21),
            EntityKind::Weekly => Some(22),
            EntityKind::Monthly => Some(23),
            EntityKind::Yearly => Some(24),
            EntityKind::Folders => Some(32),
            EntityKind::Extensions | EntityKind::Overrides | EntityKind::Deleted => None,
        }
    }

    pub fn from_table_code(code: i16) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.table_code() == Some(code))
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
