// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fixed-size entity records, record lists, and the syncup result bitmap.

use bytes::Bytes;

use super::codec::{FieldReader, FieldWriter};
use super::WireError;
use crate::models::{EntityKind, RecordExtra, RecordShape, SyncRecord};

/// Size of the leading record count in collection responses.
pub const RECORD_COUNT_LEN: usize = 4;

/// Decode `count` back-to-back records of `kind` from the start of `buf`.
///
/// The count comes from the request header; the caller has already checked
/// the outer length, so a short buffer here means the header lied.
pub fn decode_records(
    kind: EntityKind,
    buf: &[u8],
    count: usize,
) -> Result<Vec<SyncRecord>, WireError> {
    let mut reader = FieldReader::new(buf);
    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        records.push(decode_record(kind, &mut reader)?);
    }
    Ok(records)
}

fn decode_record(kind: EntityKind, reader: &mut FieldReader<'_>) -> Result<SyncRecord, WireError> {
    let item_id = reader.read_i64()?;
    let last_modified = reader.read_i64()?;
    let extra = match kind.shape() {
        RecordShape::Plain => RecordExtra::None,
        RecordShape::Extension => RecordExtra::SequenceNum(reader.read_i32()?),
        RecordShape::Override => RecordExtra::LinkedItemId(reader.read_i64()?),
        RecordShape::Deleted => RecordExtra::ItemTable(reader.read_i16()?),
    };
    let encrypted_data = reader.read_bytes(kind.payload_size())?.to_vec();

    Ok(SyncRecord {
        item_id,
        last_modified,
        extra,
        encrypted_data,
    })
}

/// Append one record in its wire layout.
///
/// Records here come from storage, so a wrong payload length or a shape that
/// does not belong to `kind` is an integrity failure, never a client error.
pub fn encode_record(
    kind: EntityKind,
    record: &SyncRecord,
    writer: &mut FieldWriter,
) -> Result<(), WireError> {
    let expected = kind.payload_size();
    if record.encrypted_data.len() != expected {
        return Err(WireError::PayloadSize {
            kind,
            expected,
            actual: record.encrypted_data.len(),
        });
    }
    if record.extra.shape() != kind.shape() {
        return Err(WireError::ShapeMismatch { kind });
    }

    writer.put_i64(record.item_id);
    writer.put_i64(record.last_modified);
    match record.extra {
        RecordExtra::None => {}
        RecordExtra::SequenceNum(seq) => writer.put_i32(seq),
        RecordExtra::LinkedItemId(linked) => writer.put_i64(linked),
        RecordExtra::ItemTable(table) => writer.put_i16(table),
    }
    writer.put_bytes(&record.encrypted_data);
    Ok(())
}

/// Encode a collection response: 4-byte LE count, then the records.
pub fn encode_record_list(kind: EntityKind, records: &[SyncRecord]) -> Result<Bytes, WireError> {
    let count = u32::try_from(records.len()).map_err(|_| WireError::TooManyRecords {
        count: records.len(),
    })?;
    let mut writer =
        FieldWriter::with_capacity(RECORD_COUNT_LEN + records.len() * kind.record_size());
    writer.put_u32(count);
    for record in records {
        encode_record(kind, record, &mut writer)?;
    }
    Ok(writer.finish())
}

/// Decode a collection response produced by [`encode_record_list`].
pub fn decode_record_list(kind: EntityKind, buf: &[u8]) -> Result<Vec<SyncRecord>, WireError> {
    let mut reader = FieldReader::new(buf);
    let count = reader.read_u32()? as usize;
    decode_records(kind, &buf[RECORD_COUNT_LEN..], count)
}

/// Pack per-record "not stored" flags, MSB-first, one bit per record.
///
/// Bit value 0 means stored, 1 means not stored. Unused low bits of the last
/// byte are zero.
pub fn encode_bitmap(not_stored: &[bool]) -> Bytes {
    let mut out = vec![0u8; not_stored.len().div_ceil(8)];
    for (i, _) in not_stored.iter().enumerate().filter(|(_, &flag)| flag) {
        out[i / 8] |= 0x80 >> (i % 8);
    }
    Bytes::from(out)
}

/// Unpack `count` flags from a bitmap produced by [`encode_bitmap`].
pub fn decode_bitmap(bitmap: &[u8], count: usize) -> Vec<bool> {
    (0..count)
        .map(|i| {
            bitmap
                .get(i / 8)
                .is_some_and(|byte| byte & (0x80 >> (i % 8)) != 0)
        })
        .collect()
}
