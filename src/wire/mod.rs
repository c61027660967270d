// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Binary wire protocol.
//!
//! Every body is a sequence of fixed-offset fields. Integers are little-endian,
//! text fields are 32 bytes right-padded with spaces, and opaque blobs have
//! purely positional lengths.

pub mod codec;
pub mod messages;
pub mod records;

pub use codec::{FieldReader, FieldWriter};
pub use records::{decode_records, encode_bitmap, encode_record_list};

use crate::models::EntityKind;

/// Codec failures.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WireError {
    #[error("body truncated at offset {offset}: need {needed} bytes, have {available}")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("stored {kind} payload is {actual} bytes, expected {expected}")]
    PayloadSize {
        kind: EntityKind,
        expected: usize,
        actual: usize,
    },

    #[error("record shape does not match table {kind}")]
    ShapeMismatch { kind: EntityKind },

    #[error("{count} records do not fit a 32-bit count")]
    TooManyRecords { count: usize },
}
