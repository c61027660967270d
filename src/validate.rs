// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request size and field validation.
//!
//! Runs before any decoding, token lookup, or storage access.

use axum::http::{header, HeaderMap};

use crate::models::Username;
use crate::wire::messages::RECORD_COUNT_OFFSET;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing or malformed Content-Length")]
    MissingLength,

    #[error("content length {declared} does not match expected {expected}")]
    LengthMismatch { declared: usize, expected: usize },

    #[error("content length {declared} exceeds limit {limit}")]
    TooLarge { declared: usize, limit: usize },

    #[error("record count {count} exceeds maximum {max}")]
    TooManyRecords { count: u32, max: u32 },

    #[error("body too short to hold a record count")]
    NoRecordCount,

    #[error("username contains a reserved byte")]
    ReservedByte,
}

/// Size checks parameterized by the configured record ceiling.
#[derive(Debug, Clone, Copy)]
pub struct RequestValidator {
    max_record_count: u32,
}

impl RequestValidator {
    pub fn new(max_record_count: u32) -> Self {
        Self { max_record_count }
    }

    pub fn max_record_count(&self) -> u32 {
        self.max_record_count
    }

    /// Most bytes ever read from the transport for this body shape.
    pub fn read_limit(&self, header_len: usize, record_size: usize) -> usize {
        header_len + self.max_record_count as usize * record_size
    }

    /// Reject a declared length that could never be valid before reading it.
    pub fn check_declared(
        &self,
        declared: usize,
        header_len: usize,
        record_size: usize,
    ) -> Result<(), ValidationError> {
        let limit = self.read_limit(header_len, record_size);
        if declared > limit {
            return Err(ValidationError::TooLarge { declared, limit });
        }
        Ok(())
    }

    /// Fixed-size bodies: no records, exact length.
    pub fn check_fixed(&self, declared: usize, expected: usize) -> Result<(), ValidationError> {
        self.check_records(declared, expected, 0, 0)
    }

    /// `declared == header_len + record_size * count`, with `count` capped.
    pub fn check_records(
        &self,
        declared: usize,
        header_len: usize,
        record_size: usize,
        count: u32,
    ) -> Result<(), ValidationError> {
        if count > self.max_record_count {
            return Err(ValidationError::TooManyRecords {
                count,
                max: self.max_record_count,
            });
        }
        let expected = header_len + record_size * count as usize;
        if declared != expected {
            return Err(ValidationError::LengthMismatch { declared, expected });
        }
        Ok(())
    }

    /// Read the record count at offset 40..44 of a batch body.
    pub fn record_count(&self, body: &[u8]) -> Result<u32, ValidationError> {
        let raw: [u8; 4] = body
            .get(RECORD_COUNT_OFFSET..RECORD_COUNT_OFFSET + 4)
            .and_then(|slice| slice.try_into().ok())
            .ok_or(ValidationError::NoRecordCount)?;
        let count = u32::from_le_bytes(raw);
        if count > self.max_record_count {
            return Err(ValidationError::TooManyRecords {
                count,
                max: self.max_record_count,
            });
        }
        Ok(count)
    }
}

/// Parse the `Content-Length` header.
pub fn content_length(headers: &HeaderMap) -> Result<usize, ValidationError> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .ok_or(ValidationError::MissingLength)
}

pub fn validate_username(username: &Username) -> Result<(), ValidationError> {
    if username.contains_reserved() {
        return Err(ValidationError::ReservedByte);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityKind;
    use crate::wire::messages::SYNCUP_HEADER_LEN;
    use axum::http::HeaderValue;

    fn syncup_body(count: u32) -> Vec<u8> {
        let mut body = vec![0u8; RECORD_COUNT_OFFSET];
        body.extend_from_slice(&count.to_le_bytes());
        body
    }

    #[test]
    fn test_exact_length_accepted() {
        let v = RequestValidator::new(1000);
        let size = EntityKind::Notes.record_size();
        assert!(v
            .check_records(SYNCUP_HEADER_LEN + 3 * size, SYNCUP_HEADER_LEN, size, 3)
            .is_ok());
    }

    #[test]
    fn test_one_byte_short_rejected() {
        let v = RequestValidator::new(1000);
        let size = EntityKind::Notes.record_size();
        let declared = SYNCUP_HEADER_LEN + 2 * size - 1;
        assert_eq!(
            v.check_records(declared, SYNCUP_HEADER_LEN, size, 2),
            Err(ValidationError::LengthMismatch {
                declared,
                expected: declared + 1
            })
        );
    }

    #[test]
    fn test_count_over_ceiling_rejected_regardless_of_length() {
        let v = RequestValidator::new(1000);
        let size = EntityKind::Folders.record_size();
        let declared = SYNCUP_HEADER_LEN + 1001 * size;
        assert_eq!(
            v.check_records(declared, SYNCUP_HEADER_LEN, size, 1001),
            Err(ValidationError::TooManyRecords {
                count: 1001,
                max: 1000
            })
        );
        assert!(matches!(
            v.record_count(&syncup_body(1001)),
            Err(ValidationError::TooManyRecords { .. })
        ));
    }

    #[test]
    fn test_record_count_requires_header() {
        let v = RequestValidator::new(10);
        assert_eq!(v.record_count(&syncup_body(4)), Ok(4));
        assert_eq!(
            v.record_count(&syncup_body(4)[..43]),
            Err(ValidationError::NoRecordCount)
        );
    }

    #[test]
    fn test_read_limit_and_declared() {
        let v = RequestValidator::new(2);
        assert_eq!(v.read_limit(44, 18), 80);
        assert!(v.check_declared(80, 44, 18).is_ok());
        assert!(v.check_declared(81, 44, 18).is_err());
    }

    #[test]
    fn test_fixed_length() {
        let v = RequestValidator::new(1);
        assert!(v.check_fixed(64, 64).is_ok());
        assert!(v.check_fixed(65, 64).is_err());
    }

    #[test]
    fn test_content_length_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(
            content_length(&headers),
            Err(ValidationError::MissingLength)
        );
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("abc"));
        assert!(content_length(&headers).is_err());
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("128"));
        assert_eq!(content_length(&headers), Ok(128));
    }

    #[test]
    fn test_username_reserved_byte() {
        let ok = Username::padded("alice").unwrap();
        assert!(validate_username(&ok).is_ok());

        let mut bytes = *ok.as_bytes();
        bytes[31] = 0;
        assert_eq!(
            validate_username(&Username::from_bytes(bytes)),
            Err(ValidationError::ReservedByte)
        );
    }
}
