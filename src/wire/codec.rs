// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bounds-checked little-endian field access over request and response bodies.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::WireError;

/// Sequential reader over fixed-offset fields.
///
/// Every read checks the remaining length first, so a short body yields
/// [`WireError::Truncated`] instead of a panic.
pub struct FieldReader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn ensure(&self, needed: usize) -> Result<(), WireError> {
        if self.buf.remaining() < needed {
            return Err(WireError::Truncated {
                offset: self.offset,
                needed,
                available: self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_i64(&mut self) -> Result<i64, WireError> {
        self.ensure(8)?;
        self.offset += 8;
        Ok(self.buf.get_i64_le())
    }

    pub fn read_i32(&mut self) -> Result<i32, WireError> {
        self.ensure(4)?;
        self.offset += 4;
        Ok(self.buf.get_i32_le())
    }

    pub fn read_u32(&mut self) -> Result<u32, WireError> {
        self.ensure(4)?;
        self.offset += 4;
        Ok(self.buf.get_u32_le())
    }

    pub fn read_i16(&mut self) -> Result<i16, WireError> {
        self.ensure(2)?;
        self.offset += 2;
        Ok(self.buf.get_i16_le())
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        self.buf.copy_to_slice(&mut out);
        self.offset += N;
        Ok(out)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        self.ensure(len)?;
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        self.offset += len;
        Ok(head)
    }
}

/// Append-only writer producing a response body.
pub struct FieldWriter {
    buf: BytesMut,
}

impl FieldWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    pub fn put_i64(&mut self, value: i64) {
        self.buf.put_i64_le(value);
    }

    pub fn put_i32(&mut self, value: i32) {
        self.buf.put_i32_le(value);
    }

    pub fn put_u32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    pub fn put_i16(&mut self, value: i16) {
        self.buf.put_i16_le(value);
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}
