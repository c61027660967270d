// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fixed-size request headers and response bodies.

use bytes::Bytes;

use super::codec::{FieldReader, FieldWriter};
use super::WireError;
use crate::models::{Credentials, KeyPair, LastUpdated, Token, Username, TOKEN_LEN};

/// `username[32] ‖ passwordHash[32] ‖ key1[32] ‖ key2[32]`
pub const REGISTER_LEN: usize = 128;
/// `username[32] ‖ passwordHash[32]`
pub const LOGIN_LEN: usize = 64;
/// Old login, new login, new keys.
pub const CHANGE_LOGIN_LEN: usize = 192;
/// `userID[8] ‖ token[32]`
pub const AUTH_HEADER_LEN: usize = 40;
/// Auth header followed by `recordCount[4]`.
pub const SYNCUP_HEADER_LEN: usize = 44;
/// Auth header followed by `startTime[8] ‖ endTime[8]`.
pub const SYNCDOWN_LEN: usize = 56;
/// Same body as login.
pub const DELETE_ACCOUNT_LEN: usize = LOGIN_LEN;
/// Where the syncup record count lives.
pub const RECORD_COUNT_OFFSET: usize = AUTH_HEADER_LEN;

/// `userID[8] ‖ token[32]`
pub const SESSION_RESPONSE_LEN: usize = 8 + TOKEN_LEN;
/// Session followed by both keys.
pub const LOGIN_RESPONSE_LEN: usize = SESSION_RESPONSE_LEN + 64;
/// Ten cursor values.
pub const CURSORS_RESPONSE_LEN: usize = 80;

fn read_credentials(reader: &mut FieldReader<'_>) -> Result<Credentials, WireError> {
    Ok(Credentials {
        username: Username::from_bytes(reader.read_array()?),
        password_hash: reader.read_array()?,
    })
}

fn read_keys(reader: &mut FieldReader<'_>) -> Result<KeyPair, WireError> {
    Ok(KeyPair {
        key1: reader.read_array()?,
        key2: reader.read_array()?,
    })
}

impl Credentials {
    /// Decode a login or account deletion body.
    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        read_credentials(&mut FieldReader::new(buf))
    }
}

/// `/register` body.
pub struct RegisterRequest {
    pub credentials: Credentials,
    pub keys: KeyPair,
}

impl RegisterRequest {
    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        let mut reader = FieldReader::new(buf);
        Ok(Self {
            credentials: read_credentials(&mut reader)?,
            keys: read_keys(&mut reader)?,
        })
    }
}

/// `/changelogin` body.
pub struct ChangeLoginRequest {
    pub old: Credentials,
    pub new: Credentials,
    pub keys: KeyPair,
}

impl ChangeLoginRequest {
    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        let mut reader = FieldReader::new(buf);
        Ok(Self {
            old: read_credentials(&mut reader)?,
            new: read_credentials(&mut reader)?,
            keys: read_keys(&mut reader)?,
        })
    }
}

/// `userID ‖ token` prefix shared by every token-gated body.
#[derive(Debug, Clone, Copy)]
pub struct AuthHeader {
    pub user_id: i64,
    pub token: Token,
}

impl AuthHeader {
    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        Self::read(&mut FieldReader::new(buf))
    }

    fn read(reader: &mut FieldReader<'_>) -> Result<Self, WireError> {
        Ok(Self {
            user_id: reader.read_i64()?,
            token: reader.read_array()?,
        })
    }
}

/// Fixed part of a `/syncup/<table>` body; records follow at offset 44.
#[derive(Debug, Clone, Copy)]
pub struct SyncupHeader {
    pub auth: AuthHeader,
    pub record_count: u32,
}

impl SyncupHeader {
    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        let mut reader = FieldReader::new(buf);
        Ok(Self {
            auth: AuthHeader::read(&mut reader)?,
            record_count: reader.read_u32()?,
        })
    }
}

/// `/syncdown/<table>` body.
#[derive(Debug, Clone, Copy)]
pub struct SyncdownRequest {
    pub auth: AuthHeader,
    pub start_time: i64,
    pub end_time: i64,
}

impl SyncdownRequest {
    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        let mut reader = FieldReader::new(buf);
        Ok(Self {
            auth: AuthHeader::read(&mut reader)?,
            start_time: reader.read_i64()?,
            end_time: reader.read_i64()?,
        })
    }
}

/// Register and changelogin response.
pub fn encode_session(user_id: i64, token: &Token) -> Bytes {
    let mut writer = FieldWriter::with_capacity(SESSION_RESPONSE_LEN);
    writer.put_i64(user_id);
    writer.put_bytes(token);
    writer.finish()
}

/// Login response.
pub fn encode_login(user_id: i64, token: &Token, keys: &KeyPair) -> Bytes {
    let mut writer = FieldWriter::with_capacity(LOGIN_RESPONSE_LEN);
    writer.put_i64(user_id);
    writer.put_bytes(token);
    writer.put_bytes(&keys.key1);
    writer.put_bytes(&keys.key2);
    writer.finish()
}

pub fn encode_cursors(cursors: &LastUpdated) -> Bytes {
    let mut writer = FieldWriter::with_capacity(CURSORS_RESPONSE_LEN);
    for &value in cursors.values() {
        writer.put_i64(value);
    }
    writer.finish()
}

pub fn encode_max_record_count(max_record_count: u32) -> Bytes {
    let mut writer = FieldWriter::with_capacity(4);
    writer.put_u32(max_record_count);
    writer.finish()
}
