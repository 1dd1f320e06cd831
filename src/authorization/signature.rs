// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! 65-byte recoverable signatures (`r || s || v`).
//!
//! Some clients emit the recovery byte as 0/1, others as 27/28. Every
//! signature is normalized to 27/28 before use so both encodings of the
//! same proof are treated as one.

use std::fmt;
use std::str::FromStr;

use k256::ecdsa::{RecoveryId, Signature};

use super::error::EncodingError;

/// Length of an encoded recoverable signature.
pub const SIGNATURE_LEN: usize = 65;

/// Offset added to a raw recovery id in the canonical encoding.
const RECOVERY_OFFSET: u8 = 27;

/// A recoverable secp256k1 signature in wire format.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature([u8; SIGNATURE_LEN]);

impl RecoverableSignature {
    /// Wrap raw signature bytes.
    pub const fn from_bytes(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a signature from exactly [`SIGNATURE_LEN`] bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, EncodingError> {
        let bytes: [u8; SIGNATURE_LEN] =
            bytes.try_into().map_err(|_| EncodingError::Length {
                expected: SIGNATURE_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(bytes))
    }

    /// Build the canonical encoding from an ECDSA signature and recovery id.
    pub fn from_parts(signature: &Signature, recovery_id: RecoveryId) -> Self {
        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes[..64].copy_from_slice(&signature.to_bytes());
        bytes[64] = RECOVERY_OFFSET + recovery_id.to_byte();
        Self(bytes)
    }

    /// The trailing recovery byte as transmitted.
    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// `r || s`.
    pub fn rs(&self) -> &[u8] {
        &self.0[..64]
    }

    /// Copy with the recovery byte mapped into the 27/28 range.
    pub fn normalized(&self) -> Self {
        let mut bytes = self.0;
        if bytes[64] < RECOVERY_OFFSET {
            bytes[64] = bytes[64].wrapping_add(RECOVERY_OFFSET);
        }
        Self(bytes)
    }

    /// Recovery id of the normalized signature, if its byte is 27 or 28.
    pub fn recovery_id(&self) -> Option<RecoveryId> {
        match self.normalized().v() {
            27 => RecoveryId::from_byte(0),
            28 => RecoveryId::from_byte(1),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    /// 0x-prefixed lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        format!("0x{}", alloy::hex::encode(self.0))
    }
}

impl FromStr for RecoverableSignature {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = alloy::hex::decode(raw).map_err(|e| EncodingError::Hex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecoverableSignature({})", self.to_hex())
    }
}
