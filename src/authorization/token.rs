// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Single-use authorization tokens.
//!
//! A token is 32 bytes: the high 28 bytes are random, the low 4 bytes carry
//! the authorized amount (big-endian). The amount is OR-combined into the
//! token so the signature over the token also covers the amount.
//!
//! ```text
//!  0                                   28         32
//!  +-----------------------------------+----------+
//!  |          random (28 bytes)        | amount   |
//!  +-----------------------------------+----------+
//! ```

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{keccak256, B256};
use k256::elliptic_curve::rand_core::{CryptoRng, OsRng, RngCore};

use super::error::EncodingError;

/// Length of an encoded authorization token.
pub const TOKEN_LEN: usize = 32;

/// Number of trailing bytes that carry the amount.
const AMOUNT_LEN: usize = 4;

/// Prefix applied by wallets to a 32-byte message before signing (EIP-191).
const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// A single-use, amount-binding authorization token.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AuthorizationToken([u8; TOKEN_LEN]);

impl AuthorizationToken {
    /// Wrap raw token bytes without any validation.
    pub const fn from_bytes(bytes: [u8; TOKEN_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a token from a byte slice of exactly [`TOKEN_LEN`] bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, EncodingError> {
        let bytes: [u8; TOKEN_LEN] = bytes.try_into().map_err(|_| EncodingError::Length {
            expected: TOKEN_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(bytes))
    }

    /// Generate a fresh token for `amount` using the OS random source.
    pub fn generate(amount: u32) -> Self {
        Self::generate_with(&mut OsRng, amount)
    }

    /// Generate a fresh token for `amount` from the given RNG.
    ///
    /// The amount bytes are cleared before the amount is OR-ed in, so the
    /// embedded amount always reads back exactly.
    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R, amount: u32) -> Self {
        let mut random = [0u8; TOKEN_LEN];
        rng.fill_bytes(&mut random[..TOKEN_LEN - AMOUNT_LEN]);
        Self::embed_amount(random, amount)
    }

    /// OR-combine `amount` (big-endian) into the low bytes of `nonce`.
    pub fn embed_amount(mut nonce: [u8; TOKEN_LEN], amount: u32) -> Self {
        for (byte, amount_byte) in nonce[TOKEN_LEN - AMOUNT_LEN..]
            .iter_mut()
            .zip(amount.to_be_bytes())
        {
            *byte |= amount_byte;
        }
        Self(nonce)
    }

    /// The amount carried in the low 4 bytes of the token.
    pub fn embedded_amount(&self) -> u32 {
        let mut amount = [0u8; AMOUNT_LEN];
        amount.copy_from_slice(&self.0[TOKEN_LEN - AMOUNT_LEN..]);
        u32::from_be_bytes(amount)
    }

    /// Raw token bytes.
    pub fn as_bytes(&self) -> &[u8; TOKEN_LEN] {
        &self.0
    }

    /// `keccak256(token)`, the message a delegate signs.
    pub fn digest(&self) -> B256 {
        keccak256(self.0)
    }

    /// The prehash actually covered by the signature.
    ///
    /// Wallets sign the digest as a personal message, so the signed value is
    /// `keccak256("\x19Ethereum Signed Message:\n32" || keccak256(token))`.
    pub fn signing_hash(&self) -> B256 {
        let digest = self.digest();
        let mut message = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + digest.len());
        message.extend_from_slice(PERSONAL_MESSAGE_PREFIX);
        message.extend_from_slice(digest.as_slice());
        keccak256(&message)
    }

    /// 0x-prefixed lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        format!("0x{}", alloy::hex::encode(self.0))
    }
}

impl FromStr for AuthorizationToken {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = alloy::hex::decode(raw).map_err(|e| EncodingError::Hex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for AuthorizationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for AuthorizationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthorizationToken({})", self.to_hex())
    }
}
