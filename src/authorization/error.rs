// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization errors.

use thiserror::Error;

/// Rejection reasons for a relayed authorization.
///
/// An amount that disagrees with the token is reported as
/// [`AuthError::InvalidSignature`]: the token is the only record of what
/// was signed, so a different amount is a different (unsigned) message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Recovered signer differs from the claimed account, the signature is
    /// malformed, or the claimed amount does not match the token.
    #[error("invalid signature")]
    InvalidSignature,

    /// The token has already been consumed.
    #[error("invalid nonce")]
    InvalidNonce,

    /// Registry guard: a consume was attempted on a consumed token.
    #[error("authorization token already consumed")]
    AlreadyConsumed,
}

/// Errors decoding tokens and signatures from their wire encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("invalid hex: {0}")]
    Hex(String),

    #[error("invalid length: expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
}

/// Failures recovering a signer from a signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecoveryError {
    /// Recovery byte outside {27, 28} after normalization.
    #[error("invalid recovery byte: {0}")]
    InvalidRecoveryByte(u8),

    /// `r` or `s` is not a valid scalar.
    #[error("malformed signature")]
    Malformed,

    /// `s` is in the upper half of the curve order.
    #[error("non-canonical signature (high s)")]
    HighS,

    /// No public key corresponds to the signature and hash.
    #[error("signer could not be recovered")]
    Unrecoverable,
}
