// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger errors.
//!
//! Every error is terminal for the request that raised it and leaves
//! balances and consumed tokens exactly as they were.

use alloy::primitives::Address;
use thiserror::Error;

use super::journal::JournalError;
use crate::authorization::AuthError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Owned balance too low for a delegate operation.
    #[error("insufficient funds: {account} owns {available}, requested {requested}")]
    InsufficientFunds {
        account: Address,
        available: u128,
        requested: u128,
    },

    /// Delegated balance too low for an undelegate operation.
    #[error("insufficient delegated funds: {account} holds {available}, requested {requested}")]
    InsufficientDelegatedFunds {
        account: Address,
        available: u128,
        requested: u128,
    },

    /// Signer mismatch, malformed signature, or amount not bound by the token.
    #[error("invalid signature")]
    InvalidSignature,

    /// Authorization token already spent.
    #[error("invalid nonce")]
    InvalidNonce,

    /// Nonce registry guard tripped.
    #[error("authorization token already consumed")]
    AlreadyConsumed,

    /// A credit would exceed the representable supply.
    #[error("balance overflow: crediting {amount} to {account}")]
    BalanceOverflow { account: Address, amount: u128 },

    /// The durable journal refused or failed the write.
    #[error("journal error: {0}")]
    Journal(String),
}

impl LedgerError {
    /// Stable machine-readable code.
    pub fn error_code(&self) -> &'static str {
        match self {
            LedgerError::InsufficientFunds { .. } => "insufficient_funds",
            LedgerError::InsufficientDelegatedFunds { .. } => "insufficient_delegated_funds",
            LedgerError::InvalidSignature => "invalid_signature",
            LedgerError::InvalidNonce => "invalid_nonce",
            LedgerError::AlreadyConsumed => "already_consumed",
            LedgerError::BalanceOverflow { .. } => "balance_overflow",
            LedgerError::Journal(_) => "journal_error",
        }
    }
}

impl From<AuthError> for LedgerError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidSignature => LedgerError::InvalidSignature,
            AuthError::InvalidNonce => LedgerError::InvalidNonce,
            AuthError::AlreadyConsumed => LedgerError::AlreadyConsumed,
        }
    }
}

impl From<JournalError> for LedgerError {
    fn from(e: JournalError) -> Self {
        match e {
            JournalError::TokenConsumed => LedgerError::InvalidNonce,
            JournalError::Storage(msg) => LedgerError::Journal(msg),
        }
    }
}
