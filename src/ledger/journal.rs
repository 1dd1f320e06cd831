// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Durable record of committed ledger transitions.
//!
//! The engine writes each transition to the journal before installing it in
//! memory. A journal write is all-or-nothing; if it fails, the engine leaves
//! its in-memory state untouched.

use alloy::primitives::Address;

use super::account::{Account, TransferEvent};
use crate::authorization::AuthorizationToken;

/// Everything one successful operation changes.
#[derive(Debug, Clone, Copy)]
pub struct Transition<'a> {
    pub event: &'a TransferEvent,
    /// Post-mutation records of every touched account.
    pub accounts: &'a [(Address, Account)],
    /// Token consumed by a relayed transfer.
    pub consumed_token: Option<&'a AuthorizationToken>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JournalError {
    /// The store already holds the token (compare-and-insert lost).
    #[error("authorization token already consumed")]
    TokenConsumed,

    #[error("{0}")]
    Storage(String),
}

/// Persists transitions atomically.
pub trait Journal: Send + Sync {
    fn record(&self, transition: &Transition<'_>) -> Result<(), JournalError>;
}
