// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account balances and transfer records.

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Balances held by a single address.
///
/// `delegated_balance` is an aggregate: the ledger does not track which
/// delegator contributed what.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Account {
    /// Funds the account fully controls.
    pub owned_balance: u128,
    /// Funds placed at the account's disposal by delegators.
    pub delegated_balance: u128,
}

impl Account {
    pub fn is_empty(&self) -> bool {
        self.owned_balance == 0 && self.delegated_balance == 0
    }

    /// Sum of both buckets. `None` on overflow.
    pub fn total(&self) -> Option<u128> {
        self.owned_balance.checked_add(self.delegated_balance)
    }
}

/// What produced a transfer record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    /// New supply credited to an owned balance.
    Mint,
    /// Owned balance moved into a delegate's delegated balance.
    Delegate,
    /// Delegated balance moved into a recipient's owned balance.
    Undelegate,
}

impl TransferKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferKind::Mint => "mint",
            TransferKind::Delegate => "delegate",
            TransferKind::Undelegate => "undelegate",
        }
    }
}

/// The externally visible trace of a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    /// Monotonic position in the ledger history, starting at 0.
    pub sequence: u64,
    pub kind: TransferKind,
    /// Source address; the zero address for mints.
    pub from: Address,
    pub to: Address,
    pub amount: u128,
    pub timestamp: DateTime<Utc>,
}
