// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded ledger database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `accounts`: address (20 bytes) → owned_be16 || delegated_be16
//! - `consumed_tokens`: token (32 bytes) → sequence of the consuming transfer
//! - `transfers`: sequence → serialized StoredTransfer
//! - `ledger_state`: key → u64 (e.g., "next_sequence")
//!
//! Each committed transition is written in a single redb write transaction,
//! so balances, the consumed token and the transfer record land together
//! or not at all.

use std::path::Path;

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::authorization::{AuthorizationToken, TOKEN_LEN};
use crate::ledger::{
    Account, Journal, JournalError, LedgerSnapshot, TransferEvent, TransferKind, Transition,
};

// =============================================================================
// Table Definitions
// =============================================================================

/// Account records: address bytes → 32-byte balance pair.
const ACCOUNTS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("accounts");

/// Consumed authorization tokens: token bytes → consuming transfer sequence.
const CONSUMED_TOKENS: TableDefinition<&[u8], u64> = TableDefinition::new("consumed_tokens");

/// Transfer history: sequence → StoredTransfer (JSON bytes).
const TRANSFERS: TableDefinition<u64, &[u8]> = TableDefinition::new("transfers");

/// Ledger bookkeeping: key → value.
const LEDGER_STATE: TableDefinition<&str, u64> = TableDefinition::new("ledger_state");

const NEXT_SEQUENCE_KEY: &str = "next_sequence";

const ADDRESS_LEN: usize = 20;
const ACCOUNT_LEN: usize = 32;

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LedgerDbError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("authorization token already consumed")]
    TokenConsumed,

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type LedgerDbResult<T> = Result<T, LedgerDbError>;

// =============================================================================
// Stored Transfer
// =============================================================================

/// Persisted transfer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StoredTransfer {
    /// Position in the ledger history
    pub sequence: u64,
    /// Operation that produced the transfer
    pub kind: TransferKind,
    /// Source address (zero address for mints)
    pub from: String,
    /// Destination address
    pub to: String,
    /// Amount in smallest units, as a decimal string
    pub amount: String,
    /// When the transfer was committed
    pub timestamp: DateTime<Utc>,
}

impl From<&TransferEvent> for StoredTransfer {
    fn from(event: &TransferEvent) -> Self {
        Self {
            sequence: event.sequence,
            kind: event.kind,
            from: event.from.to_string(),
            to: event.to.to_string(),
            amount: event.amount.to_string(),
            timestamp: event.timestamp,
        }
    }
}

// =============================================================================
// Record Encoding
// =============================================================================

fn encode_account(account: &Account) -> [u8; ACCOUNT_LEN] {
    let mut bytes = [0u8; ACCOUNT_LEN];
    bytes[..16].copy_from_slice(&account.owned_balance.to_be_bytes());
    bytes[16..].copy_from_slice(&account.delegated_balance.to_be_bytes());
    bytes
}

fn decode_account(bytes: &[u8]) -> LedgerDbResult<Account> {
    if bytes.len() != ACCOUNT_LEN {
        return Err(LedgerDbError::Corrupt(format!(
            "account record is {} bytes",
            bytes.len()
        )));
    }
    let mut owned = [0u8; 16];
    let mut delegated = [0u8; 16];
    owned.copy_from_slice(&bytes[..16]);
    delegated.copy_from_slice(&bytes[16..]);
    Ok(Account {
        owned_balance: u128::from_be_bytes(owned),
        delegated_balance: u128::from_be_bytes(delegated),
    })
}

fn decode_address(bytes: &[u8]) -> LedgerDbResult<Address> {
    if bytes.len() != ADDRESS_LEN {
        return Err(LedgerDbError::Corrupt(format!(
            "account key is {} bytes",
            bytes.len()
        )));
    }
    Ok(Address::from_slice(bytes))
}

// =============================================================================
// LedgerDatabase
// =============================================================================

/// Embedded ACID ledger database.
pub struct LedgerDatabase {
    db: Database,
}

impl LedgerDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> LedgerDbResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ACCOUNTS)?;
            let _ = write_txn.open_table(CONSUMED_TOKENS)?;
            let _ = write_txn.open_table(TRANSFERS)?;
            let _ = write_txn.open_table(LEDGER_STATE)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Persist one transition atomically.
    ///
    /// Fails with [`LedgerDbError::TokenConsumed`] (writing nothing) if the
    /// transition consumes a token the database already holds.
    pub fn commit_transition(&self, transition: &Transition<'_>) -> LedgerDbResult<()> {
        let sequence = transition.event.sequence;
        let record = serde_json::to_vec(&StoredTransfer::from(transition.event))?;

        let write_txn = self.db.begin_write()?;
        let replayed = match transition.consumed_token {
            Some(token) => {
                let key = token.as_bytes().as_slice();
                let mut tokens = write_txn.open_table(CONSUMED_TOKENS)?;
                let seen = tokens.get(key)?.is_some();
                if !seen {
                    tokens.insert(key, sequence)?;
                }
                seen
            }
            None => false,
        };
        if replayed {
            write_txn.abort()?;
            return Err(LedgerDbError::TokenConsumed);
        }

        {
            let mut accounts = write_txn.open_table(ACCOUNTS)?;
            for (address, account) in transition.accounts {
                if account.is_empty() {
                    accounts.remove(address.as_slice())?;
                } else {
                    accounts.insert(address.as_slice(), encode_account(account).as_slice())?;
                }
            }

            let mut transfers = write_txn.open_table(TRANSFERS)?;
            transfers.insert(sequence, record.as_slice())?;

            let mut state = write_txn.open_table(LEDGER_STATE)?;
            state.insert(NEXT_SEQUENCE_KEY, sequence + 1)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Load everything needed to rebuild the delegation engine.
    pub fn load_snapshot(&self) -> LedgerDbResult<LedgerSnapshot> {
        let read_txn = self.db.begin_read()?;

        let accounts_table = read_txn.open_table(ACCOUNTS)?;
        let mut accounts = Vec::new();
        for entry in accounts_table.iter()? {
            let (key, value) = entry?;
            accounts.push((decode_address(key.value())?, decode_account(value.value())?));
        }

        let tokens_table = read_txn.open_table(CONSUMED_TOKENS)?;
        let mut consumed_tokens = Vec::new();
        for entry in tokens_table.iter()? {
            let (key, _) = entry?;
            let token = AuthorizationToken::from_slice(key.value()).map_err(|_| {
                LedgerDbError::Corrupt(format!(
                    "consumed token is {} bytes, expected {TOKEN_LEN}",
                    key.value().len()
                ))
            })?;
            consumed_tokens.push(token);
        }

        Ok(LedgerSnapshot {
            accounts,
            consumed_tokens,
            next_sequence: self.next_sequence()?,
        })
    }

    /// Sequence the next committed transfer will receive.
    pub fn next_sequence(&self) -> LedgerDbResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LEDGER_STATE)?;
        Ok(table
            .get(NEXT_SEQUENCE_KEY)?
            .map(|v| v.value())
            .unwrap_or(0))
    }

    /// True until the first transition has been committed.
    pub fn is_empty(&self) -> LedgerDbResult<bool> {
        Ok(self.next_sequence()? == 0)
    }

    /// Whether the database holds `token` as consumed.
    pub fn is_consumed(&self, token: &AuthorizationToken) -> LedgerDbResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CONSUMED_TOKENS)?;
        Ok(table.get(token.as_bytes().as_slice())?.is_some())
    }

    /// Look up a single transfer by sequence.
    pub fn get_transfer(&self, sequence: u64) -> LedgerDbResult<Option<StoredTransfer>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TRANSFERS)?;
        match table.get(sequence)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Paginated transfer history in commit order.
    ///
    /// `after` is the cursor returned by the previous page. Returns
    /// `(transfers, next_cursor)`; `next_cursor` is `None` on the last page.
    pub fn list_transfers(
        &self,
        after: Option<u64>,
        limit: usize,
    ) -> LedgerDbResult<(Vec<StoredTransfer>, Option<u64>)> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TRANSFERS)?;

        let start = match after {
            Some(cursor) => match cursor.checked_add(1) {
                Some(start) => start,
                None => return Ok((Vec::new(), None)),
            },
            None => 0,
        };

        let mut transfers = Vec::with_capacity(limit.min(256));
        let mut has_more = false;
        for entry in table.range(start..)? {
            let (_, value) = entry?;
            if transfers.len() >= limit {
                has_more = true;
                break;
            }
            transfers.push(serde_json::from_slice::<StoredTransfer>(value.value())?);
        }

        let next_cursor = if has_more {
            transfers.last().map(|t| t.sequence)
        } else {
            None
        };
        Ok((transfers, next_cursor))
    }
}

impl Journal for LedgerDatabase {
    fn record(&self, transition: &Transition<'_>) -> Result<(), JournalError> {
        self.commit_transition(transition).map_err(|e| match e {
            LedgerDbError::TokenConsumed => JournalError::TokenConsumed,
            other => JournalError::Storage(other.to_string()),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
