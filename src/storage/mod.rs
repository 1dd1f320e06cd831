// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Ledger Storage
//!
//! Durable state lives in a single redb file under the data directory:
//!
//! ```text
//! $DATA_DIR/
//!   ledger.redb     # Accounts, consumed tokens, transfer history
//! ```
//!
//! The in-memory engine is rebuilt from this file on startup and every
//! committed operation is journaled here before it becomes visible.

pub mod ledger_db;

pub use ledger_db::{LedgerDatabase, LedgerDbError, LedgerDbResult, StoredTransfer};

/// File name of the ledger database inside the data directory.
pub const LEDGER_DB_FILE: &str = "ledger.redb";
