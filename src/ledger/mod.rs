// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Delegated Token Ledger
//!
//! Two balance buckets per address:
//!
//! - **owned**: funds the account controls and may delegate
//! - **delegated**: funds placed at the account's disposal by others
//!
//! ## Components
//!
//! ```text
//! store.rs    Ledger Store: balances, checked planning and application
//! nonce.rs    Nonce Registry: consumed authorization tokens
//! journal.rs  Durable transition journal interface
//! engine.rs   Delegation Engine: serialized mutations, relayed transfers
//! ```
//!
//! Supply only grows through minting; delegate and undelegate operations
//! conserve it.

pub mod account;
pub mod engine;
pub mod error;
pub mod journal;
pub mod nonce;
pub mod store;

pub use account::{Account, TransferEvent, TransferKind};
pub use engine::{DelegationEngine, LedgerSnapshot, RelayPhase, RelayedTransfer};
pub use error::LedgerError;
pub use journal::{Journal, JournalError, Transition};
pub use nonce::{InMemoryNonceRegistry, NonceRegistry};
pub use store::{BalanceUpdate, LedgerStore};
