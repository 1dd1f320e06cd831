// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::config::GenesisConfig;
use crate::ledger::{DelegationEngine, LedgerError};
use crate::storage::{LedgerDatabase, LedgerDbError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open ledger database: {0}")]
    Storage(#[from] LedgerDbError),

    #[error("failed to restore ledger: {0}")]
    Ledger(#[from] LedgerError),
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DelegationEngine>,
    pub db: Arc<LedgerDatabase>,
}

impl AppState {
    /// Wire an engine to the database that journals it.
    pub fn new(engine: Arc<DelegationEngine>, db: Arc<LedgerDatabase>) -> Self {
        Self { engine, db }
    }

    /// Open the ledger at `path`, restore the engine from it, and apply the
    /// genesis mint if the ledger has never been written.
    pub fn open(path: &Path, genesis: Option<GenesisConfig>) -> Result<Self, StartupError> {
        let db = Arc::new(LedgerDatabase::open(path)?);
        let fresh = db.is_empty()?;
        let snapshot = db.load_snapshot()?;

        tracing::info!(
            path = %path.display(),
            accounts = snapshot.accounts.len(),
            consumed_tokens = snapshot.consumed_tokens.len(),
            next_sequence = snapshot.next_sequence,
            "Ledger loaded"
        );

        let engine = DelegationEngine::restore(snapshot)?.with_journal(db.clone());

        if let (true, Some(genesis)) = (fresh, genesis) {
            engine.mint(genesis.account, genesis.supply)?;
            tracing::info!(
                account = %genesis.account,
                supply = %genesis.supply,
                "Genesis supply minted"
            );
        }

        Ok(Self::new(Arc::new(engine), db))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;

    #[test]
    fn genesis_is_minted_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.redb");
        let genesis = GenesisConfig {
            account: Address::repeat_byte(0xA),
            supply: 10_000,
        };

        {
            let state = AppState::open(&path, Some(genesis)).unwrap();
            assert_eq!(state.engine.balance_of(&genesis.account), 10_000);
            state
                .engine
                .delegate(genesis.account, Address::repeat_byte(0xB), 4_000)
                .unwrap();
        }

        let state = AppState::open(&path, Some(genesis)).unwrap();
        assert_eq!(state.engine.balance_of(&genesis.account), 6_000);
        assert_eq!(state.engine.delegated_balance_of(&Address::repeat_byte(0xB)), 4_000);
        assert_eq!(state.engine.total_supply(), 10_000);
        assert_eq!(state.engine.next_sequence(), 2);
    }

    #[test]
    fn no_genesis_leaves_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::open(&dir.path().join("ledger.redb"), None).unwrap();
        assert_eq!(state.engine.total_supply(), 0);
        assert!(state.db.is_empty().unwrap());
    }
}
