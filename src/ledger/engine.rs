// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Delegation engine.
//!
//! Single entry point for every balance mutation. All state (ledger and
//! consumed tokens) sits behind one mutex, so each request is one
//! serialized transaction:
//!
//! ```text
//! validate (read-only) -> plan update (pure) -> journal -> consume token -> apply
//! ```
//!
//! Nothing is mutated until validation and planning have succeeded, and the
//! journal write is all-or-nothing, so a failed request leaves no trace.
//!
//! ## Relayed Transfer States
//!
//! ```text
//! Received -> Verifying -> Authorized -> Applied
//!                 |             |
//!                 +-------------+--> Rejected
//! ```

use std::sync::Arc;

use alloy::primitives::Address;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use super::account::{Account, TransferEvent};
use super::error::LedgerError;
use super::journal::{Journal, Transition};
use super::nonce::{InMemoryNonceRegistry, NonceRegistry};
use super::store::{BalanceUpdate, LedgerStore};
use crate::authorization::{AuthorizationToken, RecoverableSignature, SignatureAuthorizer};

/// Capacity of the in-process transfer event channel.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Persisted state used to rebuild an engine on startup.
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    pub accounts: Vec<(Address, Account)>,
    pub consumed_tokens: Vec<AuthorizationToken>,
    pub next_sequence: u64,
}

/// A relayer's request to move a delegate's funds.
#[derive(Debug, Clone)]
pub struct RelayedTransfer {
    /// The party submitting the request.
    pub relayer: Address,
    /// The delegate who signed the authorization.
    pub account: Address,
    pub signature: RecoverableSignature,
    pub token: AuthorizationToken,
    pub amount: u128,
    /// Explicit recipient; the relayer when absent.
    pub recipient: Option<Address>,
}

impl RelayedTransfer {
    pub fn recipient(&self) -> Address {
        self.recipient.unwrap_or(self.relayer)
    }
}

/// Lifecycle of a relayed request, used in log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayPhase {
    Received,
    Verifying,
    Authorized,
    Applied,
    Rejected,
}

impl RelayPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayPhase::Received => "received",
            RelayPhase::Verifying => "verifying",
            RelayPhase::Authorized => "authorized",
            RelayPhase::Applied => "applied",
            RelayPhase::Rejected => "rejected",
        }
    }
}

struct EngineState {
    ledger: LedgerStore,
    nonces: Box<dyn NonceRegistry>,
    next_sequence: u64,
}

/// Serialized executor for ledger operations.
pub struct DelegationEngine {
    state: Mutex<EngineState>,
    authorizer: SignatureAuthorizer,
    journal: Option<Arc<dyn Journal>>,
    events: broadcast::Sender<TransferEvent>,
}

impl DelegationEngine {
    /// Build an engine over the given ledger and nonce registry.
    pub fn new(ledger: LedgerStore, nonces: Box<dyn NonceRegistry>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(EngineState {
                ledger,
                nonces,
                next_sequence: 0,
            }),
            authorizer: SignatureAuthorizer::default(),
            journal: None,
            events,
        }
    }

    /// Empty ledger, in-memory registry, no journal.
    pub fn in_memory() -> Self {
        Self::new(LedgerStore::new(), Box::new(InMemoryNonceRegistry::new()))
    }

    /// Rebuild an engine from persisted state.
    pub fn restore(snapshot: LedgerSnapshot) -> Result<Self, LedgerError> {
        let ledger = LedgerStore::from_accounts(snapshot.accounts)?;
        let nonces: InMemoryNonceRegistry = snapshot.consumed_tokens.into_iter().collect();
        let engine = Self::new(ledger, Box::new(nonces));
        engine.state.lock().next_sequence = snapshot.next_sequence;
        Ok(engine)
    }

    /// Record every transition in `journal` before applying it.
    pub fn with_journal(mut self, journal: Arc<dyn Journal>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Replace the signature verification scheme.
    pub fn with_authorizer(mut self, authorizer: SignatureAuthorizer) -> Self {
        self.authorizer = authorizer;
        self
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn balance_of(&self, address: &Address) -> u128 {
        self.state.lock().ledger.balance_of(address)
    }

    pub fn delegated_balance_of(&self, address: &Address) -> u128 {
        self.state.lock().ledger.delegated_balance_of(address)
    }

    pub fn account(&self, address: &Address) -> Account {
        self.state.lock().ledger.account(address)
    }

    pub fn total_supply(&self) -> u128 {
        self.state.lock().ledger.total_supply()
    }

    pub fn is_consumed(&self, token: &AuthorizationToken) -> bool {
        self.state.lock().nonces.is_consumed(token)
    }

    /// Sequence number the next transfer event will carry.
    pub fn next_sequence(&self) -> u64 {
        self.state.lock().next_sequence
    }

    /// Listen for transfer events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<TransferEvent> {
        self.events.subscribe()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Credit new supply to `to`. Authorization is the caller's concern.
    pub fn mint(&self, to: Address, amount: u128) -> Result<TransferEvent, LedgerError> {
        let mut state = self.state.lock();
        let result = state
            .ledger
            .plan_credit_owned(to, amount)
            .and_then(|update| self.commit(&mut state, update, None));

        match &result {
            Ok(event) => tracing::info!(
                sequence = event.sequence,
                to = %to,
                amount = %amount,
                "Minted"
            ),
            Err(e) => tracing::warn!(to = %to, amount = %amount, error = %e, "Mint rejected"),
        }
        result
    }

    /// Move `amount` of the caller's owned balance into `to`'s delegated balance.
    pub fn delegate(
        &self,
        caller: Address,
        to: Address,
        amount: u128,
    ) -> Result<TransferEvent, LedgerError> {
        let mut state = self.state.lock();
        let result = state
            .ledger
            .plan_move_owned_to_delegated(caller, to, amount)
            .and_then(|update| self.commit(&mut state, update, None));

        match &result {
            Ok(event) => tracing::info!(
                sequence = event.sequence,
                from = %caller,
                to = %to,
                amount = %amount,
                "Delegated"
            ),
            Err(e) => tracing::warn!(
                from = %caller,
                to = %to,
                amount = %amount,
                error = %e,
                "Delegation rejected"
            ),
        }
        result
    }

    /// The caller, acting as delegate, moves `amount` of its delegated
    /// balance into `recipient`'s owned balance.
    pub fn undelegate_and_transfer_to(
        &self,
        caller: Address,
        recipient: Address,
        amount: u128,
    ) -> Result<TransferEvent, LedgerError> {
        let mut state = self.state.lock();
        let result = state
            .ledger
            .plan_move_delegated_to_owned(caller, recipient, amount)
            .and_then(|update| self.commit(&mut state, update, None));

        match &result {
            Ok(event) => tracing::info!(
                sequence = event.sequence,
                delegate = %caller,
                recipient = %recipient,
                amount = %amount,
                "Undelegated"
            ),
            Err(e) => tracing::warn!(
                delegate = %caller,
                recipient = %recipient,
                amount = %amount,
                error = %e,
                "Undelegation rejected"
            ),
        }
        result
    }

    /// Move a delegate's funds on the strength of its signed authorization.
    ///
    /// The token is consumed if and only if the funds move.
    pub fn undelegate_and_transfer_from(
        &self,
        request: &RelayedTransfer,
    ) -> Result<TransferEvent, LedgerError> {
        let recipient = request.recipient();
        tracing::debug!(
            phase = RelayPhase::Received.as_str(),
            relayer = %request.relayer,
            account = %request.account,
            token = %request.token,
            "Relayed transfer received"
        );

        let mut state = self.state.lock();
        let result = self.authorize_and_apply(&mut state, request, recipient);

        match &result {
            Ok(event) => tracing::info!(
                phase = RelayPhase::Applied.as_str(),
                sequence = event.sequence,
                relayer = %request.relayer,
                delegate = %request.account,
                recipient = %recipient,
                amount = %request.amount,
                "Relayed transfer applied"
            ),
            Err(e) => tracing::warn!(
                phase = RelayPhase::Rejected.as_str(),
                relayer = %request.relayer,
                delegate = %request.account,
                token = %request.token,
                error = %e,
                "Relayed transfer rejected"
            ),
        }
        result
    }

    fn authorize_and_apply(
        &self,
        state: &mut EngineState,
        request: &RelayedTransfer,
        recipient: Address,
    ) -> Result<TransferEvent, LedgerError> {
        tracing::debug!(phase = RelayPhase::Verifying.as_str(), token = %request.token);
        let authorization = self.authorizer.authorize(
            state.nonces.as_ref(),
            &request.account,
            &request.signature,
            &request.token,
            request.amount,
        )?;
        tracing::debug!(
            phase = RelayPhase::Authorized.as_str(),
            signer = %authorization.signer,
            amount = authorization.amount
        );

        let update = state
            .ledger
            .plan_move_delegated_to_owned(request.account, recipient, request.amount)?;
        self.commit(state, update, Some(authorization.token))
    }

    /// Journal, consume and apply a planned update.
    ///
    /// Runs under the state lock with the token already checked unconsumed,
    /// so nothing after the journal write can fail.
    fn commit(
        &self,
        state: &mut EngineState,
        update: BalanceUpdate,
        consumed_token: Option<AuthorizationToken>,
    ) -> Result<TransferEvent, LedgerError> {
        let event = TransferEvent {
            sequence: state.next_sequence,
            kind: update.kind,
            from: update.from,
            to: update.to,
            amount: update.amount,
            timestamp: Utc::now(),
        };

        if let Some(journal) = &self.journal {
            journal
                .record(&Transition {
                    event: &event,
                    accounts: &update.accounts,
                    consumed_token: consumed_token.as_ref(),
                })
                .inspect_err(|e| tracing::error!(error = %e, "Journal write failed"))?;
        }

        if let Some(token) = consumed_token {
            state.nonces.consume(token)?;
        }
        state.ledger.apply(&update);
        state.next_sequence += 1;

        // No subscribers is not an error.
        let _ = self.events.send(event.clone());
        Ok(event)
    }
}
