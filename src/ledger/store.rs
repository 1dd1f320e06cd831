// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory ledger of owned and delegated balances.
//!
//! Every mutation is split in two: a `plan_*` method validates and computes
//! the resulting account records without touching state, and [`LedgerStore::apply`]
//! installs them. The engine uses the split to commit a balance move
//! together with a consumed token; the one-shot methods (`credit_owned`,
//! `move_owned_to_delegated`, `move_delegated_to_owned`) do both at once.

use std::collections::HashMap;

use alloy::primitives::Address;

use super::account::{Account, TransferKind};
use super::error::LedgerError;

/// A validated balance change, ready to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceUpdate {
    pub kind: TransferKind,
    pub from: Address,
    pub to: Address,
    pub amount: u128,
    /// Post-mutation records of every touched account.
    pub accounts: Vec<(Address, Account)>,
    /// Total supply after the update.
    pub total_supply: u128,
}

/// Owner of every account record.
#[derive(Debug, Default, Clone)]
pub struct LedgerStore {
    accounts: HashMap<Address, Account>,
    total_supply: u128,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted account records.
    pub fn from_accounts<I>(accounts: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = (Address, Account)>,
    {
        let mut store = Self::new();
        for (address, account) in accounts {
            let total = account
                .total()
                .and_then(|t| t.checked_add(store.total_supply))
                .ok_or(LedgerError::BalanceOverflow {
                    account: address,
                    amount: account.owned_balance,
                })?;
            store.total_supply = total;
            if !account.is_empty() {
                store.accounts.insert(address, account);
            }
        }
        Ok(store)
    }

    /// Current record for `address`; zero balances if never touched.
    pub fn account(&self, address: &Address) -> Account {
        self.accounts.get(address).copied().unwrap_or_default()
    }

    pub fn balance_of(&self, address: &Address) -> u128 {
        self.account(address).owned_balance
    }

    pub fn delegated_balance_of(&self, address: &Address) -> u128 {
        self.account(address).delegated_balance
    }

    /// Sum of every owned and delegated balance.
    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Number of accounts holding a non-zero balance.
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    // =========================================================================
    // Planning
    // =========================================================================

    /// Plan `owned_balance[to] += amount`.
    pub fn plan_credit_owned(&self, to: Address, amount: u128) -> Result<BalanceUpdate, LedgerError> {
        let overflow = || LedgerError::BalanceOverflow {
            account: to,
            amount,
        };
        let total_supply = self.total_supply.checked_add(amount).ok_or_else(overflow)?;

        let mut target = self.account(&to);
        target.owned_balance = target.owned_balance.checked_add(amount).ok_or_else(overflow)?;

        Ok(BalanceUpdate {
            kind: TransferKind::Mint,
            from: Address::ZERO,
            to,
            amount,
            accounts: vec![(to, target)],
            total_supply,
        })
    }

    /// Plan moving `amount` from `owned_balance[from]` to `delegated_balance[to]`.
    pub fn plan_move_owned_to_delegated(
        &self,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<BalanceUpdate, LedgerError> {
        let mut source = self.account(&from);
        if source.owned_balance < amount {
            return Err(LedgerError::InsufficientFunds {
                account: from,
                available: source.owned_balance,
                requested: amount,
            });
        }
        source.owned_balance -= amount;

        let mut target = if to == from { source } else { self.account(&to) };
        target.delegated_balance = target
            .delegated_balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow {
                account: to,
                amount,
            })?;

        Ok(BalanceUpdate {
            kind: TransferKind::Delegate,
            from,
            to,
            amount,
            accounts: touched(from, source, to, target),
            total_supply: self.total_supply,
        })
    }

    /// Plan moving `amount` from `delegated_balance[delegate]` to `owned_balance[recipient]`.
    pub fn plan_move_delegated_to_owned(
        &self,
        delegate: Address,
        recipient: Address,
        amount: u128,
    ) -> Result<BalanceUpdate, LedgerError> {
        let mut source = self.account(&delegate);
        if source.delegated_balance < amount {
            return Err(LedgerError::InsufficientDelegatedFunds {
                account: delegate,
                available: source.delegated_balance,
                requested: amount,
            });
        }
        source.delegated_balance -= amount;

        let mut target = if recipient == delegate {
            source
        } else {
            self.account(&recipient)
        };
        target.owned_balance = target
            .owned_balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow {
                account: recipient,
                amount,
            })?;

        Ok(BalanceUpdate {
            kind: TransferKind::Undelegate,
            from: delegate,
            to: recipient,
            amount,
            accounts: touched(delegate, source, recipient, target),
            total_supply: self.total_supply,
        })
    }

    /// Install a planned update.
    pub fn apply(&mut self, update: &BalanceUpdate) {
        for (address, account) in &update.accounts {
            if account.is_empty() {
                self.accounts.remove(address);
            } else {
                self.accounts.insert(*address, *account);
            }
        }
        self.total_supply = update.total_supply;
    }

    // =========================================================================
    // One-shot mutations
    // =========================================================================

    pub fn credit_owned(&mut self, to: Address, amount: u128) -> Result<BalanceUpdate, LedgerError> {
        let update = self.plan_credit_owned(to, amount)?;
        self.apply(&update);
        Ok(update)
    }

    pub fn move_owned_to_delegated(
        &mut self,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<BalanceUpdate, LedgerError> {
        let update = self.plan_move_owned_to_delegated(from, to, amount)?;
        self.apply(&update);
        Ok(update)
    }

    pub fn move_delegated_to_owned(
        &mut self,
        delegate: Address,
        recipient: Address,
        amount: u128,
    ) -> Result<BalanceUpdate, LedgerError> {
        let update = self.plan_move_delegated_to_owned(delegate, recipient, amount)?;
        self.apply(&update);
        Ok(update)
    }
}

/// Touched records; a self-transfer collapses to one entry.
fn touched(
    source_address: Address,
    source: Account,
    target_address: Address,
    target: Account,
) -> Vec<(Address, Account)> {
    if source_address == target_address {
        vec![(target_address, target)]
    } else {
        vec![(source_address, source), (target_address, target)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn credit_increases_owned_and_supply() {
        let mut store = LedgerStore::new();
        store.credit_owned(addr(0xA), 200).unwrap();

        assert_eq!(store.balance_of(&addr(0xA)), 200);
        assert_eq!(store.delegated_balance_of(&addr(0xA)), 0);
        assert_eq!(store.total_supply(), 200);
    }

    #[test]
    fn mint_then_delegate() {
        let mut store = LedgerStore::new();
        store.credit_owned(addr(0xA), 200).unwrap();
        let update = store.move_owned_to_delegated(addr(0xA), addr(0xB), 150).unwrap();

        assert_eq!(update.kind, TransferKind::Delegate);
        assert_eq!(store.balance_of(&addr(0xA)), 50);
        assert_eq!(store.delegated_balance_of(&addr(0xB)), 150);
        assert_eq!(store.balance_of(&addr(0xB)), 0);
        assert_eq!(store.total_supply(), 200);
    }

    #[test]
    fn direct_undelegate_and_transfer() {
        let mut store = LedgerStore::new();
        store.credit_owned(addr(0xA), 200).unwrap();
        store.move_owned_to_delegated(addr(0xA), addr(0xB), 150).unwrap();
        store.move_delegated_to_owned(addr(0xB), addr(0xC), 50).unwrap();

        assert_eq!(store.balance_of(&addr(0xB)), 0);
        assert_eq!(store.delegated_balance_of(&addr(0xB)), 100);
        assert_eq!(store.balance_of(&addr(0xC)), 50);
        assert_eq!(store.delegated_balance_of(&addr(0xC)), 0);
        assert_eq!(store.total_supply(), 200);
    }

    #[test]
    fn delegate_without_funds_fails_and_leaves_state() {
        let mut store = LedgerStore::new();
        store.credit_owned(addr(0xA), 10).unwrap();

        let err = store.move_owned_to_delegated(addr(0xA), addr(0xB), 11).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                account: addr(0xA),
                available: 10,
                requested: 11
            }
        );
        assert_eq!(store.balance_of(&addr(0xA)), 10);
        assert_eq!(store.delegated_balance_of(&addr(0xB)), 0);
    }

    #[test]
    fn undelegate_without_delegated_funds_fails() {
        let mut store = LedgerStore::new();
        store.credit_owned(addr(0xB), 500).unwrap();

        let err = store.move_delegated_to_owned(addr(0xB), addr(0xC), 1).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientDelegatedFunds { .. }));
        assert_eq!(store.balance_of(&addr(0xB)), 500);
        assert_eq!(store.balance_of(&addr(0xC)), 0);
    }

    #[test]
    fn self_delegation_moves_between_buckets() {
        let mut store = LedgerStore::new();
        store.credit_owned(addr(0xA), 100).unwrap();
        let update = store.move_owned_to_delegated(addr(0xA), addr(0xA), 40).unwrap();

        assert_eq!(update.accounts.len(), 1);
        assert_eq!(store.balance_of(&addr(0xA)), 60);
        assert_eq!(store.delegated_balance_of(&addr(0xA)), 40);

        store.move_delegated_to_owned(addr(0xA), addr(0xA), 40).unwrap();
        assert_eq!(store.balance_of(&addr(0xA)), 100);
        assert_eq!(store.delegated_balance_of(&addr(0xA)), 0);
        assert_eq!(store.total_supply(), 100);
    }

    #[test]
    fn plan_does_not_mutate() {
        let mut store = LedgerStore::new();
        store.credit_owned(addr(0xA), 100).unwrap();
        let update = store.plan_move_owned_to_delegated(addr(0xA), addr(0xB), 30).unwrap();

        assert_eq!(store.balance_of(&addr(0xA)), 100);
        store.apply(&update);
        assert_eq!(store.balance_of(&addr(0xA)), 70);
        assert_eq!(store.delegated_balance_of(&addr(0xB)), 30);
    }

    #[test]
    fn credit_overflow_is_rejected() {
        let mut store = LedgerStore::new();
        store.credit_owned(addr(0xA), u128::MAX).unwrap();

        let err = store.credit_owned(addr(0xB), 1).unwrap_err();
        assert!(matches!(err, LedgerError::BalanceOverflow { .. }));
        assert_eq!(store.balance_of(&addr(0xB)), 0);
        assert_eq!(store.total_supply(), u128::MAX);
    }

    #[test]
    fn zero_amount_moves_are_allowed() {
        let mut store = LedgerStore::new();
        let update = store.move_owned_to_delegated(addr(0xA), addr(0xB), 0).unwrap();
        assert_eq!(update.amount, 0);
        assert_eq!(store.account_count(), 0);
    }

    #[test]
    fn from_accounts_restores_supply() {
        let store = LedgerStore::from_accounts([
            (
                addr(0xA),
                Account {
                    owned_balance: 50,
                    delegated_balance: 0,
                },
            ),
            (
                addr(0xB),
                Account {
                    owned_balance: 0,
                    delegated_balance: 150,
                },
            ),
        ])
        .unwrap();

        assert_eq!(store.total_supply(), 200);
        assert_eq!(store.delegated_balance_of(&addr(0xB)), 150);
    }
}
