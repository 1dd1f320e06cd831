// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registry of consumed authorization tokens.
//!
//! Scope is global: a token consumed anywhere is rejected everywhere.
//! The registry is append-only and never pruned.

use std::collections::HashSet;

use crate::authorization::{AuthError, AuthorizationToken};

/// Injectable store of consumed tokens.
pub trait NonceRegistry: Send {
    /// Whether `token` has already been consumed.
    fn is_consumed(&self, token: &AuthorizationToken) -> bool;

    /// Mark `token` as consumed.
    ///
    /// Fails with [`AuthError::AlreadyConsumed`] if it already is, even
    /// though callers are expected to have checked first.
    fn consume(&mut self, token: AuthorizationToken) -> Result<(), AuthError>;

    /// Number of consumed tokens.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local registry backed by a hash set.
#[derive(Debug, Default, Clone)]
pub struct InMemoryNonceRegistry {
    consumed: HashSet<AuthorizationToken>,
}

impl InMemoryNonceRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FromIterator<AuthorizationToken> for InMemoryNonceRegistry {
    fn from_iter<I: IntoIterator<Item = AuthorizationToken>>(iter: I) -> Self {
        Self {
            consumed: iter.into_iter().collect(),
        }
    }
}

impl NonceRegistry for InMemoryNonceRegistry {
    fn is_consumed(&self, token: &AuthorizationToken) -> bool {
        self.consumed.contains(token)
    }

    fn consume(&mut self, token: AuthorizationToken) -> Result<(), AuthError> {
        if self.consumed.insert(token) {
            Ok(())
        } else {
            Err(AuthError::AlreadyConsumed)
        }
    }

    fn len(&self) -> usize {
        self.consumed.len()
    }
}
