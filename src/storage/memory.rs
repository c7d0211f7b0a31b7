// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory token store (tests and ephemeral sessions).

use std::sync::Mutex;

use super::{StorageResult, TokenStore};
use crate::auth::SessionToken;

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<SessionToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a token already stored, as if left by a previous run.
    pub fn with_token(token: SessionToken) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<SessionToken>> {
        // A poisoned slot still holds a valid Option.
        self.token.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> StorageResult<Option<SessionToken>> {
        Ok(self.slot().clone())
    }

    fn save(&self, token: &SessionToken) -> StorageResult<()> {
        *self.slot() = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        *self.slot() = None;
        Ok(())
    }
}
