// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory accounts and sessions for the development backend stub.
//!
//! **Development only**: passwords are kept in clear text and sessions live
//! as long as the process.

use std::collections::HashMap;

use uuid::Uuid;

use crate::auth::Role;

/// A backend account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub role: Role,
}

#[derive(Default)]
pub struct InMemoryStore {
    accounts: HashMap<String, Account>,
    /// token -> account username
    sessions: HashMap<String, String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with one account per role.
    pub fn seeded() -> Self {
        let mut store = Self::new();
        store.insert_account(1, "admin", "admin123", "Admin User", "IT", Role::Admin);
        store.insert_account(
            2,
            "tech",
            "tech123",
            "Helpdesk Technician",
            "IT",
            Role::Technician,
        );
        store.insert_account(3, "user", "user123", "Regular User", "Finance", Role::Employee);
        store
    }

    pub fn insert_account(
        &mut self,
        id: i64,
        username: &str,
        password: &str,
        full_name: &str,
        department: &str,
        role: Role,
    ) -> Account {
        let account = Account {
            id,
            username: username.to_string(),
            password: password.to_string(),
            full_name: full_name.to_string(),
            email: format!("{username}@localhost"),
            department: department.to_string(),
            role,
        };
        self.accounts.insert(account.username.clone(), account.clone());
        account
    }

    /// Check credentials.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<Account> {
        self.accounts
            .get(username)
            .filter(|account| account.password == password)
            .cloned()
    }

    /// Issue a session token for an account.
    pub fn open_session(&mut self, account: &Account) -> String {
        let token = format!("session-token-{}", Uuid::new_v4());
        self.sessions.insert(token.clone(), account.username.clone());
        token
    }

    /// Account owning a session token.
    pub fn session_owner(&self, token: &str) -> Option<Account> {
        self.sessions
            .get(token)
            .and_then(|username| self.accounts.get(username))
            .cloned()
    }

    /// Invalidate a session. Returns whether it existed.
    pub fn close_session(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
