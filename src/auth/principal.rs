// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated principal and session token.

use serde::{Deserialize, Serialize};

use super::roles::Role;

/// The authenticated user as known to the client.
///
/// Replaced wholesale on login or session resume, merged field-wise by a
/// profile update, cleared on logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Backend user ID
    pub id: i64,
    /// Login name
    pub username: String,
    /// Name shown in the shell header
    pub display_name: String,
    /// Help-desk role
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Whether the account is enabled
    pub is_active: bool,
}

impl Principal {
    /// Apply a partial profile update.
    ///
    /// `id` and `username` are identity and never change within a session.
    pub fn merge(&mut self, update: PrincipalUpdate) {
        if let Some(display_name) = update.display_name {
            self.display_name = display_name;
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(email) = update.email {
            self.email = Some(email);
        }
        if let Some(department) = update.department {
            self.department = Some(department);
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
    }
}

/// Partial principal, as produced by profile-editing screens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalUpdate {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Opaque proof of authentication.
///
/// Never empty. `Debug` is redacted so tokens do not end up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw token, rejecting empty or whitespace-only values.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

impl TryFrom<String> for SessionToken {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SessionToken::new(value).ok_or("session token must not be empty")
    }
}

impl From<SessionToken> for String {
    fn from(value: SessionToken) -> Self {
        value.0
    }
}
