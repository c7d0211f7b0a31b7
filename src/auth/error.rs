// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use serde::Serialize;
use thiserror::Error;

/// Authentication error taxonomy.
///
/// This is the only error shape that leaves the Auth Gateway. Transport
/// errors are mapped into it at the boundary and never travel further.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthError {
    /// Wrong username or password
    #[error("Invalid username or password")]
    InvalidCredentials,
    /// Backend unreachable or the request timed out
    #[error("Backend unavailable: {detail}")]
    NetworkUnavailable { detail: String },
    /// Backend answered with a 5xx status
    #[error("Backend error (HTTP {status})")]
    ServerError { status: u16 },
    /// Stored session is missing, expired or rejected
    #[error("No valid session")]
    NoValidSession,
    /// Anything else
    #[error("Unexpected authentication failure: {detail}")]
    UnknownError { detail: String },
}

impl AuthError {
    pub fn network(detail: impl Into<String>) -> Self {
        AuthError::NetworkUnavailable {
            detail: detail.into(),
        }
    }

    pub fn unknown(detail: impl Into<String>) -> Self {
        AuthError::UnknownError {
            detail: detail.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::NetworkUnavailable { .. } => "network_unavailable",
            AuthError::ServerError { .. } => "server_error",
            AuthError::NoValidSession => "no_valid_session",
            AuthError::UnknownError { .. } => "unknown_error",
        }
    }

    /// Message suitable for rendering next to the login form.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Invalid username or password.",
            AuthError::NetworkUnavailable { .. } => {
                "Cannot connect to server. Please check your connection and retry."
            }
            AuthError::ServerError { .. } => "Server error. Please try again later.",
            AuthError::NoValidSession => "Your session has ended. Please sign in again.",
            AuthError::UnknownError { .. } => "Login failed. Please try again.",
        }
    }

    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AuthError::NetworkUnavailable { .. } | AuthError::ServerError { .. }
        )
    }

    /// Whether this error should be shown to the user at all.
    ///
    /// A missing session on resume just means "show the login page".
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, AuthError::NoValidSession)
    }
}
