// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Auth Gateway
//!
//! The only component allowed to talk to the backend's authentication
//! endpoints.
//!
//! ## Contract
//!
//! - `login` fails with `InvalidCredentials`, `NetworkUnavailable`,
//!   `ServerError` or `UnknownError`, never with a transport error
//! - `logout` never fails: remote is best effort, local token removal is
//!   unconditional
//! - `resume_session` fails with `NoValidSession` when the backend rejects
//!   the stored session
//! - Gateways are stateless and reentrant; serializing calls is the
//!   controller's job

pub mod http;
pub mod wire;

use std::future::Future;

use crate::auth::{AuthError, Principal, SessionToken};

pub use http::HttpAuthGateway;

/// Successful login: the principal and the session token issued for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub principal: Principal,
    pub token: SessionToken,
}

/// Backend operations the gateway performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    Logout,
    CurrentUser,
    VerifySession,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Login => write!(f, "login"),
            Operation::Logout => write!(f, "logout"),
            Operation::CurrentUser => write!(f, "current_user"),
            Operation::VerifySession => write!(f, "verify_session"),
        }
    }
}

/// Authentication boundary.
pub trait AuthGateway: Send + Sync {
    /// Exchange credentials for a session. Persists the token on success.
    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<LoginSuccess, AuthError>> + Send;

    /// End the session. Never fails; always removes the stored token.
    fn logout(&self, token: Option<&SessionToken>) -> impl Future<Output = ()> + Send;

    /// Token left behind by a previous run, if any.
    fn stored_token(&self) -> Option<SessionToken>;

    /// Validate a stored token and fetch its owner.
    fn resume_session(
        &self,
        token: &SessionToken,
    ) -> impl Future<Output = Result<Principal, AuthError>> + Send;

    /// "Who am I" for an existing session.
    fn current_user(
        &self,
        token: &SessionToken,
    ) -> impl Future<Output = Result<Principal, AuthError>> + Send;
}
