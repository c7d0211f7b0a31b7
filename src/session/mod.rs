// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session
//!
//! - [`SessionStore`]: observable authentication state
//! - [`SessionController`]: login, bootstrap, logout and profile refresh on
//!   top of an [`AuthGateway`](crate::gateway::AuthGateway)
//! - [`RetryPolicy`]: bounded retry for boot-time session resumption

pub mod controller;
pub mod retry;
pub mod store;

pub use controller::{FieldErrors, LoginError, SessionController, SessionError};
pub use retry::RetryPolicy;
pub use store::{AuthEvent, AuthState, AuthStatus, SessionStore, Subscription};
