// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Model
//!
//! Identity types shared by every layer of the session core.
//!
//! ## Trust Model
//!
//! - The client never validates tokens itself; the backend is the authority
//! - A token is only meaningful together with the principal it was issued for
//! - Roles form a closed set; unknown values degrade to `Employee`

pub mod error;
pub mod principal;
pub mod roles;

pub use error::AuthError;
pub use principal::{Principal, PrincipalUpdate, SessionToken};
pub use roles::Role;
