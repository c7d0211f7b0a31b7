// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Routing
//!
//! Role-based access control over the help-desk views.
//!
//! - [`RouteAccessPolicy`]: static route → allowed roles mapping
//! - [`RouteGuard`]: wait / render / redirect / deny decision per route
//! - [`ViewComposer`]: navigation entries and dashboard variant per role

pub mod guard;
pub mod policy;
pub mod views;

pub use guard::{DenyReason, GuardDecision, RouteGuard};
pub use policy::{routes, PolicyError, RouteAccessPolicy, RouteId, RouteSpec};
pub use views::{DashboardVariant, NavEntry, ViewComposer};
