// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route Guard.
//!
//! A pure function of the route, the auth state and the static policy. No
//! I/O, no hidden state: the same inputs always give the same decision.

use std::sync::Arc;

use serde::Serialize;

use super::policy::{RouteAccessPolicy, RouteId};
use crate::auth::Role;
use crate::session::AuthState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Session still resolving; show a loading indicator
    Wait,
    Render,
    RedirectLogin,
    Deny { reason: DenyReason },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DenyReason {
    UnknownRoute,
    RoleNotPermitted { required: Vec<Role>, actual: Role },
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenyReason::UnknownRoute => write!(f, "This page does not exist."),
            DenyReason::RoleNotPermitted { required, actual } => {
                let required: Vec<&str> = required.iter().map(Role::as_str).collect();
                write!(
                    f,
                    "You don't have permission to access this page. Required roles: {} (Your role: {})",
                    required.join(", "),
                    actual
                )
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    policy: Arc<RouteAccessPolicy>,
}

impl RouteGuard {
    pub fn new(policy: Arc<RouteAccessPolicy>) -> Self {
        Self { policy }
    }

    pub fn decide(&self, route: &RouteId, state: &AuthState) -> GuardDecision {
        if state.status.is_pending() {
            return GuardDecision::Wait;
        }

        let Some(principal) = state.principal.as_ref().filter(|_| state.is_authenticated()) else {
            return GuardDecision::RedirectLogin;
        };

        let Some(spec) = self.policy.get(route) else {
            return GuardDecision::Deny {
                reason: DenyReason::UnknownRoute,
            };
        };

        if spec.permits(principal.role) {
            GuardDecision::Render
        } else {
            GuardDecision::Deny {
                reason: DenyReason::RoleNotPermitted {
                    required: spec.allowed_roles.iter().copied().collect(),
                    actual: principal.role,
                },
            }
        }
    }
}
