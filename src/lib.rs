// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Helpdesk Session - Client Session Core for the Help-Desk Application
//!
//! This crate owns the authentication lifecycle of the help-desk client and
//! the role-based gating of its views.
//!
//! ## Modules
//!
//! - `session` - Session Store and Session Controller
//! - `gateway` - Auth Gateway (HTTP client for `/api/auth/*`)
//! - `routing` - Route access policy, Route Guard, view composition
//! - `storage` - Durable session token storage
//! - `context` - Composition root
//! - `api` - Development backend stub (Axum)

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod gateway;
pub mod routing;
pub mod session;
pub mod state;
pub mod storage;
pub mod store;
