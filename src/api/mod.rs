// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Development Backend Stub
//!
//! An axum service speaking the help-desk `/api/auth` contract, seeded with
//! one account per role. Used by `helpdesk-session serve-stub` for local
//! work against the real client and by the HTTP gateway tests.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod auth;
pub mod health;

pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::current_user))
        .route("/verify", get(auth::verify))
        .route("/check", get(auth::check))
        .with_state(state);

    Router::new()
        .nest("/api/auth", auth_routes)
        .route("/health/live", get(health::liveness))
        .layer(TraceLayer::new_for_http())
}
