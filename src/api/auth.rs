// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `/api/auth` endpoints of the development backend stub.

use axum::{
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, Role};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::Account;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Flat login body, as the help-desk backend sends it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub role: &'static str,
    pub token: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub role: &'static str,
}

impl From<Account> for UserInfoResponse {
    fn from(account: Account) -> Self {
        Self {
            user_id: account.id,
            role: backend_role_name(account.role),
            username: account.username,
            full_name: account.full_name,
            email: account.email,
            department: account.department,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// The backend still calls employees `USER`.
fn backend_role_name(role: Role) -> &'static str {
    match role {
        Role::Admin => "ADMIN",
        Role::Technician => "TECHNICIAN",
        Role::Employee => "USER",
    }
}

/// Extract the bearer token, if any.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Extractor for the account behind a valid bearer session.
///
/// ```rust,ignore
/// async fn handler(SessionUser(account): SessionUser) -> impl IntoResponse { ... }
/// ```
pub struct SessionUser(pub Account);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let store = state.store.read().await;
        store
            .session_owner(token)
            .map(SessionUser)
            .ok_or_else(|| AuthError::NoValidSession.into())
    }
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let mut store = state.store.write().await;
    let account = store
        .authenticate(request.username.trim(), &request.password)
        .ok_or_else(|| {
            tracing::info!(username = %request.username, "Stub login rejected");
            ApiError::from(AuthError::InvalidCredentials)
        })?;
    let token = store.open_session(&account);

    tracing::info!(username = %account.username, role = %account.role, "Stub login succeeded");

    Ok(Json(LoginResponse {
        user_id: account.id,
        role: backend_role_name(account.role),
        username: account.username,
        full_name: account.full_name,
        email: account.email,
        department: account.department,
        token,
        message: "Login successful".to_string(),
    }))
}

/// `POST /api/auth/logout`
///
/// Always succeeds, even without a session.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Json<MessageResponse> {
    if let Some(token) = bearer_token(&headers) {
        state.store.write().await.close_session(token);
    }
    Json(MessageResponse {
        message: "Logout successful".to_string(),
    })
}

/// `GET /api/auth/me`
pub async fn current_user(SessionUser(account): SessionUser) -> Json<UserInfoResponse> {
    Json(account.into())
}

/// `GET /api/auth/verify`
pub async fn verify(SessionUser(account): SessionUser) -> Json<UserInfoResponse> {
    Json(account.into())
}

/// `GET /api/auth/check`
pub async fn check(State(state): State<AppState>, headers: HeaderMap) -> Json<CheckResponse> {
    let owner = match bearer_token(&headers) {
        Some(token) => state.store.read().await.session_owner(token),
        None => None,
    };
    Json(CheckResponse {
        authenticated: owner.is_some(),
        username: owner.map(|account| account.username),
    })
}
