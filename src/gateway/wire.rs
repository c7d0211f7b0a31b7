// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Backend wire shapes and their normalization.
//!
//! The help-desk backend has returned the same information in several
//! shapes over time: a flat login body with the token next to the user
//! fields, a nested `{user, token}` body, `userId` vs `id`, `fullName` vs
//! `displayName`. Every variant is resolved here, on receipt, into the one
//! internal [`Principal`] shape.

use serde::{Deserialize, Serialize};

use super::LoginSuccess;
use crate::auth::{AuthError, Principal, Role, SessionToken};

/// Body of `POST /api/auth/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// User fields as the backend sends them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    #[serde(default, alias = "userId")]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, alias = "fullName")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, alias = "active")]
    pub is_active: Option<bool>,
}

impl UserPayload {
    /// Normalize into a [`Principal`].
    ///
    /// `id` and `username` are mandatory; everything else has a default.
    pub fn into_principal(self) -> Result<Principal, AuthError> {
        let id = self
            .id
            .ok_or_else(|| AuthError::unknown("user payload is missing its id"))?;
        let username = self
            .username
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AuthError::unknown("user payload is missing its username"))?;
        let display_name = self
            .display_name
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| username.clone());

        Ok(Principal {
            id,
            username,
            display_name,
            role: Role::from_wire(self.role.as_deref()),
            email: self.email.filter(|e| !e.is_empty()),
            department: self.department.filter(|d| !d.is_empty()),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

/// Login response: nested or flat.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LoginBody {
    Nested {
        user: UserPayload,
        #[serde(default, alias = "sessionToken")]
        token: Option<String>,
    },
    Flat {
        #[serde(default, alias = "sessionToken")]
        token: Option<String>,
        #[serde(flatten)]
        user: UserPayload,
    },
}

impl LoginBody {
    pub fn into_success(self) -> Result<LoginSuccess, AuthError> {
        let (user, token) = match self {
            LoginBody::Nested { user, token } | LoginBody::Flat { token, user } => (user, token),
        };
        let token = token
            .and_then(SessionToken::new)
            .ok_or_else(|| AuthError::unknown("login response did not include a session token"))?;
        Ok(LoginSuccess {
            principal: user.into_principal()?,
            token,
        })
    }
}

/// `GET /api/auth/me` and `GET /api/auth/verify` responses.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UserBody {
    Wrapped { user: UserPayload },
    Bare(UserPayload),
}

impl UserBody {
    pub fn into_principal(self) -> Result<Principal, AuthError> {
        match self {
            UserBody::Wrapped { user } | UserBody::Bare(user) => user.into_principal(),
        }
    }
}

/// Error body the backend attaches to non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default, alias = "error")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_login_body_is_normalized() {
        let body: LoginBody = serde_json::from_str(
            r#"{
                "userId": 1,
                "username": "admin",
                "fullName": "Admin User",
                "email": "admin@localhost",
                "department": "IT",
                "role": "ADMIN",
                "token": "tok-1",
                "message": "Login successful"
            }"#,
        )
        .unwrap();

        let success = body.into_success().unwrap();
        assert_eq!(success.token.as_str(), "tok-1");
        assert_eq!(success.principal.id, 1);
        assert_eq!(success.principal.display_name, "Admin User");
        assert_eq!(success.principal.role, Role::Admin);
        assert!(success.principal.is_active);
    }

    #[test]
    fn nested_login_body_is_normalized() {
        let body: LoginBody = serde_json::from_str(
            r#"{"user": {"id": 3, "username": "tech", "role": "TECHNICIAN"}, "token": "tok-3"}"#,
        )
        .unwrap();

        let success = body.into_success().unwrap();
        assert_eq!(success.principal.id, 3);
        assert_eq!(success.principal.display_name, "tech");
        assert_eq!(success.principal.role, Role::Technician);
    }

    #[test]
    fn login_body_without_token_is_rejected() {
        let body: LoginBody =
            serde_json::from_str(r#"{"userId": 1, "username": "admin", "token": null}"#).unwrap();
        assert!(matches!(
            body.into_success(),
            Err(AuthError::UnknownError { .. })
        ));
    }

    #[test]
    fn legacy_user_role_and_unknown_role_map_to_employee() {
        let legacy: UserBody =
            serde_json::from_str(r#"{"userId": 9, "username": "bob", "role": "USER"}"#).unwrap();
        assert_eq!(legacy.into_principal().unwrap().role, Role::Employee);

        let unknown: UserBody =
            serde_json::from_str(r#"{"userId": 9, "username": "bob", "role": "OWNER"}"#).unwrap();
        assert_eq!(unknown.into_principal().unwrap().role, Role::Employee);

        let missing: UserBody =
            serde_json::from_str(r#"{"userId": 9, "username": "bob"}"#).unwrap();
        assert_eq!(missing.into_principal().unwrap().role, Role::Employee);
    }

    #[test]
    fn wrapped_user_body_is_accepted() {
        let body: UserBody = serde_json::from_str(
            r#"{"user": {"id": 4, "username": "eve", "displayName": "Eve", "active": false}}"#,
        )
        .unwrap();
        let principal = body.into_principal().unwrap();
        assert_eq!(principal.id, 4);
        assert_eq!(principal.display_name, "Eve");
        assert!(!principal.is_active);
    }

    #[test]
    fn user_without_identity_is_rejected() {
        let body: UserBody = serde_json::from_str(r#"{"username": "ghost"}"#).unwrap();
        assert!(body.into_principal().is_err());

        let body: UserBody = serde_json::from_str(r#"{"userId": 5, "username": ""}"#).unwrap();
        assert!(body.into_principal().is_err());
    }
}
