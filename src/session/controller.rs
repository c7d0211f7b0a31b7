// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session Controller.
//!
//! Orchestrates the [`AuthGateway`] and publishes every outcome through the
//! [`SessionStore`]. Each login and resume is tagged with a generation; a
//! logout or a newer login bumps the generation, and results carrying an
//! older tag are dropped instead of being applied.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

use serde::Serialize;
use thiserror::Error;

use super::retry::RetryPolicy;
use super::store::{AuthEvent, AuthStatus, SessionStore};
use crate::auth::{AuthError, Principal, PrincipalUpdate, SessionToken};
use crate::gateway::{AuthGateway, LoginSuccess};

pub const USERNAME_REQUIRED: &str = "Username is required";
pub const PASSWORD_REQUIRED: &str = "Password is required";

/// Field-level validation state of the login form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    pub username: Option<&'static str>,
    pub password: Option<&'static str>,
}

impl FieldErrors {
    /// Validate trimmed credentials.
    pub fn validate(username: &str, password: &str) -> Self {
        Self {
            username: username.trim().is_empty().then_some(USERNAME_REQUIRED),
            password: password.trim().is_empty().then_some(PASSWORD_REQUIRED),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none()
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = [self.username, self.password].into_iter().flatten().collect();
        f.write_str(&messages.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("Invalid login form: {0}")]
    Validation(FieldErrors),
    #[error("A login is already in progress")]
    AlreadyInFlight,
    #[error("Login result discarded: the session changed while it was pending")]
    Superseded,
    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("No authenticated session")]
    NotAuthenticated,
}

/// Clears the single-flight flag when the login finishes or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SessionController<G> {
    store: SessionStore,
    gateway: G,
    retry: RetryPolicy,
    generation: AtomicU64,
    login_in_flight: AtomicBool,
    bootstrapped: AtomicBool,
    field_errors: RwLock<FieldErrors>,
}

impl<G: AuthGateway> SessionController<G> {
    pub fn new(store: SessionStore, gateway: G, retry: RetryPolicy) -> Self {
        Self {
            store,
            gateway,
            retry,
            generation: AtomicU64::new(0),
            login_in_flight: AtomicBool::new(false),
            bootstrapped: AtomicBool::new(false),
            field_errors: RwLock::new(FieldErrors::default()),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Current field-level validation state.
    pub fn field_errors(&self) -> FieldErrors {
        *self.field_errors.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Validate and submit the login form.
    ///
    /// Empty fields fail locally without touching the network or the
    /// session state. While a login is pending, further submissions return
    /// [`LoginError::AlreadyInFlight`] and have no effect.
    pub async fn submit_login(&self, username: &str, password: &str) -> Result<Principal, LoginError> {
        let username = username.trim();
        let errors = FieldErrors::validate(username, password);
        self.set_field_errors(errors);
        if !errors.is_empty() {
            tracing::debug!(%errors, "Login form rejected");
            return Err(LoginError::Validation(errors));
        }

        let _flight = InFlight::acquire(&self.login_in_flight).ok_or_else(|| {
            tracing::debug!("Ignoring login submission while another is pending");
            LoginError::AlreadyInFlight
        })?;

        let generation = self.advance_generation();
        self.store.dispatch(AuthEvent::LoginStarted);

        match self.gateway.login(username, password).await {
            Ok(LoginSuccess { principal, token }) => {
                let event = AuthEvent::LoginSucceeded {
                    principal: principal.clone(),
                    token: token.clone(),
                };
                if self.apply_if_current(generation, event) {
                    tracing::info!(username = %principal.username, role = %principal.role, "Logged in");
                    Ok(principal)
                } else {
                    // The session this login created was abandoned; drop it.
                    tracing::info!(username = %principal.username, "Discarding superseded login");
                    self.gateway.logout(Some(&token)).await;
                    Err(LoginError::Superseded)
                }
            }
            Err(error) => {
                if self.apply_if_current(generation, AuthEvent::LoginFailed(error.clone())) {
                    tracing::info!(code = error.error_code(), "Login failed");
                    Err(LoginError::Auth(error))
                } else {
                    Err(LoginError::Superseded)
                }
            }
        }
    }

    /// Resolve the boot-time session from the stored token.
    ///
    /// Runs once per controller; later calls return the current status
    /// without side effects.
    pub async fn bootstrap(&self) -> AuthStatus {
        if self.bootstrapped.swap(true, Ordering::AcqRel) {
            return self.store.get_state().status;
        }

        let generation = self.advance_generation();
        let Some(token) = self.gateway.stored_token() else {
            tracing::debug!("No stored session to resume");
            self.apply_if_current(generation, AuthEvent::ResumeFailed(AuthError::NoValidSession));
            return self.store.get_state().status;
        };

        match self.resume_with_retry(&token, generation).await {
            Ok(principal) => {
                let username = principal.username.clone();
                if self.apply_if_current(generation, AuthEvent::SessionResumed { principal, token }) {
                    tracing::info!(%username, "Session resumed");
                }
            }
            Err(error) => {
                if self.apply_if_current(generation, AuthEvent::ResumeFailed(error.clone())) {
                    tracing::info!(code = error.error_code(), "Session not resumed");
                }
            }
        }

        self.store.get_state().status
    }

    /// End the session. Always leaves the store `Unauthenticated`.
    pub async fn submit_logout(&self) {
        self.advance_generation();
        // Before bootstrap settles the token is only on disk.
        let token = self
            .store
            .get_state()
            .token
            .or_else(|| self.gateway.stored_token());
        self.gateway.logout(token.as_ref()).await;
        self.set_field_errors(FieldErrors::default());
        self.store.dispatch(AuthEvent::LoggedOut);
        tracing::info!("Logged out");
    }

    /// Merge profile changes into the authenticated principal.
    pub fn update_principal(&self, update: PrincipalUpdate) -> Result<Principal, SessionError> {
        self.store
            .dispatch_if(
                || self.store.get_state().is_authenticated(),
                AuthEvent::PrincipalUpdated(update),
            )
            .and_then(|state| state.principal)
            .ok_or(SessionError::NotAuthenticated)
    }

    /// Dismiss the visible error, as when leaving the login view.
    pub fn clear_error(&self) {
        self.set_field_errors(FieldErrors::default());
        self.store.dispatch(AuthEvent::ErrorCleared);
    }

    async fn resume_with_retry(
        &self,
        token: &SessionToken,
        generation: u64,
    ) -> Result<Principal, AuthError> {
        let mut attempt = 1;
        loop {
            match self.gateway.resume_session(token).await {
                Ok(principal) => return Ok(principal),
                Err(error)
                    if error.is_retryable()
                        && self.retry.should_retry(attempt)
                        && self.is_current(generation) =>
                {
                    let delay = self.retry.backoff_for(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Session resume failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    if !self.is_current(generation) {
                        return Err(error);
                    }
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    fn advance_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    fn apply_if_current(&self, generation: u64, event: AuthEvent) -> bool {
        self.store
            .dispatch_if(|| self.is_current(generation), event)
            .is_some()
    }

    fn set_field_errors(&self, errors: FieldErrors) {
        *self.field_errors.write().unwrap_or_else(|e| e.into_inner()) = errors;
    }
}

impl<G> std::fmt::Debug for SessionController<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("store", &self.store)
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
