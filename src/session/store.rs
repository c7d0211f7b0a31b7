// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session Store: the single source of truth for authentication state.
//!
//! Every mutation goes through [`SessionStore::dispatch`], which applies an
//! [`AuthEvent`] and then notifies every subscriber with the resulting state.
//! Dispatches are serialized, so listeners observe transitions one by one in
//! the order they were applied. Nothing is coalesced.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use serde::Serialize;

use crate::auth::{AuthError, Principal, PrincipalUpdate, SessionToken};

/// Coarse authentication status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    /// Not yet decided and nothing in progress
    Idle,
    /// Resolution pending (boot-time resume or login in flight)
    Checking,
    Authenticated,
    Unauthenticated,
}

impl AuthStatus {
    /// Whether the status is still waiting on an outcome.
    pub fn is_pending(&self) -> bool {
        matches!(self, AuthStatus::Idle | AuthStatus::Checking)
    }
}

/// Full authentication state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthState {
    pub status: AuthStatus,
    pub principal: Option<Principal>,
    #[serde(skip)]
    pub token: Option<SessionToken>,
    /// Only ever set alongside `Unauthenticated`
    pub error: Option<AuthError>,
}

impl AuthState {
    /// State at application start.
    pub fn checking() -> Self {
        Self {
            status: AuthStatus::Checking,
            principal: None,
            token: None,
            error: None,
        }
    }

    pub fn unauthenticated(error: Option<AuthError>) -> Self {
        Self {
            status: AuthStatus::Unauthenticated,
            principal: None,
            token: None,
            error,
        }
    }

    pub fn authenticated(principal: Principal, token: SessionToken) -> Self {
        Self {
            status: AuthStatus::Authenticated,
            principal: Some(principal),
            token: Some(token),
            error: None,
        }
    }

    /// True iff the status is `Authenticated` and both halves of the session
    /// are present.
    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
            && self.principal.is_some()
            && self.token.is_some()
    }

    /// Apply one transition. Total over every (state, event) pair.
    pub fn apply(&self, event: AuthEvent) -> AuthState {
        match event {
            AuthEvent::LoginStarted => AuthState::checking(),
            AuthEvent::LoginSucceeded { principal, token }
            | AuthEvent::SessionResumed { principal, token } => {
                AuthState::authenticated(principal, token)
            }
            AuthEvent::LoginFailed(error) => AuthState::unauthenticated(Some(error)),
            AuthEvent::LoggedOut => AuthState::unauthenticated(None),
            AuthEvent::ResumeFailed(error) => {
                let visible = Some(error).filter(AuthError::is_user_visible);
                AuthState::unauthenticated(visible)
            }
            AuthEvent::ErrorCleared => AuthState {
                error: None,
                ..self.clone()
            },
            AuthEvent::PrincipalUpdated(update) => {
                let mut next = self.clone();
                if next.is_authenticated() {
                    if let Some(principal) = next.principal.as_mut() {
                        principal.merge(update);
                    }
                }
                next
            }
        }
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::checking()
    }
}

/// State transitions understood by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    LoginStarted,
    LoginSucceeded {
        principal: Principal,
        token: SessionToken,
    },
    LoginFailed(AuthError),
    LoggedOut,
    SessionResumed {
        principal: Principal,
        token: SessionToken,
    },
    ResumeFailed(AuthError),
    ErrorCleared,
    PrincipalUpdated(PrincipalUpdate),
}

impl AuthEvent {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            AuthEvent::LoginStarted => "login_started",
            AuthEvent::LoginSucceeded { .. } => "login_succeeded",
            AuthEvent::LoginFailed(_) => "login_failed",
            AuthEvent::LoggedOut => "logged_out",
            AuthEvent::SessionResumed { .. } => "session_resumed",
            AuthEvent::ResumeFailed(_) => "resume_failed",
            AuthEvent::ErrorCleared => "error_cleared",
            AuthEvent::PrincipalUpdated(_) => "principal_updated",
        }
    }
}

type Listener = Arc<dyn Fn(&AuthState) + Send + Sync>;

struct StoreInner {
    state: RwLock<AuthState>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    /// Serializes apply + notify so listeners never see transitions out of order.
    dispatch_lock: Mutex<()>,
    next_listener_id: AtomicU64,
}

/// Injectable, cloneable handle to the session state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

impl SessionStore {
    /// New store in the application-start state (`Checking`).
    pub fn new() -> Self {
        Self::with_state(AuthState::checking())
    }

    pub fn with_state(state: AuthState) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(state),
                listeners: Mutex::new(Vec::new()),
                dispatch_lock: Mutex::new(()),
                next_listener_id: AtomicU64::new(1),
            }),
        }
    }

    /// Snapshot of the current state.
    pub fn get_state(&self) -> AuthState {
        self.inner
            .state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Register a listener, invoked after every transition.
    ///
    /// Listeners run inside the dispatch critical section and must not
    /// dispatch themselves.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(listener)));
        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    /// Apply an event and notify subscribers. Returns the new state.
    pub fn dispatch(&self, event: AuthEvent) -> AuthState {
        self.dispatch_if(|| true, event)
            .unwrap_or_else(|| self.get_state())
    }

    /// Apply an event only if `guard` holds at the moment of application.
    ///
    /// The guard is evaluated inside the dispatch critical section, so no
    /// other transition can slip in between the check and the update.
    /// Returns `None` when the guard rejected the event.
    pub fn dispatch_if<G>(&self, guard: G, event: AuthEvent) -> Option<AuthState>
    where
        G: FnOnce() -> bool,
    {
        let _serial = self
            .inner
            .dispatch_lock
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        if !guard() {
            tracing::debug!(event = event.name(), "Discarding superseded transition");
            return None;
        }

        let event_name = event.name();
        let next = {
            let mut state = self.inner.state.write().unwrap_or_else(|e| e.into_inner());
            let next = state.apply(event);
            *state = next.clone();
            next
        };

        tracing::debug!(event = event_name, status = ?next.status, "Auth state transition");

        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&next);
        }

        Some(next)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.get_state())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Handle returned by [`SessionStore::subscribe`].
#[must_use = "dropping a Subscription keeps the listener registered; call unsubscribe()"]
pub struct Subscription {
    id: u64,
    store: Weak<StoreInner>,
}

impl Subscription {
    /// Remove the listener. No-op if the store is gone.
    pub fn unsubscribe(self) {
        if let Some(inner) = self.store.upgrade() {
            inner
                .listeners
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn principal(role: Role) -> Principal {
        Principal {
            id: 1,
            username: "admin".to_string(),
            display_name: "Admin User".to_string(),
            role,
            email: None,
            department: Some("IT".to_string()),
            is_active: true,
        }
    }

    fn token(raw: &str) -> SessionToken {
        SessionToken::new(raw).unwrap()
    }

    fn recorder(store: &SessionStore) -> (Arc<Mutex<Vec<AuthStatus>>>, Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let sub = store.subscribe(move |state| sink.lock().unwrap().push(state.status));
        (seen, sub)
    }

    #[test]
    fn only_idle_and_checking_are_pending() {
        assert!(AuthStatus::Idle.is_pending());
        assert!(AuthStatus::Checking.is_pending());
        assert!(!AuthStatus::Authenticated.is_pending());
        assert!(!AuthStatus::Unauthenticated.is_pending());
    }

    #[test]
    fn starts_checking() {
        let store = SessionStore::new();
        let state = store.get_state();
        assert_eq!(state.status, AuthStatus::Checking);
        assert!(!state.is_authenticated());
    }

    #[test]
    fn login_success_sets_principal_and_token_together() {
        let store = SessionStore::new();
        store.dispatch(AuthEvent::LoginStarted);
        let state = store.dispatch(AuthEvent::LoginSucceeded {
            principal: principal(Role::Admin),
            token: token("tok-1"),
        });

        assert!(state.is_authenticated());
        assert_eq!(state.principal.unwrap().id, 1);
        assert_eq!(state.token.unwrap().as_str(), "tok-1");
        assert!(state.error.is_none());
    }

    #[test]
    fn login_failure_sets_error_only_when_unauthenticated() {
        let store = SessionStore::new();
        let state = store.dispatch(AuthEvent::LoginFailed(AuthError::InvalidCredentials));
        assert_eq!(state.status, AuthStatus::Unauthenticated);
        assert_eq!(state.error, Some(AuthError::InvalidCredentials));

        // Next attempt clears it
        let state = store.dispatch(AuthEvent::LoginStarted);
        assert_eq!(state.status, AuthStatus::Checking);
        assert!(state.error.is_none());
    }

    #[test]
    fn resume_failure_without_session_is_silent() {
        let store = SessionStore::new();
        let state = store.dispatch(AuthEvent::ResumeFailed(AuthError::NoValidSession));
        assert_eq!(state.status, AuthStatus::Unauthenticated);
        assert!(state.error.is_none());

        let state = store.dispatch(AuthEvent::ResumeFailed(AuthError::network("timed out")));
        assert_eq!(state.error, Some(AuthError::network("timed out")));
    }

    #[test]
    fn logout_clears_everything() {
        let store = SessionStore::with_state(AuthState::authenticated(
            principal(Role::Technician),
            token("tok"),
        ));
        let state = store.dispatch(AuthEvent::LoggedOut);
        assert_eq!(state, AuthState::unauthenticated(None));
    }

    #[test]
    fn clear_error_keeps_status() {
        let store = SessionStore::with_state(AuthState::unauthenticated(Some(
            AuthError::ServerError { status: 500 },
        )));
        let state = store.dispatch(AuthEvent::ErrorCleared);
        assert_eq!(state.status, AuthStatus::Unauthenticated);
        assert!(state.error.is_none());
    }

    #[test]
    fn principal_update_merges_without_touching_session() {
        let store = SessionStore::with_state(AuthState::authenticated(
            principal(Role::Employee),
            token("tok"),
        ));
        let state = store.dispatch(AuthEvent::PrincipalUpdated(PrincipalUpdate {
            email: Some("new@example.org".to_string()),
            ..Default::default()
        }));

        assert_eq!(state.status, AuthStatus::Authenticated);
        assert_eq!(state.token.as_ref().unwrap().as_str(), "tok");
        assert_eq!(
            state.principal.unwrap().email.as_deref(),
            Some("new@example.org")
        );
    }

    #[test]
    fn principal_update_is_ignored_when_logged_out() {
        let store = SessionStore::with_state(AuthState::unauthenticated(None));
        let state = store.dispatch(AuthEvent::PrincipalUpdated(PrincipalUpdate::default()));
        assert_eq!(state, AuthState::unauthenticated(None));
    }

    #[test]
    fn listeners_see_every_transition_in_order() {
        let store = SessionStore::new();
        let (seen, _sub) = recorder(&store);

        store.dispatch(AuthEvent::LoginStarted);
        store.dispatch(AuthEvent::LoginSucceeded {
            principal: principal(Role::Admin),
            token: token("a"),
        });
        store.dispatch(AuthEvent::LoggedOut);
        store.dispatch(AuthEvent::LoggedOut);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                AuthStatus::Checking,
                AuthStatus::Authenticated,
                AuthStatus::Unauthenticated,
                AuthStatus::Unauthenticated,
            ]
        );
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let store = SessionStore::new();
        let (seen, sub) = recorder(&store);
        assert_eq!(store.listener_count(), 1);

        sub.unsubscribe();
        assert_eq!(store.listener_count(), 0);

        store.dispatch(AuthEvent::LoggedOut);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn listener_can_read_state() {
        let store = SessionStore::new();
        let reader = store.clone();
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let _sub = store.subscribe(move |_| {
            *sink.lock().unwrap() = Some(reader.get_state().status);
        });

        store.dispatch(AuthEvent::LoggedOut);
        assert_eq!(*seen.lock().unwrap(), Some(AuthStatus::Unauthenticated));
    }

    #[test]
    fn rejected_guard_leaves_state_and_listeners_alone() {
        let store = SessionStore::new();
        let (seen, _sub) = recorder(&store);

        let result = store.dispatch_if(
            || false,
            AuthEvent::SessionResumed {
                principal: principal(Role::Admin),
                token: token("stale"),
            },
        );

        assert!(result.is_none());
        assert_eq!(store.get_state().status, AuthStatus::Checking);
        assert!(seen.lock().unwrap().is_empty());
    }
}
