// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Composition root.
//!
//! Wires the session store, gateway, controller, guard and view composer
//! from a [`ClientConfig`]. Consumers receive these handles explicitly;
//! nothing is global.

use std::sync::Arc;

use thiserror::Error;

use crate::auth::AuthError;
use crate::config::{ClientConfig, ConfigError};
use crate::gateway::HttpAuthGateway;
use crate::routing::{PolicyError, RouteAccessPolicy, RouteGuard, ViewComposer};
use crate::session::{SessionController, SessionStore};
use crate::storage::{FileTokenStore, TokenStore};

#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error("Failed to create auth gateway: {0}")]
    Gateway(#[from] AuthError),
}

pub struct ClientContext {
    config: ClientConfig,
    policy: Arc<RouteAccessPolicy>,
    controller: SessionController<HttpAuthGateway>,
    guard: RouteGuard,
    views: ViewComposer,
}

impl ClientContext {
    /// Build from the process environment.
    pub fn from_env() -> Result<Self, ContextError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Build with the file-backed token store under `config.storage`.
    pub fn new(config: ClientConfig) -> Result<Self, ContextError> {
        let tokens = Arc::new(FileTokenStore::new(config.storage.clone()));
        Self::with_token_store(config, tokens)
    }

    pub fn with_token_store(
        config: ClientConfig,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, ContextError> {
        let policy = Arc::new(match &config.route_policy_path {
            Some(path) => RouteAccessPolicy::load(path)?,
            None => RouteAccessPolicy::builtin(),
        });

        let gateway = HttpAuthGateway::new(
            config.api_base_url.clone(),
            config.request_timeout,
            tokens,
        )?;
        let controller = SessionController::new(SessionStore::new(), gateway, config.retry);

        tracing::debug!(
            api = %config.api_base_url,
            routes = policy.len(),
            "Client context ready"
        );

        Ok(Self {
            guard: RouteGuard::new(policy.clone()),
            views: ViewComposer::new(policy.clone()),
            policy,
            controller,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn policy(&self) -> &RouteAccessPolicy {
        &self.policy
    }

    pub fn store(&self) -> &SessionStore {
        self.controller.store()
    }

    pub fn controller(&self) -> &SessionController<HttpAuthGateway> {
        &self.controller
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn views(&self) -> &ViewComposer {
        &self.views
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::routing::{routes, GuardDecision};
    use crate::session::{AuthStatus, RetryPolicy};
    use crate::state::AppState;
    use crate::storage::{MemoryTokenStore, StoragePaths};
    use std::time::Duration;

    async fn spawn_backend() -> url::Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, crate::api::router(AppState::seeded()))
                .await
                .unwrap();
        });
        format!("http://{addr}").parse().unwrap()
    }

    fn config(api_base_url: url::Url, dir: &std::path::Path) -> ClientConfig {
        ClientConfig {
            api_base_url,
            request_timeout: Duration::from_secs(5),
            storage: StoragePaths::new(dir),
            route_policy_path: None,
            retry: RetryPolicy::none(),
        }
    }

    #[tokio::test]
    async fn login_then_restart_resumes_session() {
        let base = spawn_backend().await;
        let dir = tempfile::tempdir().unwrap();

        let first = ClientContext::new(config(base.clone(), dir.path())).unwrap();
        assert_eq!(first.controller().bootstrap().await, AuthStatus::Unauthenticated);
        first.controller().submit_login("tech", "tech123").await.unwrap();

        let state = first.store().get_state();
        assert_eq!(first.guard().decide(&routes::EQUIPMENT, &state), GuardDecision::Render);
        assert!(matches!(
            first.guard().decide(&routes::USERS, &state),
            GuardDecision::Deny { .. }
        ));

        // A new process picks the session up from disk
        let second = ClientContext::new(config(base, dir.path())).unwrap();
        assert_eq!(second.controller().bootstrap().await, AuthStatus::Authenticated);
        let principal = second.store().get_state().principal.unwrap();
        assert_eq!(principal.role, Role::Technician);
        assert_eq!(principal.display_name, "Helpdesk Technician");
    }

    #[tokio::test]
    async fn logout_forgets_session_for_next_start() {
        let base = spawn_backend().await;
        let tokens: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
        let dir = tempfile::tempdir().unwrap();

        let context =
            ClientContext::with_token_store(config(base.clone(), dir.path()), tokens.clone()).unwrap();
        context.controller().submit_login("admin", "admin123").await.unwrap();
        assert!(tokens.load().unwrap().is_some());

        context.controller().submit_logout().await;
        assert!(tokens.load().unwrap().is_none());
        assert_eq!(
            context.guard().decide(&routes::DASHBOARD, &context.store().get_state()),
            GuardDecision::RedirectLogin
        );

        let restarted = ClientContext::with_token_store(config(base, dir.path()), tokens).unwrap();
        assert_eq!(restarted.controller().bootstrap().await, AuthStatus::Unauthenticated);
    }

    #[test]
    fn missing_policy_file_fails_construction() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config("http://localhost:1".parse().unwrap(), dir.path());
        config.route_policy_path = Some(dir.path().join("missing.json"));

        assert!(matches!(
            ClientContext::new(config),
            Err(ContextError::Policy(PolicyError::Io { .. }))
        ));
    }
}
