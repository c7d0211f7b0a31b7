// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP implementation of the Auth Gateway (help-desk `/api/auth/*`).

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

use super::wire::{ErrorBody, LoginBody, LoginRequest, UserBody};
use super::{AuthGateway, LoginSuccess, Operation};
use crate::auth::{AuthError, Principal, SessionToken};
use crate::storage::TokenStore;

const LOGIN_PATH: &str = "api/auth/login";
const LOGOUT_PATH: &str = "api/auth/logout";
const CURRENT_USER_PATH: &str = "api/auth/me";
const VERIFY_PATH: &str = "api/auth/verify";

/// Header used to correlate client and backend logs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Auth Gateway over reqwest.
#[derive(Clone)]
pub struct HttpAuthGateway {
    base_url: Url,
    http: Client,
    tokens: Arc<dyn TokenStore>,
}

impl HttpAuthGateway {
    /// Create a gateway for `base_url` with a bounded request timeout.
    pub fn new(
        base_url: Url,
        timeout: Duration,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, AuthError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::unknown(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: with_trailing_slash(base_url),
            http,
            tokens,
        })
    }

    /// Get the backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.base_url
            .join(path)
            .map_err(|e| AuthError::unknown(format!("invalid endpoint {path}: {e}")))
    }

    /// Send a request, mapping transport failures. The status is not checked.
    async fn transmit(
        &self,
        op: Operation,
        request: RequestBuilder,
    ) -> Result<(Uuid, Response), AuthError> {
        let request_id = Uuid::new_v4();
        let request = request.header(REQUEST_ID_HEADER, request_id.to_string());

        let response = request.send().await.map_err(|e| {
            warn!(%request_id, %op, error = %e, "Auth request failed in transport");
            map_transport_error(op, &e)
        })?;
        Ok((request_id, response))
    }

    /// Turn every non-2xx response into an [`AuthError`].
    async fn ensure_success(
        &self,
        op: Operation,
        request_id: Uuid,
        response: Response,
    ) -> Result<Response, AuthError> {
        let status = response.status();
        if status.is_success() {
            debug!(%request_id, %op, status = status.as_u16(), "Auth request succeeded");
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message);
        let mapped = classify_status(op, status, message.as_deref());
        match &mapped {
            AuthError::UnknownError { detail } => {
                error!(%request_id, %op, status = status.as_u16(), detail = %detail, "Unexpected auth response");
            }
            other => {
                info!(%request_id, %op, status = status.as_u16(), code = other.error_code(), "Auth request rejected");
            }
        }
        Err(mapped)
    }

    async fn send(&self, op: Operation, request: RequestBuilder) -> Result<Response, AuthError> {
        let (request_id, response) = self.transmit(op, request).await?;
        self.ensure_success(op, request_id, response).await
    }

    /// Fetch a user for `token`. `Ok(None)` means the endpoint does not exist.
    async fn fetch_user(
        &self,
        op: Operation,
        path: &str,
        token: &SessionToken,
    ) -> Result<Option<Principal>, AuthError> {
        let request = self
            .http
            .get(self.endpoint(path)?)
            .header(AUTHORIZATION, bearer(token)?);
        let (request_id, response) = self.transmit(op, request).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(%request_id, %op, "Endpoint not found");
            return Ok(None);
        }

        let response = self.ensure_success(op, request_id, response).await?;
        let body: UserBody = read_json(op, response).await?;
        body.into_principal().map(Some)
    }

    fn forget_stored_token(&self) {
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "Failed to remove stored session token");
        }
    }
}

impl AuthGateway for HttpAuthGateway {
    async fn login(&self, username: &str, password: &str) -> Result<LoginSuccess, AuthError> {
        let request = self
            .http
            .post(self.endpoint(LOGIN_PATH)?)
            .json(&LoginRequest { username, password });
        let response = self.send(Operation::Login, request).await?;

        let body: LoginBody = read_json(Operation::Login, response).await?;
        let success = body.into_success()?;

        if let Err(e) = self.tokens.save(&success.token) {
            // The session is still valid for this run; it just won't survive a restart.
            warn!(error = %e, "Failed to persist session token");
        }

        info!(
            user_id = success.principal.id,
            username = %success.principal.username,
            role = %success.principal.role,
            "Login succeeded"
        );
        Ok(success)
    }

    async fn logout(&self, token: Option<&SessionToken>) {
        if let Some(token) = token {
            let remote = async {
                let request = self
                    .http
                    .post(self.endpoint(LOGOUT_PATH)?)
                    .header(AUTHORIZATION, bearer(token)?);
                self.send(Operation::Logout, request).await?;
                Ok::<(), AuthError>(())
            };
            if let Err(e) = remote.await {
                warn!(code = e.error_code(), error = %e, "Remote logout failed; clearing local session anyway");
            }
        }

        self.forget_stored_token();
    }

    fn stored_token(&self) -> Option<SessionToken> {
        match self.tokens.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read stored session token");
                None
            }
        }
    }

    async fn resume_session(&self, token: &SessionToken) -> Result<Principal, AuthError> {
        let result = match self
            .fetch_user(Operation::VerifySession, VERIFY_PATH, token)
            .await
        {
            Ok(Some(principal)) => Ok(principal),
            // Session-style backends without a verify endpoint.
            Ok(None) => {
                debug!("Verify endpoint not available, falling back to current user");
                self.current_user(token).await
            }
            Err(e) => Err(e),
        };

        if matches!(result, Err(AuthError::NoValidSession)) {
            self.forget_stored_token();
        }
        result
    }

    async fn current_user(&self, token: &SessionToken) -> Result<Principal, AuthError> {
        self.fetch_user(Operation::CurrentUser, CURRENT_USER_PATH, token)
            .await?
            .ok_or_else(|| AuthError::unknown("current user endpoint not found"))
    }
}

/// Map a non-2xx status into the error taxonomy.
pub fn classify_status(op: Operation, status: StatusCode, message: Option<&str>) -> AuthError {
    match status.as_u16() {
        401 | 403 => match op {
            Operation::Login => AuthError::InvalidCredentials,
            _ => AuthError::NoValidSession,
        },
        code @ 500..=599 => AuthError::ServerError { status: code },
        code => {
            let suffix = message.map(|m| format!(": {m}")).unwrap_or_default();
            AuthError::unknown(format!("HTTP {code} from {op}{suffix}"))
        }
    }
}

/// Read the whole body, then decode it.
///
/// The request timeout also covers the body, so a stalled body is a
/// transport failure, not a decode failure.
async fn read_json<T>(op: Operation, response: Response) -> Result<T, AuthError>
where
    T: DeserializeOwned,
{
    let bytes = response.bytes().await.map_err(|e| {
        warn!(%op, error = %e, "Auth response body could not be read");
        map_transport_error(op, &e)
    })?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::unknown(format!("undecodable {op} response: {e}")))
}

/// Map a reqwest transport failure into the error taxonomy.
fn map_transport_error(op: Operation, e: &reqwest::Error) -> AuthError {
    if e.is_timeout() {
        AuthError::network(format!("{op} timed out"))
    } else if e.is_connect() || e.is_request() || e.is_body() {
        AuthError::network(format!("{op} could not reach the backend"))
    } else {
        AuthError::unknown(format!("{op} failed: {e}"))
    }
}

fn bearer(token: &SessionToken) -> Result<HeaderValue, AuthError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
        .map_err(|_| AuthError::NoValidSession)?;
    value.set_sensitive(true);
    Ok(value)
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::auth::Role;
    use crate::state::AppState;
    use crate::storage::MemoryTokenStore;

    async fn spawn_backend(state: AppState) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        Url::parse(&format!("http://{addr}")).unwrap()
    }

    fn gateway(base_url: Url, tokens: Arc<MemoryTokenStore>) -> HttpAuthGateway {
        HttpAuthGateway::new(base_url, Duration::from_secs(5), tokens).unwrap()
    }

    #[test]
    fn status_classification() {
        assert_eq!(
            classify_status(Operation::Login, StatusCode::UNAUTHORIZED, None),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            classify_status(Operation::VerifySession, StatusCode::UNAUTHORIZED, None),
            AuthError::NoValidSession
        );
        assert_eq!(
            classify_status(Operation::CurrentUser, StatusCode::FORBIDDEN, None),
            AuthError::NoValidSession
        );
        assert_eq!(
            classify_status(Operation::Login, StatusCode::BAD_GATEWAY, None),
            AuthError::ServerError { status: 502 }
        );
        assert_eq!(
            classify_status(Operation::Login, StatusCode::BAD_REQUEST, Some("bad body")),
            AuthError::unknown("HTTP 400 from login: bad body")
        );
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let url = with_trailing_slash(Url::parse("http://localhost:8080/helpdesk").unwrap());
        assert_eq!(url.as_str(), "http://localhost:8080/helpdesk/");
        assert_eq!(
            url.join(LOGIN_PATH).unwrap().as_str(),
            "http://localhost:8080/helpdesk/api/auth/login"
        );
    }

    #[tokio::test]
    async fn login_persists_token_and_normalizes_principal() {
        let base = spawn_backend(AppState::seeded()).await;
        let tokens = Arc::new(MemoryTokenStore::new());
        let gateway = gateway(base, tokens.clone());

        let success = gateway.login("admin", "admin123").await.unwrap();
        assert_eq!(success.principal.username, "admin");
        assert_eq!(success.principal.role, Role::Admin);
        assert_eq!(tokens.load().unwrap(), Some(success.token.clone()));
        assert_eq!(gateway.stored_token(), Some(success.token));
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let base = spawn_backend(AppState::seeded()).await;
        let tokens = Arc::new(MemoryTokenStore::new());
        let gateway = gateway(base, tokens.clone());

        let err = gateway.login("admin", "wrongpass").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        assert!(tokens.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn resume_returns_token_owner() {
        let base = spawn_backend(AppState::seeded()).await;
        let tokens = Arc::new(MemoryTokenStore::new());
        let gateway = gateway(base, tokens);

        let success = gateway.login("tech", "tech123").await.unwrap();
        let principal = gateway.resume_session(&success.token).await.unwrap();
        assert_eq!(principal, success.principal);

        let me = gateway.current_user(&success.token).await.unwrap();
        assert_eq!(me.id, success.principal.id);
    }

    #[tokio::test]
    async fn rejected_resume_forgets_stored_token() {
        let base = spawn_backend(AppState::seeded()).await;
        let stale = SessionToken::new("not-a-session").unwrap();
        let tokens = Arc::new(MemoryTokenStore::with_token(stale.clone()));
        let gateway = gateway(base, tokens.clone());

        let err = gateway.resume_session(&stale).await.unwrap_err();
        assert_eq!(err, AuthError::NoValidSession);
        assert!(tokens.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn logout_invalidates_remote_session_and_local_token() {
        let base = spawn_backend(AppState::seeded()).await;
        let tokens = Arc::new(MemoryTokenStore::new());
        let gateway = gateway(base, tokens.clone());

        let success = gateway.login("user", "user123").await.unwrap();
        gateway.logout(Some(&success.token)).await;

        assert!(tokens.load().unwrap().is_none());
        assert_eq!(
            gateway.resume_session(&success.token).await.unwrap_err(),
            AuthError::NoValidSession
        );
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_unavailable() {
        // Bind then drop to get a port with nothing listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let tokens = Arc::new(MemoryTokenStore::with_token(SessionToken::new("tok").unwrap()));
        let gateway = gateway(Url::parse(&format!("http://{addr}")).unwrap(), tokens.clone());

        let err = gateway.login("admin", "admin123").await.unwrap_err();
        assert!(matches!(err, AuthError::NetworkUnavailable { .. }));

        // Resume keeps the token around for a later retry
        let err = gateway
            .resume_session(&SessionToken::new("tok").unwrap())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(tokens.load().unwrap().is_some());

        // Logout still clears locally
        gateway.logout(Some(&SessionToken::new("tok").unwrap())).await;
        assert!(tokens.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn resume_falls_back_to_current_user_without_verify_endpoint() {
        use axum::routing::get;
        use axum::{Json, Router};

        let app = Router::new().route(
            "/api/auth/me",
            get(|| async {
                Json(serde_json::json!({
                    "userId": 12,
                    "username": "legacy",
                    "fullName": "Legacy User",
                    "role": "USER"
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let tokens = Arc::new(MemoryTokenStore::new());
        let gateway = gateway(Url::parse(&format!("http://{addr}")).unwrap(), tokens);
        let principal = gateway
            .resume_session(&SessionToken::new("session-based").unwrap())
            .await
            .unwrap();

        assert_eq!(principal.id, 12);
        assert_eq!(principal.role, Role::Employee);
    }

    /// Answers every request with headers and a truncated body, then stalls.
    fn spawn_stalling_backend() -> Url {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                std::thread::spawn(move || {
                    let mut buf = [0u8; 4096];
                    let _ = stream.read(&mut buf);
                    let _ = stream.write_all(
                        b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 200\r\n\r\n{\"userId\": 1,",
                    );
                    let _ = stream.flush();
                    std::thread::sleep(Duration::from_secs(5));
                });
            }
        });
        Url::parse(&format!("http://{addr}")).unwrap()
    }

    #[tokio::test]
    async fn stalled_body_is_network_unavailable() {
        let tokens = Arc::new(MemoryTokenStore::new());
        let gateway = HttpAuthGateway::new(
            spawn_stalling_backend(),
            Duration::from_millis(300),
            tokens.clone(),
        )
        .unwrap();

        let err = gateway.login("admin", "admin123").await.unwrap_err();
        assert!(matches!(err, AuthError::NetworkUnavailable { .. }), "{err:?}");
        assert!(err.is_retryable());
        assert!(tokens.load().unwrap().is_none());

        let err = gateway
            .resume_session(&SessionToken::new("tok").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NetworkUnavailable { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn malformed_body_is_unknown_error() {
        use axum::routing::post;
        use axum::Router;

        let app = Router::new().route("/api/auth/login", post(|| async { "not json" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let gateway = gateway(
            Url::parse(&format!("http://{addr}")).unwrap(),
            Arc::new(MemoryTokenStore::new()),
        );
        let err = gateway.login("admin", "admin123").await.unwrap_err();
        assert!(matches!(err, AuthError::UnknownError { .. }), "{err:?}");
        assert!(!err.is_retryable());
    }
}
