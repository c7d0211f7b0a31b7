// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the client. Configuration is loaded from the environment at
//! startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HELPDESK_API_URL` | Base URL of the help-desk backend | `http://localhost:8080` |
//! | `HELPDESK_REQUEST_TIMEOUT_MS` | Per-request timeout for auth calls | `10000` |
//! | `HELPDESK_DATA_DIR` | Directory holding `session.json` | `$HOME/.helpdesk` |
//! | `HELPDESK_ROUTE_POLICY` | JSON route policy file | Built-in catalog |
//! | `HELPDESK_RESUME_MAX_ATTEMPTS` | Boot-time resume attempts | `2` |
//! | `HOST` | Dev backend bind address | `127.0.0.1` |
//! | `PORT` | Dev backend bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::session::RetryPolicy;
use crate::storage::StoragePaths;

/// Environment variable name for the backend base URL.
pub const API_URL_ENV: &str = "HELPDESK_API_URL";

/// Environment variable name for the auth request timeout, in milliseconds.
pub const REQUEST_TIMEOUT_ENV: &str = "HELPDESK_REQUEST_TIMEOUT_MS";

/// Environment variable name for the session data directory.
///
/// Holds the single durable session token (`session.json`).
pub const DATA_DIR_ENV: &str = "HELPDESK_DATA_DIR";

/// Environment variable name for the route policy file.
pub const ROUTE_POLICY_ENV: &str = "HELPDESK_ROUTE_POLICY";

/// Environment variable name for the resume attempt budget.
pub const RESUME_MAX_ATTEMPTS_ENV: &str = "HELPDESK_RESUME_MAX_ATTEMPTS";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not a valid URL: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

/// Client-side configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: Url,
    pub request_timeout: Duration,
    pub storage: StoragePaths,
    pub route_policy_path: Option<PathBuf>,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_base_url = get(API_URL_ENV)
            .as_deref()
            .unwrap_or(DEFAULT_API_URL)
            .parse::<Url>()
            .map_err(|source| ConfigError::InvalidUrl {
                name: API_URL_ENV,
                source,
            })?;

        let timeout_ms = match get(REQUEST_TIMEOUT_ENV) {
            Some(raw) => parse_positive(REQUEST_TIMEOUT_ENV, &raw)?,
            None => DEFAULT_REQUEST_TIMEOUT_MS,
        };

        let retry = match get(RESUME_MAX_ATTEMPTS_ENV) {
            Some(raw) => {
                let attempts = parse_positive(RESUME_MAX_ATTEMPTS_ENV, &raw)?;
                let attempts = u32::try_from(attempts).map_err(|_| ConfigError::InvalidNumber {
                    name: RESUME_MAX_ATTEMPTS_ENV,
                    value: raw.clone(),
                })?;
                RetryPolicy::default().with_max_attempts(attempts)
            }
            None => RetryPolicy::default(),
        };

        Ok(Self {
            api_base_url,
            request_timeout: Duration::from_millis(timeout_ms),
            storage: get(DATA_DIR_ENV)
                .map(StoragePaths::new)
                .unwrap_or_default(),
            route_policy_path: get(ROUTE_POLICY_ENV).map(PathBuf::from),
            retry,
        })
    }
}

fn parse_positive(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ConfigError::InvalidNumber {
            name,
            value: raw.to_string(),
        })
}
