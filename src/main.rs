// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr, process::ExitCode};

use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use helpdesk_session::api::router;
use helpdesk_session::auth::{AuthError, Principal};
use helpdesk_session::config::{
    DEFAULT_HOST, DEFAULT_PORT, HOST_ENV, LOG_FORMAT_ENV, PORT_ENV,
};
use helpdesk_session::context::{ClientContext, ContextError};
use helpdesk_session::routing::{DashboardVariant, NavEntry};
use helpdesk_session::session::{AuthStatus, LoginError};
use helpdesk_session::state::AppState;

const USAGE: &str = "\
Usage: helpdesk-session <command>

Commands:
  status                      Resume the stored session and print it
  login <username> <password> Log in and store the session
  logout                      End the stored session
  serve-stub                  Run the development backend (HOST, PORT)";

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Login(#[from] LoginError),
    #[error("Invalid bind address {0}")]
    BindAddress(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// What `status` and `login` print.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionReport<'a> {
    status: AuthStatus,
    principal: Option<&'a Principal>,
    error: Option<&'a AuthError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dashboard: Option<DashboardVariant>,
    navigation: Vec<NavEntry>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => {
            let _ = builder.json().with_target(false).try_init();
        }
        _ => {
            let _ = builder.try_init();
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let result = match args.as_slice() {
        ["status"] => status().await,
        ["login", username, password] => login(username, password).await,
        ["logout"] => logout().await,
        ["serve-stub"] => serve_stub().await,
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_session(context: &ClientContext) -> Result<(), CliError> {
    let state = context.store().get_state();
    let role = state
        .principal
        .as_ref()
        .filter(|_| state.is_authenticated())
        .map(|p| p.role);

    let report = SessionReport {
        status: state.status,
        principal: state.principal.as_ref(),
        error: state.error.as_ref(),
        error_message: state.error.as_ref().map(AuthError::user_message),
        dashboard: role.map(|r| context.views().dashboard_variant_for(r)),
        navigation: role
            .map(|r| context.views().navigation_for(r))
            .unwrap_or_default(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn status() -> Result<(), CliError> {
    let context = ClientContext::from_env()?;
    context.controller().bootstrap().await;
    print_session(&context)
}

async fn login(username: &str, password: &str) -> Result<(), CliError> {
    let context = ClientContext::from_env()?;
    context.controller().submit_login(username, password).await?;
    print_session(&context)
}

async fn logout() -> Result<(), CliError> {
    let context = ClientContext::from_env()?;
    context.controller().submit_logout().await;
    println!("Logged out");
    Ok(())
}

async fn serve_stub() -> Result<(), CliError> {
    let host = env::var(HOST_ENV).unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port: u16 = env::var(PORT_ENV)
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|_| CliError::BindAddress(format!("{host}:{port}")))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Help-desk dev backend listening (accounts: admin, tech, user)");

    axum::serve(listener, router(AppState::seeded()))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;
    Ok(())
}
