// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Durable Session Storage
//!
//! Exactly one value survives restarts: the session token. Its absence means
//! there is no session to resume.
//!
//! ## Storage Layout
//!
//! ```text
//! $HELPDESK_DATA_DIR/
//!   session.json    # {"token": "...", "saved_at": "..."}
//! ```
//!
//! Only the Auth Gateway writes here. The Session Controller reads the token
//! once, at bootstrap, through the gateway.

pub mod file;
pub mod memory;
pub mod paths;

use thiserror::Error;

use crate::auth::SessionToken;

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;
pub use paths::StoragePaths;

/// Error type for token storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Single-key durable token storage.
pub trait TokenStore: Send + Sync {
    /// Read the stored token, if any.
    fn load(&self) -> StorageResult<Option<SessionToken>>;

    /// Replace the stored token.
    fn save(&self, token: &SessionToken) -> StorageResult<()>;

    /// Remove the stored token. Removing a missing token is not an error.
    fn clear(&self) -> StorageResult<()>;
}
