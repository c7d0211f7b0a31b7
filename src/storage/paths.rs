// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path utilities for the client data directory.

use std::path::{Path, PathBuf};

/// Directory name used under `$HOME` when no data directory is configured.
pub const DEFAULT_DIR_NAME: &str = ".helpdesk";

/// File holding the durable session token.
pub const SESSION_FILE: &str = "session.json";

/// Storage path utilities.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);
        Self::new(home.join(DEFAULT_DIR_NAME))
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the session token file.
    pub fn session_file(&self) -> PathBuf {
        self.root.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_file_lives_under_root() {
        let paths = StoragePaths::new("/tmp/helpdesk-test");
        assert_eq!(
            paths.session_file(),
            PathBuf::from("/tmp/helpdesk-test/session.json")
        );
    }

    #[test]
    fn default_root_ends_with_dir_name() {
        let paths = StoragePaths::default();
        assert!(paths.root().ends_with(DEFAULT_DIR_NAME));
    }
}
