// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! File-backed token store.
//!
//! The native counterpart of a browser's single `authToken` localStorage
//! key. Writes go to a temp file first and are renamed into place, so a
//! crash mid-write never leaves a half-written token behind.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{StoragePaths, StorageResult, TokenStore};
use crate::auth::SessionToken;

/// On-disk record.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    token: SessionToken,
    saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FileTokenStore {
    paths: StoragePaths,
}

impl FileTokenStore {
    pub fn new(paths: StoragePaths) -> Self {
        Self { paths }
    }

    /// Get the storage paths.
    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> StorageResult<Option<SessionToken>> {
        let path = self.paths.session_file();
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_reader::<_, StoredSession>(BufReader::new(file)) {
            Ok(stored) => Ok(Some(stored.token)),
            Err(e) if e.is_data() || e.is_syntax() || e.is_eof() => {
                // Corrupt or empty-token file: nothing resumable.
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable session file");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &SessionToken) -> StorageResult<()> {
        let path = self.paths.session_file();
        fs::create_dir_all(self.paths.root())?;

        let record = StoredSession {
            token: token.clone(),
            saved_at: Utc::now(),
        };

        let temp_path = path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &record)?;
            writer.flush()?;
        }

        fs::rename(&temp_path, &path)?;
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        match fs::remove_file(self.paths.session_file()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
