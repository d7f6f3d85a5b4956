// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Durable session snapshot.
//!
//! One JSON document under the data directory keeps the active session
//! across process restarts. Writes go through a temp file and an atomic
//! rename, so the snapshot on disk is always either the old session or the
//! new one, never a torn write.
//!
//! The key names (`access_token`, `refresh_token`, `user`, `issued_at`) are
//! a contract: operators inspect and wipe a deployment's session state by
//! file.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::models::{Principal, Session};

/// File name of the session snapshot inside the data directory.
pub const SESSION_FILE: &str = "session.json";

/// Error type for durable session storage.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("session storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("session storage serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk shape of the snapshot.
#[derive(Debug, Serialize, Deserialize)]
struct SessionSnapshot {
    access_token: String,
    refresh_token: String,
    user: Principal,
    issued_at: DateTime<Utc>,
}

impl From<&Session> for SessionSnapshot {
    fn from(session: &Session) -> Self {
        Self {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            user: session.principal.clone(),
            issued_at: session.issued_at,
        }
    }
}

impl From<SessionSnapshot> for Session {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            access_token: snapshot.access_token,
            refresh_token: snapshot.refresh_token,
            principal: snapshot.user,
            issued_at: snapshot.issued_at,
        }
    }
}

/// Reads and writes the session snapshot.
#[derive(Debug, Clone)]
pub struct SessionVault {
    dir: PathBuf,
}

impl SessionVault {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Full path of the snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    /// Persist the session (atomic write via rename). Creates the data
    /// directory on first use.
    pub fn store(&self, session: &Session) -> Result<(), VaultError> {
        fs::create_dir_all(&self.dir)?;

        let path = self.snapshot_path();
        let temp_path = path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &SessionSnapshot::from(session))?;
            writer.flush()?;
        }

        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Load the persisted session, if any.
    ///
    /// A missing snapshot means anonymous. An unreadable or corrupt one is
    /// logged and treated the same, never a crash.
    pub fn load(&self) -> Option<Session> {
        let path = self.snapshot_path();
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "session snapshot unreadable; starting anonymous");
                return None;
            }
        };
        match serde_json::from_reader::<_, SessionSnapshot>(BufReader::new(file)) {
            Ok(snapshot) => Some(snapshot.into()),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "session snapshot corrupt; starting anonymous");
                None
            }
        }
    }

    /// Delete the snapshot. Idempotent: clearing an absent snapshot is fine.
    pub fn clear(&self) -> Result<(), VaultError> {
        match fs::remove_file(self.snapshot_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VaultError::Io(e)),
        }
    }
}
