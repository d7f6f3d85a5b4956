// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Store
//!
//! The in-memory session of record plus its durable vault.
//!
//! ## Atomicity Contract
//!
//! All transitions happen under one write lock: readers observe either the
//! previous session or the next one, never a half-written state. Durable
//! writes land before the in-memory publish, so a persistence failure
//! leaves memory unchanged. Clearing drops memory first, so a session is
//! gone in-process even if the disk wipe fails.
//!
//! The store is a cheap-to-clone handle; every clone observes and mutates
//! the same session.

pub mod vault;

pub use vault::{SessionVault, VaultError, SESSION_FILE};

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::models::{Session, TokenRefresh};

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    vault: SessionVault,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Open the store, rehydrating any session persisted under `data_dir`.
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        let vault = SessionVault::new(data_dir.as_ref());
        let restored = vault.load();
        match &restored {
            Some(session) => {
                info!(username = %session.principal.username, "session rehydrated from disk");
            }
            None => debug!("no persisted session; starting anonymous"),
        }
        Self {
            inner: Arc::new(StoreInner {
                vault,
                current: RwLock::new(restored),
            }),
        }
    }

    /// Make `session` the active session: persist first, then publish.
    pub fn establish(&self, session: Session) -> Result<(), VaultError> {
        let mut current = self.inner.current.write();
        self.inner.vault.store(&session)?;
        info!(
            username = %session.principal.username,
            role = %session.principal.role,
            "session established"
        );
        *current = Some(session);
        Ok(())
    }

    /// Snapshot of the active session, if any.
    pub fn current(&self) -> Option<Session> {
        self.inner.current.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.current.read().is_some()
    }

    /// Swap in refreshed tokens without touching the principal. A rotated
    /// refresh token replaces the stored one; otherwise it is kept. No-op
    /// when anonymous.
    pub fn update_tokens(&self, refreshed: TokenRefresh) -> Result<(), VaultError> {
        let mut current = self.inner.current.write();
        let Some(session) = current.as_ref() else {
            debug!("token refresh with no active session; ignoring");
            return Ok(());
        };

        let mut updated = session.clone();
        updated.access_token = refreshed.access;
        if let Some(refresh_token) = refreshed.refresh {
            updated.refresh_token = refresh_token;
        }
        self.inner.vault.store(&updated)?;
        *current = Some(updated);
        Ok(())
    }

    /// Drop the session from memory and disk. Idempotent.
    pub fn clear(&self) -> Result<(), VaultError> {
        let mut current = self.inner.current.write();
        if current.take().is_some() {
            info!("session cleared");
        }
        self.inner.vault.clear()
    }
}
