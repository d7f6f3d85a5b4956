// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Role & Base Catalog Cache
//!
//! Cached catalogs backing the registration form: the selectable roles and
//! the organizational base directory.
//!
//! ## Degradation Model
//!
//! - The role catalog fails **open**: it starts from a compiled-in default
//!   (one entry per [`Role`]) and a failed or empty fetch never replaces
//!   good entries. Registration therefore always has roles to offer.
//! - The base directory has no safe default (base ids are deployment data),
//!   so it starts *unavailable* and only a successful fetch makes it
//!   available. The validator blocks base-commander registration until then.
//!
//! Reads are synchronous snapshots; no lock is ever held across network I/O.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::auth::roles::Role;
use crate::client::IdentityClient;
use crate::models::{Base, RoleOption};

/// Compiled-in role catalog used until the service supplies one.
pub fn default_role_catalog() -> Vec<RoleOption> {
    Role::ALL
        .iter()
        .map(|role| RoleOption {
            value: role.as_str().to_string(),
            label: role.label().to_string(),
        })
        .collect()
}

/// Snapshot of the organizational base directory.
///
/// Distinguishes "never fetched" from "fetched and empty": membership
/// checks are only meaningful once the directory is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDirectory {
    entries: Vec<Base>,
    available: bool,
}

impl BaseDirectory {
    /// Directory before any successful fetch.
    pub fn unavailable() -> Self {
        Self {
            entries: Vec::new(),
            available: false,
        }
    }

    /// Directory built from a successful fetch.
    pub fn loaded(entries: Vec<Base>) -> Self {
        Self {
            entries,
            available: true,
        }
    }

    /// Whether a fetch has ever succeeded.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Whether `base_id` names a known base.
    pub fn contains(&self, base_id: i64) -> bool {
        self.entries.iter().any(|base| base.id == base_id)
    }

    pub fn entries(&self) -> &[Base] {
        &self.entries
    }
}

impl Default for BaseDirectory {
    fn default() -> Self {
        Self::unavailable()
    }
}

/// What a [`CatalogCache::refresh`] call actually changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshOutcome {
    /// The refresh was abandoned before applying anything.
    pub cancelled: bool,
    /// The role catalog was replaced by fetched entries.
    pub roles_refreshed: bool,
    /// The base directory was replaced by fetched entries.
    pub bases_refreshed: bool,
}

struct CatalogState {
    roles: Vec<RoleOption>,
    bases: BaseDirectory,
}

/// Shared cache of the role catalog and base directory.
///
/// Cheap to clone; all clones observe the same state.
#[derive(Clone)]
pub struct CatalogCache {
    client: IdentityClient,
    state: Arc<RwLock<CatalogState>>,
}

impl CatalogCache {
    pub fn new(client: IdentityClient) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(CatalogState {
                roles: default_role_catalog(),
                bases: BaseDirectory::unavailable(),
            })),
        }
    }

    /// Current role catalog. Never empty: defaults remain until a fetch
    /// succeeds with real entries.
    pub fn roles(&self) -> Vec<RoleOption> {
        self.state.read().roles.clone()
    }

    /// Current base directory snapshot.
    pub fn bases(&self) -> BaseDirectory {
        self.state.read().bases.clone()
    }

    /// Fetch both catalogs concurrently and apply whatever succeeded.
    ///
    /// The two fetches fail independently: a dead base endpoint does not
    /// stop a role update, and vice versa. Cancelling `cancel` (navigation
    /// away from the form) abandons both requests and changes nothing.
    pub async fn refresh(&self, cancel: &CancellationToken) -> RefreshOutcome {
        let fetches = async { tokio::join!(self.client.fetch_roles(), self.client.fetch_bases()) };
        let (roles, bases) = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("catalog refresh cancelled before completion");
                return RefreshOutcome {
                    cancelled: true,
                    ..RefreshOutcome::default()
                };
            }
            results = fetches => results,
        };

        let mut outcome = RefreshOutcome::default();
        let mut state = self.state.write();
        match roles {
            Ok(catalog) if !catalog.is_empty() => {
                debug!(count = catalog.len(), "role catalog refreshed");
                state.roles = catalog;
                outcome.roles_refreshed = true;
            }
            Ok(_) => {
                warn!("identity service returned an empty role catalog; keeping current entries");
            }
            Err(error) => {
                warn!(%error, "role catalog fetch failed; keeping current entries");
            }
        }
        match bases {
            Ok(entries) => {
                debug!(count = entries.len(), "base directory refreshed");
                state.bases = BaseDirectory::loaded(entries);
                outcome.bases_refreshed = true;
            }
            Err(error) => {
                warn!(%error, "base directory fetch failed; keeping previous entries");
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::ClientConfig;

    fn unreachable_cache() -> CatalogCache {
        // Port 9 (discard) refuses connections immediately on loopback.
        let config = ClientConfig::new("http://127.0.0.1:9/api/v1", "/tmp/unused")
            .unwrap()
            .with_timeout(Duration::from_secs(1));
        CatalogCache::new(IdentityClient::new(&config).unwrap())
    }

    #[test]
    fn default_catalog_lists_every_role_with_label() {
        let catalog = default_role_catalog();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog[0].value, "admin");
        assert_eq!(catalog[0].label, "Administrator");
        assert_eq!(catalog[1].value, "base_commander");
        assert_eq!(catalog[2].value, "logistics_officer");
    }

    #[test]
    fn new_cache_serves_defaults_and_unavailable_bases() {
        let cache = unreachable_cache();
        assert_eq!(cache.roles(), default_role_catalog());
        assert!(!cache.bases().is_available());
    }

    #[test]
    fn base_directory_membership() {
        let directory = BaseDirectory::loaded(vec![Base {
            id: 3,
            name: "Fort Meridian".to_string(),
            code: "FTM".to_string(),
        }]);
        assert!(directory.is_available());
        assert!(directory.contains(3));
        assert!(!directory.contains(4));

        let empty = BaseDirectory::loaded(Vec::new());
        assert!(empty.is_available());
        assert!(!empty.contains(3));

        assert!(!BaseDirectory::unavailable().is_available());
    }

    #[tokio::test]
    async fn refresh_against_unreachable_service_keeps_defaults() {
        let cache = unreachable_cache();
        let outcome = cache.refresh(&CancellationToken::new()).await;
        assert!(!outcome.cancelled);
        assert!(!outcome.roles_refreshed);
        assert!(!outcome.bases_refreshed);
        assert_eq!(cache.roles(), default_role_catalog());
        assert!(!cache.bases().is_available());
    }

    #[tokio::test]
    async fn cancelled_refresh_changes_nothing() {
        let cache = unreachable_cache();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = cache.refresh(&cancel).await;
        assert!(outcome.cancelled);
        assert!(!outcome.roles_refreshed);
        assert_eq!(cache.roles(), default_role_catalog());
    }
}
