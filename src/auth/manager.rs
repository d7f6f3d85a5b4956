// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! End-to-end authentication flows.
//!
//! [`AuthManager`] is the surface an application binds to: it wires the
//! Identity Service client, the session store, and the catalog cache
//! together and owns the control flow between them, so no component ever
//! reaches around another.

use tracing::warn;

use crate::auth::gate::{authorize, AccessDecision};
use crate::auth::roles::Role;
use crate::auth::validate::validate_registration;
use crate::catalog::CatalogCache;
use crate::client::{ApiError, IdentityClient};
use crate::config::ClientConfig;
use crate::error::AuthError;
use crate::models::{Principal, RegistrationForm, Session};
use crate::session::SessionStore;

pub struct AuthManager {
    client: IdentityClient,
    store: SessionStore,
    catalog: CatalogCache,
}

impl AuthManager {
    /// Wire the engine from configuration. Opens the session store, which
    /// rehydrates any session persisted by a previous run.
    pub fn new(config: &ClientConfig) -> Result<Self, AuthError> {
        let client = IdentityClient::new(config)?;
        let store = SessionStore::open(&config.data_dir);
        let catalog = CatalogCache::new(client.clone());
        Ok(Self {
            client,
            store,
            catalog,
        })
    }

    /// The session store, for gate evaluation and direct inspection.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The catalog cache; a registration form drives `refresh` on it.
    pub fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    /// Register a new account and establish its first session.
    ///
    /// Client-side validation runs against the current base directory
    /// before anything else: a rejected form never reaches the network.
    pub async fn register(&self, form: &RegistrationForm) -> Result<Session, AuthError> {
        let bases = self.catalog.bases();
        let request = validate_registration(form, &bases)?;
        let session = self.client.register(request).await?;
        self.store.establish(session.clone())?;
        Ok(session)
    }

    /// Exchange credentials for a session. On any failure the store is left
    /// exactly as it was.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let session = self.client.login(username, password).await?;
        self.store.establish(session.clone())?;
        Ok(session)
    }

    /// Clear the session from memory and disk.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.clear()?;
        Ok(())
    }

    /// Refresh the session's tokens.
    ///
    /// A rejected refresh token means the session is dead: it is cleared
    /// before the error surfaces, and there is no retry. A transport
    /// failure is not a rejection and leaves the session in place.
    pub async fn refresh_session(&self) -> Result<Session, AuthError> {
        let session = self.store.current().ok_or(AuthError::NotAuthenticated)?;
        match self.client.refresh(&session.refresh_token).await {
            Ok(refreshed) => {
                self.store.update_tokens(refreshed)?;
                self.store.current().ok_or(AuthError::NotAuthenticated)
            }
            Err(ApiError::Unauthorized) => {
                warn!("refresh token rejected; destroying session");
                self.store.clear()?;
                Err(AuthError::Api(ApiError::Unauthorized))
            }
            Err(error) => Err(AuthError::Api(error)),
        }
    }

    /// Ask the Identity Service who the stored access token belongs to.
    ///
    /// A 401/403 answer means the token is stale, so the session is cleared
    /// before the error surfaces. Transport failures leave it in place.
    pub async fn verify_session(&self) -> Result<Principal, AuthError> {
        let session = self.store.current().ok_or(AuthError::NotAuthenticated)?;
        match self.client.current_user(&session.access_token).await {
            Ok(principal) => Ok(principal),
            Err(error @ (ApiError::Unauthorized | ApiError::Forbidden)) => {
                warn!("stored access token rejected; destroying session");
                self.store.clear()?;
                Err(AuthError::Api(error))
            }
            Err(error) => Err(AuthError::Api(error)),
        }
    }

    /// Gate decision for a route, evaluated against the live store.
    pub fn authorize(&self, required: &[Role]) -> AccessDecision {
        authorize(self.store.current().as_ref(), required)
    }
}
