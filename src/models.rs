// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Domain Data Models
//!
//! This module defines the data structures the engine passes between its
//! components and persists to disk. All types derive `Serialize` and/or
//! `Deserialize` as their direction of travel requires.
//!
//! ## Model Categories
//!
//! - **Catalog**: [`RoleOption`] and [`Base`] entries served by the
//!   Identity Service for the registration form.
//! - **Identity**: the authenticated [`Principal`] and its [`Session`].
//! - **Registration**: the raw [`RegistrationForm`] and the validated
//!   [`RegistrationRequest`] wire payload.
//!
//! ## Secret Handling
//!
//! Passwords and bearer tokens never appear in `Debug` output; the types
//! holding them implement `Debug` by hand and redact those fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::roles::Role;

// =============================================================================
// Catalog Models
// =============================================================================

/// A selectable role as served by the Identity Service role catalog.
///
/// `value` is the wire role string; `label` is the human-readable name a
/// picker displays. The built-in fallback catalog mirrors this shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleOption {
    /// Wire value submitted on registration (e.g. `base_commander`).
    pub value: String,
    /// Display name (e.g. `Base Commander`).
    pub label: String,
}

/// An organizational base (unit) a commander can be assigned to.
///
/// Extra fields on the wire (location, inventory counts) are ignored; only
/// the identity triple matters to this engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Base {
    /// Service-issued identifier, referenced by `assigned_base_id`.
    pub id: i64,
    /// Full base name.
    pub name: String,
    /// Short base code.
    pub code: String,
}

// =============================================================================
// Identity Models
// =============================================================================

/// The authenticated user as this engine sees them.
///
/// Immutable once issued for the lifetime of a session; a changed role or
/// base assignment takes effect at the next login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    /// Service-issued user id.
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// The single role this account holds.
    pub role: Role,
    /// Present for base commanders; optional everywhere else.
    #[serde(default)]
    pub assigned_base: Option<Base>,
}

/// Access/refresh token pair issued on registration or login.
///
/// Tokens are opaque bearer strings: the engine stores and presents them
/// without inspecting their contents.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Result of a token refresh.
///
/// The service may rotate the refresh token; when `refresh` is absent only
/// the access token changes.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct TokenRefresh {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl std::fmt::Debug for TokenRefresh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRefresh")
            .field("access", &"<redacted>")
            .field("rotated", &self.refresh.is_some())
            .finish()
    }
}

/// An established session: the principal plus the tokens that act for it.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub principal: Principal,
    /// When this client established the session (UTC). Survives rehydration.
    pub issued_at: DateTime<Utc>,
}

impl Session {
    /// Build a session from a principal and a freshly issued token pair,
    /// stamping `issued_at` with the current time.
    pub fn issue(principal: Principal, tokens: TokenPair) -> Self {
        Self {
            access_token: tokens.access,
            refresh_token: tokens.refresh,
            principal,
            issued_at: Utc::now(),
        }
    }

    /// Role of the session's principal.
    pub fn role(&self) -> Role {
        self.principal.role
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("principal", &self.principal)
            .field("issued_at", &self.issued_at)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Registration Models
// =============================================================================

/// Raw registration input exactly as a form collects it.
///
/// Nothing here is trusted: the Credential Validator turns a form into a
/// [`RegistrationRequest`] or a typed failure.
#[derive(Clone, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
    /// Role verification code; only its presence is checked client-side.
    pub role_verification_code: String,
    /// Base selection; required (and verified against the directory) for
    /// base commanders only.
    pub assigned_base_id: Option<i64>,
}

impl std::fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("assigned_base_id", &self.assigned_base_id)
            .field("password", &"<redacted>")
            .field("confirm_password", &"<redacted>")
            .finish()
    }
}

/// Validated registration payload, serialized verbatim to the Identity
/// Service.
///
/// Only [`validate_registration`](crate::auth::validate::validate_registration)
/// constructs this type, so an unvalidated form can never reach the wire.
/// It is consumed by the one `register` call that submits it.
#[derive(Clone, Serialize)]
pub struct RegistrationRequest {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) role: Role,
    pub(crate) role_code: String,
    pub(crate) assigned_base_id: Option<i64>,
}

impl RegistrationRequest {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

impl std::fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("assigned_base_id", &self.assigned_base_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_principal() -> Principal {
        Principal {
            id: 7,
            username: "jordan".to_string(),
            email: "jordan@example.mil".to_string(),
            first_name: "Jordan".to_string(),
            last_name: "Reyes".to_string(),
            role: Role::BaseCommander,
            assigned_base: Some(Base {
                id: 3,
                name: "Fort Meridian".to_string(),
                code: "FTM".to_string(),
            }),
        }
    }

    #[test]
    fn session_issue_carries_tokens_and_stamps_time() {
        let before = Utc::now();
        let session = Session::issue(
            sample_principal(),
            TokenPair {
                access: "acc".to_string(),
                refresh: "ref".to_string(),
            },
        );
        assert_eq!(session.access_token, "acc");
        assert_eq!(session.refresh_token, "ref");
        assert_eq!(session.role(), Role::BaseCommander);
        assert!(session.issued_at >= before);
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let session = Session::issue(
            sample_principal(),
            TokenPair {
                access: "top-secret-access".to_string(),
                refresh: "top-secret-refresh".to_string(),
            },
        );
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("top-secret-access"));
        assert!(!rendered.contains("top-secret-refresh"));
        assert!(rendered.contains("<redacted>"));

        let form = RegistrationForm {
            password: "hunter2hunter2".to_string(),
            confirm_password: "hunter2hunter2".to_string(),
            ..RegistrationForm::default()
        };
        assert!(!format!("{form:?}").contains("hunter2hunter2"));
    }

    #[test]
    fn principal_deserializes_with_missing_optional_fields() {
        let principal: Principal = serde_json::from_value(serde_json::json!({
            "id": 1,
            "username": "sam",
            "email": "sam@example.mil",
            "role": "admin"
        }))
        .unwrap();
        assert_eq!(principal.role, Role::Admin);
        assert_eq!(principal.first_name, "");
        assert_eq!(principal.assigned_base, None);
    }

    #[test]
    fn token_refresh_tolerates_missing_rotation() {
        let refreshed: TokenRefresh =
            serde_json::from_value(serde_json::json!({ "access": "a2" })).unwrap();
        assert_eq!(refreshed.access, "a2");
        assert_eq!(refreshed.refresh, None);
    }
}
