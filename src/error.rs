// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Crate-level error surface.
//!
//! [`AuthError`] is what the flow manager returns: a thin umbrella over the
//! per-module errors, so callers can match once and still reach the precise
//! cause. Messages are complete sentences suitable for direct display.

use thiserror::Error;

use crate::auth::validate::ValidationError;
use crate::client::ApiError;
use crate::session::VaultError;

/// Umbrella error for the authentication flows.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Client-side rule failure; raised before any network I/O happens.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// An Identity Service outcome: rejection, invalid credentials,
    /// unexpected status, or transport failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Durable session storage failure.
    #[error("session storage failure: {0}")]
    Vault(#[from] VaultError),

    /// An operation that needs an active session ran without one.
    #[error("no active session")]
    NotAuthenticated,
}

impl AuthError {
    /// Form field this failure should be attached to, when it maps to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            AuthError::Validation(e) => Some(e.field()),
            _ => None,
        }
    }

    /// True when the service was never reached, as opposed to it saying no.
    /// Callers use this to offer "try again" instead of "fix your input".
    pub fn is_network(&self) -> bool {
        matches!(self, AuthError::Api(ApiError::Network(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_convert_and_keep_their_field() {
        let error: AuthError = ValidationError::PasswordTooShort.into();
        assert_eq!(error.field(), Some("password"));
        assert!(!error.is_network());
    }

    #[test]
    fn network_errors_are_identified() {
        let error: AuthError = ApiError::Network("connection refused".to_string()).into();
        assert!(error.is_network());
        assert_eq!(error.field(), None);
    }

    #[test]
    fn api_errors_pass_their_message_through() {
        let error: AuthError = ApiError::InvalidCredentials.into();
        assert_eq!(error.to_string(), "invalid username or password");
    }
}
