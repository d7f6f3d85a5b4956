// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration input validation.
//!
//! Pure and synchronous: no I/O, no clocks. A form either becomes a
//! [`RegistrationRequest`] ready for the wire, or the first failing rule
//! comes back as a typed [`ValidationError`].

use thiserror::Error;

use crate::catalog::BaseDirectory;
use crate::models::{RegistrationForm, RegistrationRequest};

/// Minimum password length, counted in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Client-side registration failure. Raised before any network I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,

    #[error("base commander accounts require an assigned base")]
    MissingAssignedBase,

    #[error("the base list has not loaded; base commander registration is unavailable")]
    BasesUnavailable,

    #[error("a role verification code is required")]
    MissingRoleCode,
}

impl ValidationError {
    /// Form field this failure should be attached to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::PasswordMismatch => "confirm_password",
            ValidationError::PasswordTooShort => "password",
            ValidationError::MissingAssignedBase | ValidationError::BasesUnavailable => {
                "assigned_base_id"
            }
            ValidationError::MissingRoleCode => "role_verification_code",
        }
    }
}

/// Validate a registration form against the current base directory.
///
/// Rules run in order and the first failure wins:
///
/// 1. `password` must equal `confirm_password`.
/// 2. `password` must be at least [`MIN_PASSWORD_LEN`] characters.
/// 3. A base commander must name a base that exists in the directory; if the
///    directory has never loaded, the attempt is blocked outright. Other
///    roles skip this rule and their base selection passes through as-is.
/// 4. `role_verification_code` must be present. Presence only: the service
///    is the sole judge of whether a code is valid.
pub fn validate_registration(
    form: &RegistrationForm,
    bases: &BaseDirectory,
) -> Result<RegistrationRequest, ValidationError> {
    if form.password != form.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if form.role.requires_assigned_base() {
        if !bases.is_available() {
            return Err(ValidationError::BasesUnavailable);
        }
        match form.assigned_base_id {
            Some(base_id) if bases.contains(base_id) => {}
            _ => return Err(ValidationError::MissingAssignedBase),
        }
    }
    if form.role_verification_code.is_empty() {
        return Err(ValidationError::MissingRoleCode);
    }

    Ok(RegistrationRequest {
        username: form.username.clone(),
        email: form.email.clone(),
        password: form.password.clone(),
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        role: form.role,
        role_code: form.role_verification_code.clone(),
        assigned_base_id: form.assigned_base_id,
    })
}
