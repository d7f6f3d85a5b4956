// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Registration validation, role modeling, route gating, and the flow
//! manager that ties them to the Identity Service.
//!
//! ## Flow
//!
//! 1. A registration form loads the role catalog and base directory
//!    (concurrently, fail-open) from [`crate::catalog`].
//! 2. [`validate::validate_registration`] turns raw input into a wire
//!    payload or a typed, field-addressable failure before any network
//!    I/O happens.
//! 3. [`manager::AuthManager`] submits via [`crate::client`], establishes
//!    the returned session in [`crate::session`], and owns logout, token
//!    refresh, and session verification.
//! 4. Every navigation asks [`gate::authorize`] for a fresh decision
//!    against the live store; nothing is cached.
//!
//! ## Security
//!
//! - Login failures surface one generic message; account existence never
//!   leaks.
//! - Tokens are opaque bearer strings and never appear in logs or `Debug`
//!   output.
//! - Role verification codes are checked for presence only; the service is
//!   the sole verifier.

pub mod gate;
pub mod manager;
pub mod roles;
pub mod validate;

pub use gate::{authorize, AccessDecision, RouteGuard};
pub use manager::AuthManager;
pub use roles::Role;
pub use validate::{validate_registration, ValidationError, MIN_PASSWORD_LEN};
