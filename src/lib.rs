// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! AMS Auth Client - Role-Gated Session & Registration Engine
//!
//! Client-side authentication subsystem for the asset management platform.
//! It validates registration input, drives login/registration against the
//! remote Identity Service, keeps the session of record (in memory and on
//! disk), and answers role-gated access questions for every navigation.
//!
//! ## Modules
//!
//! - `auth` - validation, roles, route gating, and the flow manager
//! - `catalog` - role/base catalogs with fail-open refresh
//! - `client` - Identity Service HTTP adapter (the only network I/O)
//! - `session` - session store and its durable vault
//! - `config` - environment-driven configuration
//! - `telemetry` - tracing/logging initialization

pub mod auth;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod telemetry;
