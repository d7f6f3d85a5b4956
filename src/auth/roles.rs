// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Organizational roles for registration and route gating.

use serde::{Deserialize, Serialize};

/// Organizational roles for registration and route gating.
///
/// ## Role Catalog
///
/// - `Admin` - Full access across every base
/// - `BaseCommander` - Commands a single assigned base
/// - `LogisticsOfficer` - Manages purchases and transfers for a base
///
/// The set is closed: role checks are `match`/`contains` over this enum,
/// never string comparisons. The wire encoding is snake_case
/// (`base_commander`), matching the Identity Service catalog values;
/// decoding goes through [`Role::from_str`], so casing variants are
/// accepted and unknown strings are rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Commands one assigned base (must pick it at registration)
    BaseCommander,
    /// Manages logistics for a base
    LogisticsOfficer,
}

impl Role {
    /// Every selectable role, in catalog display order.
    pub const ALL: [Role; 3] = [Role::Admin, Role::BaseCommander, Role::LogisticsOfficer];

    /// Wire value for this role (snake_case).
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::BaseCommander => "base_commander",
            Role::LogisticsOfficer => "logistics_officer",
        }
    }

    /// Human-readable label shown in role pickers.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::BaseCommander => "Base Commander",
            Role::LogisticsOfficer => "Logistics Officer",
        }
    }

    /// Parse a role from its wire value (case-insensitive).
    pub fn from_str(s: &str) -> Option<Role> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "base_commander" => Some(Role::BaseCommander),
            "logistics_officer" => Some(Role::LogisticsOfficer),
            _ => None,
        }
    }

    /// Whether registration for this role must name an organizational base.
    pub fn requires_assigned_base(&self) -> bool {
        matches!(self, Role::BaseCommander)
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Role::from_str(&value).ok_or_else(|| format!("unknown role '{value}'"))
    }
}

impl Default for Role {
    /// Default selection in the registration form (least privilege).
    fn default() -> Self {
        Role::LogisticsOfficer
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
