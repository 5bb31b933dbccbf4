// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Roles
//!
//! Functional permission categories gating which operations may be invoked.

use serde::{Deserialize, Serialize};

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Investigator,
    Officer,
    Citizen,
}

/// Roles allowed to create and update cases, manage assignees and triage reports.
pub const CASE_MANAGERS: &[Role] = &[Role::Investigator, Role::Admin];

/// Roles allowed to add evidence and persons to a case.
pub const FIELD_STAFF: &[Role] = &[Role::Investigator, Role::Admin, Role::Officer];

/// Administrative operations (user management, hard delete, audit reads).
pub const ADMINS: &[Role] = &[Role::Admin];

impl Role {
    /// Parse a role (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "investigator" => Some(Role::Investigator),
            "officer" => Some(Role::Officer),
            "citizen" => Some(Role::Citizen),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Investigator => "investigator",
            Role::Officer => "officer",
            Role::Citizen => "citizen",
        }
    }

    /// Whether this role appears in `allowed`.
    pub fn is_one_of(&self, allowed: &[Role]) -> bool {
        allowed.contains(self)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Citizen
    }
}
