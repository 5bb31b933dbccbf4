// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
use serde::{Deserialize, Serialize};

use crate::clearance::ClearanceLevel;
use crate::role::Role;

/// An authenticated, active user as seen by authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub clearance: ClearanceLevel,
}

impl Principal {
    pub fn new(
        user_id: i64,
        username: impl Into<String>,
        role: Role,
        clearance: ClearanceLevel,
    ) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
            clearance,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether this principal may see material classified at `level`.
    pub fn can_view(&self, level: ClearanceLevel) -> bool {
        self.clearance.satisfies(level)
    }
}
