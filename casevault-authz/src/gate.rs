// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Authorization Gate
//!
//! Two independent checks composed at the request boundary:
//! - role: the principal's role must be in an allow-list
//! - clearance: the principal's clearance must rank at or above a minimum
//!
//! A missing principal fails with `Unauthenticated` before either check runs.

use thiserror::Error;
use tracing::{debug, warn};

use crate::clearance::ClearanceLevel;
use crate::principal::Principal;
use crate::role::Role;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("insufficient permissions: role '{role}' is not allowed")]
    InsufficientPermissions { role: Role },

    #[error("insufficient clearance: '{held}' does not satisfy '{required}'")]
    InsufficientClearance {
        held: ClearanceLevel,
        required: ClearanceLevel,
    },
}

impl AuthzError {
    /// Short label used for metrics and log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthzError::Unauthenticated => "unauthenticated",
            AuthzError::InsufficientPermissions { .. } => "insufficient_permissions",
            AuthzError::InsufficientClearance { .. } => "insufficient_clearance",
        }
    }
}

// =============================================================================
// Individual checks
// =============================================================================

/// Succeeds iff the principal's role is a member of `allowed`.
pub fn require_role(principal: &Principal, allowed: &[Role]) -> Result<(), AuthzError> {
    if principal.role.is_one_of(allowed) {
        return Ok(());
    }
    warn!(
        user_id = principal.user_id,
        role = %principal.role,
        "role check failed"
    );
    Err(AuthzError::InsufficientPermissions {
        role: principal.role,
    })
}

/// Succeeds iff `rank(principal.clearance) >= rank(minimum)`.
pub fn require_clearance(
    principal: &Principal,
    minimum: ClearanceLevel,
) -> Result<(), AuthzError> {
    if principal.clearance.satisfies(minimum) {
        return Ok(());
    }
    warn!(
        user_id = principal.user_id,
        held = %principal.clearance,
        required = %minimum,
        "clearance check failed"
    );
    Err(AuthzError::InsufficientClearance {
        held: principal.clearance,
        required: minimum,
    })
}

// =============================================================================
// Guard
// =============================================================================

/// A composed gate: optional role allow-list plus optional minimum clearance.
///
/// ```rust
/// use casevault_authz::{ClearanceLevel, Guard, Principal, Role};
///
/// let guard = Guard::roles(&[Role::Investigator, Role::Admin])
///     .with_clearance(ClearanceLevel::Critical);
///
/// let analyst = Principal::new(7, "ana", Role::Investigator, ClearanceLevel::Critical);
/// assert!(guard.check(Some(&analyst)).is_ok());
/// assert!(guard.check(None).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    roles: Option<Vec<Role>>,
    min_clearance: Option<ClearanceLevel>,
}

impl Guard {
    /// Any authenticated principal.
    pub fn authenticated() -> Self {
        Self {
            roles: None,
            min_clearance: None,
        }
    }

    /// Principals whose role is in `allowed`.
    pub fn roles(allowed: &[Role]) -> Self {
        Self {
            roles: Some(allowed.to_vec()),
            min_clearance: None,
        }
    }

    /// Add a minimum clearance.
    pub fn with_clearance(mut self, minimum: ClearanceLevel) -> Self {
        self.min_clearance = Some(minimum);
        self
    }

    /// Evaluate the guard. Authentication first, then role, then clearance.
    pub fn check(&self, principal: Option<&Principal>) -> Result<(), AuthzError> {
        let principal = principal.ok_or(AuthzError::Unauthenticated)?;

        debug!(
            user_id = principal.user_id,
            role = %principal.role,
            clearance = %principal.clearance,
            "checking authorization"
        );

        if let Some(allowed) = &self.roles {
            require_role(principal, allowed)?;
        }
        if let Some(minimum) = self.min_clearance {
            require_clearance(principal, minimum)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
