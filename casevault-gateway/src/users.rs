// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! User accounts
//!
//! Admins create and edit accounts of any role. Self-registration always
//! yields a citizen with low clearance. Accounts are deactivated, never
//! removed, so audit entries keep a valid user reference.

use casevault_authz::{ClearanceLevel, Principal, Role};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{hash_password, MIN_PASSWORD_LENGTH};
use crate::error::{ApiError, ApiResult};
use crate::store::{CaseStore, NewUser, Store, User, UserStore, UserUpdate};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@districtcore.gov";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    pub role: Option<String>,
    pub clearance_level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub clearance_level: Option<String>,
    pub is_active: Option<bool>,
}

fn parse_role(raw: &str) -> ApiResult<Role> {
    Role::parse(raw).ok_or_else(|| ApiError::invalid(format!("unknown role '{}'", raw)))
}

fn parse_clearance(raw: &str) -> ApiResult<ClearanceLevel> {
    ClearanceLevel::parse(raw)
        .ok_or_else(|| ApiError::invalid(format!("unknown clearance level '{}'", raw)))
}

fn hashed(password: &str) -> ApiResult<String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::invalid(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    hash_password(password).map_err(|e| ApiError::StorageFailure(e.to_string()))
}

fn check_identity(username: &str, email: &str) -> ApiResult<()> {
    if username.trim().is_empty() {
        return Err(ApiError::invalid("username is required"));
    }
    if !email.contains('@') {
        return Err(ApiError::invalid("a valid email is required"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn Store>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Self-registration: always a low-clearance citizen.
    pub async fn register(&self, req: RegisterRequest) -> ApiResult<User> {
        check_identity(&req.username, &req.email)?;
        let password_hash = hashed(&req.password)?;

        let user = self
            .store
            .create_user(NewUser {
                username: req.username.trim().to_string(),
                email: req.email.trim().to_string(),
                full_name: req.full_name,
                password_hash,
                role: Role::Citizen,
                clearance: ClearanceLevel::Low,
            })
            .await?;
        info!(user_id = user.id, username = %user.username, "citizen registered");
        Ok(user)
    }

    pub async fn create(&self, actor: &Principal, req: CreateUserRequest) -> ApiResult<User> {
        check_identity(&req.username, &req.email)?;
        let role = req.role.as_deref().map(parse_role).transpose()?.unwrap_or_default();
        let clearance = req
            .clearance_level
            .as_deref()
            .map(parse_clearance)
            .transpose()?
            .unwrap_or_default();
        let password_hash = hashed(&req.password)?;

        let user = self
            .store
            .create_user(NewUser {
                username: req.username.trim().to_string(),
                email: req.email.trim().to_string(),
                full_name: req.full_name,
                password_hash,
                role,
                clearance,
            })
            .await?;
        info!(
            user_id = user.id,
            role = %user.role,
            clearance = %user.clearance,
            created_by = actor.user_id,
            "user created"
        );
        Ok(user)
    }

    pub async fn get(&self, id: i64) -> ApiResult<User> {
        Ok(self.store.get_user(id).await?)
    }

    pub async fn list(&self) -> ApiResult<Vec<User>> {
        Ok(self.store.list_users().await?)
    }

    /// Edit an account. Self-deactivation is refused, and so is a clearance
    /// below the level of any case the user is assigned to.
    pub async fn update(
        &self,
        actor: &Principal,
        id: i64,
        req: UpdateUserRequest,
    ) -> ApiResult<User> {
        if actor.user_id == id && req.is_active == Some(false) {
            return Err(ApiError::invalid("cannot deactivate your own account"));
        }
        let update = UserUpdate {
            email: req.email,
            full_name: req.full_name,
            password_hash: req.password.as_deref().map(hashed).transpose()?,
            role: req.role.as_deref().map(parse_role).transpose()?,
            clearance: req.clearance_level.as_deref().map(parse_clearance).transpose()?,
            is_active: req.is_active,
        };
        if let Some(email) = &update.email {
            if !email.contains('@') {
                return Err(ApiError::invalid("a valid email is required"));
            }
        }
        if let Some(clearance) = update.clearance {
            self.ensure_assignments_covered(id, clearance).await?;
        }

        let user = self.store.update_user(id, update).await?;
        info!(user_id = id, updated_by = actor.user_id, "user updated");
        Ok(user)
    }

    async fn ensure_assignments_covered(
        &self,
        user_id: i64,
        clearance: ClearanceLevel,
    ) -> ApiResult<()> {
        let cases = self.store.list_cases_for_assignee(user_id).await?;
        if let Some(blocker) = cases
            .iter()
            .find(|c| !clearance.satisfies(c.authorization_level))
        {
            return Err(ApiError::invalid(format!(
                "user is assigned to case '{}' at level '{}'",
                blocker.case_number, blocker.authorization_level
            )));
        }
        Ok(())
    }

    /// Deactivate. The row stays.
    pub async fn deactivate(&self, actor: &Principal, id: i64) -> ApiResult<User> {
        if actor.user_id == id {
            return Err(ApiError::invalid("cannot deactivate your own account"));
        }
        let user = self
            .store
            .update_user(
                id,
                UserUpdate {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await?;
        info!(user_id = id, deactivated_by = actor.user_id, "user deactivated");
        Ok(user)
    }
}

/// Create the default admin account when no admin exists.
///
/// Returns whether an account was created.
pub async fn seed_default_admin(store: &Arc<dyn Store>) -> ApiResult<bool> {
    if store.count_admins().await? > 0 {
        return Ok(false);
    }

    let password_hash = hash_password(DEFAULT_ADMIN_PASSWORD)
        .map_err(|e| ApiError::StorageFailure(e.to_string()))?;
    store
        .create_user(NewUser {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            email: DEFAULT_ADMIN_EMAIL.to_string(),
            full_name: "System Administrator".to_string(),
            password_hash,
            role: Role::Admin,
            clearance: ClearanceLevel::Critical,
        })
        .await?;

    warn!(
        username = DEFAULT_ADMIN_USERNAME,
        "default admin account created, change its password"
    );
    Ok(true)
}
