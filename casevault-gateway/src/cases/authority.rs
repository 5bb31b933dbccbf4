// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Case/Assignment Authority
//!
//! Business rules for cases that hold no matter which route calls them:
//! - an assignee's clearance must cover the case's authorization level
//! - assignment is idempotent
//! - officers may only change the status of cases they are assigned to
//! - a case is only visible to principals cleared for its level

use casevault_authz::{require_clearance, CaseStatus, ClearanceLevel, Principal, Role};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::metrics::Metrics;
use crate::store::{Case, CaseStore, CaseUpdate, NewCase, Store, User, UserStore};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCaseRequest {
    #[serde(default)]
    pub case_number: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub case_type: String,
    #[serde(default)]
    pub authorization_level: Option<String>,
    #[serde(default)]
    pub reported_by: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCaseRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub area: Option<String>,
    pub case_type: Option<String>,
    pub authorization_level: Option<String>,
}

fn parse_level(raw: &str) -> ApiResult<ClearanceLevel> {
    ClearanceLevel::parse(raw)
        .ok_or_else(|| ApiError::invalid(format!("unknown clearance level '{}'", raw)))
}

#[derive(Clone)]
pub struct CaseAuthority {
    store: Arc<dyn Store>,
    metrics: Metrics,
}

impl CaseAuthority {
    pub fn new(store: Arc<dyn Store>, metrics: Metrics) -> Self {
        Self { store, metrics }
    }

    /// Load a case the principal is cleared to see.
    pub async fn visible_case(&self, actor: &Principal, case_id: i64) -> ApiResult<Case> {
        let case = self.store.get_case(case_id).await?;
        if let Err(e) = require_clearance(actor, case.authorization_level) {
            self.metrics.record_authz_denial(e.reason());
            return Err(e.into());
        }
        Ok(case)
    }

    pub async fn create_case(&self, actor: &Principal, req: CreateCaseRequest) -> ApiResult<Case> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(ApiError::invalid("case name is required"));
        }
        let level = match req.authorization_level.as_deref() {
            Some(raw) => parse_level(raw)?,
            None => ClearanceLevel::Low,
        };
        let case_number = match req.case_number.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => generate_case_number(),
        };

        // A creator cannot classify a case above their own clearance.
        require_clearance(actor, level)?;

        if let Some(reporter) = req.reported_by {
            self.store.get_user(reporter).await?;
        }

        let case = self
            .store
            .create_case(NewCase {
                case_number,
                name: name.to_string(),
                description: req.description,
                area: req.area,
                case_type: req.case_type,
                authorization_level: level,
                created_by: actor.user_id,
                reported_by: req.reported_by,
            })
            .await?;

        info!(
            case_id = case.id,
            case_number = %case.case_number,
            level = %case.authorization_level,
            created_by = actor.user_id,
            "case created"
        );
        Ok(case)
    }

    /// Cases whose level the principal's clearance covers.
    pub async fn list_cases(&self, actor: &Principal) -> ApiResult<Vec<Case>> {
        let cases = self.store.list_cases().await?;
        Ok(cases
            .into_iter()
            .filter(|c| actor.can_view(c.authorization_level))
            .collect())
    }

    pub async fn update_case(
        &self,
        actor: &Principal,
        case_id: i64,
        req: UpdateCaseRequest,
    ) -> ApiResult<Case> {
        let level = req.authorization_level.as_deref().map(parse_level).transpose()?;
        let case = self.visible_case(actor, case_id).await?;

        if let Some(level) = level {
            require_clearance(actor, level)?;
            // Raising the level must not leave an under-cleared assignee behind.
            let assignees = self.store.list_assignees(case.id).await?;
            if let Some(blocker) = assignees.iter().find(|u| !u.clearance.satisfies(level)) {
                return Err(ApiError::invalid(format!(
                    "assignee '{}' lacks clearance for level '{}'",
                    blocker.username, level
                )));
            }
        }

        let updated = self
            .store
            .update_case(
                case.id,
                CaseUpdate {
                    name: req.name,
                    description: req.description,
                    area: req.area,
                    case_type: req.case_type,
                    authorization_level: level,
                },
            )
            .await?;
        info!(case_id, updated_by = actor.user_id, "case updated");
        Ok(updated)
    }

    /// Add `user_id` to the case's assignees.
    ///
    /// Fails with `Forbidden` unless the user's clearance covers the case level.
    /// Re-adding an existing assignee succeeds without change.
    pub async fn assign_user(&self, actor: &Principal, case_id: i64, user_id: i64) -> ApiResult<()> {
        let case = self.visible_case(actor, case_id).await?;
        let user = self.store.get_user(user_id).await?;

        if !user.clearance.satisfies(case.authorization_level) {
            self.metrics.record_authz_denial("insufficient_clearance");
            warn!(
                case_id,
                user_id,
                user_clearance = %user.clearance,
                case_level = %case.authorization_level,
                "assignment refused"
            );
            return Err(ApiError::forbidden("insufficient clearance"));
        }

        self.store.add_assignee(case.id, user.id).await?;
        info!(case_id, user_id, assigned_by = actor.user_id, "user assigned to case");
        Ok(())
    }

    /// Removing a user that is not assigned is a no-op.
    pub async fn remove_assignee(
        &self,
        actor: &Principal,
        case_id: i64,
        user_id: i64,
    ) -> ApiResult<()> {
        let case = self.visible_case(actor, case_id).await?;
        self.store.remove_assignee(case.id, user_id).await?;
        info!(case_id, user_id, removed_by = actor.user_id, "assignee removed");
        Ok(())
    }

    pub async fn assignees(&self, actor: &Principal, case_id: i64) -> ApiResult<Vec<User>> {
        let case = self.visible_case(actor, case_id).await?;
        Ok(self.store.list_assignees(case.id).await?)
    }

    /// Change case status.
    ///
    /// The status value is validated before anything is read. Officers must be
    /// assignees of the case; investigators and admins are unrestricted.
    pub async fn update_status(
        &self,
        actor: &Principal,
        case_id: i64,
        raw_status: &str,
    ) -> ApiResult<Case> {
        let status = CaseStatus::parse(raw_status)
            .ok_or_else(|| ApiError::invalid(format!("invalid case status '{}'", raw_status)))?;

        let case = self.visible_case(actor, case_id).await?;

        match actor.role {
            Role::Admin | Role::Investigator => {}
            Role::Officer => {
                if !self.store.is_assignee(case.id, actor.user_id).await? {
                    self.metrics.record_authz_denial("not_assigned");
                    warn!(case_id, user_id = actor.user_id, "officer is not assigned to case");
                    return Err(ApiError::forbidden("not assigned to this case"));
                }
            }
            Role::Citizen => return Err(ApiError::forbidden("insufficient permissions")),
        }

        let updated = self.store.set_case_status(case.id, status).await?;
        info!(
            case_id,
            from = %case.status,
            to = %status,
            changed_by = actor.user_id,
            "case status changed"
        );
        Ok(updated)
    }
}

fn generate_case_number() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("CASE-{}-{}", Utc::now().format("%Y%m%d"), &suffix[..8])
}
