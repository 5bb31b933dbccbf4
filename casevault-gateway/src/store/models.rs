// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Record types shared by every store backend.

use casevault_authz::{
    CaseStatus, ClearanceLevel, EvidenceKind, EvidenceStatus, Principal, Role,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub clearance: ClearanceLevel,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn principal(&self) -> Principal {
        Principal::new(self.id, self.username.clone(), self.role, self.clearance)
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub role: Role,
    pub clearance: ClearanceLevel,
}

#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub clearance: Option<ClearanceLevel>,
    pub is_active: Option<bool>,
}

// =============================================================================
// Cases
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub id: i64,
    pub case_number: String,
    pub name: String,
    pub description: String,
    pub area: String,
    pub case_type: String,
    pub status: CaseStatus,
    pub authorization_level: ClearanceLevel,
    pub created_by: i64,
    pub reported_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCase {
    pub case_number: String,
    pub name: String,
    pub description: String,
    pub area: String,
    pub case_type: String,
    pub authorization_level: ClearanceLevel,
    pub created_by: i64,
    pub reported_by: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct CaseUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub area: Option<String>,
    pub case_type: Option<String>,
    pub authorization_level: Option<ClearanceLevel>,
}

// =============================================================================
// Evidence
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub id: i64,
    pub case_id: i64,
    #[serde(rename = "type")]
    pub kind: EvidenceKind,
    pub content: Option<String>,
    pub image_path: Option<String>,
    pub remarks: Option<String>,
    pub added_by: i64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Evidence {
    pub fn status(&self) -> EvidenceStatus {
        EvidenceStatus::from_deleted_flag(self.is_deleted)
    }
}

#[derive(Debug, Clone)]
pub struct NewEvidence {
    pub case_id: i64,
    pub kind: EvidenceKind,
    pub content: Option<String>,
    pub image_path: Option<String>,
    pub remarks: Option<String>,
    pub added_by: i64,
}

// =============================================================================
// Audit
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(AuditAction::Create),
            "update" => Some(AuditAction::Update),
            "delete" => Some(AuditAction::Delete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub user_id: i64,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: i64,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub user_id: i64,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: i64,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub ip_address: Option<String>,
}

// =============================================================================
// Persons
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonKind {
    Suspect,
    Victim,
    Witness,
}

impl PersonKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonKind::Suspect => "suspect",
            PersonKind::Victim => "victim",
            PersonKind::Witness => "witness",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "suspect" => Some(PersonKind::Suspect),
            "victim" => Some(PersonKind::Victim),
            "witness" => Some(PersonKind::Witness),
            _ => None,
        }
    }
}

/// Suspect, victim or witness attached to a case.
///
/// The kind-specific fields are only meaningful for their kind:
/// `description`/`is_arrested` for suspects, `injury_description` for victims,
/// `statement` for witnesses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub case_id: i64,
    pub kind: PersonKind,
    pub first_name: String,
    pub last_name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_arrested: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub injury_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
    pub added_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Person fields as supplied by a client, for both create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonFields {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_arrested: Option<bool>,
    #[serde(default)]
    pub injury_description: Option<String>,
    #[serde(default)]
    pub statement: Option<String>,
}

impl PersonFields {
    /// Drop fields that do not belong to `kind`.
    pub fn for_kind(mut self, kind: PersonKind) -> Self {
        if kind != PersonKind::Suspect {
            self.description = None;
            self.is_arrested = None;
        } else if self.is_arrested.is_none() {
            self.is_arrested = Some(false);
        }
        if kind != PersonKind::Victim {
            self.injury_description = None;
        }
        if kind != PersonKind::Witness {
            self.statement = None;
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct NewPerson {
    pub case_id: i64,
    pub kind: PersonKind,
    pub fields: PersonFields,
    pub added_by: i64,
}

// =============================================================================
// Public reports
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Open,
    InProgress,
    Closed,
    Resolved,
    Rejected,
    Pending,
    Escalated,
    Archived,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Open => "open",
            ReportStatus::InProgress => "in_progress",
            ReportStatus::Closed => "closed",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Rejected => "rejected",
            ReportStatus::Pending => "pending",
            ReportStatus::Escalated => "escalated",
            ReportStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(ReportStatus::Open),
            "in_progress" => Some(ReportStatus::InProgress),
            "closed" => Some(ReportStatus::Closed),
            "resolved" => Some(ReportStatus::Resolved),
            "rejected" => Some(ReportStatus::Rejected),
            "pending" => Some(ReportStatus::Pending),
            "escalated" => Some(ReportStatus::Escalated),
            "archived" => Some(ReportStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    /// Public tracking identifier handed to the submitter.
    pub report_id: String,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub civil_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub reporter_role: Option<String>,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReport {
    pub report_id: String,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub civil_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub reporter_role: Option<String>,
}
