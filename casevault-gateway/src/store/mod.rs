// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Relational store
//!
//! One trait per aggregate, all combined into [`Store`]. Two backends:
//! - [`MemoryStore`]: maps behind a lock, used by tests and when no database is configured
//! - [`PgStore`]: Postgres via sqlx
//!
//! Not-found is always reported as [`StoreError::NotFound`] so callers can tell
//! it apart from transport failures.

mod memory;
pub mod models;
mod postgres;

pub use memory::MemoryStore;
pub use models::*;
pub use postgres::PgStore;

use async_trait::async_trait;
use casevault_authz::CaseStatus;
use thiserror::Error;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("record".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict(format!(
                    "duplicate value violates {}",
                    db_err.constraint().unwrap_or("a unique constraint")
                ))
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

// =============================================================================
// Aggregate traits
// =============================================================================

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the username or email is taken.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn get_user(&self, id: i64) -> StoreResult<User>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<User>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn update_user(&self, id: i64, update: UserUpdate) -> StoreResult<User>;
    async fn touch_last_login(&self, id: i64) -> StoreResult<()>;
    async fn count_admins(&self) -> StoreResult<i64>;
}

#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Fails with `Conflict` when the case number is taken.
    async fn create_case(&self, case: NewCase) -> StoreResult<Case>;
    async fn get_case(&self, id: i64) -> StoreResult<Case>;
    async fn list_cases(&self) -> StoreResult<Vec<Case>>;
    async fn update_case(&self, id: i64, update: CaseUpdate) -> StoreResult<Case>;
    async fn set_case_status(&self, id: i64, status: CaseStatus) -> StoreResult<Case>;

    /// Idempotent: adding an existing assignee is a no-op.
    async fn add_assignee(&self, case_id: i64, user_id: i64) -> StoreResult<()>;
    /// Idempotent: removing a non-assignee is a no-op.
    async fn remove_assignee(&self, case_id: i64, user_id: i64) -> StoreResult<()>;
    async fn list_assignees(&self, case_id: i64) -> StoreResult<Vec<User>>;
    async fn is_assignee(&self, case_id: i64, user_id: i64) -> StoreResult<bool>;
    /// Cases the user is assigned to, ordered by id.
    async fn list_cases_for_assignee(&self, user_id: i64) -> StoreResult<Vec<Case>>;
}

#[async_trait]
pub trait EvidenceStore: Send + Sync {
    async fn create_evidence(&self, evidence: NewEvidence) -> StoreResult<Evidence>;
    /// Direct lookup; includes soft-deleted items.
    async fn get_evidence(&self, id: i64) -> StoreResult<Evidence>;
    /// Case listing; excludes soft-deleted items.
    async fn list_evidence_by_case(&self, case_id: i64) -> StoreResult<Vec<Evidence>>;
    /// All text evidence that is not soft-deleted, across cases.
    async fn list_active_text_evidence(&self) -> StoreResult<Vec<Evidence>>;
    /// Active rows only; a soft-deleted row yields `Conflict`.
    async fn update_remarks(&self, id: i64, remarks: Option<String>) -> StoreResult<Evidence>;
    /// Flips the flag on an active row; a soft-deleted row yields `Conflict`.
    async fn mark_evidence_deleted(&self, id: i64) -> StoreResult<Evidence>;
    async fn delete_evidence(&self, id: i64) -> StoreResult<()>;
}

/// Append-only: there is no update or delete.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append_audit(&self, entry: NewAuditEntry) -> StoreResult<AuditEntry>;
    async fn list_audit_by_user(&self, user_id: i64) -> StoreResult<Vec<AuditEntry>>;
    async fn list_audit_by_entity(
        &self,
        entity_type: &str,
        entity_id: i64,
    ) -> StoreResult<Vec<AuditEntry>>;
}

#[async_trait]
pub trait PersonStore: Send + Sync {
    async fn create_person(&self, person: NewPerson) -> StoreResult<Person>;
    async fn get_person(&self, id: i64) -> StoreResult<Person>;
    async fn list_persons(&self, case_id: i64, kind: PersonKind) -> StoreResult<Vec<Person>>;
    async fn update_person(&self, id: i64, fields: PersonFields) -> StoreResult<Person>;
    async fn delete_person(&self, id: i64) -> StoreResult<()>;
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn create_report(&self, report: NewReport) -> StoreResult<Report>;
    async fn get_report(&self, id: i64) -> StoreResult<Report>;
    async fn find_report_by_tracking_id(&self, report_id: &str) -> StoreResult<Report>;
    async fn list_reports(&self) -> StoreResult<Vec<Report>>;
    async fn set_report_status(&self, id: i64, status: ReportStatus) -> StoreResult<Report>;
    /// Idempotent.
    async fn link_report(&self, case_id: i64, report_id: i64) -> StoreResult<()>;
    /// First case the report was linked to, if any.
    async fn linked_case(&self, report_id: i64) -> StoreResult<Option<Case>>;
}

/// The full relational store.
#[async_trait]
pub trait Store:
    UserStore + CaseStore + EvidenceStore + AuditStore + PersonStore + ReportStore
{
    /// Cheap round-trip used by readiness checks.
    async fn ping(&self) -> StoreResult<()>;
}
