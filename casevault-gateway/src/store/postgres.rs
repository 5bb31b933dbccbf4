// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Postgres store
//!
//! Enum columns are stored as text. Unknown stored clearance labels load as
//! `ClearanceLevel::Unknown`, unknown roles as `citizen`, so a corrupt row can
//! only lose access, never gain it.

use async_trait::async_trait;
use casevault_authz::{CaseStatus, ClearanceLevel, EvidenceKind, Role};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use tracing::{info, warn};

use super::models::*;
use super::{
    AuditStore, CaseStore, EvidenceStore, PersonStore, ReportStore, Store, StoreError,
    StoreResult, UserStore,
};

/// Postgres implementation of [`Store`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and apply pending migrations.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        info!(max_connections, "connected to database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {}", e)))?;
        info!("database migrations applied");

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Why a conditional evidence update touched no row: gone, or soft-deleted.
    async fn inactive_evidence(&self, id: i64) -> StoreError {
        let exists: Result<bool, sqlx::Error> =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM evidence WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await;
        match exists {
            Ok(true) => StoreError::Conflict(format!("evidence {} is deleted", id)),
            Ok(false) => missing("evidence", id),
            Err(e) => e.into(),
        }
    }
}

// =============================================================================
// Row types
// =============================================================================

#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    full_name: String,
    password_hash: String,
    role: String,
    clearance: String,
    is_active: bool,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let role = Role::parse(&row.role).unwrap_or_else(|| {
            warn!(user_id = row.id, role = %row.role, "unknown stored role, treating as citizen");
            Role::Citizen
        });
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            full_name: row.full_name,
            password_hash: row.password_hash,
            role,
            clearance: ClearanceLevel::from_label(&row.clearance),
            is_active: row.is_active,
            last_login: row.last_login,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct CaseRow {
    id: i64,
    case_number: String,
    name: String,
    description: String,
    area: String,
    case_type: String,
    status: String,
    authorization_level: String,
    created_by: i64,
    reported_by: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CaseRow> for Case {
    type Error = StoreError;

    fn try_from(row: CaseRow) -> Result<Self, Self::Error> {
        let status = CaseStatus::parse(&row.status).ok_or_else(|| {
            StoreError::Backend(format!("case {} has invalid status '{}'", row.id, row.status))
        })?;
        Ok(Case {
            id: row.id,
            case_number: row.case_number,
            name: row.name,
            description: row.description,
            area: row.area,
            case_type: row.case_type,
            status,
            authorization_level: ClearanceLevel::from_label(&row.authorization_level),
            created_by: row.created_by,
            reported_by: row.reported_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct EvidenceRow {
    id: i64,
    case_id: i64,
    kind: String,
    content: Option<String>,
    image_path: Option<String>,
    remarks: Option<String>,
    added_by: i64,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EvidenceRow> for Evidence {
    type Error = StoreError;

    fn try_from(row: EvidenceRow) -> Result<Self, Self::Error> {
        let kind = EvidenceKind::parse(&row.kind).ok_or_else(|| {
            StoreError::Backend(format!("evidence {} has invalid kind '{}'", row.id, row.kind))
        })?;
        Ok(Evidence {
            id: row.id,
            case_id: row.case_id,
            kind,
            content: row.content,
            image_path: row.image_path,
            remarks: row.remarks,
            added_by: row.added_by,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct AuditRow {
    id: i64,
    user_id: i64,
    action: String,
    entity_type: String,
    entity_id: i64,
    old_value: Option<String>,
    new_value: Option<String>,
    ip_address: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditEntry {
    type Error = StoreError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let action = AuditAction::parse(&row.action).ok_or_else(|| {
            StoreError::Backend(format!("audit {} has invalid action '{}'", row.id, row.action))
        })?;
        Ok(AuditEntry {
            id: row.id,
            user_id: row.user_id,
            action,
            entity_type: row.entity_type,
            entity_id: row.entity_id,
            old_value: row.old_value,
            new_value: row.new_value,
            ip_address: row.ip_address,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct PersonRow {
    id: i64,
    case_id: i64,
    kind: String,
    first_name: String,
    last_name: String,
    age: Option<i32>,
    gender: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    notes: Option<String>,
    description: Option<String>,
    is_arrested: Option<bool>,
    injury_description: Option<String>,
    statement: Option<String>,
    added_by: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PersonRow> for Person {
    type Error = StoreError;

    fn try_from(row: PersonRow) -> Result<Self, Self::Error> {
        let kind = PersonKind::parse(&row.kind).ok_or_else(|| {
            StoreError::Backend(format!("person {} has invalid kind '{}'", row.id, row.kind))
        })?;
        Ok(Person {
            id: row.id,
            case_id: row.case_id,
            kind,
            first_name: row.first_name,
            last_name: row.last_name,
            age: row.age,
            gender: row.gender,
            address: row.address,
            phone: row.phone,
            notes: row.notes,
            description: row.description,
            is_arrested: row.is_arrested,
            injury_description: row.injury_description,
            statement: row.statement,
            added_by: row.added_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ReportRow {
    id: i64,
    report_id: String,
    title: String,
    description: String,
    location: Option<String>,
    civil_id: Option<String>,
    email: Option<String>,
    name: Option<String>,
    reporter_role: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReportRow> for Report {
    type Error = StoreError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        let status = ReportStatus::parse(&row.status).ok_or_else(|| {
            StoreError::Backend(format!("report {} has invalid status '{}'", row.id, row.status))
        })?;
        Ok(Report {
            id: row.id,
            report_id: row.report_id,
            title: row.title,
            description: row.description,
            location: row.location,
            civil_id: row.civil_id,
            email: row.email,
            name: row.name,
            reporter_role: row.reporter_role,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn missing(what: &str, id: impl std::fmt::Display) -> StoreError {
    StoreError::NotFound(format!("{} {}", what, id))
}

fn convert_all<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

const USER_COLUMNS: &str = "id, username, email, full_name, password_hash, role, clearance, \
     is_active, last_login, created_at, updated_at";
const CASE_COLUMNS: &str = "id, case_number, name, description, area, case_type, status, \
     authorization_level, created_by, reported_by, created_at, updated_at";
const EVIDENCE_COLUMNS: &str = "id, case_id, kind, content, image_path, remarks, added_by, \
     is_deleted, created_at, updated_at";
const AUDIT_COLUMNS: &str = "id, user_id, action, entity_type, entity_id, old_value, new_value, \
     ip_address, created_at";
const PERSON_COLUMNS: &str = "id, case_id, kind, first_name, last_name, age, gender, address, \
     phone, notes, description, is_arrested, injury_description, statement, added_by, \
     created_at, updated_at";
const REPORT_COLUMNS: &str = "id, report_id, title, description, location, civil_id, email, \
     name, reporter_role, status, created_at, updated_at";

// =============================================================================
// Users
// =============================================================================

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (username, email, full_name, password_hash, role, clearance) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            USER_COLUMNS
        );
        let row: UserRow = sqlx::query_as(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.full_name)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(user.clearance.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn get_user(&self, id: i64) -> StoreResult<User> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::from).ok_or_else(|| missing("user", id))
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<User> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::from).ok_or_else(|| missing("user", username))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        let rows: Vec<UserRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update_user(&self, id: i64, update: UserUpdate) -> StoreResult<User> {
        let sql = format!(
            "UPDATE users SET \
                email = COALESCE($2, email), \
                full_name = COALESCE($3, full_name), \
                password_hash = COALESCE($4, password_hash), \
                role = COALESCE($5, role), \
                clearance = COALESCE($6, clearance), \
                is_active = COALESCE($7, is_active), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(update.email)
            .bind(update.full_name)
            .bind(update.password_hash)
            .bind(update.role.map(|r| r.as_str()))
            .bind(update.clearance.map(|c| c.as_str()))
            .bind(update.is_active)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::from).ok_or_else(|| missing("user", id))
    }

    async fn touch_last_login(&self, id: i64) -> StoreResult<()> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_admins(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Cases
// =============================================================================

#[async_trait]
impl CaseStore for PgStore {
    async fn create_case(&self, case: NewCase) -> StoreResult<Case> {
        let sql = format!(
            "INSERT INTO cases (case_number, name, description, area, case_type, \
                authorization_level, created_by, reported_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            CASE_COLUMNS
        );
        let row: CaseRow = sqlx::query_as(&sql)
            .bind(&case.case_number)
            .bind(&case.name)
            .bind(&case.description)
            .bind(&case.area)
            .bind(&case.case_type)
            .bind(case.authorization_level.as_str())
            .bind(case.created_by)
            .bind(case.reported_by)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn get_case(&self, id: i64) -> StoreResult<Case> {
        let sql = format!("SELECT {} FROM cases WHERE id = $1", CASE_COLUMNS);
        let row: Option<CaseRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or_else(|| missing("case", id))?.try_into()
    }

    async fn list_cases(&self) -> StoreResult<Vec<Case>> {
        let sql = format!("SELECT {} FROM cases ORDER BY id", CASE_COLUMNS);
        let rows: Vec<CaseRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        convert_all(rows)
    }

    async fn update_case(&self, id: i64, update: CaseUpdate) -> StoreResult<Case> {
        let sql = format!(
            "UPDATE cases SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                area = COALESCE($4, area), \
                case_type = COALESCE($5, case_type), \
                authorization_level = COALESCE($6, authorization_level), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            CASE_COLUMNS
        );
        let row: Option<CaseRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(update.name)
            .bind(update.description)
            .bind(update.area)
            .bind(update.case_type)
            .bind(update.authorization_level.map(|l| l.as_str()))
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or_else(|| missing("case", id))?.try_into()
    }

    async fn set_case_status(&self, id: i64, status: CaseStatus) -> StoreResult<Case> {
        let sql = format!(
            "UPDATE cases SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            CASE_COLUMNS
        );
        let row: Option<CaseRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or_else(|| missing("case", id))?.try_into()
    }

    async fn add_assignee(&self, case_id: i64, user_id: i64) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO case_assignees (case_id, user_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(case_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_assignee(&self, case_id: i64, user_id: i64) -> StoreResult<()> {
        sqlx::query("DELETE FROM case_assignees WHERE case_id = $1 AND user_id = $2")
            .bind(case_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_assignees(&self, case_id: i64) -> StoreResult<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE id IN \
                (SELECT user_id FROM case_assignees WHERE case_id = $1) ORDER BY id",
            USER_COLUMNS
        );
        let rows: Vec<UserRow> = sqlx::query_as(&sql)
            .bind(case_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn is_assignee(&self, case_id: i64, user_id: i64) -> StoreResult<bool> {
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM case_assignees WHERE case_id = $1 AND user_id = $2)",
        )
        .bind(case_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(found)
    }

    async fn list_cases_for_assignee(&self, user_id: i64) -> StoreResult<Vec<Case>> {
        let sql = format!(
            "SELECT {} FROM cases WHERE id IN \
                (SELECT case_id FROM case_assignees WHERE user_id = $1) ORDER BY id",
            CASE_COLUMNS
        );
        let rows: Vec<CaseRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }
}

// =============================================================================
// Evidence
// =============================================================================

#[async_trait]
impl EvidenceStore for PgStore {
    async fn create_evidence(&self, evidence: NewEvidence) -> StoreResult<Evidence> {
        let sql = format!(
            "INSERT INTO evidence (case_id, kind, content, image_path, remarks, added_by) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            EVIDENCE_COLUMNS
        );
        let row: EvidenceRow = sqlx::query_as(&sql)
            .bind(evidence.case_id)
            .bind(evidence.kind.as_str())
            .bind(evidence.content)
            .bind(evidence.image_path)
            .bind(evidence.remarks)
            .bind(evidence.added_by)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn get_evidence(&self, id: i64) -> StoreResult<Evidence> {
        let sql = format!("SELECT {} FROM evidence WHERE id = $1", EVIDENCE_COLUMNS);
        let row: Option<EvidenceRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or_else(|| missing("evidence", id))?.try_into()
    }

    async fn list_evidence_by_case(&self, case_id: i64) -> StoreResult<Vec<Evidence>> {
        let sql = format!(
            "SELECT {} FROM evidence WHERE case_id = $1 AND NOT is_deleted ORDER BY id",
            EVIDENCE_COLUMNS
        );
        let rows: Vec<EvidenceRow> = sqlx::query_as(&sql)
            .bind(case_id)
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn list_active_text_evidence(&self) -> StoreResult<Vec<Evidence>> {
        let sql = format!(
            "SELECT {} FROM evidence WHERE kind = 'text' AND NOT is_deleted ORDER BY id",
            EVIDENCE_COLUMNS
        );
        let rows: Vec<EvidenceRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        convert_all(rows)
    }

    async fn update_remarks(&self, id: i64, remarks: Option<String>) -> StoreResult<Evidence> {
        let sql = format!(
            "UPDATE evidence SET remarks = $2, updated_at = NOW() \
             WHERE id = $1 AND NOT is_deleted RETURNING {}",
            EVIDENCE_COLUMNS
        );
        let row: Option<EvidenceRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(remarks)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => row.try_into(),
            None => Err(self.inactive_evidence(id).await),
        }
    }

    async fn mark_evidence_deleted(&self, id: i64) -> StoreResult<Evidence> {
        let sql = format!(
            "UPDATE evidence SET is_deleted = TRUE, updated_at = NOW() \
             WHERE id = $1 AND NOT is_deleted RETURNING {}",
            EVIDENCE_COLUMNS
        );
        let row: Option<EvidenceRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => row.try_into(),
            None => Err(self.inactive_evidence(id).await),
        }
    }

    async fn delete_evidence(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM evidence WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(missing("evidence", id));
        }
        Ok(())
    }
}

// =============================================================================
// Audit
// =============================================================================

#[async_trait]
impl AuditStore for PgStore {
    async fn append_audit(&self, entry: NewAuditEntry) -> StoreResult<AuditEntry> {
        let sql = format!(
            "INSERT INTO audit_logs \
                (user_id, action, entity_type, entity_id, old_value, new_value, ip_address) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            AUDIT_COLUMNS
        );
        let row: AuditRow = sqlx::query_as(&sql)
            .bind(entry.user_id)
            .bind(entry.action.as_str())
            .bind(&entry.entity_type)
            .bind(entry.entity_id)
            .bind(entry.old_value)
            .bind(entry.new_value)
            .bind(entry.ip_address)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn list_audit_by_user(&self, user_id: i64) -> StoreResult<Vec<AuditEntry>> {
        let sql = format!(
            "SELECT {} FROM audit_logs WHERE user_id = $1 ORDER BY id DESC",
            AUDIT_COLUMNS
        );
        let rows: Vec<AuditRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn list_audit_by_entity(
        &self,
        entity_type: &str,
        entity_id: i64,
    ) -> StoreResult<Vec<AuditEntry>> {
        let sql = format!(
            "SELECT {} FROM audit_logs WHERE entity_type = $1 AND entity_id = $2 \
             ORDER BY id DESC",
            AUDIT_COLUMNS
        );
        let rows: Vec<AuditRow> = sqlx::query_as(&sql)
            .bind(entity_type)
            .bind(entity_id)
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }
}

// =============================================================================
// Persons
// =============================================================================

#[async_trait]
impl PersonStore for PgStore {
    async fn create_person(&self, person: NewPerson) -> StoreResult<Person> {
        let f = person.fields;
        let sql = format!(
            "INSERT INTO persons (case_id, kind, first_name, last_name, age, gender, address, \
                phone, notes, description, is_arrested, injury_description, statement, added_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING {}",
            PERSON_COLUMNS
        );
        let row: PersonRow = sqlx::query_as(&sql)
            .bind(person.case_id)
            .bind(person.kind.as_str())
            .bind(f.first_name)
            .bind(f.last_name)
            .bind(f.age)
            .bind(f.gender)
            .bind(f.address)
            .bind(f.phone)
            .bind(f.notes)
            .bind(f.description)
            .bind(f.is_arrested)
            .bind(f.injury_description)
            .bind(f.statement)
            .bind(person.added_by)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn get_person(&self, id: i64) -> StoreResult<Person> {
        let sql = format!("SELECT {} FROM persons WHERE id = $1", PERSON_COLUMNS);
        let row: Option<PersonRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or_else(|| missing("person", id))?.try_into()
    }

    async fn list_persons(&self, case_id: i64, kind: PersonKind) -> StoreResult<Vec<Person>> {
        let sql = format!(
            "SELECT {} FROM persons WHERE case_id = $1 AND kind = $2 ORDER BY id",
            PERSON_COLUMNS
        );
        let rows: Vec<PersonRow> = sqlx::query_as(&sql)
            .bind(case_id)
            .bind(kind.as_str())
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn update_person(&self, id: i64, fields: PersonFields) -> StoreResult<Person> {
        let sql = format!(
            "UPDATE persons SET first_name = $2, last_name = $3, age = $4, gender = $5, \
                address = $6, phone = $7, notes = $8, description = $9, is_arrested = $10, \
                injury_description = $11, statement = $12, updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            PERSON_COLUMNS
        );
        let row: Option<PersonRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(fields.first_name)
            .bind(fields.last_name)
            .bind(fields.age)
            .bind(fields.gender)
            .bind(fields.address)
            .bind(fields.phone)
            .bind(fields.notes)
            .bind(fields.description)
            .bind(fields.is_arrested)
            .bind(fields.injury_description)
            .bind(fields.statement)
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or_else(|| missing("person", id))?.try_into()
    }

    async fn delete_person(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM persons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(missing("person", id));
        }
        Ok(())
    }
}

// =============================================================================
// Reports
// =============================================================================

#[async_trait]
impl ReportStore for PgStore {
    async fn create_report(&self, report: NewReport) -> StoreResult<Report> {
        let sql = format!(
            "INSERT INTO reports (report_id, title, description, location, civil_id, email, \
                name, reporter_role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            REPORT_COLUMNS
        );
        let row: ReportRow = sqlx::query_as(&sql)
            .bind(report.report_id)
            .bind(report.title)
            .bind(report.description)
            .bind(report.location)
            .bind(report.civil_id)
            .bind(report.email)
            .bind(report.name)
            .bind(report.reporter_role)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn get_report(&self, id: i64) -> StoreResult<Report> {
        let sql = format!("SELECT {} FROM reports WHERE id = $1", REPORT_COLUMNS);
        let row: Option<ReportRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or_else(|| missing("report", id))?.try_into()
    }

    async fn find_report_by_tracking_id(&self, report_id: &str) -> StoreResult<Report> {
        let sql = format!("SELECT {} FROM reports WHERE report_id = $1", REPORT_COLUMNS);
        let row: Option<ReportRow> = sqlx::query_as(&sql)
            .bind(report_id)
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or_else(|| missing("report", report_id))?.try_into()
    }

    async fn list_reports(&self) -> StoreResult<Vec<Report>> {
        let sql = format!("SELECT {} FROM reports ORDER BY id DESC", REPORT_COLUMNS);
        let rows: Vec<ReportRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        convert_all(rows)
    }

    async fn set_report_status(&self, id: i64, status: ReportStatus) -> StoreResult<Report> {
        let sql = format!(
            "UPDATE reports SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            REPORT_COLUMNS
        );
        let row: Option<ReportRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or_else(|| missing("report", id))?.try_into()
    }

    async fn link_report(&self, case_id: i64, report_id: i64) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO case_reports (case_id, report_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(case_id)
        .bind(report_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn linked_case(&self, report_id: i64) -> StoreResult<Option<Case>> {
        let sql = format!(
            "SELECT {} FROM cases WHERE id = \
                (SELECT case_id FROM case_reports WHERE report_id = $1 \
                 ORDER BY linked_at, case_id LIMIT 1)",
            CASE_COLUMNS
        );
        let row: Option<CaseRow> = sqlx::query_as(&sql)
            .bind(report_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Case::try_from).transpose()
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
