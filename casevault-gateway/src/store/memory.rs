// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! In-memory store
//!
//! Used by tests and by deployments without `DATABASE_URL`. Identifiers come
//! from one counter shared by every table, starting at 1.

use async_trait::async_trait;
use casevault_authz::{CaseStatus, EvidenceKind, Role};
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::models::*;
use super::{
    AuditStore, CaseStore, EvidenceStore, PersonStore, ReportStore, Store, StoreError,
    StoreResult, UserStore,
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    cases: BTreeMap<i64, Case>,
    assignees: BTreeSet<(i64, i64)>,
    evidence: BTreeMap<i64, Evidence>,
    audit: BTreeMap<i64, AuditEntry>,
    persons: BTreeMap<i64, Person>,
    reports: BTreeMap<i64, Report>,
    // (report_id, case_id) in link order
    report_links: Vec<(i64, i64)>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory implementation of [`Store`].
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_audit_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every audit append fail with a backend error.
    pub fn set_fail_audit_writes(&self, fail: bool) {
        self.fail_audit_writes.store(fail, Ordering::SeqCst);
    }
}

fn not_found(what: &str, id: impl std::fmt::Display) -> StoreError {
    StoreError::NotFound(format!("{} {}", what, id))
}

fn already_deleted(id: i64) -> StoreError {
    StoreError::Conflict(format!("evidence {} is deleted", id))
}

// =============================================================================
// Users
// =============================================================================

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict("username already taken".to_string()));
        }
        if t.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }

        let id = t.allocate_id();
        let now = Utc::now();
        let record = User {
            id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            password_hash: user.password_hash,
            role: user.role,
            clearance: user.clearance,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        t.users.insert(id, record.clone());
        Ok(record)
    }

    async fn get_user(&self, id: i64) -> StoreResult<User> {
        let t = self.tables.read().await;
        t.users.get(&id).cloned().ok_or_else(|| not_found("user", id))
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<User> {
        let t = self.tables.read().await;
        t.users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| not_found("user", username))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let t = self.tables.read().await;
        Ok(t.users.values().cloned().collect())
    }

    async fn update_user(&self, id: i64, update: UserUpdate) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if let Some(email) = &update.email {
            if t.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(StoreError::Conflict("email already registered".to_string()));
            }
        }

        let user = t.users.get_mut(&id).ok_or_else(|| not_found("user", id))?;
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(full_name) = update.full_name {
            user.full_name = full_name;
        }
        if let Some(hash) = update.password_hash {
            user.password_hash = hash;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(clearance) = update.clearance {
            user.clearance = clearance;
        }
        if let Some(active) = update.is_active {
            user.is_active = active;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn touch_last_login(&self, id: i64) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        let user = t.users.get_mut(&id).ok_or_else(|| not_found("user", id))?;
        user.last_login = Some(Utc::now());
        Ok(())
    }

    async fn count_admins(&self) -> StoreResult<i64> {
        let t = self.tables.read().await;
        Ok(t.users.values().filter(|u| u.role == Role::Admin).count() as i64)
    }
}

// =============================================================================
// Cases
// =============================================================================

#[async_trait]
impl CaseStore for MemoryStore {
    async fn create_case(&self, case: NewCase) -> StoreResult<Case> {
        let mut t = self.tables.write().await;
        if t.cases.values().any(|c| c.case_number == case.case_number) {
            return Err(StoreError::Conflict("case number already exists".to_string()));
        }

        let id = t.allocate_id();
        let now = Utc::now();
        let record = Case {
            id,
            case_number: case.case_number,
            name: case.name,
            description: case.description,
            area: case.area,
            case_type: case.case_type,
            status: CaseStatus::Pending,
            authorization_level: case.authorization_level,
            created_by: case.created_by,
            reported_by: case.reported_by,
            created_at: now,
            updated_at: now,
        };
        t.cases.insert(id, record.clone());
        Ok(record)
    }

    async fn get_case(&self, id: i64) -> StoreResult<Case> {
        let t = self.tables.read().await;
        t.cases.get(&id).cloned().ok_or_else(|| not_found("case", id))
    }

    async fn list_cases(&self) -> StoreResult<Vec<Case>> {
        let t = self.tables.read().await;
        Ok(t.cases.values().cloned().collect())
    }

    async fn update_case(&self, id: i64, update: CaseUpdate) -> StoreResult<Case> {
        let mut t = self.tables.write().await;
        let case = t.cases.get_mut(&id).ok_or_else(|| not_found("case", id))?;
        if let Some(name) = update.name {
            case.name = name;
        }
        if let Some(description) = update.description {
            case.description = description;
        }
        if let Some(area) = update.area {
            case.area = area;
        }
        if let Some(case_type) = update.case_type {
            case.case_type = case_type;
        }
        if let Some(level) = update.authorization_level {
            case.authorization_level = level;
        }
        case.updated_at = Utc::now();
        Ok(case.clone())
    }

    async fn set_case_status(&self, id: i64, status: CaseStatus) -> StoreResult<Case> {
        let mut t = self.tables.write().await;
        let case = t.cases.get_mut(&id).ok_or_else(|| not_found("case", id))?;
        case.status = status;
        case.updated_at = Utc::now();
        Ok(case.clone())
    }

    async fn add_assignee(&self, case_id: i64, user_id: i64) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if !t.cases.contains_key(&case_id) {
            return Err(not_found("case", case_id));
        }
        if !t.users.contains_key(&user_id) {
            return Err(not_found("user", user_id));
        }
        t.assignees.insert((case_id, user_id));
        Ok(())
    }

    async fn remove_assignee(&self, case_id: i64, user_id: i64) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        t.assignees.remove(&(case_id, user_id));
        Ok(())
    }

    async fn list_assignees(&self, case_id: i64) -> StoreResult<Vec<User>> {
        let t = self.tables.read().await;
        Ok(t.assignees
            .iter()
            .filter(|(c, _)| *c == case_id)
            .filter_map(|(_, u)| t.users.get(u).cloned())
            .collect())
    }

    async fn is_assignee(&self, case_id: i64, user_id: i64) -> StoreResult<bool> {
        let t = self.tables.read().await;
        Ok(t.assignees.contains(&(case_id, user_id)))
    }

    async fn list_cases_for_assignee(&self, user_id: i64) -> StoreResult<Vec<Case>> {
        let t = self.tables.read().await;
        Ok(t.assignees
            .iter()
            .filter(|(_, u)| *u == user_id)
            .filter_map(|(c, _)| t.cases.get(c).cloned())
            .collect())
    }
}

// =============================================================================
// Evidence
// =============================================================================

#[async_trait]
impl EvidenceStore for MemoryStore {
    async fn create_evidence(&self, evidence: NewEvidence) -> StoreResult<Evidence> {
        let mut t = self.tables.write().await;
        if !t.cases.contains_key(&evidence.case_id) {
            return Err(not_found("case", evidence.case_id));
        }

        let id = t.allocate_id();
        let now = Utc::now();
        let record = Evidence {
            id,
            case_id: evidence.case_id,
            kind: evidence.kind,
            content: evidence.content,
            image_path: evidence.image_path,
            remarks: evidence.remarks,
            added_by: evidence.added_by,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        t.evidence.insert(id, record.clone());
        Ok(record)
    }

    async fn get_evidence(&self, id: i64) -> StoreResult<Evidence> {
        let t = self.tables.read().await;
        t.evidence
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("evidence", id))
    }

    async fn list_evidence_by_case(&self, case_id: i64) -> StoreResult<Vec<Evidence>> {
        let t = self.tables.read().await;
        Ok(t.evidence
            .values()
            .filter(|e| e.case_id == case_id && !e.is_deleted)
            .cloned()
            .collect())
    }

    async fn list_active_text_evidence(&self) -> StoreResult<Vec<Evidence>> {
        let t = self.tables.read().await;
        Ok(t.evidence
            .values()
            .filter(|e| e.kind == EvidenceKind::Text && !e.is_deleted)
            .cloned()
            .collect())
    }

    async fn update_remarks(&self, id: i64, remarks: Option<String>) -> StoreResult<Evidence> {
        let mut t = self.tables.write().await;
        let e = t
            .evidence
            .get_mut(&id)
            .ok_or_else(|| not_found("evidence", id))?;
        if e.is_deleted {
            return Err(already_deleted(id));
        }
        e.remarks = remarks;
        e.updated_at = Utc::now();
        Ok(e.clone())
    }

    async fn mark_evidence_deleted(&self, id: i64) -> StoreResult<Evidence> {
        let mut t = self.tables.write().await;
        let e = t
            .evidence
            .get_mut(&id)
            .ok_or_else(|| not_found("evidence", id))?;
        if e.is_deleted {
            return Err(already_deleted(id));
        }
        e.is_deleted = true;
        e.updated_at = Utc::now();
        Ok(e.clone())
    }

    async fn delete_evidence(&self, id: i64) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        t.evidence
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("evidence", id))
    }
}

// =============================================================================
// Audit
// =============================================================================

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append_audit(&self, entry: NewAuditEntry) -> StoreResult<AuditEntry> {
        if self.fail_audit_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("audit table unavailable".to_string()));
        }

        let mut t = self.tables.write().await;
        let id = t.allocate_id();
        let record = AuditEntry {
            id,
            user_id: entry.user_id,
            action: entry.action,
            entity_type: entry.entity_type,
            entity_id: entry.entity_id,
            old_value: entry.old_value,
            new_value: entry.new_value,
            ip_address: entry.ip_address,
            created_at: Utc::now(),
        };
        t.audit.insert(id, record.clone());
        Ok(record)
    }

    async fn list_audit_by_user(&self, user_id: i64) -> StoreResult<Vec<AuditEntry>> {
        let t = self.tables.read().await;
        Ok(t.audit
            .values()
            .rev()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_audit_by_entity(
        &self,
        entity_type: &str,
        entity_id: i64,
    ) -> StoreResult<Vec<AuditEntry>> {
        let t = self.tables.read().await;
        Ok(t.audit
            .values()
            .rev()
            .filter(|a| a.entity_type == entity_type && a.entity_id == entity_id)
            .cloned()
            .collect())
    }
}

// =============================================================================
// Persons
// =============================================================================

#[async_trait]
impl PersonStore for MemoryStore {
    async fn create_person(&self, person: NewPerson) -> StoreResult<Person> {
        let mut t = self.tables.write().await;
        if !t.cases.contains_key(&person.case_id) {
            return Err(not_found("case", person.case_id));
        }

        let id = t.allocate_id();
        let now = Utc::now();
        let f = person.fields;
        let record = Person {
            id,
            case_id: person.case_id,
            kind: person.kind,
            first_name: f.first_name,
            last_name: f.last_name,
            age: f.age,
            gender: f.gender,
            address: f.address,
            phone: f.phone,
            notes: f.notes,
            description: f.description,
            is_arrested: f.is_arrested,
            injury_description: f.injury_description,
            statement: f.statement,
            added_by: person.added_by,
            created_at: now,
            updated_at: now,
        };
        t.persons.insert(id, record.clone());
        Ok(record)
    }

    async fn get_person(&self, id: i64) -> StoreResult<Person> {
        let t = self.tables.read().await;
        t.persons
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("person", id))
    }

    async fn list_persons(&self, case_id: i64, kind: PersonKind) -> StoreResult<Vec<Person>> {
        let t = self.tables.read().await;
        Ok(t.persons
            .values()
            .filter(|p| p.case_id == case_id && p.kind == kind)
            .cloned()
            .collect())
    }

    async fn update_person(&self, id: i64, fields: PersonFields) -> StoreResult<Person> {
        let mut t = self.tables.write().await;
        let p = t
            .persons
            .get_mut(&id)
            .ok_or_else(|| not_found("person", id))?;
        p.first_name = fields.first_name;
        p.last_name = fields.last_name;
        p.age = fields.age;
        p.gender = fields.gender;
        p.address = fields.address;
        p.phone = fields.phone;
        p.notes = fields.notes;
        p.description = fields.description;
        p.is_arrested = fields.is_arrested;
        p.injury_description = fields.injury_description;
        p.statement = fields.statement;
        p.updated_at = Utc::now();
        Ok(p.clone())
    }

    async fn delete_person(&self, id: i64) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        t.persons
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("person", id))
    }
}

// =============================================================================
// Reports
// =============================================================================

#[async_trait]
impl ReportStore for MemoryStore {
    async fn create_report(&self, report: NewReport) -> StoreResult<Report> {
        let mut t = self.tables.write().await;
        if t.reports.values().any(|r| r.report_id == report.report_id) {
            return Err(StoreError::Conflict("report id already exists".to_string()));
        }

        let id = t.allocate_id();
        let now = Utc::now();
        let record = Report {
            id,
            report_id: report.report_id,
            title: report.title,
            description: report.description,
            location: report.location,
            civil_id: report.civil_id,
            email: report.email,
            name: report.name,
            reporter_role: report.reporter_role,
            status: ReportStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        t.reports.insert(id, record.clone());
        Ok(record)
    }

    async fn get_report(&self, id: i64) -> StoreResult<Report> {
        let t = self.tables.read().await;
        t.reports
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("report", id))
    }

    async fn find_report_by_tracking_id(&self, report_id: &str) -> StoreResult<Report> {
        let t = self.tables.read().await;
        t.reports
            .values()
            .find(|r| r.report_id == report_id)
            .cloned()
            .ok_or_else(|| not_found("report", report_id))
    }

    async fn list_reports(&self) -> StoreResult<Vec<Report>> {
        let t = self.tables.read().await;
        Ok(t.reports.values().rev().cloned().collect())
    }

    async fn set_report_status(&self, id: i64, status: ReportStatus) -> StoreResult<Report> {
        let mut t = self.tables.write().await;
        let r = t
            .reports
            .get_mut(&id)
            .ok_or_else(|| not_found("report", id))?;
        r.status = status;
        r.updated_at = Utc::now();
        Ok(r.clone())
    }

    async fn link_report(&self, case_id: i64, report_id: i64) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if !t.cases.contains_key(&case_id) {
            return Err(not_found("case", case_id));
        }
        if !t.reports.contains_key(&report_id) {
            return Err(not_found("report", report_id));
        }
        if !t.report_links.contains(&(report_id, case_id)) {
            t.report_links.push((report_id, case_id));
        }
        Ok(())
    }

    async fn linked_case(&self, report_id: i64) -> StoreResult<Option<Case>> {
        let t = self.tables.read().await;
        Ok(t.report_links
            .iter()
            .find(|(r, _)| *r == report_id)
            .and_then(|(_, c)| t.cases.get(c).cloned()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
