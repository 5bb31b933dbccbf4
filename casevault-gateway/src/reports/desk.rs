// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Public crime report desk
//!
//! Anyone may submit a report and receives a tracking id. Staff triage
//! reports and link them to cases. Once linked, the public status follows
//! the case.

use casevault_authz::Principal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::cases::CaseAuthority;
use crate::error::{ApiError, ApiResult};
use crate::store::{NewReport, Report, ReportStatus, ReportStore, Store};

/// Prefix of every public tracking id.
pub const TRACKING_PREFIX: &str = "RPT-";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitReportRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: Option<String>,
    pub civil_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Self-described relation to the incident (victim, witness, ...).
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmittedReport {
    pub report_id: String,
    pub status: ReportStatus,
}

/// Status exposed to the public.
#[derive(Debug, Clone, Serialize)]
pub struct PublicStatus {
    pub report_id: String,
    pub status: String,
}

fn tracking_id() -> String {
    format!("{}{}", TRACKING_PREFIX, Uuid::new_v4())
}

#[derive(Clone)]
pub struct ReportDesk {
    store: Arc<dyn Store>,
    cases: CaseAuthority,
}

impl ReportDesk {
    pub fn new(store: Arc<dyn Store>, cases: CaseAuthority) -> Self {
        Self { store, cases }
    }

    pub async fn submit(&self, req: SubmitReportRequest) -> ApiResult<SubmittedReport> {
        let title = req.title.trim();
        let description = req.description.trim();
        if title.is_empty() || description.is_empty() {
            return Err(ApiError::invalid("title and description are required"));
        }

        let report = self
            .store
            .create_report(NewReport {
                report_id: tracking_id(),
                title: title.to_string(),
                description: description.to_string(),
                location: req.location,
                civil_id: req.civil_id,
                email: req.email,
                name: req.name,
                reporter_role: req.role,
            })
            .await?;

        info!(id = report.id, report_id = %report.report_id, "public report submitted");
        Ok(SubmittedReport {
            report_id: report.report_id,
            status: report.status,
        })
    }

    /// Tracking status for the submitter. Only the status of a linked case
    /// is disclosed, never its identity.
    pub async fn public_status(&self, report_id: &str) -> ApiResult<PublicStatus> {
        let report = self.store.find_report_by_tracking_id(report_id).await?;
        let status = match self.store.linked_case(report.id).await? {
            Some(case) => case.status.to_string(),
            None => report.status.as_str().to_string(),
        };
        Ok(PublicStatus {
            report_id: report.report_id,
            status,
        })
    }

    pub async fn list(&self) -> ApiResult<Vec<Report>> {
        Ok(self.store.list_reports().await?)
    }

    pub async fn set_status(&self, actor: &Principal, id: i64, raw: &str) -> ApiResult<Report> {
        let status = ReportStatus::parse(raw)
            .ok_or_else(|| ApiError::invalid(format!("invalid report status '{}'", raw)))?;
        let report = self.store.set_report_status(id, status).await?;
        info!(id, status = status.as_str(), changed_by = actor.user_id, "report status changed");
        Ok(report)
    }

    /// Link a report to a case the principal can see. Idempotent.
    pub async fn link(&self, actor: &Principal, case_id: i64, report_id: i64) -> ApiResult<()> {
        let case = self.cases.visible_case(actor, case_id).await?;
        let report = self.store.get_report(report_id).await?;
        self.store.link_report(case.id, report.id).await?;
        info!(case_id, report_id, linked_by = actor.user_id, "report linked to case");
        Ok(())
    }
}
