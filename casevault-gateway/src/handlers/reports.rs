// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::reports::{PublicStatus, SubmitReportRequest, SubmittedReport};
use crate::state::AppState;
use crate::store::Report;

#[derive(Debug, Deserialize)]
pub struct ReportStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct LinkReportRequest {
    pub report_id: i64,
}

/// `POST /api/public/reports`, no authentication.
pub async fn submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitReportRequest>,
) -> ApiResult<(StatusCode, Json<SubmittedReport>)> {
    let submitted = state.reports.submit(req).await?;
    Ok((StatusCode::CREATED, Json(submitted)))
}

/// `GET /api/public/reports/:report_id/status`, no authentication.
pub async fn public_status(
    State(state): State<AppState>,
    Path(report_id): Path<String>,
) -> ApiResult<Json<PublicStatus>> {
    Ok(Json(state.reports.public_status(&report_id).await?))
}

/// `GET /api/reports`
pub async fn list_reports(State(state): State<AppState>) -> ApiResult<Json<Vec<Report>>> {
    Ok(Json(state.reports.list().await?))
}

/// `PUT /api/reports/:id/status`
pub async fn set_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<ReportStatusRequest>,
) -> ApiResult<Json<Report>> {
    Ok(Json(
        state
            .reports
            .set_status(&user.principal, id, &req.status)
            .await?,
    ))
}

/// `POST /api/cases/:id/reports`
pub async fn link_report(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(case_id): Path<i64>,
    Json(req): Json<LinkReportRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    state
        .reports
        .link(&user.principal, case_id, req.report_id)
        .await?;
    Ok(Json(json!({ "case_id": case_id, "report_id": req.report_id, "linked": true })))
}
