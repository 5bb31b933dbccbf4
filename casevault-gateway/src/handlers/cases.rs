// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthUser;
use crate::cases::{CreateCaseRequest, UpdateCaseRequest};
use crate::error::{ApiError, ApiResult};
use crate::reports::{render_case_report, CaseReport};
use crate::state::AppState;
use crate::store::{Case, Evidence, User};

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub user_id: i64,
}

/// `POST /api/cases`
pub async fn create_case(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateCaseRequest>,
) -> ApiResult<(StatusCode, Json<Case>)> {
    let case = state.cases.create_case(&user.principal, req).await?;
    Ok((StatusCode::CREATED, Json(case)))
}

/// `GET /api/cases`
pub async fn list_cases(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<Case>>> {
    Ok(Json(state.cases.list_cases(&user.principal).await?))
}

/// `GET /api/cases/:id`
pub async fn get_case(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Case>> {
    Ok(Json(state.cases.visible_case(&user.principal, id).await?))
}

/// `PUT /api/cases/:id`
pub async fn update_case(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateCaseRequest>,
) -> ApiResult<Json<Case>> {
    Ok(Json(state.cases.update_case(&user.principal, id, req).await?))
}

/// `PUT /api/cases/:id/status`
pub async fn update_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<StatusRequest>,
) -> ApiResult<Json<Case>> {
    Ok(Json(
        state
            .cases
            .update_status(&user.principal, id, &req.status)
            .await?,
    ))
}

/// `GET /api/cases/:id/assignees`
pub async fn list_assignees(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.cases.assignees(&user.principal, id).await?))
}

/// `POST /api/cases/:id/assignees`
pub async fn add_assignee(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<AssignRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    state
        .cases
        .assign_user(&user.principal, id, req.user_id)
        .await?;
    Ok(Json(json!({ "case_id": id, "user_id": req.user_id, "assigned": true })))
}

/// `DELETE /api/cases/:id/assignees/:user_id`
pub async fn remove_assignee(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, user_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    state
        .cases
        .remove_assignee(&user.principal, id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/cases/:id/evidence`, soft-deleted items excluded.
pub async fn case_evidence(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<Evidence>>> {
    Ok(Json(state.evidence.list_for_case(&user.principal, id).await?))
}

/// `GET /api/cases/:id/report`
pub async fn case_report(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let report = CaseReport::assemble(&state.store, &state.cases, &user.principal, id).await?;
    let filename = format!("{}.pdf", report.case.case_number);

    // Rendering is CPU bound.
    let pdf = tokio::task::spawn_blocking(move || render_case_report(&report))
        .await
        .map_err(|e| ApiError::StorageFailure(format!("render task failed: {}", e)))??;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        pdf,
    )
        .into_response())
}
