// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;

use crate::audit::ENTITY_EVIDENCE;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::evidence::{ImageUpload, NewTextEvidence};
use crate::state::AppState;
use crate::store::{AuditEntry, Evidence};

#[derive(Debug, Deserialize)]
pub struct RemarksRequest {
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HardDeleteRequest {
    #[serde(default)]
    pub confirmation: String,
}

/// `POST /api/evidence/text`
pub async fn create_text(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<NewTextEvidence>,
) -> ApiResult<(StatusCode, Json<Evidence>)> {
    let evidence = state.evidence.create_text(&user, req).await?;
    Ok((StatusCode::CREATED, Json(evidence)))
}

/// `POST /api/evidence/image`, multipart fields `caseId`, `remarks`, `image`.
pub async fn create_image(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Evidence>)> {
    let mut case_id: Option<i64> = None;
    let mut remarks: Option<String> = None;
    let mut filename: Option<String> = None;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::invalid(format!("malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "caseId" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::invalid(e.to_string()))?;
                case_id = Some(
                    raw.trim()
                        .parse()
                        .map_err(|_| ApiError::invalid("caseId must be an integer"))?,
                );
            }
            "remarks" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::invalid(e.to_string()))?;
                remarks = Some(text).filter(|t| !t.is_empty());
            }
            "image" => {
                filename = field.file_name().map(str::to_string);
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::invalid(e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    let upload = ImageUpload {
        case_id: case_id.ok_or_else(|| ApiError::invalid("caseId is required"))?,
        remarks,
        filename,
        data: data.ok_or_else(|| ApiError::invalid("image is required"))?,
    };
    let evidence = state.evidence.create_image(&user, upload).await?;
    Ok((StatusCode::CREATED, Json(evidence)))
}

/// `GET /api/evidence/:id`, soft-deleted items included.
pub async fn get_evidence(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Evidence>> {
    Ok(Json(state.evidence.get(&user.principal, id).await?))
}

/// `GET /api/evidence/:id/image`
pub async fn get_image(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let object = state.evidence.read_image(&user.principal, id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, object.content_type),
            (header::CONTENT_LENGTH, object.size.to_string()),
        ],
        object.data,
    )
        .into_response())
}

/// `PUT /api/evidence/:id`
pub async fn update_remarks(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<RemarksRequest>,
) -> ApiResult<Json<Evidence>> {
    Ok(Json(state.evidence.update_remarks(&user, id, req.remarks).await?))
}

/// `DELETE /api/evidence/:id`
pub async fn soft_delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    state.evidence.soft_delete(&user, id).await?;
    Ok(Json(json!({ "id": id, "deleted": "soft" })))
}

/// `DELETE /api/evidence/:id/permanent`
///
/// A missing or unreadable body counts as a confirmation mismatch.
pub async fn hard_delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    body: Option<Json<HardDeleteRequest>>,
) -> ApiResult<Json<serde_json::Value>> {
    let confirmation = body.map(|Json(req)| req.confirmation).unwrap_or_default();
    state.evidence.hard_delete(&user, id, &confirmation).await?;
    Ok(Json(json!({ "id": id, "deleted": "permanent" })))
}

/// `GET /api/evidence/:id/audit`
pub async fn evidence_audit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<AuditEntry>>> {
    Ok(Json(state.audit.by_entity(ENTITY_EVIDENCE, id).await?))
}
