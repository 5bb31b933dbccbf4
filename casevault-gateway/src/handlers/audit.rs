// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::ApiResult;
use crate::state::AppState;
use crate::store::AuditEntry;

/// `GET /api/audit/users/:id`
pub async fn by_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<AuditEntry>>> {
    state.users.get(user_id).await?;
    Ok(Json(state.audit.by_user(user_id).await?))
}
