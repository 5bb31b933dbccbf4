// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;
use crate::store::User;
use crate::users::{CreateUserRequest, UpdateUserRequest};

/// `GET /api/me`
pub async fn me(State(state): State<AppState>, AuthUser(user): AuthUser) -> ApiResult<Json<User>> {
    Ok(Json(state.users.get(user.user_id()).await?))
}

/// `GET /api/users`
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.users.list().await?))
}

/// `GET /api/users/:id`
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.users.get(id).await?))
}

/// `POST /api/users`
pub async fn create_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let created = state.users.create(&user.principal, req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/users/:id`
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.users.update(&user.principal, id, req).await?))
}

/// `DELETE /api/users/:id`, deactivates the account.
pub async fn deactivate_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.users.deactivate(&user.principal, id).await?))
}
