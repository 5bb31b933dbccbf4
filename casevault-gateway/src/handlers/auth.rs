// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::auth::LoginResponse;
use crate::error::ApiResult;
use crate::state::AppState;
use crate::store::User;
use crate::users::RegisterRequest;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let response = state
        .auth
        .authenticator
        .login(&req.username, &req.password)
        .await?;
    Ok(Json(response))
}

/// `POST /register`
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.users.register(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
