// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Person routes. One set per kind, so each builder takes the kind.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put, MethodRouter},
    Json,
};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{PersonFields, PersonKind};

/// `GET /api/cases/:id/{kind}s`
pub fn list(kind: PersonKind) -> MethodRouter<AppState> {
    get(
        move |State(state): State<AppState>, AuthUser(user): AuthUser, Path(case_id): Path<i64>| async move {
            let persons = state.persons.list(&user.principal, case_id, kind).await?;
            Ok::<_, ApiError>(Json(persons))
        },
    )
}

/// `POST /api/cases/:id/{kind}s`
pub fn add(kind: PersonKind) -> MethodRouter<AppState> {
    post(
        move |State(state): State<AppState>,
              AuthUser(user): AuthUser,
              Path(case_id): Path<i64>,
              Json(fields): Json<PersonFields>| async move {
            let person = state
                .persons
                .add(&user.principal, case_id, kind, fields)
                .await?;
            Ok::<_, ApiError>((StatusCode::CREATED, Json(person)))
        },
    )
}

/// `PUT /api/{kind}s/:id`
pub fn update(kind: PersonKind) -> MethodRouter<AppState> {
    put(
        move |State(state): State<AppState>,
              AuthUser(user): AuthUser,
              Path(id): Path<i64>,
              Json(fields): Json<PersonFields>| async move {
            let person = state
                .persons
                .update(&user.principal, kind, id, fields)
                .await?;
            Ok::<_, ApiError>(Json(person))
        },
    )
}

/// `DELETE /api/{kind}s/:id`
pub fn remove(kind: PersonKind) -> MethodRouter<AppState> {
    delete(
        move |State(state): State<AppState>, AuthUser(user): AuthUser, Path(id): Path<i64>| async move {
            state.persons.remove(&user.principal, kind, id).await?;
            Ok::<_, ApiError>(StatusCode::NO_CONTENT)
        },
    )
}
