// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
use axum::{
    extract::{Path, Query, State},
    Json,
};
use casevault_authz::EvidenceKind;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::cases::{extract_links, word_frequency, WordCount};
use crate::error::ApiResult;
use crate::state::AppState;
use crate::store::EvidenceStore;

const DEFAULT_WORD_LIMIT: usize = 50;

#[derive(Debug, Serialize)]
pub struct CaseLinks {
    pub case_id: i64,
    pub links: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct WordFrequencyQuery {
    pub limit: Option<usize>,
}

/// `GET /api/cases/:id/links`
///
/// Links in the case description, then in its active text evidence.
pub async fn case_links(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<CaseLinks>> {
    let case = state.cases.visible_case(&user.principal, id).await?;
    let evidence = state.evidence.list_for_case(&user.principal, id).await?;

    let texts = std::iter::once(case.description.as_str()).chain(
        evidence
            .iter()
            .filter(|e| e.kind == EvidenceKind::Text)
            .filter_map(|e| e.content.as_deref()),
    );

    Ok(Json(CaseLinks {
        case_id: case.id,
        links: extract_links(texts),
    }))
}

/// `GET /api/analysis/word-frequency?limit=N`, over all active text evidence.
pub async fn word_frequencies(
    State(state): State<AppState>,
    Query(query): Query<WordFrequencyQuery>,
) -> ApiResult<Json<Vec<WordCount>>> {
    let evidence = state.store.list_active_text_evidence().await?;
    let limit = query.limit.unwrap_or(DEFAULT_WORD_LIMIT);
    Ok(Json(word_frequency(
        evidence.iter().filter_map(|e| e.content.as_deref()),
        limit,
    )))
}
