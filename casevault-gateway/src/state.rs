// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Application state shared by every handler.
//!
//! All collaborators are built once here and injected; nothing is global.

use axum::extract::FromRef;
use std::sync::Arc;

use crate::audit::AuditTrail;
use crate::auth::{AuthState, Authenticator, TokenService};
use crate::cases::CaseAuthority;
use crate::evidence::EvidenceManager;
use crate::handlers::HealthState;
use crate::metrics::Metrics;
use crate::objects::ObjectStore;
use crate::persons::PersonRegistry;
use crate::reports::ReportDesk;
use crate::store::Store;
use crate::users::UserDirectory;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth: AuthState,
    pub users: UserDirectory,
    pub cases: CaseAuthority,
    pub evidence: Arc<EvidenceManager>,
    pub persons: PersonRegistry,
    pub reports: ReportDesk,
    pub audit: AuditTrail,
    pub metrics: Metrics,
    pub health: HealthState,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        objects: Arc<dyn ObjectStore>,
        bucket: &str,
        tokens: TokenService,
        metrics: Metrics,
        health: HealthState,
    ) -> Self {
        let audit = AuditTrail::new(store.clone(), metrics.clone());
        let cases = CaseAuthority::new(store.clone(), metrics.clone());
        let evidence = EvidenceManager::new(
            store.clone(),
            objects,
            bucket,
            audit.clone(),
            metrics.clone(),
        );

        Self {
            auth: AuthState::new(Arc::new(Authenticator::new(store.clone(), tokens))),
            users: UserDirectory::new(store.clone()),
            persons: PersonRegistry::new(store.clone(), cases.clone()),
            reports: ReportDesk::new(store.clone(), cases.clone()),
            evidence: Arc::new(evidence),
            cases,
            audit,
            metrics,
            health,
            store,
        }
    }
}

impl FromRef<AppState> for Metrics {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}

impl FromRef<AppState> for HealthState {
    fn from_ref(state: &AppState) -> Self {
        state.health.clone()
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
