// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! HTTP surface
//!
//! Routes are grouped by guard. Every protected group sits behind
//! `authenticate`; each group then adds its own role/clearance guard.
//!
//! | group         | guard                                  |
//! |---------------|----------------------------------------|
//! | public        | none                                   |
//! | authenticated | any active user                        |
//! | field staff   | investigator, admin, officer           |
//! | managers      | investigator, admin                    |
//! | admins        | admin                                  |
//! | analysts      | investigator, admin + critical clearance |

mod analysis;
mod audit;
mod auth;
mod cases;
mod evidence;
mod health;
mod metrics;
mod persons;
mod reports;
mod users;

pub use health::{health_live, health_ready, health_startup, HealthState};
pub use metrics::metrics_handler;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use casevault_authz::{ClearanceLevel, Guard, ADMINS, CASE_MANAGERS, FIELD_STAFF};
use tower_http::trace::TraceLayer;

use crate::auth::{authenticate, enforce_guard, RouteGuard};
use crate::evidence::MAX_IMAGE_BYTES;
use crate::metrics::track_requests;
use crate::state::AppState;
use crate::store::PersonKind;

const PERSON_ROUTES: [(PersonKind, &str); 3] = [
    (PersonKind::Suspect, "suspects"),
    (PersonKind::Victim, "victims"),
    (PersonKind::Witness, "witnesses"),
];

/// Multipart framing on top of the largest accepted image.
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 64 * 1024;

fn guarded(router: Router<AppState>, guard: Guard, state: &AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(
        RouteGuard::new(guard, state.metrics.clone()),
        enforce_guard,
    ))
}

/// Build the complete application router.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health/live", get(health_live))
        .route("/health/startup", get(health_startup))
        .route("/health/ready", get(health_ready))
        .route("/metrics", get(metrics_handler))
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/api/public/reports", post(reports::submit))
        .route(
            "/api/public/reports/:report_id/status",
            get(reports::public_status),
        );

    let mut authenticated = Router::new()
        .route("/api/me", get(users::me))
        .route("/api/cases", get(cases::list_cases))
        .route("/api/cases/:id", get(cases::get_case))
        .route("/api/cases/:id/assignees", get(cases::list_assignees))
        .route("/api/cases/:id/evidence", get(cases::case_evidence))
        .route("/api/cases/:id/links", get(analysis::case_links))
        .route("/api/evidence/:id", get(evidence::get_evidence))
        .route("/api/evidence/:id/image", get(evidence::get_image));

    let mut field_staff = Router::new()
        .route("/api/cases/:id/status", put(cases::update_status))
        .route("/api/evidence/text", post(evidence::create_text))
        .route(
            "/api/evidence/image",
            post(evidence::create_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        );

    let mut managers = Router::new()
        .route("/api/cases", post(cases::create_case))
        .route("/api/cases/:id", put(cases::update_case))
        .route("/api/cases/:id/assignees", post(cases::add_assignee))
        .route(
            "/api/cases/:id/assignees/:user_id",
            delete(cases::remove_assignee),
        )
        .route("/api/cases/:id/report", get(cases::case_report))
        .route("/api/cases/:id/reports", post(reports::link_report))
        .route("/api/reports", get(reports::list_reports))
        .route("/api/reports/:id/status", put(reports::set_status))
        .route(
            "/api/evidence/:id",
            put(evidence::update_remarks).delete(evidence::soft_delete),
        );

    for (kind, plural) in PERSON_ROUTES {
        authenticated = authenticated.route(&format!("/api/cases/:id/{}", plural), persons::list(kind));
        field_staff = field_staff.route(&format!("/api/cases/:id/{}", plural), persons::add(kind));
        managers = managers.route(
            &format!("/api/{}/:id", plural),
            persons::update(kind).merge(persons::remove(kind)),
        );
    }

    let admins = Router::new()
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::deactivate_user),
        )
        .route("/api/audit/users/:id", get(audit::by_user))
        .route("/api/evidence/:id/audit", get(evidence::evidence_audit))
        .route("/api/evidence/:id/permanent", delete(evidence::hard_delete));

    let analysts = Router::new().route(
        "/api/analysis/word-frequency",
        get(analysis::word_frequencies),
    );

    let protected = Router::new()
        .merge(authenticated)
        .merge(guarded(field_staff, Guard::roles(FIELD_STAFF), &state))
        .merge(guarded(managers, Guard::roles(CASE_MANAGERS), &state))
        .merge(guarded(admins, Guard::roles(ADMINS), &state))
        .merge(guarded(
            analysts,
            Guard::roles(CASE_MANAGERS).with_clearance(ClearanceLevel::Critical),
            &state,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            authenticate,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            track_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
