// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Auth Middleware
//!
//! Two layers on every protected route:
//! - `authenticate`: resolves the `Authorization` header to an active user and
//!   injects an [`AuthenticatedUser`] into request extensions
//! - `enforce_guard`: evaluates a [`Guard`] (role allow-list, minimum clearance)
//!   against that user before the handler runs

use axum::{
    body::Body,
    extract::{ConnectInfo, FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use casevault_authz::{Guard, Principal};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, warn};

use super::credentials::Authenticator;
use crate::error::ApiError;
use crate::metrics::Metrics;

// =============================================================================
// Auth State
// =============================================================================

/// Authentication state shared by the authentication layer.
#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Arc<Authenticator>,
}

impl AuthState {
    pub fn new(authenticator: Arc<Authenticator>) -> Self {
        Self { authenticator }
    }
}

// =============================================================================
// Authenticated User (Request Extension)
// =============================================================================

/// Authenticated, active user. Injected into request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub principal: Principal,
    /// Client address, for audit entries
    pub client_ip: Option<String>,
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> i64 {
        self.principal.user_id
    }
}

/// Client address: first `X-Forwarded-For` hop, else the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| peer.map(|p| p.ip().to_string()))
}

// =============================================================================
// Authentication
// =============================================================================

/// Authentication middleware (Basic or Bearer).
pub async fn authenticate(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let path = request.uri().path().to_string();

    let user = auth_state
        .authenticator
        .authenticate_header(header.as_deref())
        .await
        .map_err(|e| {
            warn!(error = %e, path = %path, "authentication failed");
            e
        })?;

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|c| c.0);
    let authenticated = AuthenticatedUser {
        principal: user.principal(),
        client_ip: client_ip(request.headers(), peer),
    };

    debug!(
        user_id = authenticated.user_id(),
        role = %authenticated.principal.role,
        "User authenticated"
    );

    request.extensions_mut().insert(authenticated);
    Ok(next.run(request).await)
}

// =============================================================================
// Route guard
// =============================================================================

/// A [`Guard`] bound to a group of routes.
#[derive(Clone)]
pub struct RouteGuard {
    guard: Guard,
    metrics: Metrics,
}

impl RouteGuard {
    pub fn new(guard: Guard, metrics: Metrics) -> Self {
        Self { guard, metrics }
    }
}

/// Authorization middleware. Runs after `authenticate`.
pub async fn enforce_guard(
    State(route_guard): State<RouteGuard>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = request
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|u| &u.principal);

    if let Err(e) = route_guard.guard.check(principal) {
        route_guard.metrics.record_authz_denial(e.reason());
        warn!(
            reason = e.reason(),
            path = %request.uri().path(),
            "request denied by route guard"
        );
        return Err(e.into());
    }

    Ok(next.run(request).await)
}

// =============================================================================
// Extractor
// =============================================================================

/// Extractor for the authenticated user.
///
/// ```ignore
/// async fn handler(AuthUser(user): AuthUser) -> impl IntoResponse {
///     format!("Hello, {}", user.principal.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthenticatedUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError::Unauthenticated("authentication required".to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================
