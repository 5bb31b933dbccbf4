// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Error taxonomy
//!
//! Every service operation fails with one of five classes:
//! - `NotFound` (404): case, user, evidence, person or report absent
//! - `Unauthenticated` (401): missing or invalid credentials
//! - `Forbidden` (403): role or clearance insufficient, confirmation mismatch
//! - `InvalidInput` (400): malformed body, unknown enum value, non-image upload
//! - `StorageFailure` (500): database or object-store transport error
//!
//! Storage failures never leak their cause to the client; it is logged instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use casevault_authz::{AuthzError, LifecycleError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::objects::ObjectStoreError;
use crate::store::StoreError;

/// Message returned for every storage failure.
pub const STORAGE_FAILURE_MESSAGE: &str = "internal storage error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("storage failure: {0}")]
    StorageFailure(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ApiError::NotFound(what.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::InvalidInput(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    /// The opaque credential failure. Bad username, bad password and inactive
    /// account all produce exactly this value.
    pub fn invalid_credentials() -> Self {
        ApiError::Unauthenticated("invalid credentials".to_string())
    }

    /// Error class label, also used as the `error` field of the response body.
    pub fn class(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Unauthenticated(_) => "unauthenticated",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::InvalidInput(_) => "invalid_input",
            ApiError::StorageFailure(_) => "storage_failure",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => ApiError::NotFound(what),
            StoreError::Conflict(msg) => ApiError::InvalidInput(msg),
            StoreError::Backend(msg) => ApiError::StorageFailure(msg),
        }
    }
}

impl From<ObjectStoreError> for ApiError {
    fn from(e: ObjectStoreError) -> Self {
        ApiError::StorageFailure(e.to_string())
    }
}

impl From<AuthzError> for ApiError {
    fn from(e: AuthzError) -> Self {
        match e {
            AuthzError::Unauthenticated => {
                ApiError::Unauthenticated("authentication required".to_string())
            }
            AuthzError::InsufficientPermissions { .. } => {
                ApiError::Forbidden("insufficient permissions".to_string())
            }
            AuthzError::InsufficientClearance { .. } => {
                ApiError::Forbidden("insufficient clearance".to_string())
            }
        }
    }
}

impl From<LifecycleError> for ApiError {
    fn from(e: LifecycleError) -> Self {
        ApiError::InvalidInput(e.to_string())
    }
}

// =============================================================================
// Response
// =============================================================================

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::StorageFailure(cause) => {
                error!(cause = %cause, "storage failure");
                STORAGE_FAILURE_MESSAGE.to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: self.class(),
            message,
        };
        (self.status(), Json(body)).into_response()
    }
}
