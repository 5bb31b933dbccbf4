// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Authentication and Authorization Module
//!
//! ## Components
//!
//! - **basic**: `Authorization` header parsing (Basic and Bearer)
//! - **password**: Argon2 password hashing
//! - **jwt**: HS256 session tokens issued by `/login`
//! - **credentials**: resolves credentials to an active user record
//! - **middleware**: Axum layers for authentication and route guards
//!
//! ## Usage
//!
//! ```ignore
//! use casevault_gateway::auth::{authenticate, enforce_guard, AuthState, RouteGuard};
//! use casevault_authz::{Guard, CASE_MANAGERS};
//!
//! let managers = Router::new()
//!     .route("/api/cases", post(create_case))
//!     .route_layer(middleware::from_fn_with_state(
//!         RouteGuard::new(Guard::roles(CASE_MANAGERS), metrics.clone()),
//!         enforce_guard,
//!     ));
//!
//! let app = managers.layer(middleware::from_fn_with_state(auth_state, authenticate));
//! ```

pub mod basic;
pub mod credentials;
pub mod jwt;
pub mod middleware;
pub mod password;

// Re-exports for convenience
pub use basic::{basic_header, parse_authorization, Credentials};
pub use credentials::{Authenticator, LoginResponse};
pub use jwt::{IssuedToken, JwtError, SessionClaims, TokenService};
pub use middleware::{
    authenticate, client_ip, enforce_guard, AuthState, AuthUser, AuthenticatedUser, RouteGuard,
};
pub use password::{hash_password, verify_password, PasswordError, MIN_PASSWORD_LENGTH};
