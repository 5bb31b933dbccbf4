// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Credential store
//!
//! Resolves a username/password pair or a session token to an active user.
//! Every credential failure (unknown user, wrong password, inactive account,
//! bad token) is reported as the same opaque "invalid credentials" error.

use serde::Serialize;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use super::basic::{parse_authorization, Credentials};
use super::jwt::{IssuedToken, TokenService};
use super::password::{hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::store::{Store, StoreError, User, UserStore};

/// Hash verified when the username is unknown, so that path costs the same
/// as a wrong password.
fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_password("casevault-timing-equalizer").ok())
        .as_deref()
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub token: IssuedToken,
    pub user: User,
}

pub struct Authenticator {
    store: Arc<dyn Store>,
    tokens: TokenService,
}

impl Authenticator {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    /// Validate a username/password pair against the stored hash.
    pub async fn authenticate(&self, username: &str, password: &str) -> ApiResult<User> {
        let user = match self.store.find_user_by_username(username).await {
            Ok(user) => user,
            Err(StoreError::NotFound(_)) => {
                if let Some(hash) = dummy_hash() {
                    let _ = verify_password(password, hash);
                }
                debug!("login attempt for unknown username");
                return Err(ApiError::invalid_credentials());
            }
            Err(e) => return Err(e.into()),
        };

        let matches = verify_password(password, &user.password_hash).unwrap_or_else(|e| {
            warn!(user_id = user.id, error = %e, "stored password hash is unreadable");
            false
        });

        if !matches || !user.is_active {
            debug!(user_id = user.id, active = user.is_active, "credential check failed");
            return Err(ApiError::invalid_credentials());
        }
        Ok(user)
    }

    /// Resolve an `Authorization` header (Basic or Bearer) to an active user.
    pub async fn authenticate_header(&self, header: Option<&str>) -> ApiResult<User> {
        let header =
            header.ok_or_else(|| ApiError::Unauthenticated("authentication required".into()))?;

        match parse_authorization(header) {
            Some(Credentials::Basic { username, password }) => {
                self.authenticate(&username, &password).await
            }
            Some(Credentials::Bearer(token)) => self.resolve_token(&token).await,
            None => Err(ApiError::invalid_credentials()),
        }
    }

    async fn resolve_token(&self, token: &str) -> ApiResult<User> {
        let claims = self.tokens.validate(token).map_err(|e| {
            debug!(error = %e, "session token rejected");
            ApiError::invalid_credentials()
        })?;

        match self.store.get_user(claims.sub).await {
            Ok(user) if user.is_active => Ok(user),
            Ok(_) | Err(StoreError::NotFound(_)) => Err(ApiError::invalid_credentials()),
            Err(e) => Err(e.into()),
        }
    }

    /// Password login. Issues a session token and records the login time.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<LoginResponse> {
        let user = self.authenticate(username, password).await?;

        let token = self.tokens.issue(user.id, &user.username).map_err(|e| {
            ApiError::StorageFailure(format!("token issue failed: {}", e))
        })?;

        if let Err(e) = self.store.touch_last_login(user.id).await {
            warn!(user_id = user.id, error = %e, "failed to record last login");
        }

        info!(user_id = user.id, username = %user.username, "user logged in");
        Ok(LoginResponse { token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::basic::basic_header;
    use crate::store::{MemoryStore, NewUser, UserStore, UserUpdate};
    use casevault_authz::{ClearanceLevel, Role};

    async fn setup() -> (Authenticator, Arc<MemoryStore>, User) {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .create_user(NewUser {
                username: "kim".into(),
                email: "kim@example.org".into(),
                full_name: "Kim".into(),
                password_hash: hash_password("s3cret!").unwrap(),
                role: Role::Officer,
                clearance: ClearanceLevel::Medium,
            })
            .await
            .unwrap();
        let auth = Authenticator::new(store.clone(), TokenService::new("test", 1));
        (auth, store, user)
    }

    #[tokio::test]
    async fn test_valid_password() {
        let (auth, _, user) = setup().await;
        let resolved = auth.authenticate("kim", "s3cret!").await.unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn test_failures_are_indistinguishable() {
        let (auth, store, user) = setup().await;

        let wrong_password = auth.authenticate("kim", "nope").await.unwrap_err();
        let unknown_user = auth.authenticate("nobody", "s3cret!").await.unwrap_err();

        store
            .update_user(
                user.id,
                UserUpdate {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let inactive = auth.authenticate("kim", "s3cret!").await.unwrap_err();

        for err in [&wrong_password, &unknown_user, &inactive] {
            assert_eq!(err.class(), "unauthenticated");
            assert_eq!(err.to_string(), "invalid credentials");
        }
    }

    #[tokio::test]
    async fn test_header_basic_and_bearer() {
        let (auth, _, user) = setup().await;

        let via_basic = auth
            .authenticate_header(Some(&basic_header("kim", "s3cret!")))
            .await
            .unwrap();
        assert_eq!(via_basic.id, user.id);

        let login = auth.login("kim", "s3cret!").await.unwrap();
        let bearer = format!("Bearer {}", login.token.token);
        let via_token = auth.authenticate_header(Some(&bearer)).await.unwrap();
        assert_eq!(via_token.id, user.id);
    }

    #[tokio::test]
    async fn test_token_rejected_after_deactivation() {
        let (auth, store, user) = setup().await;
        let login = auth.login("kim", "s3cret!").await.unwrap();

        store
            .update_user(
                user.id,
                UserUpdate {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let bearer = format!("Bearer {}", login.token.token);
        let err = auth.authenticate_header(Some(&bearer)).await.unwrap_err();
        assert_eq!(err.to_string(), "invalid credentials");
    }

    #[tokio::test]
    async fn test_missing_header() {
        let (auth, _, _) = setup().await;
        let err = auth.authenticate_header(None).await.unwrap_err();
        assert_eq!(err.to_string(), "authentication required");
    }

    #[tokio::test]
    async fn test_login_records_last_login() {
        let (auth, store, user) = setup().await;
        auth.login("kim", "s3cret!").await.unwrap();
        assert!(store.get_user(user.id).await.unwrap().last_login.is_some());
    }
}
