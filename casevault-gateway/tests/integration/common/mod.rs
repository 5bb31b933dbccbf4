// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Shared fixtures: in-memory backends wired the way `main` wires the real ones.
#![allow(dead_code)]

use bytes::Bytes;
use casevault_authz::{ClearanceLevel, Principal, Role};
use std::sync::Arc;

use casevault_gateway::audit::AuditTrail;
use casevault_gateway::auth::{hash_password, AuthenticatedUser};
use casevault_gateway::cases::{CaseAuthority, CreateCaseRequest};
use casevault_gateway::evidence::EvidenceManager;
use casevault_gateway::metrics::Metrics;
use casevault_gateway::objects::{MemoryObjectStore, ObjectStore};
use casevault_gateway::store::{Case, MemoryStore, NewUser, Store, User, UserStore};

pub const BUCKET: &str = "crime-management";

/// Smallest byte sequences the content sniffer recognises.
pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];
pub const TEXT_BYTES: &[u8] = b"this is definitely not a picture\n";

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub objects: Arc<MemoryObjectStore>,
    pub metrics: Metrics,
    pub audit: AuditTrail,
    pub cases: CaseAuthority,
    pub evidence: EvidenceManager,
}

impl Harness {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let objects = Arc::new(MemoryObjectStore::new());
        objects.ensure_bucket(BUCKET).await.unwrap();

        let dyn_store: Arc<dyn Store> = store.clone();
        let metrics = Metrics::new();
        let audit = AuditTrail::new(dyn_store.clone(), metrics.clone());
        let cases = CaseAuthority::new(dyn_store.clone(), metrics.clone());
        let evidence = EvidenceManager::new(
            dyn_store,
            objects.clone(),
            BUCKET,
            audit.clone(),
            metrics.clone(),
        );

        Self {
            store,
            objects,
            metrics,
            audit,
            cases,
            evidence,
        }
    }

    pub async fn user(&self, username: &str, role: Role, clearance: ClearanceLevel) -> User {
        self.store
            .create_user(NewUser {
                username: username.to_string(),
                email: format!("{}@districtcore.gov", username),
                full_name: username.to_string(),
                password_hash: hash_password("correct-horse").unwrap(),
                role,
                clearance,
            })
            .await
            .unwrap()
    }

    pub async fn case(&self, level: ClearanceLevel) -> Case {
        let creator = Principal::new(0, "system", Role::Admin, ClearanceLevel::Critical);
        self.cases
            .create_case(
                &creator,
                CreateCaseRequest {
                    name: format!("{} case", level),
                    description: "Opened by the test harness".to_string(),
                    authorization_level: Some(level.as_str().to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
    }
}

pub fn acting(user: &User) -> AuthenticatedUser {
    AuthenticatedUser {
        principal: user.principal(),
        client_ip: Some("198.51.100.7".to_string()),
    }
}

pub fn bytes(data: &[u8]) -> Bytes {
    Bytes::copy_from_slice(data)
}
