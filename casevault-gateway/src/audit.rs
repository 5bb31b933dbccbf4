// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Audit Trail
//!
//! Append-only record of sensitive state changes. An entry is written only
//! after the operation it describes has been committed. A failed write is
//! logged and counted but never fails the request.

use std::sync::Arc;
use tracing::{debug, error};

use crate::error::ApiResult;
use crate::metrics::Metrics;
use crate::store::{AuditAction, AuditEntry, AuditStore, NewAuditEntry, Store};

/// Entity type recorded for evidence mutations.
pub const ENTITY_EVIDENCE: &str = "evidence";

/// Builder for an audit entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord(NewAuditEntry);

impl AuditRecord {
    pub fn new(user_id: i64, action: AuditAction, entity_type: &str, entity_id: i64) -> Self {
        Self(NewAuditEntry {
            user_id,
            action,
            entity_type: entity_type.to_string(),
            entity_id,
            old_value: None,
            new_value: None,
            ip_address: None,
        })
    }

    pub fn old_value(mut self, value: impl Into<String>) -> Self {
        self.0.old_value = Some(value.into());
        self
    }

    pub fn new_value(mut self, value: impl Into<String>) -> Self {
        self.0.new_value = Some(value.into());
        self
    }

    pub fn ip_address(mut self, ip: Option<String>) -> Self {
        self.0.ip_address = ip;
        self
    }
}

#[derive(Clone)]
pub struct AuditTrail {
    store: Arc<dyn Store>,
    metrics: Metrics,
}

impl AuditTrail {
    pub fn new(store: Arc<dyn Store>, metrics: Metrics) -> Self {
        Self { store, metrics }
    }

    /// Append an entry. Failures are logged, never returned.
    pub async fn record(&self, record: AuditRecord) {
        let entry = record.0;
        let (user_id, action, entity_id) = (entry.user_id, entry.action, entry.entity_id);

        match self.store.append_audit(entry).await {
            Ok(saved) => debug!(
                audit_id = saved.id,
                user_id,
                action = action.as_str(),
                entity_id,
                "audit entry recorded"
            ),
            Err(e) => {
                self.metrics.record_audit_write_failure();
                error!(
                    user_id,
                    action = action.as_str(),
                    entity_id,
                    error = %e,
                    "failed to write audit entry"
                );
            }
        }
    }

    /// Entries written by `user_id`, newest first.
    pub async fn by_user(&self, user_id: i64) -> ApiResult<Vec<AuditEntry>> {
        Ok(self.store.list_audit_by_user(user_id).await?)
    }

    /// Entries about one entity, newest first.
    pub async fn by_entity(&self, entity_type: &str, entity_id: i64) -> ApiResult<Vec<AuditEntry>> {
        Ok(self.store.list_audit_by_entity(entity_type, entity_id).await?)
    }
}
