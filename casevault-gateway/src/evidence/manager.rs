// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Evidence Lifecycle Manager
//!
//! Create (text or image), read, update remarks, soft delete and hard delete.
//!
//! Ordering rules:
//! - validation and lookups happen before any write
//! - an image is written to the object store before its row exists
//! - on hard delete the object is removed before the row; if that fails the
//!   row stays
//! - the audit entry is written last and never fails the operation

use bytes::Bytes;
use casevault_authz::{EvidenceEvent, EvidenceKind, EvidenceStatus, LifecycleError, Principal};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::sniff::sniff_image;
use crate::audit::{AuditRecord, AuditTrail, ENTITY_EVIDENCE};
use crate::auth::AuthenticatedUser;
use crate::cases::CaseAuthority;
use crate::error::{ApiError, ApiResult};
use crate::metrics::Metrics;
use crate::objects::{ObjectStore, StoredObject};
use crate::store::{
    AuditAction, Case, Evidence, EvidenceStore, NewEvidence, Store, StoreError, UserStore,
};

/// Literal the caller must send to confirm a hard delete.
pub const HARD_DELETE_CONFIRMATION: &str = "CONFIRM_DELETE";

/// Largest accepted image upload.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// The store only writes active rows. A conflict means a concurrent request
/// soft-deleted the item between our read and our write.
fn already_deleted(err: StoreError, event: EvidenceEvent) -> ApiError {
    match err {
        StoreError::Conflict(_) => LifecycleError {
            from: EvidenceStatus::SoftDeleted,
            event,
        }
        .into(),
        other => other.into(),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTextEvidence {
    pub case_id: i64,
    pub content: String,
    #[serde(default)]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub case_id: i64,
    pub remarks: Option<String>,
    /// Client-supplied name. Logged only.
    pub filename: Option<String>,
    pub data: Bytes,
}

pub struct EvidenceManager {
    store: Arc<dyn Store>,
    objects: Arc<dyn ObjectStore>,
    bucket: String,
    cases: CaseAuthority,
    audit: AuditTrail,
    metrics: Metrics,
}

impl EvidenceManager {
    pub fn new(
        store: Arc<dyn Store>,
        objects: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        audit: AuditTrail,
        metrics: Metrics,
    ) -> Self {
        Self {
            cases: CaseAuthority::new(store.clone(), metrics.clone()),
            store,
            objects,
            bucket: bucket.into(),
            audit,
            metrics,
        }
    }

    fn observe<T>(&self, operation: &str, result: ApiResult<T>) -> ApiResult<T> {
        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.class(),
        };
        self.metrics.record_evidence_operation(operation, outcome);
        result
    }

    /// Case must exist and be visible; the acting user must exist and be active.
    async fn writable_case(&self, actor: &Principal, case_id: i64) -> ApiResult<Case> {
        let case = self.cases.visible_case(actor, case_id).await?;
        let user = self.store.get_user(actor.user_id).await?;
        if !user.is_active {
            return Err(ApiError::invalid_credentials());
        }
        Ok(case)
    }

    /// Evidence plus a visibility check on its case.
    async fn visible_evidence(&self, actor: &Principal, id: i64) -> ApiResult<Evidence> {
        let evidence = self.store.get_evidence(id).await?;
        self.cases.visible_case(actor, evidence.case_id).await?;
        Ok(evidence)
    }

    // =========================================================================
    // Create
    // =========================================================================

    pub async fn create_text(
        &self,
        who: &AuthenticatedUser,
        req: NewTextEvidence,
    ) -> ApiResult<Evidence> {
        let result = self.create_text_inner(who, req).await;
        self.observe("create_text", result)
    }

    async fn create_text_inner(
        &self,
        who: &AuthenticatedUser,
        req: NewTextEvidence,
    ) -> ApiResult<Evidence> {
        if req.content.trim().is_empty() {
            return Err(ApiError::invalid("text evidence content is required"));
        }
        let case = self.writable_case(&who.principal, req.case_id).await?;

        let evidence = self
            .store
            .create_evidence(NewEvidence {
                case_id: case.id,
                kind: EvidenceKind::Text,
                content: Some(req.content),
                image_path: None,
                remarks: req.remarks,
                added_by: who.user_id(),
            })
            .await?;

        info!(
            evidence_id = evidence.id,
            case_id = case.id,
            added_by = who.user_id(),
            "text evidence created"
        );

        self.audit
            .record(
                AuditRecord::new(who.user_id(), AuditAction::Create, ENTITY_EVIDENCE, evidence.id)
                    .new_value(format!("Text evidence created for case {}", case.id))
                    .ip_address(who.client_ip.clone()),
            )
            .await;

        Ok(evidence)
    }

    pub async fn create_image(
        &self,
        who: &AuthenticatedUser,
        upload: ImageUpload,
    ) -> ApiResult<Evidence> {
        let result = self.create_image_inner(who, upload).await;
        self.observe("create_image", result)
    }

    async fn create_image_inner(
        &self,
        who: &AuthenticatedUser,
        upload: ImageUpload,
    ) -> ApiResult<Evidence> {
        if upload.data.is_empty() {
            return Err(ApiError::invalid("image payload is empty"));
        }
        if upload.data.len() > MAX_IMAGE_BYTES {
            return Err(ApiError::invalid(format!(
                "image exceeds {} bytes",
                MAX_IMAGE_BYTES
            )));
        }

        let case = self.writable_case(&who.principal, upload.case_id).await?;

        let image_type = sniff_image(&upload.data).ok_or_else(|| {
            warn!(
                case_id = case.id,
                filename = ?upload.filename,
                "upload rejected, content is not an image"
            );
            ApiError::invalid("uploaded file is not an image")
        })?;

        let key = format!(
            "evidence/{}/{}.{}",
            case.id,
            Uuid::new_v4(),
            image_type.extension
        );

        self.objects
            .put(&self.bucket, &key, upload.data.clone(), image_type.mime)
            .await?;

        let created = self
            .store
            .create_evidence(NewEvidence {
                case_id: case.id,
                kind: EvidenceKind::Image,
                content: None,
                image_path: Some(key.clone()),
                remarks: upload.remarks,
                added_by: who.user_id(),
            })
            .await;

        let evidence = match created {
            Ok(evidence) => evidence,
            Err(e) => {
                // The row failed; drop the orphaned object.
                if let Err(cleanup) = self.objects.remove(&self.bucket, &key).await {
                    error!(key = %key, error = %cleanup, "failed to remove orphaned object");
                }
                return Err(e.into());
            }
        };

        info!(
            evidence_id = evidence.id,
            case_id = case.id,
            key = %key,
            mime = image_type.mime,
            size = upload.data.len(),
            "image evidence uploaded"
        );

        self.audit
            .record(
                AuditRecord::new(who.user_id(), AuditAction::Create, ENTITY_EVIDENCE, evidence.id)
                    .new_value(format!("Image evidence uploaded for case {}", case.id))
                    .ip_address(who.client_ip.clone()),
            )
            .await;

        Ok(evidence)
    }

    // =========================================================================
    // Read
    // =========================================================================

    /// Direct lookup. Soft-deleted evidence is returned too.
    pub async fn get(&self, actor: &Principal, id: i64) -> ApiResult<Evidence> {
        self.visible_evidence(actor, id).await
    }

    /// Evidence of a case, soft-deleted items excluded.
    pub async fn list_for_case(&self, actor: &Principal, case_id: i64) -> ApiResult<Vec<Evidence>> {
        let case = self.cases.visible_case(actor, case_id).await?;
        Ok(self.store.list_evidence_by_case(case.id).await?)
    }

    /// Image bytes with the content type and size reported by the object store.
    pub async fn read_image(&self, actor: &Principal, id: i64) -> ApiResult<StoredObject> {
        let evidence = self.visible_evidence(actor, id).await?;
        let key = match (evidence.kind, evidence.image_path.as_deref()) {
            (EvidenceKind::Image, Some(key)) => key.to_string(),
            _ => return Err(ApiError::invalid("evidence is not an image")),
        };

        Ok(self.objects.get(&self.bucket, &key).await?)
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Only remarks are mutable. The old and new values are audited.
    pub async fn update_remarks(
        &self,
        who: &AuthenticatedUser,
        id: i64,
        remarks: Option<String>,
    ) -> ApiResult<Evidence> {
        let result = self.update_remarks_inner(who, id, remarks).await;
        self.observe("update", result)
    }

    async fn update_remarks_inner(
        &self,
        who: &AuthenticatedUser,
        id: i64,
        remarks: Option<String>,
    ) -> ApiResult<Evidence> {
        let evidence = self.visible_evidence(&who.principal, id).await?;
        evidence.status().transition(EvidenceEvent::UpdateRemarks)?;

        let old_value = evidence.remarks.clone().unwrap_or_default();
        let updated = self
            .store
            .update_remarks(id, remarks)
            .await
            .map_err(|e| already_deleted(e, EvidenceEvent::UpdateRemarks))?;
        info!(evidence_id = id, updated_by = who.user_id(), "evidence remarks updated");

        self.audit
            .record(
                AuditRecord::new(who.user_id(), AuditAction::Update, ENTITY_EVIDENCE, id)
                    .old_value(old_value)
                    .new_value(updated.remarks.clone().unwrap_or_default())
                    .ip_address(who.client_ip.clone()),
            )
            .await;

        Ok(updated)
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Hide the evidence from listings. Content and object stay intact.
    pub async fn soft_delete(&self, who: &AuthenticatedUser, id: i64) -> ApiResult<Evidence> {
        let result = self.soft_delete_inner(who, id).await;
        self.observe("soft_delete", result)
    }

    async fn soft_delete_inner(&self, who: &AuthenticatedUser, id: i64) -> ApiResult<Evidence> {
        let evidence = self.visible_evidence(&who.principal, id).await?;
        evidence.status().transition(EvidenceEvent::SoftDelete)?;

        let deleted = self
            .store
            .mark_evidence_deleted(id)
            .await
            .map_err(|e| already_deleted(e, EvidenceEvent::SoftDelete))?;
        info!(evidence_id = id, deleted_by = who.user_id(), "evidence soft deleted");

        self.audit
            .record(
                AuditRecord::new(who.user_id(), AuditAction::Delete, ENTITY_EVIDENCE, id)
                    .old_value(format!("Evidence {} soft deleted", id))
                    .ip_address(who.client_ip.clone()),
            )
            .await;

        Ok(deleted)
    }

    /// Irreversibly remove the evidence and its object.
    pub async fn hard_delete(
        &self,
        who: &AuthenticatedUser,
        id: i64,
        confirmation: &str,
    ) -> ApiResult<()> {
        let result = self.hard_delete_inner(who, id, confirmation).await;
        self.observe("hard_delete", result)
    }

    async fn hard_delete_inner(
        &self,
        who: &AuthenticatedUser,
        id: i64,
        confirmation: &str,
    ) -> ApiResult<()> {
        if confirmation != HARD_DELETE_CONFIRMATION {
            warn!(evidence_id = id, user_id = who.user_id(), "hard delete not confirmed");
            return Err(ApiError::forbidden(format!(
                "confirmation must be '{}'",
                HARD_DELETE_CONFIRMATION
            )));
        }

        let evidence = self.visible_evidence(&who.principal, id).await?;
        evidence.status().transition(EvidenceEvent::HardDelete)?;

        if evidence.kind == EvidenceKind::Image {
            if let Some(key) = evidence.image_path.as_deref() {
                self.objects.remove(&self.bucket, key).await.map_err(|e| {
                    error!(
                        evidence_id = id,
                        key = %key,
                        error = %e,
                        "object removal failed, evidence row kept"
                    );
                    ApiError::from(e)
                })?;
            }
        }

        self.store.delete_evidence(id).await?;
        info!(evidence_id = id, deleted_by = who.user_id(), "evidence hard deleted");

        self.audit
            .record(
                AuditRecord::new(who.user_id(), AuditAction::Delete, ENTITY_EVIDENCE, id)
                    .old_value(format!("Evidence {} hard deleted", id))
                    .ip_address(who.client_ip.clone()),
            )
            .await;

        Ok(())
    }
}
