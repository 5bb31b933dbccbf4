// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Evidence lifecycle against in-memory backends.

mod common;

use casevault_authz::{ClearanceLevel, EvidenceKind, Role};
use casevault_gateway::audit::ENTITY_EVIDENCE;
use casevault_gateway::evidence::{
    ImageUpload, NewTextEvidence, HARD_DELETE_CONFIRMATION, MAX_IMAGE_BYTES,
};
use casevault_gateway::store::{AuditAction, EvidenceStore};
use common::{acting, bytes, Harness, BUCKET, JPEG_BYTES, PNG_BYTES, TEXT_BYTES};

fn text(case_id: i64, content: &str) -> NewTextEvidence {
    NewTextEvidence {
        case_id,
        content: content.to_string(),
        remarks: None,
    }
}

fn image(case_id: i64, filename: &str, data: &[u8]) -> ImageUpload {
    ImageUpload {
        case_id,
        remarks: Some("from the scene".to_string()),
        filename: Some(filename.to_string()),
        data: bytes(data),
    }
}

#[tokio::test]
async fn test_text_evidence_created_and_audited() {
    let h = Harness::new().await;
    let officer = h.user("olga", Role::Officer, ClearanceLevel::Medium).await;
    let case = h.case(ClearanceLevel::Medium).await;

    let evidence = h
        .evidence
        .create_text(&acting(&officer), text(case.id, "Knife found under the bench"))
        .await
        .unwrap();

    assert_eq!(evidence.kind, EvidenceKind::Text);
    assert_eq!(evidence.added_by, officer.id);
    assert!(!evidence.is_deleted);

    let entries = h.audit.by_entity(ENTITY_EVIDENCE, evidence.id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::Create);
    assert_eq!(entries[0].user_id, officer.id);
    assert_eq!(
        entries[0].new_value.as_deref(),
        Some(format!("Text evidence created for case {}", case.id).as_str())
    );
    assert_eq!(entries[0].ip_address.as_deref(), Some("198.51.100.7"));
}

#[tokio::test]
async fn test_missing_case_is_not_found_without_audit() {
    let h = Harness::new().await;
    let officer = h.user("olga", Role::Officer, ClearanceLevel::Critical).await;

    let err = h
        .evidence
        .create_text(&acting(&officer), text(999, "orphan"))
        .await
        .unwrap_err();

    assert_eq!(err.class(), "not_found");
    assert!(h.audit.by_user(officer.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_text_rejected() {
    let h = Harness::new().await;
    let officer = h.user("olga", Role::Officer, ClearanceLevel::Low).await;
    let case = h.case(ClearanceLevel::Low).await;

    let err = h
        .evidence
        .create_text(&acting(&officer), text(case.id, "   "))
        .await
        .unwrap_err();
    assert_eq!(err.class(), "invalid_input");
    assert!(h.store.list_evidence_by_case(case.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_soft_delete_hides_from_listing_but_not_lookup() {
    let h = Harness::new().await;
    let investigator = h.user("ines", Role::Investigator, ClearanceLevel::High).await;
    let case = h.case(ClearanceLevel::Low).await;
    let who = acting(&investigator);

    let kept = h.evidence.create_text(&who, text(case.id, "kept")).await.unwrap();
    let hidden = h.evidence.create_text(&who, text(case.id, "hidden")).await.unwrap();

    h.evidence.soft_delete(&who, hidden.id).await.unwrap();

    let listed = h
        .evidence
        .list_for_case(&who.principal, case.id)
        .await
        .unwrap();
    assert_eq!(listed.iter().map(|e| e.id).collect::<Vec<_>>(), vec![kept.id]);

    let direct = h.evidence.get(&who.principal, hidden.id).await.unwrap();
    assert!(direct.is_deleted);
    assert_eq!(direct.content.as_deref(), Some("hidden"));

    let deletes: Vec<_> = h
        .audit
        .by_entity(ENTITY_EVIDENCE, hidden.id)
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.action == AuditAction::Delete)
        .collect();
    assert_eq!(deletes.len(), 1);
    assert_eq!(
        deletes[0].old_value.as_deref(),
        Some(format!("Evidence {} soft deleted", hidden.id).as_str())
    );
}

#[tokio::test]
async fn test_second_soft_delete_rejected() {
    let h = Harness::new().await;
    let investigator = h.user("ines", Role::Investigator, ClearanceLevel::Low).await;
    let case = h.case(ClearanceLevel::Low).await;
    let who = acting(&investigator);

    let evidence = h.evidence.create_text(&who, text(case.id, "once")).await.unwrap();
    h.evidence.soft_delete(&who, evidence.id).await.unwrap();

    let err = h.evidence.soft_delete(&who, evidence.id).await.unwrap_err();
    assert_eq!(err.class(), "invalid_input");

    let deletes = h
        .audit
        .by_entity(ENTITY_EVIDENCE, evidence.id)
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.action == AuditAction::Delete)
        .count();
    assert_eq!(deletes, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_soft_deletes_commit_once() {
    let h = Harness::new().await;
    let investigator = h.user("ines", Role::Investigator, ClearanceLevel::Low).await;
    let case = h.case(ClearanceLevel::Low).await;
    let who = acting(&investigator);
    let evidence = h.evidence.create_text(&who, text(case.id, "contested")).await.unwrap();

    let (first, second) = tokio::join!(
        h.evidence.soft_delete(&who, evidence.id),
        h.evidence.soft_delete(&who, evidence.id),
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    let rejected = outcomes
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("one soft delete must lose");
    assert_eq!(rejected.class(), "invalid_input");

    let deletes = h
        .audit
        .by_entity(ENTITY_EVIDENCE, evidence.id)
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.action == AuditAction::Delete)
        .count();
    assert_eq!(deletes, 1);
}

#[tokio::test]
async fn test_update_remarks_records_old_and_new() {
    let h = Harness::new().await;
    let investigator = h.user("ines", Role::Investigator, ClearanceLevel::Low).await;
    let case = h.case(ClearanceLevel::Low).await;
    let who = acting(&investigator);

    let evidence = h
        .evidence
        .create_text(
            &who,
            NewTextEvidence {
                case_id: case.id,
                content: "Receipt from the pawn shop".to_string(),
                remarks: Some("unverified".to_string()),
            },
        )
        .await
        .unwrap();

    let updated = h
        .evidence
        .update_remarks(&who, evidence.id, Some("verified by clerk".to_string()))
        .await
        .unwrap();
    assert_eq!(updated.remarks.as_deref(), Some("verified by clerk"));
    assert_eq!(updated.content, evidence.content);

    let entries = h.audit.by_entity(ENTITY_EVIDENCE, evidence.id).await.unwrap();
    let update = entries
        .iter()
        .find(|e| e.action == AuditAction::Update)
        .unwrap();
    assert_eq!(update.old_value.as_deref(), Some("unverified"));
    assert_eq!(update.new_value.as_deref(), Some("verified by clerk"));
}

#[tokio::test]
async fn test_soft_deleted_evidence_is_not_updatable() {
    let h = Harness::new().await;
    let investigator = h.user("ines", Role::Investigator, ClearanceLevel::Low).await;
    let case = h.case(ClearanceLevel::Low).await;
    let who = acting(&investigator);

    let evidence = h.evidence.create_text(&who, text(case.id, "frozen")).await.unwrap();
    h.evidence.soft_delete(&who, evidence.id).await.unwrap();

    let err = h
        .evidence
        .update_remarks(&who, evidence.id, Some("late edit".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.class(), "invalid_input");
}

#[tokio::test]
async fn test_jpeg_accepted_regardless_of_filename() {
    let h = Harness::new().await;
    let officer = h.user("olga", Role::Officer, ClearanceLevel::Low).await;
    let case = h.case(ClearanceLevel::Low).await;
    let who = acting(&officer);

    let evidence = h
        .evidence
        .create_image(&who, image(case.id, "remarks.txt", JPEG_BYTES))
        .await
        .unwrap();

    assert_eq!(evidence.kind, EvidenceKind::Image);
    assert!(evidence.content.is_none());
    let key = evidence.image_path.clone().unwrap();
    assert!(key.starts_with(&format!("evidence/{}/", case.id)));
    assert!(key.ends_with(".jpg"));
    assert!(h.objects.contains(BUCKET, &key).await);

    let object = h.evidence.read_image(&who.principal, evidence.id).await.unwrap();
    assert_eq!(object.content_type, "image/jpeg");
    assert_eq!(object.size, JPEG_BYTES.len() as u64);
    assert_eq!(&object.data[..], JPEG_BYTES);

    let entries = h.audit.by_entity(ENTITY_EVIDENCE, evidence.id).await.unwrap();
    assert_eq!(
        entries[0].new_value.as_deref(),
        Some(format!("Image evidence uploaded for case {}", case.id).as_str())
    );
}

#[tokio::test]
async fn test_text_bytes_named_png_rejected() {
    let h = Harness::new().await;
    let officer = h.user("olga", Role::Officer, ClearanceLevel::Low).await;
    let case = h.case(ClearanceLevel::Low).await;

    let err = h
        .evidence
        .create_image(&acting(&officer), image(case.id, "photo.png", TEXT_BYTES))
        .await
        .unwrap_err();

    assert_eq!(err.class(), "invalid_input");
    assert!(err.to_string().contains("not an image"));
    assert_eq!(h.objects.object_count().await, 0);
    assert!(h.store.list_evidence_by_case(case.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_oversized_image_rejected() {
    let h = Harness::new().await;
    let officer = h.user("olga", Role::Officer, ClearanceLevel::Low).await;
    let case = h.case(ClearanceLevel::Low).await;

    let mut data = PNG_BYTES.to_vec();
    data.resize(MAX_IMAGE_BYTES + 1, 0);

    let err = h
        .evidence
        .create_image(&acting(&officer), image(case.id, "big.png", &data))
        .await
        .unwrap_err();
    assert_eq!(err.class(), "invalid_input");
    assert_eq!(h.objects.object_count().await, 0);
}

#[tokio::test]
async fn test_failed_object_write_leaves_no_row() {
    let h = Harness::new().await;
    let officer = h.user("olga", Role::Officer, ClearanceLevel::Low).await;
    let case = h.case(ClearanceLevel::Low).await;
    h.objects.set_fail_puts(true);

    let err = h
        .evidence
        .create_image(&acting(&officer), image(case.id, "scene.png", PNG_BYTES))
        .await
        .unwrap_err();

    assert_eq!(err.class(), "storage_failure");
    assert!(h.store.list_evidence_by_case(case.id).await.unwrap().is_empty());
    assert!(h.audit.by_user(officer.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_hard_delete_keeps_row_when_object_removal_fails() {
    let h = Harness::new().await;
    let admin = h.user("ada", Role::Admin, ClearanceLevel::Critical).await;
    let case = h.case(ClearanceLevel::Low).await;
    let who = acting(&admin);

    let evidence = h
        .evidence
        .create_image(&who, image(case.id, "scene.png", PNG_BYTES))
        .await
        .unwrap();
    let key = evidence.image_path.clone().unwrap();
    h.objects.set_fail_removes(true);

    let err = h
        .evidence
        .hard_delete(&who, evidence.id, HARD_DELETE_CONFIRMATION)
        .await
        .unwrap_err();

    assert_eq!(err.class(), "storage_failure");
    assert!(h.store.get_evidence(evidence.id).await.is_ok());
    assert!(h.objects.contains(BUCKET, &key).await);
    assert!(h
        .audit
        .by_entity(ENTITY_EVIDENCE, evidence.id)
        .await
        .unwrap()
        .iter()
        .all(|e| e.action != AuditAction::Delete));
}

#[tokio::test]
async fn test_hard_delete_purges_row_and_object() {
    let h = Harness::new().await;
    let admin = h.user("ada", Role::Admin, ClearanceLevel::Critical).await;
    let case = h.case(ClearanceLevel::High).await;
    let who = acting(&admin);

    let evidence = h
        .evidence
        .create_image(&who, image(case.id, "scene.png", PNG_BYTES))
        .await
        .unwrap();
    let key = evidence.image_path.clone().unwrap();

    // Soft-deleted evidence can still be purged.
    h.evidence.soft_delete(&who, evidence.id).await.unwrap();
    h.evidence
        .hard_delete(&who, evidence.id, HARD_DELETE_CONFIRMATION)
        .await
        .unwrap();

    assert!(!h.objects.contains(BUCKET, &key).await);
    let err = h.evidence.get(&who.principal, evidence.id).await.unwrap_err();
    assert_eq!(err.class(), "not_found");

    let entries = h.audit.by_entity(ENTITY_EVIDENCE, evidence.id).await.unwrap();
    assert_eq!(
        entries[0].old_value.as_deref(),
        Some(format!("Evidence {} hard deleted", evidence.id).as_str())
    );
}

#[tokio::test]
async fn test_hard_delete_requires_exact_confirmation() {
    let h = Harness::new().await;
    let admin = h.user("ada", Role::Admin, ClearanceLevel::Critical).await;
    let case = h.case(ClearanceLevel::Low).await;
    let who = acting(&admin);

    let evidence = h.evidence.create_text(&who, text(case.id, "keep me")).await.unwrap();

    for attempt in ["", "confirm_delete", "CONFIRM DELETE", "yes"] {
        let err = h
            .evidence
            .hard_delete(&who, evidence.id, attempt)
            .await
            .unwrap_err();
        assert_eq!(err.class(), "forbidden", "confirmation {attempt:?}");
    }
    assert!(h.store.get_evidence(evidence.id).await.is_ok());
}

#[tokio::test]
async fn test_read_image_of_text_evidence_rejected() {
    let h = Harness::new().await;
    let officer = h.user("olga", Role::Officer, ClearanceLevel::Low).await;
    let case = h.case(ClearanceLevel::Low).await;
    let who = acting(&officer);

    let evidence = h.evidence.create_text(&who, text(case.id, "words")).await.unwrap();
    let err = h
        .evidence
        .read_image(&who.principal, evidence.id)
        .await
        .unwrap_err();
    assert_eq!(err.class(), "invalid_input");
}

#[tokio::test]
async fn test_evidence_hidden_from_under_cleared_users() {
    let h = Harness::new().await;
    let admin = h.user("ada", Role::Admin, ClearanceLevel::Critical).await;
    let officer = h.user("olga", Role::Officer, ClearanceLevel::Medium).await;
    let case = h.case(ClearanceLevel::High).await;

    let evidence = h
        .evidence
        .create_text(&acting(&admin), text(case.id, "classified"))
        .await
        .unwrap();

    let who = acting(&officer);
    assert_eq!(
        h.evidence.get(&who.principal, evidence.id).await.unwrap_err().class(),
        "forbidden"
    );
    assert_eq!(
        h.evidence
            .create_text(&who, text(case.id, "more"))
            .await
            .unwrap_err()
            .class(),
        "forbidden"
    );
}

#[tokio::test]
async fn test_audit_failure_does_not_fail_operation() {
    let h = Harness::new().await;
    let officer = h.user("olga", Role::Officer, ClearanceLevel::Low).await;
    let case = h.case(ClearanceLevel::Low).await;
    h.store.set_fail_audit_writes(true);

    let evidence = h
        .evidence
        .create_text(&acting(&officer), text(case.id, "still saved"))
        .await
        .unwrap();

    assert!(h.store.get_evidence(evidence.id).await.is_ok());
    assert!(h
        .metrics
        .encode()
        .contains("casevault_audit_write_failures_total 1"));
}
