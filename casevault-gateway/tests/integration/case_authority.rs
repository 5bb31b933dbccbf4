// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Case assignment and status rules.

mod common;

use casevault_authz::{CaseStatus, ClearanceLevel, Principal, Role};
use casevault_gateway::cases::{CreateCaseRequest, UpdateCaseRequest};
use casevault_gateway::store::CaseStore;
use common::Harness;

#[tokio::test]
async fn test_assignment_follows_clearance_rank() {
    let h = Harness::new().await;
    let admin = h.user("ada", Role::Admin, ClearanceLevel::Critical).await;
    let manager = admin.principal();

    let mut users = Vec::new();
    for clearance in ClearanceLevel::ALL {
        users.push(
            h.user(
                &format!("inv-{}", clearance),
                Role::Investigator,
                clearance,
            )
            .await,
        );
    }

    for level in ClearanceLevel::ALL {
        let case = h.case(level).await;
        for user in &users {
            let result = h.cases.assign_user(&manager, case.id, user.id).await;
            let allowed = user.clearance.rank() >= level.rank();

            match result {
                Ok(()) => assert!(allowed, "{} assigned to {} case", user.clearance, level),
                Err(e) => {
                    assert!(!allowed, "{} refused on {} case", user.clearance, level);
                    assert_eq!(e.class(), "forbidden");
                }
            }
        }

        let assignees = h.cases.assignees(&manager, case.id).await.unwrap();
        let expected = users
            .iter()
            .filter(|u| u.clearance.rank() >= level.rank())
            .count();
        assert_eq!(assignees.len(), expected, "assignees of {} case", level);
    }
}

#[tokio::test]
async fn test_low_clearance_user_refused_on_high_case() {
    let h = Harness::new().await;
    let admin = h.user("ada", Role::Admin, ClearanceLevel::Critical).await;
    let rookie = h.user("rook", Role::Officer, ClearanceLevel::Low).await;
    let case = h.case(ClearanceLevel::High).await;

    let err = h
        .cases
        .assign_user(&admin.principal(), case.id, rookie.id)
        .await
        .unwrap_err();

    assert_eq!(err.class(), "forbidden");
    assert_eq!(err.to_string(), "insufficient clearance");
    assert_eq!(
        h.cases
            .assignees(&admin.principal(), case.id)
            .await
            .unwrap()
            .len(),
        0
    );
}

#[tokio::test]
async fn test_assignment_is_idempotent() {
    let h = Harness::new().await;
    let admin = h.user("ada", Role::Admin, ClearanceLevel::Critical).await;
    let officer = h.user("olga", Role::Officer, ClearanceLevel::Medium).await;
    let case = h.case(ClearanceLevel::Medium).await;
    let manager = admin.principal();

    h.cases.assign_user(&manager, case.id, officer.id).await.unwrap();
    let once = h.cases.assignees(&manager, case.id).await.unwrap();
    h.cases.assign_user(&manager, case.id, officer.id).await.unwrap();
    let twice = h.cases.assignees(&manager, case.id).await.unwrap();

    assert_eq!(
        once.iter().map(|u| u.id).collect::<Vec<_>>(),
        twice.iter().map(|u| u.id).collect::<Vec<_>>()
    );
    assert_eq!(twice.len(), 1);
}

#[tokio::test]
async fn test_removing_non_assignee_is_noop() {
    let h = Harness::new().await;
    let admin = h.user("ada", Role::Admin, ClearanceLevel::Critical).await;
    let officer = h.user("olga", Role::Officer, ClearanceLevel::Low).await;
    let case = h.case(ClearanceLevel::Low).await;
    let manager = admin.principal();

    h.cases.remove_assignee(&manager, case.id, officer.id).await.unwrap();
    h.cases.assign_user(&manager, case.id, officer.id).await.unwrap();
    h.cases.remove_assignee(&manager, case.id, officer.id).await.unwrap();
    assert!(h.cases.assignees(&manager, case.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unassigned_officer_cannot_change_status() {
    let h = Harness::new().await;
    let officer = h.user("olga", Role::Officer, ClearanceLevel::High).await;
    let case = h.case(ClearanceLevel::Low).await;

    let err = h
        .cases
        .update_status(&officer.principal(), case.id, "ongoing")
        .await
        .unwrap_err();

    assert_eq!(err.class(), "forbidden");
    assert_eq!(
        h.store.get_case(case.id).await.unwrap().status,
        CaseStatus::Pending
    );
}

#[tokio::test]
async fn test_assigned_officer_can_change_status() {
    let h = Harness::new().await;
    let admin = h.user("ada", Role::Admin, ClearanceLevel::Critical).await;
    let officer = h.user("olga", Role::Officer, ClearanceLevel::Medium).await;
    let case = h.case(ClearanceLevel::Medium).await;

    h.cases
        .assign_user(&admin.principal(), case.id, officer.id)
        .await
        .unwrap();
    let updated = h
        .cases
        .update_status(&officer.principal(), case.id, "ongoing")
        .await
        .unwrap();
    assert_eq!(updated.status, CaseStatus::Ongoing);
}

#[tokio::test]
async fn test_investigator_changes_status_without_assignment() {
    let h = Harness::new().await;
    let investigator = h.user("ines", Role::Investigator, ClearanceLevel::Low).await;
    let case = h.case(ClearanceLevel::Low).await;

    let updated = h
        .cases
        .update_status(&investigator.principal(), case.id, "closed")
        .await
        .unwrap();
    assert_eq!(updated.status, CaseStatus::Closed);
}

#[tokio::test]
async fn test_invalid_status_rejected_before_lookup() {
    let h = Harness::new().await;
    let admin = h.user("ada", Role::Admin, ClearanceLevel::Critical).await;
    let case = h.case(ClearanceLevel::Low).await;

    for status in ["archived", "Ongoing", ""] {
        let err = h
            .cases
            .update_status(&admin.principal(), case.id, status)
            .await
            .unwrap_err();
        assert_eq!(err.class(), "invalid_input", "status {status:?}");
    }

    // Even for a case that does not exist.
    let err = h
        .cases
        .update_status(&admin.principal(), 9999, "reopened")
        .await
        .unwrap_err();
    assert_eq!(err.class(), "invalid_input");
    assert_eq!(
        h.store.get_case(case.id).await.unwrap().status,
        CaseStatus::Pending
    );
}

#[tokio::test]
async fn test_case_listing_filtered_by_clearance() {
    let h = Harness::new().await;
    for level in ClearanceLevel::ALL {
        h.case(level).await;
    }
    let officer = h.user("olga", Role::Officer, ClearanceLevel::Medium).await;

    let visible = h.cases.list_cases(&officer.principal()).await.unwrap();
    assert_eq!(visible.len(), 2);
    assert!(visible
        .iter()
        .all(|c| c.authorization_level.rank() <= ClearanceLevel::Medium.rank()));
}

#[tokio::test]
async fn test_creator_cannot_classify_above_own_clearance() {
    let h = Harness::new().await;
    let investigator = Principal::new(5, "ines", Role::Investigator, ClearanceLevel::Medium);

    let err = h
        .cases
        .create_case(
            &investigator,
            CreateCaseRequest {
                name: "Embezzlement".to_string(),
                authorization_level: Some("critical".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.class(), "forbidden");

    let err = h
        .cases
        .create_case(
            &investigator,
            CreateCaseRequest {
                name: "Embezzlement".to_string(),
                authorization_level: Some("secret".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.class(), "invalid_input");
}

#[tokio::test]
async fn test_raising_level_blocked_by_under_cleared_assignee() {
    let h = Harness::new().await;
    let admin = h.user("ada", Role::Admin, ClearanceLevel::Critical).await;
    let officer = h.user("olga", Role::Officer, ClearanceLevel::Medium).await;
    let case = h.case(ClearanceLevel::Low).await;
    let manager = admin.principal();

    h.cases.assign_user(&manager, case.id, officer.id).await.unwrap();

    let err = h
        .cases
        .update_case(
            &manager,
            case.id,
            UpdateCaseRequest {
                authorization_level: Some("high".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.class(), "invalid_input");
    assert_eq!(
        h.store.get_case(case.id).await.unwrap().authorization_level,
        ClearanceLevel::Low
    );

    let updated = h
        .cases
        .update_case(
            &manager,
            case.id,
            UpdateCaseRequest {
                authorization_level: Some("medium".to_string()),
                name: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.authorization_level, ClearanceLevel::Medium);
    assert_eq!(updated.name, "Renamed");
}
