use casevault_authz::{
    authorize, ClearanceLevel, EvidenceEvent, EvidenceStatus, Guard, Principal, Role, ADMINS,
    CASE_MANAGERS, FIELD_STAFF,
};
use serde_json::json;

const ROLES: [Role; 4] = [Role::Admin, Role::Investigator, Role::Officer, Role::Citizen];

fn principal(role: Role, clearance: ClearanceLevel) -> Principal {
    Principal::new(42, "integration", role, clearance)
}

#[test]
fn test_case_manager_guard_matrix() {
    let guard = Guard::roles(CASE_MANAGERS);

    for role in ROLES {
        let p = principal(role, ClearanceLevel::Critical);
        let allowed = matches!(role, Role::Admin | Role::Investigator);
        assert_eq!(guard.check(Some(&p)).is_ok(), allowed, "role {role}");
    }
}

#[test]
fn test_field_staff_excludes_citizens() {
    let guard = Guard::roles(FIELD_STAFF);
    assert!(guard
        .check(Some(&principal(Role::Citizen, ClearanceLevel::Critical)))
        .is_err());
    assert!(guard
        .check(Some(&principal(Role::Officer, ClearanceLevel::Low)))
        .is_ok());
}

#[test]
fn test_case_visibility_follows_rank() {
    for held in ClearanceLevel::ALL {
        for level in ClearanceLevel::ALL {
            let p = principal(Role::Investigator, held);
            assert_eq!(p.can_view(level), held.rank() >= level.rank());
        }
    }
}

#[test]
fn test_hard_delete_requires_admin() {
    let investigator = principal(Role::Investigator, ClearanceLevel::Critical);
    let admin = principal(Role::Admin, ClearanceLevel::Low);

    assert!(authorize(Some(&investigator), ADMINS, ClearanceLevel::Low).is_err());
    assert!(authorize(Some(&admin), ADMINS, ClearanceLevel::Low).is_ok());
}

#[test]
fn test_principal_deserializes_unknown_clearance_as_unknown() {
    let p: Principal = serde_json::from_value(json!({
        "user_id": 9,
        "username": "legacy",
        "role": "officer",
        "clearance": "top-secret"
    }))
    .unwrap();

    assert_eq!(p.clearance, ClearanceLevel::Unknown);
    assert!(!p.can_view(ClearanceLevel::Low));
}

#[test]
fn test_evidence_lifecycle_walk() {
    let status = EvidenceStatus::Active
        .transition(EvidenceEvent::UpdateRemarks)
        .and_then(|s| s.transition(EvidenceEvent::SoftDelete))
        .and_then(|s| s.transition(EvidenceEvent::HardDelete))
        .unwrap();
    assert_eq!(status, EvidenceStatus::Purged);

    assert!(EvidenceStatus::SoftDeleted
        .transition(EvidenceEvent::UpdateRemarks)
        .is_err());
}
