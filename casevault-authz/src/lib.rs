//! casevault authorization - role and clearance decisions for case records
//!
//! This crate holds the pure decision logic shared by the gateway: the
//! clearance model, the role allow-lists, the composed authorization gate and
//! the evidence lifecycle state machine. Nothing here performs I/O.
//!
//! # Example
//!
//! ```rust
//! use casevault_authz::{ClearanceLevel, Guard, Principal, Role};
//!
//! let officer = Principal::new(3, "j.doe", Role::Officer, ClearanceLevel::Medium);
//!
//! // Officers can add evidence...
//! let add_evidence = Guard::roles(casevault_authz::FIELD_STAFF);
//! assert!(add_evidence.check(Some(&officer)).is_ok());
//!
//! // ...but cannot open a high-level case.
//! assert!(!officer.can_view(ClearanceLevel::High));
//! ```

pub mod case;
pub mod clearance;
pub mod gate;
pub mod lifecycle;
pub mod principal;
pub mod role;

// Re-export commonly used types at the crate root
pub use case::CaseStatus;
pub use clearance::{higher_or_equal, ClearanceLevel};
pub use gate::{require_clearance, require_role, AuthzError, Guard};
pub use lifecycle::{EvidenceEvent, EvidenceKind, EvidenceStatus, LifecycleError};
pub use principal::Principal;
pub use role::{Role, ADMINS, CASE_MANAGERS, FIELD_STAFF};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Check a role allow-list and a minimum clearance in one call.
///
/// This is a convenience function for simple use cases.
///
/// # Example
///
/// ```rust
/// use casevault_authz::{authorize, ClearanceLevel, Principal, Role};
///
/// let admin = Principal::new(1, "admin", Role::Admin, ClearanceLevel::Critical);
/// assert!(authorize(Some(&admin), &[Role::Admin], ClearanceLevel::High).is_ok());
/// ```
pub fn authorize(
    principal: Option<&Principal>,
    allowed: &[Role],
    minimum: ClearanceLevel,
) -> Result<(), AuthzError> {
    Guard::roles(allowed).with_clearance(minimum).check(principal)
}
