// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Suspects, victims and witnesses attached to a case.
//!
//! A person is visible to whoever can see its case.

use casevault_authz::Principal;
use std::sync::Arc;
use tracing::info;

use crate::cases::CaseAuthority;
use crate::error::{ApiError, ApiResult};
use crate::store::{NewPerson, Person, PersonFields, PersonKind, PersonStore, Store};

fn validate(fields: &PersonFields) -> ApiResult<()> {
    if fields.first_name.trim().is_empty() || fields.last_name.trim().is_empty() {
        return Err(ApiError::invalid("first_name and last_name are required"));
    }
    if matches!(fields.age, Some(age) if age < 0) {
        return Err(ApiError::invalid("age must not be negative"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct PersonRegistry {
    store: Arc<dyn Store>,
    cases: CaseAuthority,
}

impl PersonRegistry {
    pub fn new(store: Arc<dyn Store>, cases: CaseAuthority) -> Self {
        Self { store, cases }
    }

    pub async fn add(
        &self,
        actor: &Principal,
        case_id: i64,
        kind: PersonKind,
        fields: PersonFields,
    ) -> ApiResult<Person> {
        validate(&fields)?;
        let case = self.cases.visible_case(actor, case_id).await?;

        let person = self
            .store
            .create_person(NewPerson {
                case_id: case.id,
                kind,
                fields: fields.for_kind(kind),
                added_by: actor.user_id,
            })
            .await?;

        info!(
            person_id = person.id,
            case_id,
            kind = kind.as_str(),
            added_by = actor.user_id,
            "person added to case"
        );
        Ok(person)
    }

    pub async fn list(
        &self,
        actor: &Principal,
        case_id: i64,
        kind: PersonKind,
    ) -> ApiResult<Vec<Person>> {
        let case = self.cases.visible_case(actor, case_id).await?;
        Ok(self.store.list_persons(case.id, kind).await?)
    }

    /// Person of the given kind on a case the principal can see.
    ///
    /// A person of another kind is reported as not found, so
    /// `/api/victims/:id` cannot reach a suspect.
    async fn visible_person(
        &self,
        actor: &Principal,
        kind: PersonKind,
        id: i64,
    ) -> ApiResult<Person> {
        let person = self.store.get_person(id).await?;
        if person.kind != kind {
            return Err(ApiError::not_found(format!("{} {}", kind.as_str(), id)));
        }
        self.cases.visible_case(actor, person.case_id).await?;
        Ok(person)
    }

    pub async fn update(
        &self,
        actor: &Principal,
        kind: PersonKind,
        id: i64,
        fields: PersonFields,
    ) -> ApiResult<Person> {
        validate(&fields)?;
        let person = self.visible_person(actor, kind, id).await?;
        let updated = self.store.update_person(person.id, fields.for_kind(kind)).await?;
        info!(person_id = id, kind = kind.as_str(), updated_by = actor.user_id, "person updated");
        Ok(updated)
    }

    pub async fn remove(&self, actor: &Principal, kind: PersonKind, id: i64) -> ApiResult<()> {
        let person = self.visible_person(actor, kind, id).await?;
        self.store.delete_person(person.id).await?;
        info!(person_id = id, kind = kind.as_str(), removed_by = actor.user_id, "person removed");
        Ok(())
    }
}
