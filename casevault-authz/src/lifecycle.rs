// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Evidence lifecycle
//!
//! ```text
//!  [active] --update(remarks)--> [active]
//!  [active] --soft-delete-->     [soft-deleted] --hard-delete--> [purged]
//!  [active] --hard-delete-->     [purged]
//! ```
//!
//! `Purged` is terminal. Remarks can only change while active.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of evidence item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
    Text,
    Image,
}

impl EvidenceKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(EvidenceKind::Text),
            "image" => Some(EvidenceKind::Image),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceKind::Text => "text",
            EvidenceKind::Image => "image",
        }
    }
}

impl std::fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of an evidence item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceStatus {
    Active,
    SoftDeleted,
    Purged,
}

/// Event applied to an evidence item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceEvent {
    UpdateRemarks,
    SoftDelete,
    HardDelete,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot apply {event:?} to evidence in state {from:?}")]
pub struct LifecycleError {
    pub from: EvidenceStatus,
    pub event: EvidenceEvent,
}

impl EvidenceStatus {
    /// Status of a persisted row, given its soft-delete flag.
    pub fn from_deleted_flag(is_deleted: bool) -> Self {
        if is_deleted {
            EvidenceStatus::SoftDeleted
        } else {
            EvidenceStatus::Active
        }
    }

    /// Soft-delete flag to persist for this status.
    pub fn is_deleted(&self) -> bool {
        !matches!(self, EvidenceStatus::Active)
    }

    /// Apply `event`, returning the next state.
    pub fn transition(self, event: EvidenceEvent) -> Result<EvidenceStatus, LifecycleError> {
        use EvidenceEvent::*;
        use EvidenceStatus::*;

        match (self, event) {
            (Active, UpdateRemarks) => Ok(Active),
            (Active, SoftDelete) => Ok(SoftDeleted),
            (Active, HardDelete) | (SoftDeleted, HardDelete) => Ok(Purged),
            (from, event) => Err(LifecycleError { from, event }),
        }
    }

    /// Whether listings should show an item in this state.
    pub fn is_listed(&self) -> bool {
        matches!(self, EvidenceStatus::Active)
    }
}
