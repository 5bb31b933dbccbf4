// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
pub mod manager;
pub mod sniff;

pub use manager::{
    EvidenceManager, ImageUpload, NewTextEvidence, HARD_DELETE_CONFIRMATION, MAX_IMAGE_BYTES,
};
