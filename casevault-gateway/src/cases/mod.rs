// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
pub mod analysis;
pub mod authority;

pub use analysis::{extract_links, word_frequency, WordCount};
pub use authority::{CaseAuthority, CreateCaseRequest, UpdateCaseRequest};
