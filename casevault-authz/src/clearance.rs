// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Clearance Model
//!
//! Ordinal confidentiality tiers gating case and evidence visibility.
//!
//! Ranks:
//! - low = 1
//! - medium = 2
//! - high = 3
//! - critical = 4
//! - anything else = 0 (never sufficient)

use serde::{Deserialize, Serialize};

// =============================================================================
// Clearance Enum
// =============================================================================

/// Security clearance held by a user or required by a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearanceLevel {
    Low,
    Medium,
    High,
    Critical,
    /// Any label outside the closed set. Ranks 0.
    #[serde(other)]
    Unknown,
}

impl ClearanceLevel {
    /// All known levels, lowest first.
    pub const ALL: [ClearanceLevel; 4] = [
        ClearanceLevel::Low,
        ClearanceLevel::Medium,
        ClearanceLevel::High,
        ClearanceLevel::Critical,
    ];

    /// Parse a clearance label (case-insensitive). Unknown labels are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(ClearanceLevel::Low),
            "medium" => Some(ClearanceLevel::Medium),
            "high" => Some(ClearanceLevel::High),
            "critical" => Some(ClearanceLevel::Critical),
            _ => None,
        }
    }

    /// Total mapping from a stored label. Unknown labels map to `Unknown`.
    pub fn from_label(s: &str) -> Self {
        Self::parse(s).unwrap_or(ClearanceLevel::Unknown)
    }

    /// Integer rank of this level.
    pub fn rank(&self) -> u8 {
        match self {
            ClearanceLevel::Low => 1,
            ClearanceLevel::Medium => 2,
            ClearanceLevel::High => 3,
            ClearanceLevel::Critical => 4,
            ClearanceLevel::Unknown => 0,
        }
    }

    /// Whether a holder of `self` may access something classified at `required`.
    pub fn satisfies(&self, required: ClearanceLevel) -> bool {
        higher_or_equal(*self, required)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClearanceLevel::Low => "low",
            ClearanceLevel::Medium => "medium",
            ClearanceLevel::High => "high",
            ClearanceLevel::Critical => "critical",
            ClearanceLevel::Unknown => "unknown",
        }
    }
}

/// `rank(a) >= rank(b)`, failing closed when either side is unknown.
pub fn higher_or_equal(a: ClearanceLevel, b: ClearanceLevel) -> bool {
    if a == ClearanceLevel::Unknown || b == ClearanceLevel::Unknown {
        return false;
    }
    a.rank() >= b.rank()
}

impl std::fmt::Display for ClearanceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for ClearanceLevel {
    fn default() -> Self {
        ClearanceLevel::Low
    }
}

// =============================================================================
// Tests
// =============================================================================
