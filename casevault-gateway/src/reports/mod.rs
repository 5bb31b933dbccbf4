// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
pub mod desk;
pub mod pdf;

pub use desk::{PublicStatus, ReportDesk, SubmitReportRequest, SubmittedReport, TRACKING_PREFIX};
pub use pdf::{render_case_report, CaseReport, PdfError};
