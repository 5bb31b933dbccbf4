// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Case PDF report
//!
//! Rendered with `genpdf`. Fonts are loaded from the first directory that
//! holds the LiberationSans family.

use genpdf::elements::{Break, Paragraph};
use genpdf::fonts::{self, FontData, FontFamily};
use genpdf::style::Style;
use genpdf::{Document, Element, SimplePageDecorator};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

use casevault_authz::Principal;

use crate::cases::CaseAuthority;
use crate::error::{ApiError, ApiResult};
use crate::store::{
    Case, CaseStore, Evidence, EvidenceStore, Person, PersonKind, PersonStore, Store, User,
};

/// Font directories searched in order.
const FONT_DIRS: &[&str] = &[
    "./fonts",
    "/usr/share/fonts/liberation",
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/liberation2",
    "/usr/share/fonts/liberation-sans",
    "/System/Library/Fonts/Supplemental",
    "/Library/Fonts",
];

const FONT_FAMILY: &str = "LiberationSans";

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("no {family} fonts found in {searched:?}")]
    FontsMissing {
        family: &'static str,
        searched: Vec<PathBuf>,
    },

    #[error("PDF render failed: {0}")]
    Render(String),
}

impl From<PdfError> for ApiError {
    fn from(err: PdfError) -> Self {
        ApiError::StorageFailure(err.to_string())
    }
}

/// Everything printed in a case report.
#[derive(Debug, Clone)]
pub struct CaseReport {
    pub case: Case,
    pub assignees: Vec<User>,
    pub suspects: Vec<Person>,
    pub victims: Vec<Person>,
    pub witnesses: Vec<Person>,
    pub evidence: Vec<Evidence>,
}

impl CaseReport {
    /// Collect the report contents for a case the principal can see.
    pub async fn assemble(
        store: &Arc<dyn Store>,
        cases: &CaseAuthority,
        actor: &Principal,
        case_id: i64,
    ) -> ApiResult<Self> {
        let case = cases.visible_case(actor, case_id).await?;
        Ok(Self {
            assignees: store.list_assignees(case.id).await?,
            suspects: store.list_persons(case.id, PersonKind::Suspect).await?,
            victims: store.list_persons(case.id, PersonKind::Victim).await?,
            witnesses: store.list_persons(case.id, PersonKind::Witness).await?,
            evidence: store.list_evidence_by_case(case.id).await?,
            case,
        })
    }
}

fn load_fonts(dirs: &[PathBuf]) -> Result<FontFamily<FontData>, PdfError> {
    dirs.iter()
        .filter(|dir| dir.exists())
        .find_map(|dir| fonts::from_files(dir, FONT_FAMILY, None).ok())
        .ok_or_else(|| PdfError::FontsMissing {
            family: FONT_FAMILY,
            searched: dirs.to_vec(),
        })
}

fn font_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = FONT_DIRS.iter().map(PathBuf::from).collect();
    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        dirs.insert(0, Path::new(&manifest_dir).join("fonts"));
    }
    dirs
}

fn person_line(person: &Person) -> String {
    let mut line = format!("{} {}", person.first_name, person.last_name);
    if let Some(age) = person.age {
        line.push_str(&format!(", age {}", age));
    }
    if person.is_arrested == Some(true) {
        line.push_str(" (arrested)");
    }
    if let Some(detail) = person
        .description
        .as_deref()
        .or(person.injury_description.as_deref())
        .or(person.statement.as_deref())
    {
        line.push_str(&format!(": {}", detail));
    }
    line
}

fn evidence_line(item: &Evidence) -> String {
    let body = match (&item.content, &item.image_path) {
        (Some(text), _) => text.clone(),
        (None, Some(key)) => format!("image {}", key),
        (None, None) => String::new(),
    };
    match item.remarks.as_deref() {
        Some(remarks) if !remarks.is_empty() => {
            format!("#{} [{}] {} | remarks: {}", item.id, item.kind.as_str(), body, remarks)
        }
        _ => format!("#{} [{}] {}", item.id, item.kind.as_str(), body),
    }
}

fn push_section(doc: &mut Document, title: &str, lines: Vec<String>) {
    doc.push(Break::new(1.0));
    doc.push(Paragraph::new(title).styled(Style::new().bold().with_font_size(13)));
    if lines.is_empty() {
        doc.push(Paragraph::new("None recorded").styled(Style::new().italic().with_font_size(10)));
    }
    for line in lines {
        doc.push(Paragraph::new(line).styled(Style::new().with_font_size(10)));
    }
}

/// Render the report to PDF bytes.
pub fn render_case_report(report: &CaseReport) -> Result<Vec<u8>, PdfError> {
    let dirs = font_dirs();
    let family = load_fonts(&dirs).map_err(|e| {
        error!(error = %e, "case report fonts unavailable");
        e
    })?;

    let case = &report.case;
    let mut doc = Document::new(family);
    doc.set_title(format!("Case report {}", case.case_number));
    doc.set_minimal_conformance();
    doc.set_line_spacing(1.25);

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(15);
    doc.set_page_decorator(decorator);

    doc.push(
        Paragraph::new(format!("CASE {}", case.case_number))
            .styled(Style::new().bold().with_font_size(18)),
    );
    doc.push(Paragraph::new(case.name.as_str()).styled(Style::new().bold().with_font_size(13)));
    doc.push(
        Paragraph::new(format!(
            "Status: {}    Authorization level: {}",
            case.status, case.authorization_level
        ))
        .styled(Style::new().with_font_size(10)),
    );
    doc.push(
        Paragraph::new(format!(
            "Area: {}    Type: {}    Opened: {}",
            case.area,
            case.case_type,
            case.created_at.format("%Y-%m-%d %H:%M UTC")
        ))
        .styled(Style::new().with_font_size(10)),
    );
    if !case.description.is_empty() {
        doc.push(Break::new(0.5));
        doc.push(Paragraph::new(case.description.as_str()).styled(Style::new().with_font_size(11)));
    }

    push_section(
        &mut doc,
        "ASSIGNEES",
        report
            .assignees
            .iter()
            .map(|u| format!("{} ({}, {} clearance)", u.full_name, u.role, u.clearance))
            .collect(),
    );
    push_section(&mut doc, "SUSPECTS", report.suspects.iter().map(person_line).collect());
    push_section(&mut doc, "VICTIMS", report.victims.iter().map(person_line).collect());
    push_section(&mut doc, "WITNESSES", report.witnesses.iter().map(person_line).collect());
    push_section(&mut doc, "EVIDENCE", report.evidence.iter().map(evidence_line).collect());

    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|e| PdfError::Render(e.to_string()))?;
    debug!(case_id = case.id, bytes = buffer.len(), "case report rendered");
    Ok(buffer)
}
