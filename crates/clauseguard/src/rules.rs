//! Rule-based structural validation.
//!
//! Deterministic checks that need no model: required structured fields,
//! required document sections, date plausibility, and percentage
//! formatting. The checker is infallible by construction — it reads the
//! inputs it is given and emits issues, so the engine treats it as the
//! one evidence source that cannot abort a run.
//!
//! The report's criticality score is the severity ceiling of the issues
//! found: a single CRITICAL structural problem scores higher than any
//! pile of MEDIUM formatting nits.

use regex::Regex;
use std::sync::OnceLock;

use clauseguard_core::engine::RuleChecker;
use clauseguard_core::models::{RuleReport, Severity, ValidationIssue};

/// Structured fields every term sheet must carry.
pub const REQUIRED_FIELDS: [&str; 5] =
    ["deal_name", "issuer", "amount", "currency", "maturity_date"];

/// Sections whose names must appear somewhere in the document text.
pub const REQUIRED_SECTIONS: [&str; 4] = ["Interest", "Collateral", "Maturity", "Issuer"];

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap())
}

fn spelled_percent_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d+(\.\d+)?\s*percent\b").unwrap())
}

fn severity_score(severity: Severity) -> u8 {
    match severity {
        Severity::Critical => 80,
        Severity::High => 60,
        Severity::Medium => 40,
        Severity::Low => 20,
    }
}

/// Deterministic structural checker for term sheets.
#[derive(Debug, Default)]
pub struct TermSheetRuleChecker;

impl TermSheetRuleChecker {
    pub fn new() -> Self {
        Self
    }
}

impl RuleChecker for TermSheetRuleChecker {
    fn check(
        &self,
        fields: &serde_json::Map<String, serde_json::Value>,
        text: &str,
    ) -> RuleReport {
        let mut errors = Vec::new();
        let lower = text.to_lowercase();

        for field in REQUIRED_FIELDS {
            if !fields.contains_key(field) {
                errors.push(ValidationIssue {
                    kind: "MISSING_FIELD".into(),
                    description: format!("Required field '{field}' is missing"),
                    section: "Structured Data".into(),
                    severity: Severity::High,
                });
            }
        }

        for section in REQUIRED_SECTIONS {
            if !lower.contains(&section.to_lowercase()) {
                errors.push(ValidationIssue {
                    kind: "MISSING_SECTION".into(),
                    description: format!("Required section '{section}' is missing"),
                    section: "Document Structure".into(),
                    severity: Severity::Critical,
                });
            }
        }

        for caps in date_regex().captures_iter(text) {
            let year: u32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            let day: u32 = caps[3].parse().unwrap_or(0);
            let plausible =
                (1900..=2100).contains(&year) && (1..=12).contains(&month) && (1..=31).contains(&day);
            if !plausible {
                errors.push(ValidationIssue {
                    kind: "INVALID_DATE".into(),
                    description: format!("Invalid date format: {}", &caps[0]),
                    section: "Dates".into(),
                    severity: Severity::High,
                });
            }
        }

        // One issue per document regardless of occurrence count.
        if spelled_percent_regex().is_match(&lower) {
            errors.push(ValidationIssue {
                kind: "FORMAT_ISSUE".into(),
                description: "Percentages should use % symbol rather than spelled out 'percent'"
                    .into(),
                section: "Interest Rates".into(),
                severity: Severity::Medium,
            });
        }

        let criticality_score = errors
            .iter()
            .map(|e| severity_score(e.severity))
            .max()
            .unwrap_or(0);

        RuleReport {
            errors,
            criticality_score,
        }
    }
}
