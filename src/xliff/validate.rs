//! Post-write checks over a translated document.

use super::extract::{text_spans, trans_units};
use super::segment::count_boundary_tokens;
use crate::xml::Document;

/// Fragment-count mismatches tolerated before a document is reported invalid.
pub const MAX_TOLERATED_MISMATCHES: usize = 5;

/// A target span that still carries boundary tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSurvivor {
    pub unit_id: String,
    pub span_id: Option<String>,
    pub text: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentMismatch {
    pub unit_id: String,
    pub source_spans: usize,
    pub target_spans: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub surviving_tokens: Vec<TokenSurvivor>,
    /// Units whose target is blank although the source is not.
    pub empty_targets: Vec<String>,
    pub fragment_mismatches: Vec<FragmentMismatch>,
    pub missing_targets: Vec<String>,
}

impl ValidationReport {
    /// A surviving token means the sweep failed; everything else is advisory.
    pub fn has_correctness_violation(&self) -> bool {
        !self.surviving_tokens.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_correctness_violation()
            && self.fragment_mismatches.len() < MAX_TOLERATED_MISMATCHES
    }

    pub fn total_tokens(&self) -> usize {
        self.surviving_tokens.iter().map(|s| s.count).sum()
    }

    pub fn total_issues(&self) -> usize {
        self.surviving_tokens.len()
            + self.empty_targets.len()
            + self.fragment_mismatches.len()
            + self.missing_targets.len()
    }
}

pub fn validate_document(doc: &Document) -> ValidationReport {
    let mut report = ValidationReport::default();

    for unit in trans_units(doc) {
        let unit_id = doc.attr(unit, "id").unwrap_or_default().to_string();
        let source = doc.find_child(unit, "source");
        let Some(target) = doc.find_child(unit, "target") else {
            report.missing_targets.push(unit_id);
            continue;
        };

        let target_spans = text_spans(doc, target);
        for &span in &target_spans {
            let text = doc.text(span);
            let count = count_boundary_tokens(&text);
            if count > 0 {
                report.surviving_tokens.push(TokenSurvivor {
                    unit_id: unit_id.clone(),
                    span_id: doc.attr(span, "id").map(str::to_string),
                    text,
                    count,
                });
            }
        }

        let Some(source) = source else {
            continue;
        };

        if doc.all_text(target).trim().is_empty() && !doc.all_text(source).trim().is_empty() {
            report.empty_targets.push(unit_id.clone());
        }

        let source_spans = text_spans(doc, source).len();
        if source_spans > 0 && source_spans != target_spans.len() {
            report.fragment_mismatches.push(FragmentMismatch {
                unit_id,
                source_spans,
                target_spans: target_spans.len(),
            });
        }
    }

    report
}
