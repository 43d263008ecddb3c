//! Sanity checks over gateway output before anything is written.

use std::fmt;

use super::segment::count_boundary_tokens;
use super::unit::TranslationUnit;
use crate::translation::OutcomeSet;

/// Sources this short are exempt from the length check.
const MIN_LENGTH_FOR_RATIO: usize = 10;
const MAX_LENGTH_RATIO: f64 = 3.0;
const MIN_LENGTH_RATIO: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical,
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewIssue {
    pub unit_id: String,
    pub severity: Severity,
    pub message: String,
}

impl ReviewIssue {
    fn critical(unit_id: &str, message: String) -> Self {
        Self {
            unit_id: unit_id.to_string(),
            severity: Severity::Critical,
            message,
        }
    }

    fn warning(unit_id: &str, message: String) -> Self {
        Self {
            unit_id: unit_id.to_string(),
            severity: Severity::Warning,
            message,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

impl fmt::Display for ReviewIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unit {}: {}", self.unit_id, self.message)
    }
}

/// Reviews every successful outcome of a translatable unit.
///
/// Failed outcomes are left out: they are reported as fallbacks by the
/// reconstructor instead.
pub fn review_outcomes(units: &[TranslationUnit], outcomes: &OutcomeSet) -> Vec<ReviewIssue> {
    let mut issues = Vec::new();

    for unit in units.iter().filter(|u| u.is_translatable()) {
        let Some(outcome) = outcomes.get(&unit.id).filter(|o| o.success) else {
            continue;
        };
        let source = unit.merged_text.as_str();
        let translated = outcome.translated_text.as_str();

        let expected = count_boundary_tokens(source);
        if expected > 0 {
            let actual = count_boundary_tokens(translated);
            if actual != expected {
                issues.push(ReviewIssue::critical(
                    &unit.id,
                    format!("boundary token mismatch ({expected} -> {actual})"),
                ));
            }
        }

        if translated.trim().is_empty() && !source.trim().is_empty() {
            issues.push(ReviewIssue::critical(
                &unit.id,
                "empty translation for non-empty source".to_string(),
            ));
        }

        let source_len = source.chars().count();
        if source_len > MIN_LENGTH_FOR_RATIO {
            let ratio = translated.chars().count() as f64 / source_len as f64;
            if ratio > MAX_LENGTH_RATIO {
                issues.push(ReviewIssue::warning(
                    &unit.id,
                    format!("translation suspiciously long ({ratio:.1}x original)"),
                ));
            } else if ratio < MIN_LENGTH_RATIO {
                issues.push(ReviewIssue::warning(
                    &unit.id,
                    format!("translation suspiciously short ({ratio:.1}x original)"),
                ));
            }
        }
    }

    issues
}
