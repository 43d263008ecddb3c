//! Printers shared by the translate, interactive and check commands.

use crate::pipeline::{Finished, Translation};
use crate::ui::Style;
use crate::xliff::{
    Advisory, AdvisoryReason, Extraction, FileStatistics, ReconstructionReport, ReviewIssue, Severity,
    SweepRecord, ValidationReport,
};

/// Entries listed before the rest is summarized as "... and N more".
const LIST_LIMIT: usize = 10;

/// Characters of unit text shown in samples.
const PREVIEW_CHARS: usize = 80;

fn preview(text: &str) -> String {
    let mut shown: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        shown.push_str("...");
    }
    shown
}

fn print_overflow(total: usize) {
    if total > LIST_LIMIT {
        println!("  {}", Style::secondary(format!("... and {} more", total - LIST_LIMIT)));
    }
}

pub fn print_statistics(stats: &FileStatistics) {
    println!("{}", Style::header("File statistics"));
    println!("  {}  {}", Style::label("units         "), Style::value(stats.total_units));
    println!("  {}  {}", Style::label("plaintext     "), Style::value(stats.plain_units));
    println!("  {}  {}", Style::label("styled        "), Style::value(stats.styled_units));
    println!(
        "  {}  {}",
        Style::label("characters    "),
        Style::value(stats.total_characters)
    );
    println!(
        "  {}  {}",
        Style::label("avg per unit  "),
        Style::value(stats.average_characters)
    );
    println!(
        "  {}  {}",
        Style::label("source        "),
        Style::value(&stats.source_language)
    );
    println!(
        "  {}  {}",
        Style::label("target        "),
        stats
            .target_language
            .as_deref()
            .map_or_else(|| Style::secondary("not specified"), Style::value)
    );
    println!();
}

pub fn print_samples(extraction: &Extraction, count: usize) {
    println!("{}", Style::header(format!("Sample units (first {count})")));
    for unit in extraction.units.iter().take(count) {
        println!("  {} {}", Style::label("id  "), Style::id(&unit.id));
        println!("  {} {}", Style::label("type"), Style::secondary(unit.kind));
        println!("  {} {}", Style::label("text"), preview(&unit.merged_text));
        println!();
    }
}

/// Prints `<bpt>`/`<ept>` pairing problems, or a confirmation when there are none.
pub fn print_tag_pairing(extraction: &Extraction) {
    let unpaired: Vec<&Advisory> = extraction.tag_pairing_advisories().collect();
    if unpaired.is_empty() {
        println!("{} All tags properly paired", Style::success("✓"));
        return;
    }

    println!("{}", Style::warning("Tag pairing warnings:"));
    for advisory in unpaired.iter().take(LIST_LIMIT) {
        println!("  - {advisory}");
    }
    print_overflow(unpaired.len());
}

/// Advisories that are not about tag pairing.
pub fn print_advisories(advisories: &[Advisory]) {
    let other: Vec<&Advisory> = advisories
        .iter()
        .filter(|a| !matches!(a.reason, AdvisoryReason::UnpairedTags { .. }))
        .collect();
    if other.is_empty() {
        return;
    }

    println!("{}", Style::warning("Advisories:"));
    for advisory in other.iter().take(LIST_LIMIT) {
        println!("  - {advisory}");
    }
    print_overflow(other.len());
}

/// Gateway counters and the units that fell back to their source text.
pub fn print_translation(translation: &Translation) {
    let stats = &translation.stats;
    crate::status!(
        "{} Translated {}/{} units ({}% success, {} retries)",
        if stats.failed == 0 {
            Style::success("✓")
        } else {
            Style::warning("!")
        },
        Style::value(stats.successful),
        Style::value(stats.total),
        stats.success_rate(),
        stats.retries
    );

    let failures = translation.outcomes.failures();
    for failure in failures.iter().take(LIST_LIMIT) {
        crate::warn!(
            "  {} {}: {}",
            Style::warning("failed"),
            Style::id(&failure.id),
            failure.error_reason.as_deref().unwrap_or("unknown error")
        );
    }
    if failures.len() > LIST_LIMIT {
        crate::warn!("  ... and {} more", failures.len() - LIST_LIMIT);
    }
}

pub fn print_review(issues: &[ReviewIssue]) {
    if issues.is_empty() {
        crate::status!("{} Review found no issues", Style::success("✓"));
        return;
    }

    for issue in issues.iter().take(LIST_LIMIT) {
        let tag = match issue.severity {
            Severity::Critical => Style::error("critical"),
            Severity::Warning => Style::warning("warning"),
        };
        crate::warn!("  {tag} {issue}");
    }
    if issues.len() > LIST_LIMIT {
        crate::warn!("  ... and {} more", issues.len() - LIST_LIMIT);
    }
}

pub fn print_reconstruction(report: &ReconstructionReport) {
    crate::status!("{} Wrote {} targets", Style::success("✓"), report.written);
    if !report.fallbacks.is_empty() {
        crate::warn!(
            "{} {} units kept their source text",
            Style::warning("Warning:"),
            report.fallbacks.len()
        );
    }
    for advisory in report.advisories.iter().take(LIST_LIMIT) {
        crate::status!("  - {advisory}");
    }
}

pub fn print_sweep(records: &[SweepRecord]) {
    if records.is_empty() {
        return;
    }

    let removed: usize = records.iter().map(|r| r.removed).sum();
    crate::status!(
        "{} Removed {removed} leftover boundary tokens from {} spans",
        Style::warning("!"),
        records.len()
    );
    for record in records.iter().take(LIST_LIMIT) {
        crate::status!(
            "  {} span {}: {}",
            Style::id(&record.unit_id),
            record.span_id.as_deref().unwrap_or("-"),
            preview(&record.after)
        );
    }
}

/// Prints a validation report to stdout.
pub fn print_validation(report: &ValidationReport) {
    if report.total_issues() == 0 {
        println!("{} No issues found", Style::success("✓"));
        return;
    }

    if report.has_correctness_violation() {
        println!(
            "{} {} boundary tokens survived in {} spans",
            Style::error("✗"),
            report.total_tokens(),
            report.surviving_tokens.len()
        );
        for survivor in report.surviving_tokens.iter().take(LIST_LIMIT) {
            println!(
                "  {} span {}: {} ({})",
                Style::id(&survivor.unit_id),
                survivor.span_id.as_deref().unwrap_or("-"),
                preview(&survivor.text),
                survivor.count
            );
        }
        print_overflow(report.surviving_tokens.len());
    }

    if !report.fragment_mismatches.is_empty() {
        println!(
            "{} {} units with a different number of text spans",
            Style::warning("!"),
            report.fragment_mismatches.len()
        );
        for mismatch in report.fragment_mismatches.iter().take(LIST_LIMIT) {
            println!(
                "  {}: source {}, target {}",
                Style::id(&mismatch.unit_id),
                mismatch.source_spans,
                mismatch.target_spans
            );
        }
        print_overflow(report.fragment_mismatches.len());
    }

    if !report.empty_targets.is_empty() {
        println!(
            "{} Empty targets: {}",
            Style::warning("!"),
            report.empty_targets.join(", ")
        );
    }
    if !report.missing_targets.is_empty() {
        println!(
            "{} Missing targets: {}",
            Style::warning("!"),
            report.missing_targets.join(", ")
        );
    }

    if report.is_valid() {
        println!("{}", Style::secondary("No correctness violations"));
    }
}

/// Sweep records, then a one-line validation verdict on stderr.
pub fn print_finished(finished: &Finished) {
    print_sweep(&finished.output.sweep);

    let validation = &finished.validation;
    if validation.has_correctness_violation() {
        crate::warn!(
            "{} {} boundary tokens survived the sweep",
            Style::error("Error:"),
            validation.total_tokens()
        );
    } else if !validation.is_valid() {
        crate::warn!(
            "{} {} units have a different number of text spans than their source",
            Style::warning("Warning:"),
            validation.fragment_mismatches.len()
        );
    } else {
        crate::status!("{} Output validated", Style::success("✓"));
    }
}

/// Exit status for a finished document: `DATAERR` when a token survived.
pub fn exit_code(validation: &ValidationReport) -> exitcode::ExitCode {
    if validation.surviving_tokens.is_empty() {
        exitcode::OK
    } else {
        exitcode::DATAERR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xliff::TokenSurvivor;

    #[test]
    fn test_preview_truncates_on_chars() {
        let long = "é".repeat(100);
        let shown = preview(&long);
        assert_eq!(shown.chars().count(), PREVIEW_CHARS + 3);
        assert!(shown.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_exit_code() {
        let mut report = ValidationReport::default();
        assert_eq!(exit_code(&report), exitcode::OK);

        report.surviving_tokens.push(TokenSurvivor {
            unit_id: "u1".to_string(),
            span_id: None,
            text: "a __SEG__ b".to_string(),
            count: 1,
        });
        assert_eq!(exit_code(&report), exitcode::DATAERR);
    }
}
