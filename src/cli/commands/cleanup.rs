//! `xlft cleanup`: strips leftover boundary tokens from a translated file.

use anyhow::Result;
use std::path::{Path, PathBuf};

use super::report;
use crate::fs::{atomic_write, cleaned_path};
use crate::input::InputReader;
use crate::ui::Style;
use crate::xliff::{finalize, validate_document};
use crate::xml::Document;

/// Writes the swept document to `output` (default `<stem>_cleaned.xlf`).
///
/// The input is never modified. A file with nothing to remove is still
/// written so the output path is predictable.
pub fn run_cleanup(file: &Path, output: Option<PathBuf>) -> Result<exitcode::ExitCode> {
    let xml = InputReader::read(file)?;
    let doc = Document::parse(&xml)?;
    let finalized = finalize(&doc)?;

    if finalized.sweep.is_empty() {
        crate::status!("{} No boundary tokens found", Style::success("✓"));
    } else {
        report::print_sweep(&finalized.sweep);
    }

    let validation = validate_document(&finalized.document);
    report::print_validation(&validation);

    let output = output.unwrap_or_else(|| cleaned_path(file));
    atomic_write(&output, &finalized.xml)?;
    crate::status!(
        "{} Saved to {}",
        Style::success("✓"),
        Style::value(output.display())
    );

    Ok(report::exit_code(&validation))
}
