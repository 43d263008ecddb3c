//! `xlft validate`: checks a translated file for leftover boundary tokens.

use anyhow::Result;
use std::path::Path;

use super::report;
use crate::input::InputReader;
use crate::xliff::validate_document;
use crate::xml::Document;

/// Exits with `DATAERR` when any target span still carries a boundary token.
pub fn run_validate(file: &Path) -> Result<exitcode::ExitCode> {
    let xml = InputReader::read(file)?;
    let doc = Document::parse(&xml)?;
    let validation = validate_document(&doc);

    report::print_validation(&validation);
    Ok(report::exit_code(&validation))
}
