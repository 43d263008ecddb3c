//! `xlft inspect`: what a file holds and what would be sent for translation.

use anyhow::Result;
use std::path::Path;

use super::report;
use crate::input::InputReader;
use crate::ui::Style;
use crate::xliff::{FileStatistics, extract_units};
use crate::xml::Document;

const SAMPLE_UNITS: usize = 3;

pub fn run_inspect(file: &Path) -> Result<exitcode::ExitCode> {
    let xml = InputReader::read(file)?;
    let doc = Document::parse(&xml)?;
    let extraction = extract_units(&doc);

    report::print_statistics(&FileStatistics::collect(&doc, &extraction));
    report::print_samples(&extraction, SAMPLE_UNITS);
    report::print_tag_pairing(&extraction);
    report::print_advisories(&extraction.advisories);

    let skipped = extraction.units.len() - extraction.translatable().count();
    if skipped > 0 {
        println!(
            "{}",
            Style::secondary(format!("{skipped} units have no translatable text"))
        );
    }

    Ok(exitcode::OK)
}
