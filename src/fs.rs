//! File system utilities.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes content to a file atomically using a temp file and rename.
///
/// The temp file lives next to the target so the rename stays on one
/// filesystem; an interrupted run never leaves a half-written XLF behind.
///
/// # Errors
///
/// Returns an error if the temp file cannot be written or renamed.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().unwrap_or_default().to_string_lossy();
    let temp_path = parent.join(format!(".{file_name}.tmp"));

    fs::write(&temp_path, content)
        .with_context(|| format!("Failed to write temporary file: {}", temp_path.display()))?;

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;

    Ok(())
}

/// `<dir>/<stem>_translated.xlf` for an input `<dir>/<stem>.xlf`.
pub fn translated_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("{stem}_translated.xlf"))
}

/// `<dir>/<stem>_cleaned.xlf`, used by `cleanup` when no output is given.
pub fn cleaned_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("{stem}_cleaned.xlf"))
}
