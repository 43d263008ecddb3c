use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

const MAX_INPUT_SIZE: u64 = 64 * 1024 * 1024; // 64MB

const XLIFF_EXTENSIONS: &[&str] = &["xlf", "xliff"];

pub struct InputReader;

impl InputReader {
    /// Reads an XLIFF file as UTF-8 text.
    pub fn read(path: &Path) -> Result<String> {
        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to access file: {}", path.display()))?;

        if metadata.is_dir() {
            bail!(
                "Error: '{}' is a directory.\n\n\
                 Pass an .xlf file, or run 'xlft' without arguments to pick one interactively.",
                path.display()
            );
        }

        let size = metadata.len();
        if size > MAX_INPUT_SIZE {
            bail!(
                "Error: Input size ({:.1} MB) exceeds maximum allowed size (64 MB).\n\n\
                 Consider exporting the course in smaller parts.",
                size as f64 / 1024.0 / 1024.0
            );
        }

        let bytes =
            fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
        String::from_utf8(bytes)
            .with_context(|| format!("File is not valid UTF-8: {}", path.display()))
    }

    /// XLIFF files directly inside `dir`, sorted by name.
    pub fn list_xliff_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read data directory: {}", dir.display()))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("Failed to read data directory: {}", dir.display()))?
                .path();
            if path.is_file() && is_xliff(&path) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }
}

fn is_xliff(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            XLIFF_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}
