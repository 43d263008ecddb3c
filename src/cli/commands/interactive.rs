//! Guided translation: pick a file, check it, translate, review, save.

use anyhow::{Context, Result, bail};
use inquire::{Confirm, Editor, Select, Text};
use std::fmt;
use std::path::{Path, PathBuf};

use super::configure::select_target_language;
use super::report;
use super::translate::{
    TranslateOptions, build_gateway, gateway_params, load_config, open_cache, print_cache_hits,
    translate_with_spinner,
};
use crate::config::ConfigManager;
use crate::fs::{atomic_write, translated_path};
use crate::input::InputReader;
use crate::pipeline::{Pipeline, Translation};
use crate::translation::{CachedGateway, OpenAiGateway};
use crate::ui::{Style, is_prompt_cancellation};
use crate::xliff::{Extraction, FileStatistics};
use crate::xml::Document;

/// Units shown before asking for confirmation.
const SAMPLE_UNITS: usize = 3;

const CONTEXT_TEMPLATE: &str = "# Additional context or rules for this translation.\n\
     # Lines starting with # are ignored. Leave empty to skip.\n\
     # e.g. This is a training module for healthcare professionals. Use a formal tone.\n\n";

/// A file offered in the selection list.
struct FileChoice {
    path: PathBuf,
    size: u64,
}

impl fmt::Display for FileChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned());
        write!(f, "{name} ({:.2} KB)", self.size as f64 / 1024.0)
    }
}

/// Runs the interactive flow. Cancelling any prompt ends it quietly.
pub async fn run_interactive(options: TranslateOptions) -> Result<exitcode::ExitCode> {
    match run_interactive_inner(options).await {
        Err(e) if is_prompt_cancellation(&e) => {
            println!();
            Ok(exitcode::OK)
        }
        other => other,
    }
}

async fn run_interactive_inner(mut options: TranslateOptions) -> Result<exitcode::ExitCode> {
    let manager = ConfigManager::new()?;
    let file_config = manager.load_or_default()?;
    let data_dir = file_config
        .xlft
        .data_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));

    let file = select_file(&data_dir)?;

    if options.to.is_none() {
        let default = file_config.xlft.to.as_deref();
        options.to = Some(select_target_language("Target language:", default)?);
    }

    let xml = InputReader::read(&file)?;
    let mut doc = Document::parse(&xml)?;
    let extraction = Pipeline::<OpenAiGateway>::prepare(&doc);

    println!();
    report::print_statistics(&FileStatistics::collect(&doc, &extraction));
    report::print_samples(&extraction, SAMPLE_UNITS);
    report::print_tag_pairing(&extraction);
    report::print_advisories(&extraction.advisories);
    println!();

    if !Confirm::new("Translate this file?")
        .with_default(true)
        .prompt()?
    {
        println!("Cancelled");
        return Ok(exitcode::OK);
    }

    if options.preserve.is_empty() {
        options.preserve = prompt_preserve_terms(&file_config.xlft.preserve_terms)?;
    }
    let prompted_context = prompt_context(
        options
            .context
            .as_deref()
            .or(file_config.xlft.context.as_deref()),
    )?;
    options.context = prompted_context;

    let config = load_config(&options.resolve_options())?;
    let params = gateway_params(&config, &doc);
    let gateway = build_gateway(&config, options.sequential);

    let translation = match open_cache(options.no_cache) {
        Some(cache) => {
            let gateway = CachedGateway::new(
                gateway,
                cache,
                config.model.clone(),
                config.endpoint.clone(),
            );
            let pipeline = Pipeline::new(gateway, params);
            let translation = translate_with_spinner(&pipeline, &extraction).await;
            print_cache_hits(pipeline.gateway().hits());
            translation
        }
        None => translate_with_spinner(&Pipeline::new(gateway, params), &extraction).await,
    };

    println!();
    report::print_translation(&translation);
    report::print_review(&translation.review);

    if !confirm_save(&translation)? {
        println!("Translation not saved");
        return Ok(exitcode::OK);
    }

    let output = options.output.unwrap_or_else(|| translated_path(&file));
    save(&mut doc, &extraction, &translation, &output)
}

fn select_file(data_dir: &Path) -> Result<PathBuf> {
    let files = InputReader::list_xliff_files(data_dir)?;
    if files.is_empty() {
        bail!(
            "No XLF files found in '{}'\n\n\
             Pass a file directly: xlft <file>\n\
             Or set data_dir in ~/.config/xlft/config.toml",
            data_dir.display()
        );
    }

    let choices = files
        .into_iter()
        .map(|path| {
            let size = std::fs::metadata(&path)
                .with_context(|| format!("Failed to read metadata of {}", path.display()))?
                .len();
            Ok(FileChoice { path, size })
        })
        .collect::<Result<Vec<_>>>()?;

    let choice = Select::new("Select a file:", choices).prompt()?;
    Ok(choice.path)
}

fn prompt_preserve_terms(configured: &[String]) -> Result<Vec<String>> {
    let default = configured.join(", ");
    let mut prompt = Text::new("Terms to preserve:")
        .with_help_message("Brand or product names that must not be translated, comma-separated");
    if !default.is_empty() {
        prompt = prompt.with_default(&default);
    }

    Ok(parse_terms(&prompt.prompt()?))
}

fn parse_terms(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

fn prompt_context(current: Option<&str>) -> Result<Option<String>> {
    let predefined = match current {
        Some(context) => format!("{CONTEXT_TEMPLATE}{context}\n"),
        None => CONTEXT_TEMPLATE.to_string(),
    };

    let context = Editor::new("Additional context (opens editor):")
        .with_help_message("Added to the translation prompt. Save and close editor when done.")
        .with_predefined_text(&predefined)
        .prompt()?;

    let context = filter_comment_lines(&context);
    Ok((!context.is_empty()).then_some(context))
}

/// Filters out comment lines (starting with #) and trims the result.
fn filter_comment_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn confirm_save(translation: &Translation) -> Result<bool> {
    let critical = translation.has_critical_issues();
    if critical {
        crate::warn!(
            "{} Review found critical issues. You may still save the file, but check it carefully.",
            Style::warning("Warning:")
        );
    }

    Ok(Confirm::new("Save translated file?")
        .with_default(!critical)
        .prompt()?)
}

fn save(
    doc: &mut Document,
    extraction: &Extraction,
    translation: &Translation,
    output: &Path,
) -> Result<exitcode::ExitCode> {
    let reconstruction = Pipeline::<OpenAiGateway>::apply(doc, extraction, translation);
    let finished = Pipeline::<OpenAiGateway>::finalize(doc)?;

    report::print_reconstruction(&reconstruction);
    report::print_finished(&finished);

    atomic_write(output, finished.xml())?;
    let size_kb = finished.xml().len() as f64 / 1024.0;
    println!(
        "{} Saved to {} ({size_kb:.2} KB)",
        Style::success("✓"),
        Style::value(output.display())
    );

    Ok(report::exit_code(&finished.validation))
}
