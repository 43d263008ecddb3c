use anyhow::Result;
use std::path::{Path, PathBuf};

use super::report;
use crate::cache::CacheManager;
use crate::config::{ConfigManager, ResolveOptions, ResolvedConfig, resolve_config};
use crate::fs::{atomic_write, translated_path};
use crate::input::InputReader;
use crate::pipeline::{Pipeline, RunReport, Translation};
use crate::translation::{
    CachedGateway, ChatClient, Gateway, GatewayMode, GatewayParams, OpenAiGateway,
};
use crate::ui::{Spinner, Style};
use crate::xliff::{Extraction, source_language};
use crate::xml::Document;

/// Translation flags shared by the file and interactive modes.
#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    pub to: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub preserve: Vec<String>,
    pub context: Option<String>,
    pub batch_size: Option<usize>,
    pub sequential: bool,
    pub output: Option<PathBuf>,
    pub no_cache: bool,
}

impl TranslateOptions {
    pub(crate) fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            to: self.to.clone(),
            provider: self.provider.clone(),
            model: self.model.clone(),
            batch_size: self.batch_size,
            preserve_terms: self.preserve.clone(),
            context: self.context.clone(),
        }
    }
}

/// Translates one file and writes `<stem>_translated.xlf` (or `--output`).
///
/// Returns `DATAERR` when a boundary token survived the sweep; the file is
/// written either way so it can be inspected.
pub async fn run_translate(file: &Path, options: &TranslateOptions) -> Result<exitcode::ExitCode> {
    let config = load_config(&options.resolve_options())?;

    let xml = InputReader::read(file)?;
    let mut doc = Document::parse(&xml)?;
    let params = gateway_params(&config, &doc);
    let gateway = build_gateway(&config, options.sequential);

    crate::status!(
        "{} {} → {} with {} ({})",
        Style::header("Translating"),
        Style::value(file.display()),
        Style::code(&config.target_language),
        Style::value(&config.model),
        Style::secondary(&config.provider_name)
    );

    let report = match open_cache(options.no_cache) {
        Some(cache) => {
            let gateway = CachedGateway::new(
                gateway,
                cache,
                config.model.clone(),
                config.endpoint.clone(),
            );
            let pipeline = Pipeline::new(gateway, params);
            let report = run_with_spinner(&pipeline, &mut doc).await?;
            print_cache_hits(pipeline.gateway().hits());
            report
        }
        None => run_with_spinner(&Pipeline::new(gateway, params), &mut doc).await?,
    };

    report::print_translation(&report.translation);
    report::print_review(&report.translation.review);
    report::print_reconstruction(&report.reconstruction);
    report::print_finished(&report.finished);

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| translated_path(file));
    atomic_write(&output, report.finished.xml())?;
    crate::status!(
        "{} Saved to {}",
        Style::success("✓"),
        Style::value(output.display())
    );

    Ok(report::exit_code(&report.finished.validation))
}

/// Loads the config file and merges CLI overrides into it.
pub(crate) fn load_config(options: &ResolveOptions) -> Result<ResolvedConfig> {
    let manager = ConfigManager::new()?;
    let file = manager.load_or_default()?;
    let config = resolve_config(options, &file)?;

    if config.unlisted_model {
        crate::warn!(
            "{} Model '{}' is not listed for provider '{}'",
            Style::warning("Warning:"),
            config.model,
            config.provider_name
        );
    }

    Ok(config)
}

pub(crate) fn gateway_params(config: &ResolvedConfig, doc: &Document) -> GatewayParams {
    GatewayParams {
        target_language: config.target_language.clone(),
        source_language: source_language(doc),
        preserve_terms: config.preserve_terms.clone(),
        extra_context: config.context.clone(),
    }
}

pub(crate) fn build_gateway(config: &ResolvedConfig, sequential: bool) -> OpenAiGateway {
    let client = ChatClient::new(
        config.endpoint.clone(),
        config.api_key.clone(),
        config.model.clone(),
    );
    let mode = if sequential {
        GatewayMode::Sequential
    } else {
        GatewayMode::Batch
    };

    OpenAiGateway::new(client)
        .with_mode(mode)
        .with_batch_size(config.batch_size)
}

/// Opens the translation cache unless disabled. A cache that cannot be
/// opened is reported and the run continues without it.
pub(crate) fn open_cache(no_cache: bool) -> Option<CacheManager> {
    if no_cache {
        return None;
    }

    match CacheManager::new() {
        Ok(cache) => Some(cache),
        Err(e) => {
            crate::warn!(
                "{} Cache unavailable, continuing without it: {e:#}",
                Style::warning("Warning:")
            );
            None
        }
    }
}

pub(crate) fn print_cache_hits(hits: usize) {
    if hits > 0 {
        crate::status!("{}", Style::secondary(format!("{hits} units served from cache")));
    }
}

fn spinner_message(count: usize) -> String {
    format!("Translating {count} units...")
}

async fn run_with_spinner<G: Gateway>(
    pipeline: &Pipeline<G>,
    doc: &mut Document,
) -> Result<RunReport> {
    let count = Pipeline::<G>::prepare(doc).translatable().count();
    let spinner = Spinner::new(&spinner_message(count));
    let report = pipeline.run(doc).await;
    spinner.stop();
    report
}

pub(crate) async fn translate_with_spinner<G: Gateway>(
    pipeline: &Pipeline<G>,
    extraction: &Extraction,
) -> Translation {
    let spinner = Spinner::new(&spinner_message(extraction.translatable().count()));
    let translation = pipeline.translate(extraction).await;
    spinner.stop();
    translation
}
