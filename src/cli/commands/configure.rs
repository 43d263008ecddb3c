//! Configure command handler for editing default settings.

use anyhow::{Result, bail};
use inquire::{Select, Text};
use std::path::PathBuf;

use crate::config::{ConfigFile, ConfigManager, DefaultsConfig};
use crate::translation::{DEFAULT_BATCH_SIZE, SUPPORTED_LANGUAGES};
use crate::ui::{Style, handle_prompt_cancellation};

/// Runs the configure command to edit default settings.
///
/// Allows the user to interactively set the default provider, model, target
/// language, batch size and data directory. Other settings are kept.
pub fn run_configure() -> Result<()> {
    handle_prompt_cancellation(run_configure_inner)
}

fn run_configure_inner() -> Result<()> {
    let manager = ConfigManager::new()?;
    let mut config = manager.load_or_default()?;

    if config.providers.is_empty() {
        bail!(
            "No providers configured.\n\n\
             Add a [providers.<name>] section to {} first.",
            manager.config_path().display()
        );
    }

    print_current_defaults(&config);

    let provider_names: Vec<String> = config.providers.keys().cloned().collect();
    let provider = select_provider(&provider_names, config.xlft.provider.as_deref())?;

    let available_models: Vec<String> = config
        .providers
        .get(&provider)
        .map(|p| p.models.clone())
        .unwrap_or_default();
    let model = select_model(&available_models, config.xlft.model.as_deref())?;

    let to = select_target_language("Default target language:", config.xlft.to.as_deref())?;
    let batch_size = prompt_batch_size(config.xlft.batch_size)?;
    let data_dir = prompt_data_dir(config.xlft.data_dir.as_ref())?;

    config.xlft = DefaultsConfig {
        provider: Some(provider),
        model: Some(model),
        to: Some(to),
        batch_size,
        data_dir,
        ..std::mem::take(&mut config.xlft)
    };

    manager.save(&config)?;

    println!();
    println!(
        "{} Configuration saved to {}",
        Style::success("✓"),
        Style::secondary(manager.config_path().display().to_string())
    );

    Ok(())
}

fn print_current_defaults(config: &ConfigFile) {
    let not_set = || Style::secondary("(not set)");
    let defaults = &config.xlft;

    println!("{}", Style::header("Current defaults"));
    println!(
        "  {}    {}",
        Style::label("provider"),
        defaults.provider.as_deref().map_or_else(not_set, Style::value)
    );
    println!(
        "  {}       {}",
        Style::label("model"),
        defaults.model.as_deref().map_or_else(not_set, Style::value)
    );
    println!(
        "  {}          {}",
        Style::label("to"),
        defaults.to.as_deref().map_or_else(not_set, Style::value)
    );
    println!(
        "  {}  {}",
        Style::label("batch_size"),
        defaults.batch_size.map_or_else(not_set, Style::value)
    );
    println!(
        "  {}    {}",
        Style::label("data_dir"),
        defaults
            .data_dir
            .as_ref()
            .map_or_else(not_set, |dir| Style::value(dir.display()))
    );
    if !defaults.preserve_terms.is_empty() {
        println!(
            "  {}    {}",
            Style::label("preserve"),
            Style::value(defaults.preserve_terms.join(", "))
        );
    }
    println!();
}

fn select_provider(providers: &[String], default: Option<&str>) -> Result<String> {
    let default_index = default
        .and_then(|d| providers.iter().position(|p| p == d))
        .unwrap_or(0);

    let selection = Select::new("Default provider:", providers.to_vec())
        .with_starting_cursor(default_index)
        .prompt()?;

    Ok(selection)
}

fn select_model(available_models: &[String], default: Option<&str>) -> Result<String> {
    if available_models.is_empty() {
        let mut prompt = Text::new("Default model:").with_help_message("Enter the model name");

        if let Some(d) = default {
            prompt = prompt.with_default(d);
        }

        let model = prompt.prompt()?;

        if model.trim().is_empty() {
            bail!("Model name cannot be empty");
        }

        Ok(model.trim().to_string())
    } else {
        let default_index = default
            .and_then(|d| available_models.iter().position(|m| m == d))
            .unwrap_or(0);

        let selection = Select::new("Default model:", available_models.to_vec())
            .with_starting_cursor(default_index)
            .prompt()?;

        Ok(selection)
    }
}

/// Lets the user pick a language from the supported list.
///
/// A configured regional variant (`de-AT`) preselects its primary language.
pub(crate) fn select_target_language(message: &str, default: Option<&str>) -> Result<String> {
    let options: Vec<String> = SUPPORTED_LANGUAGES
        .iter()
        .map(|(code, name)| format!("{code} - {name}"))
        .collect();

    let default_index = default
        .and_then(|d| {
            let primary = d.split('-').next().unwrap_or(d);
            SUPPORTED_LANGUAGES
                .iter()
                .position(|(code, _)| *code == d)
                .or_else(|| SUPPORTED_LANGUAGES.iter().position(|(code, _)| *code == primary))
        })
        .unwrap_or(0);

    let selection = Select::new(message, options)
        .with_starting_cursor(default_index)
        .prompt()?;

    Ok(code_of(&selection).to_string())
}

/// Extracts the code from a "code - Name" option.
fn code_of(option: &str) -> &str {
    option.split(" - ").next().unwrap_or(option)
}

fn prompt_batch_size(current: Option<usize>) -> Result<Option<usize>> {
    let default = current.unwrap_or(DEFAULT_BATCH_SIZE).to_string();
    let input = Text::new("Units per request:")
        .with_default(&default)
        .with_help_message("Batch size for translation requests (1 translates one unit at a time)")
        .prompt()?;

    parse_batch_size(&input)
}

fn parse_batch_size(input: &str) -> Result<Option<usize>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    match input.parse::<usize>() {
        Ok(0) | Err(_) => bail!("Invalid batch size: '{input}'\n\nUse 1 or more units per request."),
        Ok(size) if size == DEFAULT_BATCH_SIZE => Ok(None),
        Ok(size) => Ok(Some(size)),
    }
}

fn prompt_data_dir(current: Option<&PathBuf>) -> Result<Option<PathBuf>> {
    let default = current.map(|d| d.display().to_string()).unwrap_or_default();
    let mut prompt = Text::new("Data directory:")
        .with_help_message("Where interactive mode looks for .xlf files (empty = current directory)");
    if !default.is_empty() {
        prompt = prompt.with_default(&default);
    }

    let input = prompt.prompt()?;
    let input = input.trim();
    Ok((!input.is_empty()).then(|| PathBuf::from(input)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_code_of() {
        assert_eq!(code_of("pt-BR - Portuguese (Brazil)"), "pt-BR");
        assert_eq!(code_of("es"), "es");
    }

    #[test]
    fn test_parse_batch_size() {
        assert_eq!(parse_batch_size("25").unwrap(), Some(25));
        assert_eq!(parse_batch_size(" ").unwrap(), None);
        assert_eq!(parse_batch_size(&DEFAULT_BATCH_SIZE.to_string()).unwrap(), None);
        assert!(parse_batch_size("0").is_err());
        assert!(parse_batch_size("ten").is_err());
    }
}
