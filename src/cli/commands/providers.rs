//! Provider listing command handler.

use anyhow::Result;

use crate::config::{ConfigFile, ConfigManager, ProviderConfig};
use crate::ui::Style;

/// Prints configured providers to stdout.
///
/// If `specific_provider` is provided, shows detailed information for that provider.
/// Otherwise, lists all configured providers with their endpoints and models.
pub fn print_providers(specific_provider: Option<&str>) -> Result<()> {
    let manager = ConfigManager::new()?;
    let config = manager.load_or_default()?;

    if config.providers.is_empty() {
        println!("No providers configured.");
        println!(
            "{}",
            Style::hint(format!(
                "Add a [providers.<name>] section to {}",
                manager.config_path().display()
            ))
        );
        return Ok(());
    }

    match specific_provider {
        Some(name) => print_provider_details(&config, name),
        None => {
            print_provider_list(&config);
            Ok(())
        }
    }
}

fn default_suffix(config: &ConfigFile, name: &str) -> String {
    if config.xlft.provider.as_deref() == Some(name) {
        format!(" {}", Style::default_marker())
    } else {
        String::new()
    }
}

fn print_provider_details(config: &ConfigFile, name: &str) -> Result<()> {
    let Some(provider) = config.providers.get(name) else {
        anyhow::bail!(
            "Provider '{name}' not found\n\n\
             Run 'xlft providers' to list configured providers."
        );
    };

    println!(
        "{} {}{}",
        Style::header("Provider:"),
        Style::value(name),
        default_suffix(config, name)
    );
    println!("  {} {}", Style::label("endpoint"), provider.endpoint);
    if provider.requires_api_key() {
        println!("  {}  {}", Style::label("api_key"), api_key_status(provider));
    }
    if provider.models.is_empty() {
        println!(
            "  {}   {}",
            Style::label("models"),
            Style::secondary("(none configured)")
        );
    } else {
        println!("  {}", Style::label("models"));
        for model in &provider.models {
            println!("    - {model}");
        }
    }

    Ok(())
}

fn print_provider_list(config: &ConfigFile) {
    println!("{}\n", Style::header("Configured providers"));
    for (name, provider) in &config.providers {
        println!("  {}{}", Style::value(name), default_suffix(config, name));
        println!("    {} {}", Style::label("endpoint:"), provider.endpoint);
        if !provider.models.is_empty() {
            println!(
                "    {} {}",
                Style::label("models:"),
                provider.models.join(", ")
            );
        }
    }
}

fn api_key_status(provider: &ProviderConfig) -> String {
    match (provider.get_api_key(), provider.api_key_env.as_deref()) {
        (Some(_), _) => Style::success("(set)"),
        (None, Some(env)) => Style::warning(format!("(not set, export {env})")),
        (None, None) => Style::warning("(not set)"),
    }
}
