use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::paths;
use crate::translation::DEFAULT_BATCH_SIZE;

/// Default settings in the `[xlft]` section of config.toml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default provider name.
    pub provider: Option<String>,
    /// Default model name.
    pub model: Option<String>,
    /// Default target language code.
    pub to: Option<String>,
    /// Units per request in batch mode.
    pub batch_size: Option<usize>,
    /// Directory the interactive flow lists `.xlf` files from.
    pub data_dir: Option<PathBuf>,
    /// Terms that are never translated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preserve_terms: Vec<String>,
    /// Extra prompt context applied to every run.
    pub context: Option<String>,
}

/// Configuration for a translation provider.
///
/// Each provider has an endpoint and optional API key settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// The OpenAI-compatible API endpoint URL.
    pub endpoint: String,
    /// API key stored directly in config (not recommended).
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable name containing the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// List of available models for this provider.
    #[serde(default)]
    pub models: Vec<String>,
}

impl ProviderConfig {
    /// Gets the API key, preferring environment variable over config file.
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(env_var) = &self.api_key_env
            && let Ok(key) = std::env::var(env_var)
            && !key.is_empty()
        {
            return Some(key);
        }
        self.api_key.clone()
    }

    /// Returns `true` if this provider requires an API key.
    pub const fn requires_api_key(&self) -> bool {
        self.api_key.is_some() || self.api_key_env.is_some()
    }
}

/// The complete configuration file structure.
///
/// Corresponds to `~/.config/xlft/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub xlft: DefaultsConfig,
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
}

/// Resolved configuration after merging CLI arguments and config file.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub provider_name: String,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub target_language: String,
    pub batch_size: usize,
    pub preserve_terms: Vec<String>,
    pub context: Option<String>,
    /// Set when the model is not among the provider's configured models.
    pub unlisted_model: bool,
}

/// Options for resolving configuration.
///
/// Contains CLI overrides that take precedence over config file values.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub to: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub batch_size: Option<usize>,
    /// Replaces the configured preserve terms when non-empty.
    pub preserve_terms: Vec<String>,
    pub context: Option<String>,
}

/// Resolves configuration by merging CLI options with config file settings.
///
/// CLI options take precedence over config file values.
///
/// # Errors
///
/// Returns an error if required configuration (provider, model, target language)
/// is missing or if the specified provider is not found.
pub fn resolve_config(
    options: &ResolveOptions,
    config_file: &ConfigFile,
) -> Result<ResolvedConfig> {
    let defaults = &config_file.xlft;

    let provider_name = options
        .provider
        .as_ref()
        .or(defaults.provider.as_ref())
        .cloned()
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Missing required configuration: 'provider'\n\n\
                 Please provide it via:\n  \
                 - CLI option: xlft --provider <name>\n  \
                 - Config file: ~/.config/xlft/config.toml"
            )
        })?;

    let provider_config = config_file.providers.get(&provider_name).ok_or_else(|| {
        if config_file.providers.is_empty() {
            anyhow::anyhow!(
                "Provider '{provider_name}' not found\n\n\
                 No providers configured. Add providers to ~/.config/xlft/config.toml"
            )
        } else {
            anyhow::anyhow!(
                "Provider '{provider_name}' not found\n\n\
                 Available providers:\n  \
                 - {}\n\n\
                 Add providers to ~/.config/xlft/config.toml",
                config_file
                    .providers
                    .keys()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join("\n  - ")
            )
        }
    })?;

    let model = options
        .model
        .as_ref()
        .or(defaults.model.as_ref())
        .cloned()
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Missing required configuration: 'model'\n\n\
                 Please provide it via:\n  \
                 - CLI option: xlft --model <name>\n  \
                 - Config file: ~/.config/xlft/config.toml"
            )
        })?;

    let unlisted_model =
        !provider_config.models.is_empty() && !provider_config.models.contains(&model);

    let target_language = options
        .to
        .as_ref()
        .or(defaults.to.as_ref())
        .cloned()
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Missing required configuration: 'to' (target language)\n\n\
                 Please provide it via:\n  \
                 - CLI option: xlft --to <lang>\n  \
                 - Config file: ~/.config/xlft/config.toml"
            )
        })?;

    let api_key = provider_config.get_api_key();

    if provider_config.requires_api_key() && api_key.is_none() {
        let env_var = provider_config.api_key_env.as_deref().unwrap_or("API_KEY");
        bail!(
            "Provider '{provider_name}' requires an API key\n\n\
             Set the {env_var} environment variable:\n  \
             export {env_var}=\"your-api-key\"\n\n\
             Or set api_key in ~/.config/xlft/config.toml"
        );
    }

    let batch_size = options
        .batch_size
        .or(defaults.batch_size)
        .unwrap_or(DEFAULT_BATCH_SIZE);
    if batch_size == 0 {
        bail!("Invalid batch size: 0\n\nUse 1 or more units per request.");
    }

    let preserve_terms = if options.preserve_terms.is_empty() {
        defaults.preserve_terms.clone()
    } else {
        options.preserve_terms.clone()
    };

    Ok(ResolvedConfig {
        provider_name,
        endpoint: provider_config.endpoint.clone(),
        model,
        api_key,
        target_language,
        batch_size,
        preserve_terms,
        context: options.context.clone().or_else(|| defaults.context.clone()),
        unlisted_model,
    })
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager.
    ///
    /// Configuration is stored at `$XDG_CONFIG_HOME/xlft/config.toml`
    /// or `~/.config/xlft/config.toml` if `XDG_CONFIG_HOME` is not set.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: paths::config_dir()?.join("config.toml"),
        })
    }

    /// A manager for the config file at `config_path`.
    pub fn at(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub const fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn load(&self) -> Result<ConfigFile> {
        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        let config_file: ConfigFile =
            toml::from_str(&contents).with_context(|| "Failed to parse config file")?;

        Ok(config_file)
    }

    pub fn save(&self, config: &ConfigFile) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, contents).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;

        Ok(())
    }

    /// Loads the config file, or returns the default when there is none.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(&self) -> Result<ConfigFile> {
        if self.config_path.exists() {
            self.load()
        } else {
            Ok(ConfigFile::default())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn create_test_manager(temp_dir: &TempDir) -> ConfigManager {
        ConfigManager::at(temp_dir.path().join("config.toml"))
    }

    fn provider(endpoint: &str, api_key_env: Option<&str>, models: &[&str]) -> ProviderConfig {
        ProviderConfig {
            endpoint: endpoint.to_string(),
            api_key: None,
            api_key_env: api_key_env.map(str::to_string),
            models: models.iter().map(ToString::to_string).collect(),
        }
    }

    fn create_test_config() -> ConfigFile {
        let mut providers = BTreeMap::new();
        providers.insert(
            "ollama".to_string(),
            provider("http://localhost:11434", None, &["gemma3:12b"]),
        );
        providers.insert(
            "openai".to_string(),
            provider(
                "https://api.openai.com",
                Some("XLFT_TEST_NONEXISTENT_API_KEY"),
                &["gpt-4o"],
            ),
        );

        ConfigFile {
            xlft: DefaultsConfig {
                provider: Some("ollama".to_string()),
                model: Some("gemma3:12b".to_string()),
                to: Some("es".to_string()),
                batch_size: Some(5),
                data_dir: Some(PathBuf::from("/data/xlf")),
                preserve_terms: vec!["Pixel".to_string()],
                context: Some("Retail training".to_string()),
            },
            providers,
        }
    }

    fn create_test_options() -> ResolveOptions {
        ResolveOptions {
            to: Some("fr".to_string()),
            provider: Some("ollama".to_string()),
            model: Some("gemma3:12b".to_string()),
            ..ResolveOptions::default()
        }
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);
        let config = create_test_config();

        manager.save(&config).unwrap();
        let loaded = manager.load().unwrap();

        assert_eq!(loaded, config);
        let raw = fs::read_to_string(manager.config_path()).unwrap();
        assert!(raw.contains("[xlft]"));
        assert!(raw.contains("[providers.ollama]"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);

        assert!(manager.load().is_err());
        assert_eq!(manager.load_or_default().unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_load_or_default_reports_broken_file() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);
        fs::write(manager.config_path(), "[xlft\nprovider = ").unwrap();

        assert!(manager.load_or_default().is_err());
    }

    #[test]
    fn test_minimal_file_parses() {
        let config: ConfigFile = toml::from_str(
            "[xlft]\nto = \"de\"\n\n[providers.local]\nendpoint = \"http://localhost:8080\"\n",
        )
        .unwrap();

        assert_eq!(config.xlft.to.as_deref(), Some("de"));
        assert!(config.xlft.preserve_terms.is_empty());
        assert!(config.providers["local"].models.is_empty());
    }

    #[test]
    #[serial]
    fn test_provider_get_api_key_from_env() {
        // SAFETY: serialized with the other env-touching tests
        unsafe {
            std::env::set_var("XLFT_TEST_API_KEY", "test-key-value");
        }

        let provider = ProviderConfig {
            api_key: Some("fallback-key".to_string()),
            ..provider("https://api.example.com", Some("XLFT_TEST_API_KEY"), &[])
        };

        // Environment variable takes priority
        assert_eq!(provider.get_api_key(), Some("test-key-value".to_string()));

        unsafe {
            std::env::remove_var("XLFT_TEST_API_KEY");
        }
        assert_eq!(provider.get_api_key(), Some("fallback-key".to_string()));
    }

    #[test]
    fn test_provider_requires_api_key() {
        assert!(provider("https://api.example.com", Some("KEY"), &[]).requires_api_key());
        assert!(!provider("http://localhost:11434", None, &[]).requires_api_key());
    }

    #[test]
    fn test_resolve_config_cli_overrides_file() {
        let options = ResolveOptions {
            batch_size: Some(3),
            preserve_terms: vec!["Acme".to_string()],
            context: Some("Formal".to_string()),
            ..create_test_options()
        };

        let resolved = resolve_config(&options, &create_test_config()).unwrap();

        assert_eq!(resolved.target_language, "fr");
        assert_eq!(resolved.batch_size, 3);
        assert_eq!(resolved.preserve_terms, vec!["Acme"]);
        assert_eq!(resolved.context.as_deref(), Some("Formal"));
        assert!(!resolved.unlisted_model);
    }

    #[test]
    fn test_resolve_config_falls_back_to_file() {
        let resolved =
            resolve_config(&ResolveOptions::default(), &create_test_config()).unwrap();

        assert_eq!(resolved.provider_name, "ollama");
        assert_eq!(resolved.endpoint, "http://localhost:11434");
        assert_eq!(resolved.target_language, "es");
        assert_eq!(resolved.batch_size, 5);
        assert_eq!(resolved.preserve_terms, vec!["Pixel"]);
        assert_eq!(resolved.context.as_deref(), Some("Retail training"));
    }

    #[test]
    fn test_resolve_config_builtin_batch_size() {
        let mut config = create_test_config();
        config.xlft.batch_size = None;

        let resolved = resolve_config(&create_test_options(), &config).unwrap();
        assert_eq!(resolved.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_resolve_config_rejects_zero_batch_size() {
        let options = ResolveOptions {
            batch_size: Some(0),
            ..create_test_options()
        };
        assert!(resolve_config(&options, &create_test_config()).is_err());
    }

    #[test]
    fn test_resolve_config_flags_unlisted_model() {
        let options = ResolveOptions {
            model: Some("llama3".to_string()),
            ..create_test_options()
        };
        let resolved = resolve_config(&options, &create_test_config()).unwrap();
        assert!(resolved.unlisted_model);
    }

    #[test]
    fn test_resolve_config_missing_provider() {
        let err = resolve_config(&create_test_options(), &ConfigFile::default()).unwrap_err();
        assert!(err.to_string().contains("not found"));

        let options = ResolveOptions {
            provider: None,
            ..create_test_options()
        };
        let err = resolve_config(&options, &ConfigFile::default()).unwrap_err();
        assert!(err.to_string().contains("provider"));
    }

    #[test]
    fn test_resolve_config_missing_model_and_language() {
        let mut config = create_test_config();
        config.xlft.model = None;
        config.xlft.to = None;

        let options = ResolveOptions {
            model: None,
            ..create_test_options()
        };
        assert!(
            resolve_config(&options, &config)
                .unwrap_err()
                .to_string()
                .contains("'model'")
        );

        let options = ResolveOptions {
            to: None,
            ..create_test_options()
        };
        assert!(
            resolve_config(&options, &config)
                .unwrap_err()
                .to_string()
                .contains("'to'")
        );
    }

    #[test]
    #[serial]
    fn test_resolve_config_api_key_required_but_missing() {
        let options = ResolveOptions {
            provider: Some("openai".to_string()),
            model: Some("gpt-4o".to_string()),
            ..create_test_options()
        };

        let err = resolve_config(&options, &create_test_config()).unwrap_err();
        assert!(err.to_string().contains("API key"));
    }
}
