use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;
use crate::translation::{LanguagePair, default_pairs, validate_language};
use crate::ui::Style;

/// Port used when neither the command line nor the config file names one.
pub const DEFAULT_PORT: u16 = 5000;

/// Default settings in the `[tarjimani]` section of config.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TarjimaniConfig {
    /// Default provider name.
    pub provider: Option<String>,
    /// Default model name.
    pub model: Option<String>,
    /// Language you type in (ISO 639-1 code).
    pub language: Option<String>,
    /// Port to listen on or connect to.
    pub port: Option<u16>,
    /// Enabled translation directions, e.g. `["en-ka", "ka-en"]`.
    pub pairs: Option<Vec<String>>,
}

impl TarjimaniConfig {
    /// The configured translation directions, or the defaults if none are set.
    pub fn language_pairs(&self) -> Result<Vec<LanguagePair>> {
        match &self.pairs {
            Some(pairs) => parse_pairs(pairs),
            None => Ok(default_pairs()),
        }
    }
}

/// Configuration for a translation provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// The OpenAI-compatible API endpoint URL.
    pub endpoint: String,
    /// API key stored directly in config (not recommended).
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable name containing the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub models: Vec<String>,
}

impl ProviderConfig {
    /// Gets the API key, preferring the environment variable over the file.
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(env_var) = &self.api_key_env
            && let Ok(key) = std::env::var(env_var)
            && !key.is_empty()
        {
            return Some(key);
        }
        self.api_key.clone()
    }

    pub const fn requires_api_key(&self) -> bool {
        self.api_key.is_some() || self.api_key_env.is_some()
    }
}

/// The complete configuration file, `~/.config/tarjimani/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, rename = "tarjimani")]
    pub defaults: TarjimaniConfig,
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Settings for one chat after merging command line and config file.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub provider_name: String,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Local language code.
    pub language: String,
    pub port: u16,
    pub pairs: Vec<LanguagePair>,
}

/// Command line overrides. Each one takes precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub language: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub port: Option<u16>,
}

fn missing(key: &str, flag: &str) -> anyhow::Error {
    anyhow!(
        "Missing required configuration: '{key}'\n\n\
         Please provide it via:\n  \
         - CLI option: tarjimani listen {flag}\n  \
         - Config file: ~/.config/tarjimani/config.toml\n  \
         - Interactive setup: tarjimani configure"
    )
}

/// Resolves configuration by merging CLI options with config file settings.
///
/// # Errors
///
/// Returns an error if provider, model or language is missing, the provider
/// is unknown, a language code or pair is invalid, or a required API key is
/// not available.
pub fn resolve_config(
    options: &ResolveOptions,
    config_file: &ConfigFile,
) -> Result<ResolvedConfig> {
    let defaults = &config_file.defaults;

    let provider_name = options
        .provider
        .as_ref()
        .or(defaults.provider.as_ref())
        .cloned()
        .ok_or_else(|| missing("provider", "--provider <name>"))?;

    let provider_config = config_file
        .providers
        .get(&provider_name)
        .ok_or_else(|| unknown_provider(&provider_name, config_file))?;

    let model = options
        .model
        .as_ref()
        .or(defaults.model.as_ref())
        .cloned()
        .ok_or_else(|| missing("model", "--model <name>"))?;

    if !provider_config.models.is_empty() && !provider_config.models.contains(&model) {
        crate::warn!(
            "{} Model '{}' is not in the configured models list for '{}'\n\
             Configured models: {}\n\
             Proceeding anyway...\n",
            Style::warning("Warning:"),
            model,
            provider_name,
            provider_config.models.join(", ")
        );
    }

    let language = options
        .language
        .as_ref()
        .or(defaults.language.as_ref())
        .cloned()
        .ok_or_else(|| missing("language", "--lang <code>"))?;
    validate_language(&language)?;

    let port = options.port.or(defaults.port).unwrap_or(DEFAULT_PORT);

    let pairs = defaults.language_pairs()?;

    if !pairs.iter().any(|pair| pair.source == language) {
        crate::warn!(
            "{} No enabled language pair translates from '{}'; \
             every peer will be rejected\n",
            Style::warning("Warning:"),
            language
        );
    }

    let api_key = provider_config.get_api_key();

    if provider_config.requires_api_key() && api_key.is_none() {
        let env_var = provider_config.api_key_env.as_deref().unwrap_or("API_KEY");
        bail!(
            "Provider '{provider_name}' requires an API key\n\n\
             Set the {env_var} environment variable:\n  \
             export {env_var}=\"your-api-key\"\n\n\
             Or set api_key in ~/.config/tarjimani/config.toml"
        );
    }

    Ok(ResolvedConfig {
        provider_name,
        endpoint: provider_config.endpoint.clone(),
        model,
        api_key,
        language,
        port,
        pairs,
    })
}

fn unknown_provider(provider_name: &str, config_file: &ConfigFile) -> anyhow::Error {
    let mut available: Vec<_> = config_file.providers.keys().map(String::as_str).collect();
    available.sort_unstable();

    if available.is_empty() {
        anyhow!(
            "Provider '{provider_name}' not found\n\n\
             No providers configured. Add providers to ~/.config/tarjimani/config.toml"
        )
    } else {
        anyhow!(
            "Provider '{provider_name}' not found\n\n\
             Available providers:\n  \
             - {}\n\n\
             Add providers to ~/.config/tarjimani/config.toml",
            available.join("\n  - ")
        )
    }
}

/// Parses `pairs` entries like `en-ka`, rejecting unknown language codes.
fn parse_pairs(pairs: &[String]) -> Result<Vec<LanguagePair>> {
    pairs
        .iter()
        .map(|raw| {
            let pair: LanguagePair = raw.parse()?;
            validate_language(&pair.source)
                .and_then(|()| validate_language(&pair.target))
                .with_context(|| format!("Invalid entry in 'pairs': '{raw}'"))?;
            Ok(pair)
        })
        .collect()
}

/// Loads and saves the configuration file.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Uses `$XDG_CONFIG_HOME/tarjimani/config.toml`, falling back to
    /// `~/.config/tarjimani/config.toml`.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: paths::config_dir()?.join("config.toml"),
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<ConfigFile> {
        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        toml::from_str(&contents).with_context(|| {
            format!("Failed to parse config file: {}", self.config_path.display())
        })
    }

    pub fn save(&self, config: &ConfigFile) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
        crate::fs::atomic_write(&self.config_path, &contents)
    }

    /// Loads the file, or an empty configuration if it is missing.
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
