//! Configure command handler for editing default settings.

use anyhow::{Context, Result, bail};
use inquire::{Select, Text};

use crate::config::{ConfigFile, ConfigManager, DEFAULT_PORT, TarjimaniConfig};
use crate::translation::{LanguagePair, SUPPORTED_LANGUAGES, default_pairs};
use crate::ui::{Style, handle_prompt_cancellation};

/// Interactively sets the default provider, model, language, port and pairs.
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

    let mut provider_names: Vec<String> = config.providers.keys().cloned().collect();
    provider_names.sort();
    let provider = select_provider(&provider_names, config.defaults.provider.as_deref())?;

    let available_models: Vec<String> = config
        .providers
        .get(&provider)
        .map(|p| p.models.clone())
        .unwrap_or_default();
    let model = select_model(&available_models, config.defaults.model.as_deref())?;

    let language = select_language(config.defaults.language.as_deref())?;
    let port = prompt_port(config.defaults.port)?;
    let pairs = prompt_pairs(config.defaults.pairs.as_deref())?;

    config.defaults = TarjimaniConfig {
        provider: Some(provider),
        model: Some(model),
        language: Some(language),
        port: Some(port),
        pairs: Some(pairs),
    };

    manager.save(&config)?;

    println!();
    println!(
        "{} Configuration saved to {}",
        Style::success("✓"),
        Style::secondary(manager.config_path().display())
    );

    Ok(())
}

fn print_current_defaults(config: &ConfigFile) {
    let not_set = || Style::secondary("(not set)");
    let defaults = &config.defaults;

    println!("{}", Style::header("Current defaults"));
    println!(
        "  {}  {}",
        Style::label("provider"),
        defaults.provider.as_deref().map_or_else(not_set, Style::value)
    );
    println!(
        "  {}     {}",
        Style::label("model"),
        defaults.model.as_deref().map_or_else(not_set, Style::value)
    );
    println!(
        "  {}  {}",
        Style::label("language"),
        defaults.language.as_deref().map_or_else(not_set, Style::value)
    );
    println!(
        "  {}      {}",
        Style::label("port"),
        defaults.port.map_or_else(not_set, Style::value)
    );
    println!(
        "  {}     {}",
        Style::label("pairs"),
        defaults
            .pairs
            .as_ref()
            .map_or_else(not_set, |pairs| Style::value(pairs.join(", ")))
    );
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
        return Ok(model.trim().to_string());
    }

    let default_index = default
        .and_then(|d| available_models.iter().position(|m| m == d))
        .unwrap_or(0);

    let selection = Select::new("Default model:", available_models.to_vec())
        .with_starting_cursor(default_index)
        .prompt()?;

    Ok(selection)
}

fn select_language(default: Option<&str>) -> Result<String> {
    let options: Vec<String> = SUPPORTED_LANGUAGES
        .iter()
        .map(|(code, name)| format!("{code} - {name}"))
        .collect();

    let default_index = default
        .and_then(|d| SUPPORTED_LANGUAGES.iter().position(|(code, _)| *code == d))
        .unwrap_or(0);

    let selection = Select::new("Language you type in:", options)
        .with_starting_cursor(default_index)
        .prompt()?;

    let code = selection.split(" - ").next().unwrap_or(&selection);
    Ok(code.to_string())
}

fn prompt_port(default: Option<u16>) -> Result<u16> {
    let default = default.unwrap_or(DEFAULT_PORT).to_string();
    let port = Text::new("Port:").with_default(&default).prompt()?;

    port.trim()
        .parse()
        .with_context(|| format!("Invalid port: '{}'", port.trim()))
}

fn prompt_pairs(current: Option<&[String]>) -> Result<Vec<String>> {
    let default = current.map_or_else(
        || {
            default_pairs()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        },
        |pairs| pairs.join(", "),
    );

    let input = Text::new("Enabled pairs:")
        .with_default(&default)
        .with_help_message("Comma separated directions, e.g. en-ka, ka-en")
        .prompt()?;

    parse_pair_list(&input)
}

/// Splits a comma separated list into validated pair strings.
fn parse_pair_list(input: &str) -> Result<Vec<String>> {
    let pairs = input
        .split(',')
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| raw.parse::<LanguagePair>().map(|pair| pair.to_string()))
        .collect::<Result<Vec<_>>>()?;

    if pairs.is_empty() {
        bail!("At least one language pair is required");
    }
    Ok(pairs)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pair_list() {
        assert_eq!(
            parse_pair_list(" en-ka,ka-en , ,ru-en").unwrap(),
            vec!["en-ka", "ka-en", "ru-en"]
        );
    }

    #[test]
    fn test_parse_pair_list_rejects_bad_input() {
        assert!(parse_pair_list("").is_err());
        assert!(parse_pair_list("en-ka, enka").is_err());
        assert!(parse_pair_list("ka-ka").is_err());
    }
}
