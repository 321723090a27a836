//! Provider listing command handler.

use anyhow::{Result, bail};

use crate::config::{ConfigManager, ProviderConfig};
use crate::ui::Style;

/// Prints configured providers, or the details of `specific_provider`.
pub fn print_providers(specific_provider: Option<&str>) -> Result<()> {
    let manager = ConfigManager::new()?;
    let config = manager.load_or_default()?;

    if config.providers.is_empty() {
        println!("No providers configured.");
        println!(
            "Add a [providers.<name>] section to {}",
            manager.config_path().display()
        );
        return Ok(());
    }

    let default_provider = config.defaults.provider.as_deref();
    let marker = |name: &str| {
        if default_provider == Some(name) {
            format!(" {}", Style::default_marker())
        } else {
            String::new()
        }
    };

    if let Some(name) = specific_provider {
        let Some(provider) = config.providers.get(name) else {
            bail!("Provider '{name}' not found");
        };
        println!("{}{}", Style::header(name), marker(name));
        print_details(provider);
        return Ok(());
    }

    println!("{}", Style::header("Configured providers"));
    let mut names: Vec<&String> = config.providers.keys().collect();
    names.sort();
    for name in names {
        let provider = &config.providers[name];
        println!("  {}{}", Style::value(name), marker(name));
        println!(
            "    {} {}",
            Style::label("endpoint"),
            Style::secondary(&provider.endpoint)
        );
        if !provider.models.is_empty() {
            println!(
                "    {}   {}",
                Style::label("models"),
                provider.models.join(", ")
            );
        }
    }

    Ok(())
}

fn print_details(provider: &ProviderConfig) {
    println!(
        "  {} {}",
        Style::label("endpoint"),
        Style::secondary(&provider.endpoint)
    );
    if provider.requires_api_key() {
        let state = if provider.get_api_key().is_some() {
            Style::success("(set)")
        } else {
            Style::warning("(not set)")
        };
        println!("  {}  {state}", Style::label("api_key"));
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
            println!("    - {}", Style::value(model));
        }
    }
}
