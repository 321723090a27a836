use anyhow::Result;

use crate::config::ConfigManager;
use crate::translation::print_languages;

/// Prints known language codes together with the configured pairs.
pub fn run_languages() -> Result<()> {
    let config = ConfigManager::new()?.load_or_default()?;
    print_languages(&config.defaults.language_pairs()?);
    Ok(())
}
