//! XDG-style locations for configuration and cache.
//!
//! The XDG variables win over OS-specific locations on every platform, so
//! macOS users get `~/.config/tarjimani` rather than `~/Library/...`.

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_DIR: &str = "tarjimani";

/// `$XDG_CONFIG_HOME/tarjimani`, or `~/.config/tarjimani`.
pub fn config_dir() -> Result<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config")
}

/// `$XDG_CACHE_HOME/tarjimani`, or `~/.cache/tarjimani`.
pub fn cache_dir() -> Result<PathBuf> {
    xdg_dir("XDG_CACHE_HOME", ".cache")
}

fn xdg_dir(var: &str, fallback: &str) -> Result<PathBuf> {
    match std::env::var_os(var) {
        Some(base) if !base.is_empty() => Ok(PathBuf::from(base).join(APP_DIR)),
        _ => {
            let home = dirs::home_dir().context("Failed to determine home directory")?;
            Ok(home.join(fallback).join(APP_DIR))
        }
    }
}
