//! Process-wide output settings.
//!
//! Chat text goes to stdout. Status lines, warnings and errors go to
//! stderr, so `--quiet` can silence the chatter without hiding either side
//! of the conversation.

use std::sync::OnceLock;

static OUTPUT_CONFIG: OnceLock<OutputConfig> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Suppress non-essential output.
    pub quiet: bool,
    /// Disable colored output.
    pub no_color: bool,
}

impl OutputConfig {
    /// Builds the settings from command line flags. `NO_COLOR` in the
    /// environment (<https://no-color.org/>) also disables colors.
    pub fn from_flags(quiet: bool, no_color: bool) -> Self {
        Self {
            quiet,
            no_color: no_color || no_color_env(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_flags(false, false)
    }
}

fn no_color_env() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}

/// Sets the global output configuration. Only the first call has an effect.
pub fn init(config: OutputConfig) {
    let _ = OUTPUT_CONFIG.set(config);
}

pub fn config() -> &'static OutputConfig {
    OUTPUT_CONFIG.get_or_init(OutputConfig::default)
}

pub fn is_quiet() -> bool {
    config().quiet
}

pub fn is_no_color() -> bool {
    config().no_color
}

/// Print a status message to stderr (respects quiet mode).
#[macro_export]
macro_rules! status {
    ($($arg:tt)*) => {
        if !$crate::output::is_quiet() {
            eprintln!($($arg)*);
        }
    };
}

/// Print an informational message to stderr (respects quiet mode).
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        if !$crate::output::is_quiet() {
            eprintln!($($arg)*);
        }
    };
}

/// Print a warning to stderr, even in quiet mode.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        eprintln!($($arg)*);
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_flags_are_respected() {
        unsafe { std::env::remove_var("NO_COLOR") };

        let config = OutputConfig::from_flags(true, false);
        assert!(config.quiet);
        assert!(!config.no_color);

        assert!(OutputConfig::from_flags(false, true).no_color);
    }

    #[test]
    #[serial]
    fn test_no_color_env() {
        unsafe { std::env::set_var("NO_COLOR", "1") };
        assert!(OutputConfig::default().no_color);

        unsafe { std::env::set_var("NO_COLOR", "") };
        assert!(!OutputConfig::default().no_color);

        unsafe { std::env::remove_var("NO_COLOR") };
    }
}
