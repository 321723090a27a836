//! Consistent styling for terminal output.
//!
//! Every helper returns plain text when colors are disabled.

use owo_colors::{OwoColorize, Style as Paint};
use std::fmt::Display;

use crate::output;

fn paint<T: Display>(text: T, paint: Paint) -> String {
    if output::is_no_color() {
        text.to_string()
    } else {
        text.style(paint).to_string()
    }
}

/// Styles for different semantic elements.
pub struct Style;

impl Style {
    /// Section headers ("Available commands", "Session")
    pub fn header<T: Display>(text: T) -> String {
        paint(text, Paint::new().bold())
    }

    /// Labels and keys ("provider", "peer")
    pub fn label<T: Display>(text: T) -> String {
        paint(text, Paint::new().dimmed())
    }

    /// Primary values such as provider names and addresses
    pub fn value<T: Display>(text: T) -> String {
        paint(text, Paint::new().cyan())
    }

    pub fn secondary<T: Display>(text: T) -> String {
        paint(text, Paint::new().dimmed())
    }

    pub fn success<T: Display>(text: T) -> String {
        paint(text, Paint::new().green())
    }

    pub fn error<T: Display>(text: T) -> String {
        paint(text, Paint::new().red().bold())
    }

    pub fn warning<T: Display>(text: T) -> String {
        paint(text, Paint::new().yellow())
    }

    /// Slash commands ("/help", "/quit")
    pub fn command<T: Display>(text: T) -> String {
        paint(text, Paint::new().green())
    }

    /// Language codes and pairs
    pub fn code<T: Display>(text: T) -> String {
        paint(text, Paint::new().yellow())
    }

    pub fn hint<T: Display>(text: T) -> String {
        paint(text, Paint::new().dimmed().italic())
    }

    pub fn default_marker() -> String {
        paint("(default)", Paint::new().dimmed())
    }

    pub fn version<T: Display>(text: T) -> String {
        paint(text, Paint::new().dimmed())
    }

    /// Marker in front of our own input
    pub fn prompt<T: Display>(text: T) -> String {
        paint(text, Paint::new().blue().bold())
    }

    /// Marker in front of messages from the peer
    pub fn incoming<T: Display>(text: T) -> String {
        paint(text, Paint::new().magenta().bold())
    }
}
