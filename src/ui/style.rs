//! Consistent styling utilities for CLI output.
//!
//! Provides color and formatting helpers using owo-colors. Every helper
//! returns plain text when colors are disabled.

use owo_colors::OwoColorize;
use std::fmt::Display;

use crate::output;

fn paint<T: Display>(text: T, styled: impl FnOnce(&T) -> String) -> String {
    if output::is_no_color() {
        text.to_string()
    } else {
        styled(&text)
    }
}

/// Styles for different semantic elements.
pub struct Style;

impl Style {
    /// Style for section headers (e.g., "File statistics", "Review")
    pub fn header<T: Display>(text: T) -> String {
        paint(text, |t| t.bold().to_string())
    }

    /// Style for labels/keys (e.g., "provider", "model")
    pub fn label<T: Display>(text: T) -> String {
        paint(text, |t| t.dimmed().to_string())
    }

    /// Style for primary values (e.g., provider names, model names)
    pub fn value<T: Display>(text: T) -> String {
        paint(text, |t| t.cyan().to_string())
    }

    /// Style for secondary/supplementary info (e.g., endpoints, descriptions)
    pub fn secondary<T: Display>(text: T) -> String {
        paint(text, |t| t.dimmed().to_string())
    }

    /// Style for success messages
    pub fn success<T: Display>(text: T) -> String {
        paint(text, |t| t.green().to_string())
    }

    /// Style for error messages
    pub fn error<T: Display>(text: T) -> String {
        paint(text, |t| t.red().bold().to_string())
    }

    /// Style for warning messages
    pub fn warning<T: Display>(text: T) -> String {
        paint(text, |t| t.yellow().to_string())
    }

    /// Style for unit ids and other identifiers
    pub fn id<T: Display>(text: T) -> String {
        paint(text, |t| t.green().to_string())
    }

    /// Style for language codes
    pub fn code<T: Display>(text: T) -> String {
        paint(text, |t| t.yellow().to_string())
    }

    /// Style for hints/help text
    pub fn hint<T: Display>(text: T) -> String {
        paint(text, |t| t.dimmed().italic().to_string())
    }

    /// Style for the default marker
    pub fn default_marker() -> String {
        paint("(default)", |t| t.dimmed().to_string())
    }
}
