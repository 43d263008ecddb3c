//! Global output configuration and utilities.
//!
//! This module provides centralized control over CLI output behavior,
//! including quiet mode, color support, and diagnostic logging.
//!
//! ## Design Principles
//!
//! - Reports and listings go to stdout
//! - Status messages, progress, and logs go to stderr
//! - Errors always go to stderr
//! - Quiet mode suppresses non-essential output
//! - Colors can be disabled via flag or NO_COLOR environment variable

use std::sync::OnceLock;

/// Global output configuration.
static OUTPUT_CONFIG: OnceLock<OutputConfig> = OnceLock::new();

/// Output configuration settings.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Suppress non-essential output.
    pub quiet: bool,
    /// Disable colored output.
    pub no_color: bool,
    /// Show debug-level diagnostics.
    pub verbose: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            quiet: false,
            // Check NO_COLOR environment variable (https://no-color.org/)
            no_color: std::env::var_os("NO_COLOR").is_some(),
            verbose: false,
        }
    }
}

impl OutputConfig {
    /// Most verbose diagnostic level to emit, or `None` for no logging.
    pub const fn log_level(&self) -> Option<tracing::Level> {
        if self.quiet {
            None
        } else if self.verbose {
            Some(tracing::Level::DEBUG)
        } else {
            Some(tracing::Level::WARN)
        }
    }
}

/// Initialize the global output configuration and the diagnostic logger.
///
/// This should be called once at startup with the CLI flags.
/// If called multiple times, subsequent calls are ignored.
pub fn init(config: OutputConfig) {
    if let Some(level) = config.log_level() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_ansi(!config.no_color)
            .try_init();
    }
    let _ = OUTPUT_CONFIG.set(config);
}

/// Get the current output configuration.
pub fn config() -> &'static OutputConfig {
    OUTPUT_CONFIG.get_or_init(OutputConfig::default)
}

/// Check if quiet mode is enabled.
pub fn is_quiet() -> bool {
    config().quiet
}

/// Check if colors are disabled.
pub fn is_no_color() -> bool {
    config().no_color
}

/// Print a status message to stderr (respects quiet mode).
///
/// Use this for progress indicators, informational messages, etc.
#[macro_export]
macro_rules! status {
    ($($arg:tt)*) => {
        if !$crate::output::is_quiet() {
            eprintln!($($arg)*);
        }
    };
}

/// Print a warning message to stderr (always shown, even in quiet mode).
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        eprintln!($($arg)*);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_config_default() {
        // Note: This test may be affected by NO_COLOR env var in test environment
        let config = OutputConfig::default();
        assert!(!config.quiet);
        assert!(!config.verbose);
    }

    #[test]
    fn test_log_level() {
        let quiet = OutputConfig {
            quiet: true,
            no_color: true,
            verbose: false,
        };
        assert_eq!(quiet.log_level(), None);

        let verbose = OutputConfig {
            quiet: false,
            no_color: true,
            verbose: true,
        };
        assert_eq!(verbose.log_level(), Some(tracing::Level::DEBUG));

        assert_eq!(
            OutputConfig::default().log_level(),
            Some(tracing::Level::WARN)
        );
    }
}
