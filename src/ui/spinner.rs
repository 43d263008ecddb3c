use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::output;

/// A terminal spinner for indicating progress.
///
/// Automatically clears itself when dropped (RAII pattern). Hidden in quiet
/// mode.
pub struct Spinner {
    progress_bar: ProgressBar,
}

impl Spinner {
    /// Creates and starts a new spinner with the given message.
    #[allow(clippy::unwrap_used)]
    pub fn new(message: &str) -> Self {
        if output::is_quiet() {
            return Self {
                progress_bar: ProgressBar::hidden(),
            };
        }

        let progress_bar = ProgressBar::new_spinner();
        // unwrap is safe: template string is a compile-time constant
        progress_bar.set_style(
            ProgressStyle::default_spinner()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
                .template("{spinner} {msg} {elapsed:.dim}")
                .unwrap(),
        );
        progress_bar.set_message(message.to_string());
        progress_bar.enable_steady_tick(Duration::from_millis(80));

        Self { progress_bar }
    }

    /// Stops the spinner and clears it from the terminal.
    pub fn stop(&self) {
        self.progress_bar.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.progress_bar.finish_and_clear();
    }
}
