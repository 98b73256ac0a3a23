//! Progress display for the upgrade workflow
//!
//! Thin wrapper over indicatif: a spinner for indeterminate phases and a
//! package counter while dependencies are checked. Inert in quiet mode and
//! when output is machine-read.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Progress reporter for the upgrade workflow
pub struct Progress {
    enabled: bool,
    bar: Option<ProgressBar>,
}

impl Progress {
    /// Create a progress reporter; a disabled one swallows every call
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }

    /// Create a disabled progress reporter
    pub fn disabled() -> Self {
        Self::new(false)
    }

    fn replace(&mut self, bar: ProgressBar) {
        self.finish_and_clear();
        self.bar = Some(bar);
    }

    /// Show a spinner for an indeterminate operation
    pub fn spinner(&mut self, message: &str) {
        if !self.enabled {
            return;
        }
        let spinner = ProgressBar::new_spinner().with_message(message.to_string());
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars(TICK_CHARS)
                .template("{spinner:.cyan} {msg}")
                .expect("Invalid template"),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.replace(spinner);
    }

    /// Start counting over a known number of packages
    pub fn start(&mut self, total: u64, message: &str) {
        if !self.enabled {
            return;
        }
        let bar = ProgressBar::new(total).with_message(message.to_string());
        bar.set_style(
            ProgressStyle::default_bar()
                .tick_chars(TICK_CHARS)
                .template("{spinner:.cyan} {msg} {bar:24.cyan/blue} {pos}/{len}")
                .expect("Invalid template"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        self.replace(bar);
    }

    /// Record one package as in flight
    pub fn set_message(&self, message: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_message(message.to_string());
        }
    }

    /// Record one package as done
    pub fn inc(&self) {
        if let Some(ref bar) = self.bar {
            bar.inc(1);
        }
    }

    /// Tear down whatever is currently displayed
    pub fn finish_and_clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new(true)
    }
}
