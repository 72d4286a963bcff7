//! The progress reporter (ambient stack, not named by any [MODULE] block):
//! a narrow trait plus an `indicatif` terminal implementation, the same
//! split the hashing pipeline already uses for its `on_progress` callback.
//! Grounded on the `indicatif::ProgressBar` usage pattern shared by the
//! pack's CRC and hashing tools.

use indicatif::{ProgressBar, ProgressStyle};

/// What the pipeline's progress callback needs to drive: a running byte
/// count and, once enough has been read to estimate a rate, a remaining-time
/// estimate. `-s` swaps this out for [`NullProgress`] rather than branching
/// on a boolean at every call site.
pub trait ProgressReporter: Send {
    fn start(&mut self, total_bytes: Option<u64>, label: &str);
    fn update(&mut self, done_bytes: u64, eta_secs: Option<u64>);
    fn finish(&mut self);
}

/// Renders a single bar to the terminal, re-labelled per file (§4.K "one
/// line of status per file currently being hashed").
pub struct TerminalProgress {
    bar: Option<ProgressBar>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        TerminalProgress { bar: None }
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for TerminalProgress {
    fn start(&mut self, total_bytes: Option<u64>, label: &str) {
        let bar = match total_bytes {
            Some(total) => {
                let bar = ProgressBar::new(total);
                if let Ok(style) = ProgressStyle::with_template(
                    "{prefix} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
                ) {
                    bar.set_style(style.progress_chars("#>-"));
                }
                bar
            }
            None => ProgressBar::new_spinner(),
        };
        bar.set_prefix(label.to_string());
        self.bar = Some(bar);
    }

    fn update(&mut self, done_bytes: u64, eta_secs: Option<u64>) {
        if let Some(bar) = &self.bar {
            bar.set_position(done_bytes);
            if let Some(eta) = eta_secs {
                bar.set_message(format!("eta {eta}s"));
            }
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

/// `-s`: suspend progress output entirely.
#[derive(Debug, Default)]
pub struct NullProgress;

impl ProgressReporter for NullProgress {
    fn start(&mut self, _total_bytes: Option<u64>, _label: &str) {}
    fn update(&mut self, _done_bytes: u64, _eta_secs: Option<u64>) {}
    fn finish(&mut self) {}
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
