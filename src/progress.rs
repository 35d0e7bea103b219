//! Progress reporting
//!
//! The core only sees [`ProgressSink`]; the CLI plugs in an indicatif bar and
//! everything else (tests, JSON output) uses [`NoProgress`].

use indicatif::{ProgressBar, ProgressStyle};

/// Receives progress ticks from long-running work
pub trait ProgressSink: Send + Sync {
    fn update(&self, n: u64);
    fn finish(&self);
}

/// Sink that ignores every tick
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&self, _n: u64) {}
    fn finish(&self) {}
}

impl ProgressSink for ProgressBar {
    fn update(&self, n: u64) {
        self.inc(n);
    }

    fn finish(&self) {
        ProgressBar::finish(self);
    }
}

/// Create spinner progress style
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .expect("valid template")
}

/// Create bar progress style
pub fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .expect("valid template")
        .progress_chars("█▓▒░  ")
}
