//! Live progress counter for a running scan

use indicatif::ProgressBar;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Monotonic `(current, total)` counter, bumped once per attempted probe.
/// Optionally mirrors itself onto a terminal progress bar.
#[derive(Default)]
pub struct ScanProgress {
    current: AtomicUsize,
    total: AtomicUsize,
    bar: Option<ProgressBar>,
}

impl ScanProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bar(bar: ProgressBar) -> Self {
        Self {
            bar: Some(bar),
            ..Self::default()
        }
    }

    /// Resets the counter for a new scan of `total` probes
    pub fn start(&self, total: usize) {
        self.current.store(0, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);
        if let Some(ref bar) = self.bar {
            bar.set_length(total as u64);
            bar.set_position(0);
        }
    }

    /// Records one attempted probe
    pub fn advance(&self, message: &str) {
        self.current.fetch_add(1, Ordering::SeqCst);
        if let Some(ref bar) = self.bar {
            bar.set_message(message.to_string());
            bar.inc(1);
        }
    }

    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_with_message("Scan complete");
        }
    }

    /// Current `(current, total)` pair
    pub fn snapshot(&self) -> (usize, usize) {
        (
            self.current.load(Ordering::SeqCst),
            self.total.load(Ordering::SeqCst),
        )
    }
}
