//! UI/Progress presentation layer
//!
//! This module handles:
//! - Progress reporting while entries are materialized
//! - Interactive progress bars using indicatif
//! - Silent progress for dry-run, verbose or non-terminal runs
//! - Styled status lines ([`output`])
//!
//! All progress reporting goes through the [`ProgressReporter`] trait, so the
//! installer does not know whether a bar is drawn.

pub mod output;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter for an install run
pub trait ProgressReporter: Send + Sync {
    /// Begin reporting `total` steps
    fn start(&mut self, total: u64);

    /// Advance by one step labelled `label`
    fn step(&mut self, label: &str);

    /// All steps completed
    fn finish(&mut self);

    /// Abandon on error
    fn abandon(&mut self);
}

/// Progress bar on stderr
pub struct InteractiveProgressReporter {
    bar: Option<ProgressBar>,
}

impl InteractiveProgressReporter {
    pub fn new() -> Self {
        Self { bar: None }
    }
}

impl Default for InteractiveProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for InteractiveProgressReporter {
    fn start(&mut self, total: u64) {
        let style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        let bar = ProgressBar::new(total);
        bar.set_style(style);
        self.bar = Some(bar);
    }

    fn step(&mut self, label: &str) {
        if let Some(bar) = &self.bar {
            // Truncate long labels for display
            let count = label.chars().count();
            let label = if count > 50 {
                let tail: String = label.chars().skip(count - 47).collect();
                format!("...{tail}")
            } else {
                label.to_string()
            };
            bar.set_message(label);
            bar.inc(1);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn abandon(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.abandon();
        }
    }
}

/// No-op reporter
#[derive(Debug, Default)]
pub struct SilentProgressReporter;

impl ProgressReporter for SilentProgressReporter {
    fn start(&mut self, _total: u64) {}

    fn step(&mut self, _label: &str) {}

    fn finish(&mut self) {}

    fn abandon(&mut self) {}
}

/// Pick a reporter: bars only when stderr is a terminal and output is not
/// already line-oriented.
pub fn reporter(dry_run: bool, verbose: bool) -> Box<dyn ProgressReporter> {
    if dry_run || verbose || !console::Term::stderr().is_term() {
        Box::new(SilentProgressReporter)
    } else {
        Box::new(InteractiveProgressReporter::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_progress_reporter_no_ops() {
        let mut reporter = SilentProgressReporter;
        reporter.start(3);
        reporter.step("skill testing");
        reporter.finish();
        reporter.abandon();
    }

    #[test]
    fn test_interactive_progress_reporter_counts_steps() {
        let mut reporter = InteractiveProgressReporter::new();
        reporter.start(5);
        reporter.step("skill a");
        reporter.step(&"x".repeat(80));
        assert_eq!(reporter.bar.as_ref().map(ProgressBar::position), Some(2));
        reporter.finish();
        assert!(reporter.bar.is_none());
    }

    #[test]
    fn test_step_before_start_is_ignored() {
        let mut reporter = InteractiveProgressReporter::new();
        reporter.step("early");
        assert!(reporter.bar.is_none());
    }

    #[test]
    fn test_dry_run_reporter_is_silent() {
        // Only checks selection does not panic in either mode
        let _ = reporter(true, false);
        let _ = reporter(false, true);
    }
}
