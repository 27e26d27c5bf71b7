//! Terminal progress display
//!
//! Uses indicatif to render a poll session as a single bar:
//! - Bar length tracks the reported width (capped at full)
//! - Percentage text shown as the bar message
//! - Elapsed time since the display was shown

use super::display::ProgressDisplay;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Bar resolution: one step per tenth of a percent
const BAR_STEPS: u64 = 1000;

/// indicatif-backed [`ProgressDisplay`]
pub struct TerminalDisplay {
    /// Progress bar
    bar: ProgressBar,
    /// Whether the bar is currently shown
    visible: AtomicBool,
    /// Last bar position, in tenths of a percent
    position: AtomicU64,
    /// Is drawing enabled
    enabled: AtomicBool,
}

impl TerminalDisplay {
    /// Create a display drawing to stderr
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(Some(BAR_STEPS), ProgressDrawTarget::stderr());
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:.bold.dim} [{bar:40.green/white}] {msg} ({elapsed})")
                .expect("Invalid template")
                .progress_chars("=> "),
        );
        bar.set_prefix("Download");

        Self {
            bar,
            visible: AtomicBool::new(false),
            position: AtomicU64::new(0),
            enabled: AtomicBool::new(true),
        }
    }

    /// Create a display that never draws (for quiet mode)
    pub fn disabled() -> Self {
        let display = Self::new();
        display.enabled.store(false, Ordering::SeqCst);
        display.bar.set_draw_target(ProgressDrawTarget::hidden());
        display
    }

    /// Check if drawing is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Whether the bar is currently shown
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Relaxed)
    }

    /// Current bar position in tenths of a percent
    pub fn position(&self) -> u64 {
        self.position.load(Ordering::Relaxed)
    }

    /// Current message (the percentage text)
    pub fn message(&self) -> String {
        self.bar.message()
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressDisplay for TerminalDisplay {
    fn show(&self) {
        self.bar.reset();
        self.position.store(0, Ordering::Relaxed);
        self.visible.store(true, Ordering::Relaxed);
        if self.is_enabled() {
            self.bar.enable_steady_tick(Duration::from_millis(250));
        }
    }

    fn set_text(&self, text: &str) {
        self.bar.set_message(text.to_string());
    }

    fn set_bar_width(&self, width: &str) {
        let steps = width_to_steps(width);
        self.position.store(steps, Ordering::Relaxed);
        self.bar.set_position(steps);
    }

    fn hide(&self) {
        self.visible.store(false, Ordering::Relaxed);
        self.bar.finish_and_clear();
    }
}

/// Convert a width string like `42.3%` into bar steps, capped at a full bar.
/// Unparseable or negative widths render as an empty bar.
fn width_to_steps(width: &str) -> u64 {
    let percent: f64 = width.trim().trim_end_matches('%').parse().unwrap_or(0.0);
    if !percent.is_finite() || percent <= 0.0 {
        return 0;
    }
    let steps = (percent.min(100.0) * BAR_STEPS as f64 / 100.0).round();
    steps as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_to_steps() {
        assert_eq!(width_to_steps("0%"), 0);
        assert_eq!(width_to_steps("42.3%"), 423);
        assert_eq!(width_to_steps("100%"), 1000);
        assert_eq!(width_to_steps("150%"), 1000);
        assert_eq!(width_to_steps("-3%"), 0);
        assert_eq!(width_to_steps("garbage"), 0);
    }

    #[test]
    fn test_terminal_display_lifecycle() {
        let display = TerminalDisplay::disabled();
        assert!(!display.is_enabled());
        assert!(!display.is_visible());

        display.show();
        display.set_text("0%");
        display.set_bar_width("0%");
        assert!(display.is_visible());
        assert_eq!(display.position(), 0);

        display.set_text("42.3%");
        display.set_bar_width("42.3%");
        assert_eq!(display.position(), 423);
        assert_eq!(display.message(), "42.3%");

        display.hide();
        assert!(!display.is_visible());

        // A second session starts from an empty bar
        display.show();
        assert_eq!(display.position(), 0);
    }
}
