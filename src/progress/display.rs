//! The progress-display region
//!
//! [`ProgressDisplay`] is the seam between a poll session and whatever
//! renders it: a terminal bar, a web page bridge, or a recorder in tests.

use std::sync::Mutex;
use tokio::time::Instant;

/// Something that can show a percentage text and a bar.
///
/// Methods take `&self` so one display can be shared by the poller and
/// its sessions behind an `Arc`.
pub trait ProgressDisplay: Send + Sync {
    /// Make the display region visible
    fn show(&self);

    /// Replace the percentage text
    fn set_text(&self, text: &str);

    /// Replace the bar width, given as a percentage string such as `42.3%`
    fn set_bar_width(&self, width: &str);

    /// Hide the display region
    fn hide(&self);
}

/// Snapshot of a display's visible state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    /// Whether the region is shown
    pub visible: bool,
    /// Current percentage text
    pub text: String,
    /// Current bar width
    pub bar_width: String,
}

/// A single change applied to a display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayChange {
    /// Region made visible
    Shown,
    /// Text replaced
    Text(String),
    /// Bar width replaced
    BarWidth(String),
    /// Region hidden
    Hidden,
}

/// A change together with the instant it was applied
#[derive(Debug, Clone)]
pub struct DisplayEvent {
    /// When the change was applied
    pub at: Instant,
    /// What changed
    pub change: DisplayChange,
}

/// In-memory display that keeps its state and a log of every change.
///
/// Useful for headless embedding and for asserting on display timing.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    inner: Mutex<Recorded>,
}

#[derive(Debug, Default)]
struct Recorded {
    state: DisplayState,
    events: Vec<DisplayEvent>,
}

impl RecordingDisplay {
    /// Create an empty, hidden display
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> DisplayState {
        self.lock().state.clone()
    }

    /// Every change so far, oldest first
    pub fn events(&self) -> Vec<DisplayEvent> {
        self.lock().events.clone()
    }

    /// Every text value set so far
    pub fn texts(&self) -> Vec<String> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match &e.change {
                DisplayChange::Text(t) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every bar width set so far
    pub fn bar_widths(&self) -> Vec<String> {
        self.lock()
            .events
            .iter()
            .filter_map(|e| match &e.change {
                DisplayChange::BarWidth(w) => Some(w.clone()),
                _ => None,
            })
            .collect()
    }

    /// Instant of the most recent hide, if any
    pub fn last_hidden_at(&self) -> Option<Instant> {
        self.lock()
            .events
            .iter()
            .rev()
            .find(|e| e.change == DisplayChange::Hidden)
            .map(|e| e.at)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, change: DisplayChange) {
        let mut inner = self.lock();
        match &change {
            DisplayChange::Shown => inner.state.visible = true,
            DisplayChange::Hidden => inner.state.visible = false,
            DisplayChange::Text(t) => inner.state.text = t.clone(),
            DisplayChange::BarWidth(w) => inner.state.bar_width = w.clone(),
        }
        inner.events.push(DisplayEvent {
            at: Instant::now(),
            change,
        });
    }
}

impl ProgressDisplay for RecordingDisplay {
    fn show(&self) {
        self.record(DisplayChange::Shown);
    }

    fn set_text(&self, text: &str) {
        self.record(DisplayChange::Text(text.to_string()));
    }

    fn set_bar_width(&self, width: &str) {
        self.record(DisplayChange::BarWidth(width.to_string()));
    }

    fn hide(&self) {
        self.record(DisplayChange::Hidden);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_display_tracks_state() {
        let display = RecordingDisplay::new();
        assert!(!display.state().visible);

        display.show();
        display.set_text("0%");
        display.set_bar_width("0%");
        assert_eq!(
            display.state(),
            DisplayState {
                visible: true,
                text: "0%".into(),
                bar_width: "0%".into(),
            }
        );

        display.set_text("42.3%");
        display.hide();

        assert!(!display.state().visible);
        assert_eq!(display.texts(), vec!["0%", "42.3%"]);
        assert_eq!(display.bar_widths(), vec!["0%"]);
        assert!(display.last_hidden_at().is_some());
        assert_eq!(display.events().len(), 5);
    }
}
