//! Progress readings as served by the progress endpoint
//!
//! A reading is a single percentage. The producer may report more than
//! 100; the displayed text is capped, the bar width follows [`WidthMode`].

use crate::config::WidthMode;
use serde::{Deserialize, Serialize};

/// Upper bound for the displayed percentage
pub const MAX_PERCENT: f64 = 100.0;

/// One reading from `GET /progress`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressReading {
    /// Raw percentage, expected in 0..=100
    pub progress: f64,
}

impl ProgressReading {
    /// Create a reading from a raw percentage
    pub fn new(progress: f64) -> Self {
        Self { progress }
    }

    /// Percentage capped at 100. Values below 0 pass through.
    pub fn clamped(&self) -> f64 {
        self.progress.min(MAX_PERCENT)
    }

    /// Display text: clamped value with one decimal digit, e.g. `42.3%`
    pub fn text(&self) -> String {
        format!("{:.1}%", self.clamped())
    }

    /// Bar width string, e.g. `42.3%` or `150%`
    pub fn bar_width(&self, mode: WidthMode) -> String {
        let value = match mode {
            WidthMode::Raw => self.progress,
            WidthMode::Clamped => self.clamped(),
        };
        format_percent(value)
    }

    /// Whether the clamped value has reached 100
    pub fn is_complete(&self) -> bool {
        self.clamped() >= MAX_PERCENT
    }
}

/// Shortest round-trip rendering of a percentage with a `%` suffix
pub fn format_percent(value: f64) -> String {
    // -0.0 renders as "-0" otherwise
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_text_has_one_decimal() {
        assert_eq!(ProgressReading::new(0.0).text(), "0.0%");
        assert_eq!(ProgressReading::new(42.3).text(), "42.3%");
        assert_eq!(ProgressReading::new(99.96).text(), "100.0%");
        assert_eq!(ProgressReading::new(100.0).text(), "100.0%");
        assert_eq!(ProgressReading::new(150.0).text(), "100.0%");
    }

    #[test]
    fn test_bar_width_modes() {
        let over = ProgressReading::new(150.0);
        assert_eq!(over.bar_width(WidthMode::Raw), "150%");
        assert_eq!(over.bar_width(WidthMode::Clamped), "100%");

        let partial = ProgressReading::new(42.3);
        assert_eq!(partial.bar_width(WidthMode::Raw), "42.3%");
        assert_eq!(ProgressReading::new(0.0).bar_width(WidthMode::Raw), "0%");
        assert_eq!(ProgressReading::new(-0.0).bar_width(WidthMode::Raw), "0%");
    }

    #[test]
    fn test_negative_is_not_clamped() {
        let reading = ProgressReading::new(-5.0);
        assert_eq!(reading.clamped(), -5.0);
        assert_eq!(reading.text(), "-5.0%");
        assert!(!reading.is_complete());
    }

    #[test]
    fn test_completion_threshold() {
        assert!(!ProgressReading::new(99.99).is_complete());
        assert!(ProgressReading::new(100.0).is_complete());
        assert!(ProgressReading::new(250.0).is_complete());
    }

    #[test]
    fn test_deserialize_reading() {
        let reading: ProgressReading = serde_json::from_str(r#"{"progress": 42.3}"#).unwrap();
        assert_eq!(reading.progress, 42.3);

        let integer: ProgressReading = serde_json::from_str(r#"{"progress": 7}"#).unwrap();
        assert_eq!(integer.progress, 7.0);

        assert!(serde_json::from_str::<ProgressReading>(r#"{"done": true}"#).is_err());
        assert!(serde_json::from_str::<ProgressReading>(r#"{"progress": "12"}"#).is_err());
    }

    proptest! {
        #[test]
        fn text_is_clamped_with_one_decimal(p in 0.0f64..1.0e6) {
            let reading = ProgressReading::new(p);
            prop_assert_eq!(reading.text(), format!("{:.1}%", p.min(100.0)));
        }

        #[test]
        fn raw_width_is_unclamped(p in -1.0e6f64..1.0e6) {
            let reading = ProgressReading::new(p);
            let width = reading.bar_width(WidthMode::Raw);
            let number: f64 = width.trim_end_matches('%').parse().unwrap();
            prop_assert_eq!(number, p);
        }
    }
}
