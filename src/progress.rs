//! Monotonic progress tracking
//!
//! The server's reported progress is advisory. What the client displays
//! follows `displayed = max(displayed, min(reported, 100))`, so the value
//! never goes backwards within one task even when the server is
//! non-monotonic or a stale report arrives late.

/// Upper bound of displayed progress
pub const MAX_PROGRESS: u8 = 100;

/// Displayed progress and message for one task
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgressTracker {
    displayed: u8,
    message: Option<String>,
}

impl ProgressTracker {
    /// Tracker starting at 0% with no message
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one report into the tracker and return the displayed progress
    ///
    /// Absent, non-finite and negative values never lower the display. A
    /// provided message always replaces the previous one, whether or not
    /// progress advanced.
    pub fn apply(&mut self, reported: Option<f64>, message: Option<String>) -> u8 {
        if let Some(value) = reported.filter(|v| v.is_finite()) {
            let clamped = value.clamp(0.0, f64::from(MAX_PROGRESS)).floor() as u8;
            self.displayed = self.displayed.max(clamped);
        }
        if message.is_some() {
            self.message = message;
        }
        self.displayed
    }

    /// Displayed progress
    pub fn displayed(&self) -> u8 {
        self.displayed
    }

    /// Latest message
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_never_decreases() {
        let mut tracker = ProgressTracker::new();

        assert_eq!(tracker.apply(Some(30.0), Some("Fetching page".into())), 30);
        assert_eq!(tracker.apply(Some(10.0), None), 30);
        assert_eq!(tracker.message(), Some("Fetching page"));
        assert_eq!(tracker.apply(Some(80.0), None), 80);
    }

    #[test]
    fn message_updates_even_without_progress() {
        let mut tracker = ProgressTracker::new();
        tracker.apply(Some(50.0), Some("Analyzing".into()));

        assert_eq!(tracker.apply(Some(20.0), Some("Writing report".into())), 50);
        assert_eq!(tracker.message(), Some("Writing report"));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let mut tracker = ProgressTracker::new();

        assert_eq!(tracker.apply(Some(-5.0), None), 0);
        assert_eq!(tracker.apply(Some(250.0), None), 100);
        assert_eq!(tracker.apply(Some(99.0), None), 100);
    }

    #[test]
    fn absent_and_non_finite_values_are_ignored() {
        let mut tracker = ProgressTracker::new();
        tracker.apply(Some(40.0), None);

        assert_eq!(tracker.apply(None, None), 40);
        assert_eq!(tracker.apply(Some(f64::NAN), None), 40);
        assert_eq!(tracker.apply(Some(f64::INFINITY), None), 40);
    }

    #[test]
    fn displayed_equals_clamped_running_maximum() {
        let reports = [12.0, 7.0, 55.5, 55.0, 130.0, 3.0, -1.0, 100.0];
        let mut tracker = ProgressTracker::new();
        let mut running_max = f64::MIN;
        let mut previous = 0u8;

        for reported in reports {
            let shown = tracker.apply(Some(reported), None);
            running_max = running_max.max(reported);
            let expected = running_max.clamp(0.0, 100.0).floor() as u8;

            assert!(shown >= previous, "progress went backwards");
            assert_eq!(shown, expected);
            previous = shown;
        }
    }
}
