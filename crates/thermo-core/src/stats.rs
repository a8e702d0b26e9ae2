//! Daily extrema and alert-armed flags
//!
//! The day boundary is detected purely by comparing day identifiers taken
//! from the clock, never by counting samples, so a boundary that passes while
//! no cycle ran (a long storage stall, a sensor outage) is still observed on
//! the next poll.

use crate::alerts::AlertDecision;
use crate::sensors::Reading;
use crate::time::DayId;

/// Per-day accumulator.
///
/// Invariants for the current day:
/// - `max_seen >= v` and `min_seen <= v` for every valid reading `v` accepted
/// - alert flags are only ever cleared by a day transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyState {
    pub day: DayId,
    pub max_seen: Option<f32>,
    pub min_seen: Option<f32>,
    pub high_alert_fired: bool,
    pub low_alert_fired: bool,
}

impl DailyState {
    pub const fn new(day: DayId) -> Self {
        Self {
            day,
            max_seen: None,
            min_seen: None,
            high_alert_fired: false,
            low_alert_fired: false,
        }
    }
}

impl Default for DailyState {
    fn default() -> Self {
        Self::new(DayId::UNKNOWN)
    }
}

#[derive(Debug, Default)]
pub struct DailyStatsTracker {
    state: DailyState,
}

impl DailyStatsTracker {
    pub const fn new() -> Self {
        Self {
            state: DailyState::new(DayId::UNKNOWN),
        }
    }

    /// Start a fresh day if `day` differs from the tracked one.
    ///
    /// Returns `true` when the state was replaced. Calling it again with the
    /// same day is a no-op.
    pub fn roll_if_new_day(&mut self, day: DayId) -> bool {
        if day == self.state.day {
            return false;
        }
        self.state = DailyState::new(day);
        true
    }

    /// Fold a reading into the day's extrema. Faults are ignored.
    pub fn accept(&mut self, reading: &Reading) {
        let Some(value) = reading.celsius() else {
            return;
        };

        self.state.max_seen = Some(match self.state.max_seen {
            Some(max) => max.max(value),
            None => value,
        });
        self.state.min_seen = Some(match self.state.min_seen {
            Some(min) => min.min(value),
            None => value,
        });
    }

    /// Record that the alerts named by `decision` have been fired today
    pub fn mark_fired(&mut self, decision: AlertDecision) {
        if decision.fires_high() {
            self.state.high_alert_fired = true;
        }
        if decision.fires_low() {
            self.state.low_alert_fired = true;
        }
    }

    pub fn state(&self) -> &DailyState {
        &self.state
    }

    pub fn max_seen(&self) -> Option<f32> {
        self.state.max_seen
    }

    pub fn min_seen(&self) -> Option<f32> {
        self.state.min_seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::SensorError;
    use crate::time::Date;

    const D1: DayId = Date::new(2026, 10, 18).day_id();
    const D2: DayId = Date::new(2026, 10, 19).day_id();

    #[test]
    fn test_first_roll_replaces_unknown_day() {
        let mut tracker = DailyStatsTracker::new();
        assert_eq!(tracker.state().day, DayId::UNKNOWN);
        assert!(tracker.roll_if_new_day(D1));
        assert_eq!(tracker.state().day, D1);
    }

    #[test]
    fn test_roll_is_idempotent_within_a_day() {
        let mut tracker = DailyStatsTracker::new();
        tracker.roll_if_new_day(D1);
        tracker.accept(&Reading::Celsius(20.0));
        tracker.mark_fired(AlertDecision::High);

        for _ in 0..3 {
            assert!(!tracker.roll_if_new_day(D1));
        }
        assert_eq!(tracker.max_seen(), Some(20.0));
        assert!(tracker.state().high_alert_fired);
    }

    #[test]
    fn test_resets_only_when_day_changes() {
        let days = [D1, D1, D2, D2, D1, D1];
        let expect_roll = [true, false, true, false, true, false];

        let mut tracker = DailyStatsTracker::new();
        for (day, expected) in days.iter().zip(expect_roll) {
            tracker.accept(&Reading::Celsius(10.0));
            tracker.mark_fired(AlertDecision::Both);

            assert_eq!(tracker.roll_if_new_day(*day), expected);
            if expected {
                assert_eq!(*tracker.state(), DailyState::new(*day));
            } else {
                assert!(tracker.state().high_alert_fired);
                assert_eq!(tracker.min_seen(), Some(10.0));
            }
        }
    }

    #[test]
    fn test_first_reading_initializes_both_bounds() {
        let mut tracker = DailyStatsTracker::new();
        tracker.roll_if_new_day(D1);
        assert_eq!(tracker.max_seen(), None);
        assert_eq!(tracker.min_seen(), None);

        tracker.accept(&Reading::Celsius(-3.5));
        assert_eq!(tracker.max_seen(), Some(-3.5));
        assert_eq!(tracker.min_seen(), Some(-3.5));
    }

    #[test]
    fn test_extrema_bound_every_accepted_reading() {
        let readings = [28.0, 31.0, -4.0, 32.0, 29.0, 12.25, 0.0];
        let mut tracker = DailyStatsTracker::new();
        tracker.roll_if_new_day(D1);

        for (i, value) in readings.iter().enumerate() {
            tracker.accept(&Reading::Celsius(*value));
            let max = tracker.max_seen().unwrap();
            let min = tracker.min_seen().unwrap();
            for seen in &readings[..=i] {
                assert!(min <= *seen && *seen <= max);
            }
        }
        assert_eq!(tracker.max_seen(), Some(32.0));
        assert_eq!(tracker.min_seen(), Some(-4.0));
    }

    #[test]
    fn test_fault_does_not_touch_extrema() {
        let mut tracker = DailyStatsTracker::new();
        tracker.roll_if_new_day(D1);
        tracker.accept(&Reading::Celsius(18.0));
        tracker.accept(&Reading::Fault(SensorError::Disconnected));

        assert_eq!(tracker.max_seen(), Some(18.0));
        assert_eq!(tracker.min_seen(), Some(18.0));
    }

    #[test]
    fn test_mark_fired_sets_only_named_flags() {
        let mut tracker = DailyStatsTracker::new();
        tracker.mark_fired(AlertDecision::None);
        assert!(!tracker.state().high_alert_fired);
        assert!(!tracker.state().low_alert_fired);

        tracker.mark_fired(AlertDecision::Low);
        assert!(!tracker.state().high_alert_fired);
        assert!(tracker.state().low_alert_fired);
    }

    #[test]
    fn test_roll_clears_fired_high_alert() {
        let mut tracker = DailyStatsTracker::new();
        tracker.roll_if_new_day(D1);
        tracker.accept(&Reading::Celsius(33.0));
        tracker.mark_fired(AlertDecision::High);

        assert!(tracker.roll_if_new_day(D2));
        assert!(!tracker.state().high_alert_fired);
        assert_eq!(tracker.max_seen(), None);
        assert_eq!(tracker.min_seen(), None);
    }
}
