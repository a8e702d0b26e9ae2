//! Threshold alerts, at most one per condition per day
//!
//! [`evaluate`] is a pure function of the day's state and the reading. The
//! orchestrator records the decision in the tracker before the alert is
//! sounded, so a slow sink can never cause a repeat within the same day.

use core::future::Future;

use embedded_hal::pwm::SetDutyCycle;
use embedded_hal_async::delay::DelayNs;
use log::{error, warn};

use crate::config::MonitorConfig;
use crate::stats::DailyState;

/// Spoken texts as the device has always announced them
pub const HIGH_ALERT_MESSAGE: &str = "over Temperature";
pub const LOW_ALERT_MESSAGE: &str = "Low Temperature, put extra thick undies on";

/// Outcome of evaluating one reading against the thresholds.
///
/// `Both` is only reachable when the high threshold is configured below the
/// low threshold; that is a configuration error and both alerts fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertDecision {
    None,
    High,
    Low,
    Both,
}

impl AlertDecision {
    pub const fn from_flags(high: bool, low: bool) -> Self {
        match (high, low) {
            (false, false) => Self::None,
            (true, false) => Self::High,
            (false, true) => Self::Low,
            (true, true) => Self::Both,
        }
    }

    pub const fn fires_high(self) -> bool {
        matches!(self, Self::High | Self::Both)
    }

    pub const fn fires_low(self) -> bool {
        matches!(self, Self::Low | Self::Both)
    }

    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Messages to speak for this decision, high first
    pub fn messages(self) -> impl Iterator<Item = &'static str> {
        [
            (self.fires_high(), HIGH_ALERT_MESSAGE),
            (self.fires_low(), LOW_ALERT_MESSAGE),
        ]
        .into_iter()
        .filter_map(|(fires, message)| fires.then_some(message))
    }
}

/// Decide which alerts a reading fires today.
///
/// High fires iff `celsius > high_threshold_c` and the high alert has not
/// fired today; low is symmetric with `<`. Both are checked independently.
pub fn evaluate(state: &DailyState, celsius: f32, config: &MonitorConfig) -> AlertDecision {
    let high = celsius > config.high_threshold_c && !state.high_alert_fired;
    let low = celsius < config.low_threshold_c && !state.low_alert_fired;
    AlertDecision::from_flags(high, low)
}

/// Plays a human-audible message. Fire-and-forget; may take around a second.
pub trait AlertSink {
    fn speak(&mut self, message: &str) -> impl Future<Output = ()>;
}

/// Number of beeps per alert
pub const BEEP_COUNT: u32 = 3;
/// How long the buzzer sounds per beep
pub const BEEP_ON_MS: u32 = 200;
/// Beep start to beep start
pub const BEEP_PERIOD_MS: u32 = 300;

/// Buzzer on a PWM channel standing in for speech output.
///
/// The tone frequency is whatever the PWM channel was configured with; this
/// only gates it on at 50% duty and off again. The message itself goes to the
/// log.
pub struct BuzzerAlert<P, D> {
    pwm: P,
    delay: D,
}

impl<P: SetDutyCycle, D: DelayNs> BuzzerAlert<P, D> {
    pub fn new(pwm: P, delay: D) -> Self {
        Self { pwm, delay }
    }

    pub fn release(self) -> (P, D) {
        (self.pwm, self.delay)
    }
}

impl<P: SetDutyCycle, D: DelayNs> AlertSink for BuzzerAlert<P, D> {
    async fn speak(&mut self, message: &str) {
        warn!("ALERT: {}", message);

        for _ in 0..BEEP_COUNT {
            if let Err(e) = self.pwm.set_duty_cycle_percent(50) {
                error!("Buzzer PWM failed: {:?}", e);
                return;
            }
            self.delay.delay_ms(BEEP_ON_MS).await;
            if let Err(e) = self.pwm.set_duty_cycle_fully_off() {
                error!("Buzzer PWM failed to stop: {:?}", e);
                return;
            }
            self.delay.delay_ms(BEEP_PERIOD_MS - BEEP_ON_MS).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::DayId;
    use alloc::vec::Vec;
    use core::convert::Infallible;

    fn config() -> MonitorConfig {
        MonitorConfig {
            high_threshold_c: 30.0,
            low_threshold_c: 5.0,
            ..MonitorConfig::default()
        }
    }

    #[test]
    fn test_in_range_reading_fires_nothing() {
        let state = DailyState::new(DayId(1));
        assert_eq!(evaluate(&state, 20.0, &config()), AlertDecision::None);
        // Thresholds are strict
        assert_eq!(evaluate(&state, 30.0, &config()), AlertDecision::None);
        assert_eq!(evaluate(&state, 5.0, &config()), AlertDecision::None);
    }

    #[test]
    fn test_high_and_low_fire_when_armed() {
        let state = DailyState::new(DayId(1));
        assert_eq!(evaluate(&state, 30.1, &config()), AlertDecision::High);
        assert_eq!(evaluate(&state, 4.9, &config()), AlertDecision::Low);
    }

    #[test]
    fn test_fired_flags_disarm_alerts() {
        let mut state = DailyState::new(DayId(1));
        state.high_alert_fired = true;
        state.low_alert_fired = true;

        assert_eq!(evaluate(&state, 45.0, &config()), AlertDecision::None);
        assert_eq!(evaluate(&state, -20.0, &config()), AlertDecision::None);
    }

    #[test]
    fn test_one_disarmed_flag_leaves_the_other_armed() {
        let mut state = DailyState::new(DayId(1));
        state.high_alert_fired = true;
        assert_eq!(evaluate(&state, -1.0, &config()), AlertDecision::Low);
    }

    #[test]
    fn test_inverted_thresholds_fire_both() {
        let inverted = MonitorConfig {
            high_threshold_c: 10.0,
            low_threshold_c: 20.0,
            ..MonitorConfig::default()
        };
        let state = DailyState::new(DayId(1));
        let decision = evaluate(&state, 15.0, &inverted);

        assert_eq!(decision, AlertDecision::Both);
        let messages: Vec<_> = decision.messages().collect();
        assert_eq!(messages, [HIGH_ALERT_MESSAGE, LOW_ALERT_MESSAGE]);
    }

    #[test]
    fn test_high_fires_once_per_day_when_crossed_every_cycle() {
        let mut state = DailyState::new(DayId(1));
        let mut fired = 0;
        for _ in 0..1440 {
            let decision = evaluate(&state, 35.0, &config());
            if decision.fires_high() {
                fired += 1;
                state.high_alert_fired = true;
            }
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_spoken_texts() {
        let both: Vec<_> = AlertDecision::Both.messages().collect();
        assert_eq!(
            both,
            ["over Temperature", "Low Temperature, put extra thick undies on"]
        );
    }

    #[test]
    fn test_messages_for_single_decisions() {
        assert_eq!(AlertDecision::None.messages().count(), 0);
        assert!(AlertDecision::None.is_none());

        let high: Vec<_> = AlertDecision::High.messages().collect();
        assert_eq!(high, [HIGH_ALERT_MESSAGE]);

        let low: Vec<_> = AlertDecision::Low.messages().collect();
        assert_eq!(low, [LOW_ALERT_MESSAGE]);
    }

    #[derive(Default)]
    struct RecordingPwm {
        duties: Vec<u16>,
    }

    impl embedded_hal::pwm::ErrorType for RecordingPwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for RecordingPwm {
        fn max_duty_cycle(&self) -> u16 {
            100
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duties.push(duty);
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingDelay {
        elapsed_ns: u64,
    }

    impl DelayNs for CountingDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.elapsed_ns += ns as u64;
        }
    }

    #[test]
    fn test_buzzer_beeps_three_times() {
        let mut buzzer = BuzzerAlert::new(RecordingPwm::default(), CountingDelay::default());
        embassy_futures::block_on(buzzer.speak(HIGH_ALERT_MESSAGE));

        let (pwm, delay) = buzzer.release();
        assert_eq!(pwm.duties, [50, 0, 50, 0, 50, 0]);
        assert_eq!(delay.elapsed_ns, 900_000_000);
    }
}
