//! Fixed-interval sampling gate

/// Decides when a sampling cycle runs.
///
/// Works on a free-running millisecond counter that wraps at `u32::MAX`
/// (about 49.7 days). Elapsed time is always `now.wrapping_sub(last)`, so the
/// wrap neither fires early nor stalls the gate.
#[derive(Debug, Clone, Copy)]
pub struct SamplingScheduler {
    interval_ms: u32,
    last_fired_ms: u32,
}

impl SamplingScheduler {
    /// First fire happens once `interval_ms` has elapsed since counter zero.
    pub const fn new(interval_ms: u32) -> Self {
        Self::starting_at(interval_ms, 0)
    }

    /// First fire happens once `interval_ms` has elapsed since `now_ms`.
    pub const fn starting_at(interval_ms: u32, now_ms: u32) -> Self {
        Self {
            interval_ms,
            last_fired_ms: now_ms,
        }
    }

    pub fn tick(&mut self, now_ms: u32) -> bool {
        if now_ms.wrapping_sub(self.last_fired_ms) >= self.interval_ms {
            self.last_fired_ms = now_ms;
            true
        } else {
            false
        }
    }

    pub const fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub const fn last_fired_ms(&self) -> u32 {
        self.last_fired_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_per_interval() {
        let mut scheduler = SamplingScheduler::new(60_000);

        assert!(!scheduler.tick(0));
        assert!(!scheduler.tick(59_999));
        assert!(scheduler.tick(60_000));
        assert!(!scheduler.tick(60_000));
        assert!(!scheduler.tick(119_999));
        assert!(scheduler.tick(120_000));
    }

    #[test]
    fn test_late_poll_restarts_interval_from_fire() {
        let mut scheduler = SamplingScheduler::new(1000);

        assert!(scheduler.tick(1500));
        assert!(!scheduler.tick(2000));
        assert!(!scheduler.tick(2499));
        assert!(scheduler.tick(2500));
        assert_eq!(scheduler.last_fired_ms(), 2500);
    }

    #[test]
    fn test_counter_wrap_does_not_fire_early() {
        let start = u32::MAX - 10_000;
        let mut scheduler = SamplingScheduler::starting_at(60_000, start);

        // 10 001 ms elapsed across the wrap
        assert!(!scheduler.tick(0));
        // 59 999 ms elapsed
        assert!(!scheduler.tick(49_998));
        // 60 000 ms elapsed
        assert!(scheduler.tick(49_999));
        assert!(!scheduler.tick(50_000));
    }

    #[test]
    fn test_counter_wrap_does_not_stall() {
        let mut scheduler = SamplingScheduler::starting_at(1000, u32::MAX - 100);

        let mut fired = 0;
        let mut now = u32::MAX - 100;
        for _ in 0..5_000 {
            now = now.wrapping_add(1);
            if scheduler.tick(now) {
                fired += 1;
            }
        }
        assert_eq!(fired, 5);
    }

    #[test]
    fn test_zero_interval_always_fires() {
        let mut scheduler = SamplingScheduler::new(0);
        assert!(scheduler.tick(0));
        assert!(scheduler.tick(0));
        assert_eq!(scheduler.interval_ms(), 0);
    }
}
