//! Sampling cycle orchestration
//!
//! One cooperative task calls [`Orchestrator::poll`] as often as it likes with
//! a free-running millisecond counter. Every poll refreshes the day from the
//! clock; when the scheduler fires, one full cycle runs to completion:
//!
//! 1. roll the daily state if the clock shows a new day
//! 2. stay idle unless the sampling interval has elapsed
//! 3. read the sensor
//! 4. on a fault, report it and stop (no stats, storage or alerts)
//! 5. fold the reading into the day's extrema
//! 6. evaluate alerts, record them as fired, then sound them
//! 7. append to the day log, then apply the capacity floor
//! 8. publish to the wireless characteristic
//! 9. render the status screen
//!
//! Steps 7 to 9 are isolated from each other: a failure is logged, recorded in
//! the [`CycleReport`] and the remaining steps still run. Nothing here is
//! fatal and nothing is retried within a cycle; the next cycle is the retry.

use log::{debug, error, info, warn};

use crate::alerts::{AlertDecision, AlertSink, evaluate};
use crate::config::{ConfigError, MonitorConfig};
use crate::error::MonitorError;
use crate::notifier::{Notifier, NotifyError, format_celsius};
use crate::scheduler::SamplingScheduler;
use crate::screen::{Screen, Snapshot};
use crate::sensors::{Reading, SensorError, TemperatureSensor};
use crate::stats::{DailyState, DailyStatsTracker};
use crate::storage::{LogEntry, Storage, rotate};
use crate::time::{CalendarTime, TimeSource};

/// Steps 7 to 9 can each fail at most once per cycle, eviction included
pub const MAX_CYCLE_FAULTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// Waiting for the next tick
    Idle,
    /// Acquisition in flight
    Sampling,
    /// Fanning out to alerts, storage, notifier and screen
    Dispatching,
}

/// What a completed cycle did
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub at: CalendarTime,
    pub celsius: f32,
    pub alert: AlertDecision,
    /// The day's log was deleted by the capacity floor
    pub evicted: bool,
    pub faults: heapless::Vec<MonitorError, MAX_CYCLE_FAULTS>,
}

impl CycleReport {
    fn new(at: CalendarTime, celsius: f32, alert: AlertDecision) -> Self {
        Self {
            at,
            celsius,
            alert,
            evicted: false,
            faults: heapless::Vec::new(),
        }
    }

    fn record(&mut self, fault: MonitorError) {
        let _ = self.faults.push(fault);
    }

    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// The sampling interval has not elapsed
    Idle,
    /// The sensor could not be read; nothing was recorded
    SensorFault(SensorError),
    Completed(CycleReport),
}

/// The external collaborators a monitor drives
pub struct Devices<C, S, L, N, D, A> {
    pub clock: C,
    pub sensor: S,
    pub storage: L,
    pub notifier: N,
    pub screen: D,
    pub alerts: A,
}

pub struct Orchestrator<C, S, L, N, D, A> {
    devices: Devices<C, S, L, N, D, A>,
    config: MonitorConfig,
    scheduler: SamplingScheduler,
    tracker: DailyStatsTracker,
    state: CycleState,
}

impl<C, S, L, N, D, A> Orchestrator<C, S, L, N, D, A>
where
    C: TimeSource,
    S: TemperatureSensor,
    L: Storage,
    N: Notifier,
    D: Screen,
    A: AlertSink,
{
    /// Build a monitor whose first cycle runs once the interval has elapsed
    /// since counter zero.
    pub fn new(
        config: MonitorConfig,
        devices: Devices<C, S, L, N, D, A>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.thresholds_inverted() {
            warn!(
                "High threshold {:.1} C is below low threshold {:.1} C: readings in between fire both alerts",
                config.high_threshold_c, config.low_threshold_c
            );
        }

        Ok(Self {
            devices,
            scheduler: SamplingScheduler::new(config.sample_interval_ms),
            config,
            tracker: DailyStatsTracker::new(),
            state: CycleState::Idle,
        })
    }

    /// Count the first interval from `now_ms` instead of counter zero
    pub fn starting_at(mut self, now_ms: u32) -> Self {
        self.scheduler = SamplingScheduler::starting_at(self.config.sample_interval_ms, now_ms);
        self
    }

    /// Run one scheduler decision point, and a full cycle if it fires.
    pub async fn poll(&mut self, now_ms: u32) -> CycleOutcome {
        let now = self.devices.clock.now();
        if self.tracker.roll_if_new_day(now.date.day_id()) {
            info!("New day {}: extrema and alerts reset", now.date);
        }

        if !self.scheduler.tick(now_ms) {
            return CycleOutcome::Idle;
        }

        self.state = CycleState::Sampling;
        let reading = Reading::from(self.devices.sensor.read_once().await);
        let celsius = match reading {
            Reading::Celsius(celsius) => celsius,
            Reading::Fault(e) => {
                warn!("{}", MonitorError::Sensor(e));
                self.state = CycleState::Idle;
                return CycleOutcome::SensorFault(e);
            }
        };

        self.state = CycleState::Dispatching;
        self.tracker.accept(&reading);

        let alert = evaluate(self.tracker.state(), celsius, &self.config);
        // Flag before acting so a slow sink can never fire twice in one day
        self.tracker.mark_fired(alert);
        for message in alert.messages() {
            self.devices.alerts.speak(message).await;
        }

        let mut report = CycleReport::new(now, celsius, alert);
        self.store(&mut report);
        self.publish(&mut report);
        self.render(&mut report);

        info!("Logged temperature: {:.1} C", celsius);
        self.state = CycleState::Idle;
        CycleOutcome::Completed(report)
    }

    fn store(&mut self, report: &mut CycleReport) {
        let date = report.at.date;
        let entry = LogEntry::new(&report.at, report.celsius);
        if let Err(e) = self.devices.storage.append(date, &entry) {
            error!("Failed to append to log for {}: {}", date, e);
            report.record(MonitorError::StorageWrite(e));
        }

        // Checked whether or not the append went through
        match rotate(&mut self.devices.storage, date, &self.config) {
            Ok(evicted) => report.evicted = evicted,
            Err(e) => report.record(MonitorError::Eviction(e)),
        }
    }

    fn publish(&mut self, report: &mut CycleReport) {
        match self.devices.notifier.publish(&format_celsius(report.celsius)) {
            Ok(()) => {}
            Err(NotifyError::NoSubscriber) => {
                debug!("No subscriber for {:.1} C", report.celsius);
            }
            Err(e) => {
                warn!("Failed to publish reading: {}", e);
                report.record(MonitorError::Notifier(e));
            }
        }
    }

    fn render(&mut self, report: &mut CycleReport) {
        let snapshot = Snapshot::new(
            &report.at,
            report.celsius,
            self.tracker.max_seen(),
            self.tracker.min_seen(),
        );
        if let Err(e) = self.devices.screen.render(&snapshot) {
            error!("Failed to update screen: {}", e);
            report.record(MonitorError::Screen(e));
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn daily(&self) -> &DailyState {
        self.tracker.state()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn devices(&self) -> &Devices<C, S, L, N, D, A> {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut Devices<C, S, L, N, D, A> {
        &mut self.devices
    }
}
