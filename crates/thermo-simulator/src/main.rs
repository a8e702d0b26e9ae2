//! Desktop simulator for the thermo temperature monitor.
//!
//! Drives a thermo-core [`Orchestrator`] in accelerated time against host
//! stand-ins for every device:
//!
//! | Device      | Stand-in                                           |
//! |-------------|----------------------------------------------------|
//! | Clock       | host time, advanced one simulated step per loop    |
//! | Thermometer | daily sinusoid crossing both thresholds            |
//! | Card        | `YYYY-MM-DD.txt` files in the output directory     |
//! | Radio       | static [`Characteristic`] with a logging subscriber |
//! | Screen      | headless framebuffer saved as `screen.png`         |
//! | Speaker     | log lines                                          |
//!
//! Output goes to `thermo-sim-out/` (override with `THERMO_SIM_DIR`). The
//! configuration is read from `thermo-config.bin` there, and written with
//! defaults if missing.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use embassy_futures::block_on;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay};
use log::{error, info, warn};

use thermo_core::alerts::AlertSink;
use thermo_core::notifier::{Characteristic, Notifier, NotifyError};
use thermo_core::screen::SnapshotScreen;
use thermo_core::sensors::{DISCONNECTED_CELSIUS, SensorError, TemperatureSensor};
use thermo_core::storage::{LogEntry, Storage, StorageError};
use thermo_core::time::{CalendarTime, Date, TimeSource};
use thermo_core::{CycleOutcome, Devices, MonitorConfig, Orchestrator};

// ---------------------------------------------------------------------------
// Simulation constants
// ---------------------------------------------------------------------------

const DISPLAY_WIDTH_PX: u32 = 128;
const DISPLAY_HEIGHT_PX: u32 = 128;

/// Simulated time that passes per loop iteration.
const SIM_STEP_MS: u32 = 10_000;

/// Real time slept per loop iteration.
const LOOP_PAUSE: Duration = Duration::from_millis(5);

/// How long the simulation runs before exiting.
const SIM_DURATION_SECS: u64 = 3 * 86_400;

/// Card size on top of the capacity floor, so rotation triggers within a day.
const CARD_HEADROOM_BYTES: u64 = 4 * 1024;

/// Every n-th read reports a disconnected probe.
const FAULT_EVERY_N_READS: u32 = 37;

/// The radio alternates between connected and idle every n publishes.
const RADIO_TOGGLE_EVERY: u32 = 50;

const CONFIG_FILE: &str = "thermo-config.bin";
const SCREEN_FILE: &str = "screen.png";

static CHARACTERISTIC: Characteristic<2> = Characteristic::new();

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

/// Wall clock started from host time and moved forward by the main loop.
struct SimClock {
    epoch_secs: u64,
    utc_offset_secs: i32,
}

impl SimClock {
    fn from_host(utc_offset_secs: i32) -> Self {
        let epoch_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            epoch_secs,
            utc_offset_secs,
        }
    }

    fn advance(&mut self, ms: u32) {
        self.epoch_secs += u64::from(ms / 1000);
    }
}

impl TimeSource for SimClock {
    fn now(&mut self) -> CalendarTime {
        CalendarTime::from_unix(self.epoch_secs, self.utc_offset_secs)
    }
}

/// Synthetic probe following a daily cycle between 2.5 C and 32.5 C.
struct MockThermometer {
    epoch_secs: u64,
    reads: u32,
}

impl MockThermometer {
    fn new() -> Self {
        Self {
            epoch_secs: 0,
            reads: 0,
        }
    }

    fn sync(&mut self, epoch_secs: u64) {
        self.epoch_secs = epoch_secs;
    }
}

impl TemperatureSensor for MockThermometer {
    async fn read_once(&mut self) -> Result<f32, SensorError> {
        self.reads = self.reads.wrapping_add(1);
        if self.reads % FAULT_EVERY_N_READS == 0 {
            return Ok(DISCONNECTED_CELSIUS);
        }

        let day_phase = (self.epoch_secs % 86_400) as f64 / 86_400.0;
        let t = day_phase * std::f64::consts::TAU;
        let celsius = 17.5 + 15.0 * t.sin() + 0.3 * (t * 29.0).cos();
        Ok(celsius as f32)
    }
}

/// Day logs as text files in a directory, capped at a simulated card size.
struct FsLog {
    dir: PathBuf,
    card_bytes: u64,
}

impl FsLog {
    fn new(dir: PathBuf, card_bytes: u64) -> Self {
        Self { dir, card_bytes }
    }

    fn path(&self, date: Date) -> PathBuf {
        self.dir.join(format!("{}.txt", date))
    }

    fn used_bytes(&self) -> u64 {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return 0;
        };
        entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "txt"))
            .filter_map(|entry| entry.metadata().ok())
            .map(|meta| meta.len())
            .sum()
    }
}

impl Storage for FsLog {
    fn append(&mut self, date: Date, entry: &LogEntry) -> Result<(), StorageError> {
        let line = entry.line();
        if self.used_bytes() + line.len() as u64 > self.card_bytes {
            return Err(StorageError::Full);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(date))
            .map_err(StorageError::io)?;
        file.write_all(line.as_bytes()).map_err(StorageError::io)
    }

    fn remaining_capacity_bytes(&mut self) -> u64 {
        self.card_bytes.saturating_sub(self.used_bytes())
    }

    fn delete_all(&mut self, date: Date) -> Result<(), StorageError> {
        match fs::remove_file(self.path(date)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(e)),
        }
    }
}

/// Radio link that only delivers while a central is connected.
///
/// The characteristic value is updated either way, the way a GATT server
/// keeps its attribute current for the next read.
struct SimRadio {
    characteristic: &'static Characteristic<2>,
    connected: bool,
    publishes: u32,
}

impl Notifier for SimRadio {
    fn publish(&mut self, value: &str) -> Result<(), NotifyError> {
        self.publishes = self.publishes.wrapping_add(1);
        if self.publishes % RADIO_TOGGLE_EVERY == 0 {
            self.connected = !self.connected;
            info!(
                "Radio {}",
                if self.connected { "connected" } else { "disconnected" }
            );
        }

        let mut characteristic = self.characteristic;
        characteristic.publish(value)?;
        if self.connected {
            Ok(())
        } else {
            Err(NotifyError::NoSubscriber)
        }
    }
}

struct LogAlert;

impl AlertSink for LogAlert {
    async fn speak(&mut self, message: &str) {
        warn!("SPEAKER: {}", message);
    }
}

// ---------------------------------------------------------------------------
// Setup helpers
// ---------------------------------------------------------------------------

fn output_dir() -> PathBuf {
    std::env::var_os("THERMO_SIM_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("thermo-sim-out"))
}

/// Read the stored configuration, falling back to (and saving) defaults.
fn load_config(dir: &Path) -> MonitorConfig {
    let path = dir.join(CONFIG_FILE);
    match fs::read(&path) {
        Ok(bytes) => match MonitorConfig::from_bytes(&bytes) {
            Ok(config) => return config,
            Err(e) => warn!("Ignoring {}: {}", path.display(), e),
        },
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to read {}: {}", path.display(), e),
    }

    let config = MonitorConfig::default();
    match config.to_bytes() {
        Ok(bytes) => {
            if let Err(e) = fs::write(&path, bytes) {
                warn!("Failed to save {}: {}", path.display(), e);
            }
        }
        Err(e) => warn!("Failed to encode config: {}", e),
    }
    config
}

fn save_screen(display: &SimulatorDisplay<Rgb565>, path: &Path) {
    let settings = OutputSettingsBuilder::new().build();
    if let Err(e) = display.to_rgb_output_image(&settings).save_png(path) {
        error!("Failed to save {}: {}", path.display(), e);
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting thermo simulator");

    let dir = output_dir();
    if let Err(e) = fs::create_dir_all(&dir) {
        error!("Cannot create {}: {}", dir.display(), e);
        return;
    }

    let config = load_config(&dir);
    info!(
        "Config: every {} ms, high {:.1} C, low {:.1} C, floor {} bytes, UTC{:+}s",
        config.sample_interval_ms,
        config.high_threshold_c,
        config.low_threshold_c,
        config.capacity_floor_bytes,
        config.utc_offset_secs
    );

    let display = SimulatorDisplay::<Rgb565>::new(Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX));
    let devices = Devices {
        clock: SimClock::from_host(config.utc_offset_secs),
        sensor: MockThermometer::new(),
        storage: FsLog::new(
            dir.clone(),
            config.capacity_floor_bytes + CARD_HEADROOM_BYTES,
        ),
        notifier: SimRadio {
            characteristic: &CHARACTERISTIC,
            connected: false,
            publishes: 0,
        },
        screen: SnapshotScreen::new(display),
        alerts: LogAlert,
    };

    let mut monitor = match Orchestrator::new(config, devices) {
        Ok(monitor) => monitor,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    let Some(mut subscriber) = CHARACTERISTIC.subscribe() else {
        error!("No free characteristic subscriber slot");
        return;
    };

    let screen_path = dir.join(SCREEN_FILE);
    let mut now_ms: u32 = 0;
    let mut elapsed_secs: u64 = 0;

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    while elapsed_secs < SIM_DURATION_SECS {
        now_ms = now_ms.wrapping_add(SIM_STEP_MS);
        elapsed_secs += u64::from(SIM_STEP_MS / 1000);

        let devices = monitor.devices_mut();
        devices.clock.advance(SIM_STEP_MS);
        let epoch_secs = devices.clock.epoch_secs;
        devices.sensor.sync(epoch_secs);

        match block_on(monitor.poll(now_ms)) {
            CycleOutcome::Idle => {}
            CycleOutcome::SensorFault(e) => info!("Cycle skipped: {}", e),
            CycleOutcome::Completed(report) => {
                if report.evicted {
                    info!("Rotated log for {}", report.at.date);
                }
                for fault in &report.faults {
                    warn!("Cycle fault: {}", fault);
                }
                save_screen(monitor.devices().screen.target(), &screen_path);
            }
        }

        // --- Subscriber ---------------------------------------------------
        if let Some(value) = subscriber.try_changed() {
            info!("Subscriber received {} C (read {})", value, CHARACTERISTIC.read());
        }

        std::thread::sleep(LOOP_PAUSE);
    }

    let daily = monitor.daily();
    info!(
        "Simulator exiting: max {:?} C, min {:?} C today",
        daily.max_seen, daily.min_seen
    );
}
