//! Hardware-independent core library for thermo
//!
//! This crate contains the platform-agnostic control logic of the thermo
//! temperature monitor: the sampling gate, daily min/max tracking, once-per-day
//! threshold alerts, capacity-bounded log rotation and the orchestrator that
//! fans each reading out to storage, the wireless characteristic and the screen.
//!
//! The outside world (clock, thermometer, storage card, radio, screen, speaker)
//! is reached through the traits in [`time`], [`sensors`], [`storage`],
//! [`notifier`], [`screen`] and [`alerts`].
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod alerts;
pub mod config;
pub mod error;
pub mod notifier;
pub mod orchestrator;
pub mod scheduler;
pub mod screen;
pub mod sensors;
pub mod stats;
pub mod storage;
pub mod time;

pub use config::MonitorConfig;
pub use error::MonitorError;
pub use orchestrator::{CycleOutcome, CycleReport, CycleState, Devices, Orchestrator};
