//! Wireless republication of the latest reading
//!
//! The radio exposes one read/notify characteristic whose value is the ASCII
//! temperature with one decimal (`"23.4"`). Delivery is best-effort: having
//! nobody subscribed is the normal state, not an error worth reporting.

use core::fmt::Write;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::watch::{Receiver, Watch};
use thiserror_no_std::Error;

/// Wire representation of a temperature
pub type CelsiusText = heapless::String<8>;

/// Characteristic value before the first reading
pub const INITIAL_VALUE: &str = "0.0";

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyError {
    #[error("No subscriber connected")]
    NoSubscriber,
    #[error("Radio not ready")]
    NotReady,
}

/// One-decimal ASCII value. Fits any reading accepted by
/// [`Reading::from`](crate::sensors::Reading).
pub fn format_celsius(celsius: f32) -> CelsiusText {
    let mut text = CelsiusText::new();
    let _ = write!(text, "{:.1}", celsius);
    text
}

/// Holds the value visible to a remote subscriber.
pub trait Notifier {
    /// Replace the value and notify any connected subscriber
    fn publish(&mut self, value: &str) -> Result<(), NotifyError>;
}

/// In-memory characteristic shared with up to `N` local subscribers
/// (the radio task, a diagnostics task, ...).
///
/// Each publish is a single-value replacement; subscribers only ever observe
/// whole values.
pub struct Characteristic<const N: usize> {
    value: Watch<CriticalSectionRawMutex, CelsiusText, N>,
}

impl<const N: usize> Characteristic<N> {
    pub const fn new() -> Self {
        Self {
            value: Watch::new(),
        }
    }

    /// `None` once all `N` subscriber slots are taken
    pub fn subscribe(&self) -> Option<Receiver<'_, CriticalSectionRawMutex, CelsiusText, N>> {
        self.value.receiver()
    }

    /// Current value as a remote read would see it
    pub fn read(&self) -> CelsiusText {
        self.value
            .anon_receiver()
            .try_get()
            .unwrap_or_else(|| format_text(INITIAL_VALUE))
    }

    fn store(&self, value: &str) {
        self.value.sender().send(format_text(value));
    }
}

impl<const N: usize> Default for Characteristic<N> {
    fn default() -> Self {
        Self::new()
    }
}

fn format_text(value: &str) -> CelsiusText {
    let mut text = CelsiusText::new();
    let _ = text.push_str(value);
    text
}

impl<const N: usize> Notifier for Characteristic<N> {
    fn publish(&mut self, value: &str) -> Result<(), NotifyError> {
        self.store(value);
        Ok(())
    }
}

impl<const N: usize> Notifier for &Characteristic<N> {
    fn publish(&mut self, value: &str) -> Result<(), NotifyError> {
        self.store(value);
        Ok(())
    }
}
