//! Temperature sensor port and the per-cycle reading

use core::future::Future;

use thiserror_no_std::Error;

/// Value a 1-Wire thermometer driver reports when the probe does not answer
pub const DISCONNECTED_CELSIUS: f32 = -127.0;

/// Readings outside this range are treated as corrupt. Every accepted value
/// formats to at most six characters with one decimal (`-100.0`), which the
/// log line and the characteristic value are sized for.
pub const MIN_PLAUSIBLE_CELSIUS: f32 = -100.0;
pub const MAX_PLAUSIBLE_CELSIUS: f32 = 200.0;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("Sensor disconnected")]
    Disconnected,
    #[error("Failed to read {sensor}: {details}")]
    ReadFailed {
        sensor: &'static str,
        details: &'static str,
    },
    #[error("Sensor returned a value that is not a temperature")]
    InvalidValue,
}

/// Result of one acquisition.
///
/// Produced once per cycle and dropped at the end of it. The acquisition
/// timestamp is the calendar time sampled at the start of the cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// Valid temperature in °C
    Celsius(f32),
    /// The sensor could not be read; never recorded as a temperature
    Fault(SensorError),
}

impl Reading {
    pub fn celsius(&self) -> Option<f32> {
        match self {
            Self::Celsius(value) => Some(*value),
            Self::Fault(_) => None,
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }
}

impl From<Result<f32, SensorError>> for Reading {
    fn from(result: Result<f32, SensorError>) -> Self {
        match result {
            Ok(value) if value == DISCONNECTED_CELSIUS => Self::Fault(SensorError::Disconnected),
            Ok(value) if (MIN_PLAUSIBLE_CELSIUS..=MAX_PLAUSIBLE_CELSIUS).contains(&value) => {
                Self::Celsius(value)
            }
            Ok(_) => Self::Fault(SensorError::InvalidValue),
            Err(e) => Self::Fault(e),
        }
    }
}

/// A thermometer that performs one blocking-from-the-caller's-view
/// acquisition per call.
pub trait TemperatureSensor {
    fn read_once(&mut self) -> impl Future<Output = Result<f32, SensorError>>;
}
