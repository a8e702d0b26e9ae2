//! Non-fatal faults observed during a sampling cycle
//!
//! Nothing here aborts the monitor. Each fault is isolated to the step that
//! produced it, logged, and carried in the cycle report.

use thiserror_no_std::Error;

use crate::notifier::NotifyError;
use crate::screen::ScreenError;
use crate::sensors::SensorError;
use crate::storage::StorageError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    #[error("Sensor fault: {0}")]
    Sensor(SensorError),
    #[error("Storage write failed: {0}")]
    StorageWrite(StorageError),
    #[error("Log eviction failed: {0}")]
    Eviction(StorageError),
    #[error("Notifier failed: {0}")]
    Notifier(NotifyError),
    #[error("Screen failed: {0}")]
    Screen(ScreenError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_messages_name_the_step() {
        assert_eq!(
            MonitorError::StorageWrite(StorageError::Full).to_string(),
            "Storage write failed: Storage is full"
        );
        assert_eq!(
            MonitorError::Sensor(SensorError::Disconnected).to_string(),
            "Sensor fault: Sensor disconnected"
        );
    }
}
