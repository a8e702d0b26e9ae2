//! Day-keyed, append-only reading log
//!
//! Each calendar day owns one record, keyed by its [`Date`] (`YYYY-MM-DD`),
//! holding one `HH:MM:SS,<celsius>` line per accepted reading. Records are
//! only ever appended to or deleted whole.

pub mod ram_log;
pub mod rotation;

pub use ram_log::RamLog;
pub use rotation::{rotate, should_evict};

use core::fmt::{self, Write};

use thiserror_no_std::Error;

use crate::time::{CalendarTime, Date};

/// One log line including the trailing newline
pub type LineText = heapless::String<24>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage is full")]
    Full,
    #[error("Storage is not mounted")]
    Unavailable,
    #[error("Storage I/O failed: {0}")]
    Io(heapless::String<64>),
}

impl StorageError {
    /// Wrap a backend error, truncating its description to fit
    pub fn io(details: impl fmt::Display) -> Self {
        let mut text = heapless::String::new();
        let _ = write!(Truncating(&mut text), "{}", details);
        Self::Io(text)
    }
}

/// Writes as much as fits and silently drops the rest
struct Truncating<'a, const N: usize>(&'a mut heapless::String<N>);

impl<const N: usize> Write for Truncating<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// A reading as it is persisted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogEntry {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub celsius: f32,
}

impl LogEntry {
    pub fn new(at: &CalendarTime, celsius: f32) -> Self {
        Self {
            hour: at.hour,
            minute: at.minute,
            second: at.second,
            celsius,
        }
    }

    /// `HH:MM:SS,23.4\n`
    ///
    /// Sized for readings accepted by [`Reading::from`](crate::sensors::Reading).
    pub fn line(&self) -> LineText {
        let mut line = LineText::new();
        let _ = writeln!(line, "{}", self);
        line
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02},{:.1}",
            self.hour, self.minute, self.second, self.celsius
        )
    }
}

/// Durable storage for the day logs (an SD card on the device).
pub trait Storage {
    /// Append one entry to the record for `date`, creating it if needed
    fn append(&mut self, date: Date, entry: &LogEntry) -> Result<(), StorageError>;

    /// Free space left on the medium
    fn remaining_capacity_bytes(&mut self) -> u64;

    /// Delete the whole record for `date`. Deleting a missing record is not an error.
    fn delete_all(&mut self, date: Date) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_line_format() {
        let at = CalendarTime::new(Date::new(2026, 10, 18), 9, 4, 0);
        let entry = LogEntry::new(&at, 23.44);
        assert_eq!(entry.line().as_str(), "09:04:00,23.4\n");
    }

    #[test]
    fn test_negative_log_line() {
        let at = CalendarTime::new(Date::new(2026, 1, 2), 23, 59, 59);
        let entry = LogEntry::new(&at, -12.0);
        assert_eq!(entry.line().as_str(), "23:59:59,-12.0\n");
    }

    #[test]
    fn test_plausible_extremes_fit_the_line() {
        let at = CalendarTime::new(Date::new(2026, 1, 2), 23, 59, 59);
        let coldest = LogEntry::new(&at, crate::sensors::MIN_PLAUSIBLE_CELSIUS);
        let hottest = LogEntry::new(&at, crate::sensors::MAX_PLAUSIBLE_CELSIUS);
        assert_eq!(coldest.line().as_str(), "23:59:59,-100.0\n");
        assert_eq!(hottest.line().as_str(), "23:59:59,200.0\n");
    }

    #[test]
    fn test_io_error_is_truncated() {
        let long = "x".repeat(200);
        match StorageError::io(long.as_str()) {
            StorageError::Io(text) => assert_eq!(text.len(), 64),
            other => panic!("unexpected {:?}", other),
        }
    }
}
