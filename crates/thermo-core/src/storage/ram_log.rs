use alloc::collections::BTreeMap;
use alloc::string::String;

use super::{LogEntry, Storage, StorageError};
use crate::time::Date;

/// Volatile day logs held in RAM with a fixed byte quota.
///
/// Behaves like a tiny card: an append that would not fit fails with
/// [`StorageError::Full`] and leaves the record untouched.
#[derive(Debug)]
pub struct RamLog {
    days: BTreeMap<Date, String>,
    quota_bytes: u64,
    used_bytes: u64,
}

impl RamLog {
    pub fn new(quota_bytes: u64) -> Self {
        Self {
            days: BTreeMap::new(),
            quota_bytes,
            used_bytes: 0,
        }
    }

    /// The record for `date`, if one exists
    pub fn contents(&self, date: Date) -> Option<&str> {
        self.days.get(&date).map(String::as_str)
    }

    pub fn line_count(&self, date: Date) -> usize {
        self.contents(date).map_or(0, |text| text.lines().count())
    }

    pub fn days(&self) -> impl Iterator<Item = Date> + '_ {
        self.days.keys().copied()
    }

    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }
}

impl Storage for RamLog {
    fn append(&mut self, date: Date, entry: &LogEntry) -> Result<(), StorageError> {
        let line = entry.line();
        let len = line.len() as u64;
        if self.used_bytes + len > self.quota_bytes {
            return Err(StorageError::Full);
        }

        self.days.entry(date).or_default().push_str(&line);
        self.used_bytes += len;
        Ok(())
    }

    fn remaining_capacity_bytes(&mut self) -> u64 {
        self.quota_bytes.saturating_sub(self.used_bytes)
    }

    fn delete_all(&mut self, date: Date) -> Result<(), StorageError> {
        if let Some(text) = self.days.remove(&date) {
            self.used_bytes -= text.len() as u64;
        }
        Ok(())
    }
}
