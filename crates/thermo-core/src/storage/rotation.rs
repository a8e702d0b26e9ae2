//! Capacity-floor log rotation
//!
//! When free space falls below the configured floor, the record for the day
//! that was just written is deleted in full. Older days are left alone. Later
//! writes for the same day recreate the record from empty.

use log::{error, warn};

use super::{Storage, StorageError};
use crate::config::MonitorConfig;
use crate::time::Date;

/// `true` iff `free_capacity_bytes` is strictly below the floor.
pub fn should_evict(free_capacity_bytes: u64, config: &MonitorConfig) -> bool {
    free_capacity_bytes < config.capacity_floor_bytes
}

/// Query free space and evict `date` if it is below the floor.
///
/// Returns whether the record was deleted.
pub fn rotate<S: Storage + ?Sized>(
    storage: &mut S,
    date: Date,
    config: &MonitorConfig,
) -> Result<bool, StorageError> {
    let free = storage.remaining_capacity_bytes();
    if !should_evict(free, config) {
        return Ok(false);
    }

    warn!(
        "Low storage space ({} bytes free, floor {}): deleting log for {}",
        free, config.capacity_floor_bytes, date
    );
    storage.delete_all(date).map_err(|e| {
        error!("Failed to delete log for {}: {}", date, e);
        e
    })?;
    Ok(true)
}
