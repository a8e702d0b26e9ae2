//! Calendar time as seen by the monitor
//!
//! The clock is an external collaborator that is periodically resynchronized
//! over the network and may be stale in between. The core never checks
//! freshness; it only derives a comparable day key from whatever it is given.

use core::fmt::{self, Write};

/// `YYYY-MM-DD`
pub type DateText = heapless::String<10>;

/// `HH:MM:SS`
pub type TimeText = heapless::String<8>;

const SECS_PER_DAY: i64 = 86_400;

/// 9999-12-31 23:59:59, the last instant with a four digit year
const MAX_LOCAL_SECS: i64 = 253_402_300_799;

/// Single comparable integer for a calendar day.
///
/// Computed as `year * 372 + month * 31 + day`, which never collides across
/// month or year rollover. Only compared for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayId(pub u32);

impl DayId {
    /// Placeholder before the first clock observation. No real date maps to 0.
    pub const UNKNOWN: DayId = DayId(0);
}

/// A calendar day, also used as the storage key for that day's log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    pub year: u16,
    /// 1-12
    pub month: u8,
    /// 1-31
    pub day: u8,
}

impl Date {
    pub const fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    pub const fn day_id(self) -> DayId {
        DayId(self.year as u32 * 372 + self.month as u32 * 31 + self.day as u32)
    }

    pub fn text(&self) -> DateText {
        let mut text = DateText::new();
        let _ = write!(text, "{}", self);
        text
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Snapshot of the external clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarTime {
    pub date: Date,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Seconds since the Unix epoch as reported by the network time source
    pub epoch_secs: u64,
}

impl CalendarTime {
    pub const fn new(date: Date, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            date,
            hour,
            minute,
            second,
            epoch_secs: 0,
        }
    }

    /// Convert a Unix epoch into local civil time.
    ///
    /// `utc_offset_secs` is added before the conversion, so the date and
    /// time fields are local while `epoch_secs` keeps the raw network value.
    /// Local times past the end of year 9999 clamp to its last second.
    pub fn from_unix(epoch_secs: u64, utc_offset_secs: i32) -> Self {
        let local = i64::try_from(epoch_secs)
            .unwrap_or(i64::MAX)
            .saturating_add(i64::from(utc_offset_secs))
            .min(MAX_LOCAL_SECS);
        let days = local.div_euclid(SECS_PER_DAY);
        let secs_of_day = local.rem_euclid(SECS_PER_DAY);
        let (year, month, day) = civil_from_days(days);

        Self {
            date: Date::new(u16::try_from(year).unwrap_or(9999), month, day),
            hour: (secs_of_day / 3600) as u8,
            minute: ((secs_of_day % 3600) / 60) as u8,
            second: (secs_of_day % 60) as u8,
            epoch_secs,
        }
    }

    pub fn date_text(&self) -> DateText {
        self.date.text()
    }

    pub fn time_text(&self) -> TimeText {
        let mut text = TimeText::new();
        let _ = write!(
            text,
            "{:02}:{:02}:{:02}",
            self.hour, self.minute, self.second
        );
        text
    }
}

/// Days since 1970-01-01 to a proleptic Gregorian (year, month, day).
fn civil_from_days(days: i64) -> (i64, u8, u8) {
    // Shift the epoch to 0000-03-01 so leap days fall at the end of a year
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let day_of_era = z - era * 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let shifted_month = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * shifted_month + 2) / 5 + 1;
    let month = if shifted_month < 10 {
        shifted_month + 3
    } else {
        shifted_month - 9
    };
    let year = year_of_era + era * 400 + if month <= 2 { 1 } else { 0 };

    (year, month as u8, day as u8)
}

/// External calendar clock (NTP backed on the device).
pub trait TimeSource {
    fn now(&mut self) -> CalendarTime;
}
