//! The one weekday table shared by the resolver and every display layer.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::{Result, ScheduleError};

/// Weekdays ordered by their Sunday-based index.
static WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];
static CODES: [&str; 7] = ["SU", "MO", "TU", "WE", "TH", "FR", "SA"];
static NAMES: [&str; 7] = [
    "Sonntag",
    "Montag",
    "Dienstag",
    "Mittwoch",
    "Donnerstag",
    "Freitag",
    "Samstag",
];

pub trait WeekdayLabels {
    /// The Sunday-based index, Sunday is 0 and Saturday is 6.
    fn index(&self) -> u8;
    /// The two letter code, e.g. `MO`.
    fn code(&self) -> &'static str;
    /// The German name, e.g. `Montag`.
    fn german_name(&self) -> &'static str;
}

impl WeekdayLabels for Weekday {
    fn index(&self) -> u8 {
        self.num_days_from_sunday() as u8
    }

    fn code(&self) -> &'static str {
        CODES[self.index() as usize]
    }

    fn german_name(&self) -> &'static str {
        NAMES[self.index() as usize]
    }
}

/// Parse a two letter weekday code like `MO` or `su`.
pub fn from_code(code: &str) -> Result<Weekday> {
    let code = code.trim().to_ascii_uppercase();
    CODES
        .iter()
        .position(|candidate| *candidate == code)
        .map(|position| WEEKDAYS[position])
        .ok_or(ScheduleError::InvalidWeekday(code))
}

/// Get the weekday for a Sunday-based index in `0..=6`.
pub fn from_index(index: u8) -> Result<Weekday> {
    WEEKDAYS
        .get(index as usize)
        .copied()
        .ok_or_else(|| ScheduleError::InvalidWeekday(index.to_string()))
}

/// The first date on or after `date` which falls on `weekday`.
pub fn first_on_or_after(date: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let offset = (7 + weekday.index() - date.weekday().index()) % 7;
    date.checked_add_signed(Duration::days(offset as i64))
}

/// Monday to Friday.
pub fn is_workday(weekday: Weekday) -> bool {
    !matches!(weekday, Weekday::Sat | Weekday::Sun)
}
