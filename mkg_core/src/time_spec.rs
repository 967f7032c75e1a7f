//! Time of day of a pickup event.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::Serialize;

use crate::error::{Result, ScheduleError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimeSpec {
    AllDay,
    /// Starts at the given time and lasts one hour.
    Specific { time: NaiveTime },
    Range { start: NaiveTime, end: NaiveTime },
}

impl TimeSpec {
    pub fn specific(time: &str) -> Result<Self> {
        Ok(TimeSpec::Specific {
            time: parse_time(time)?,
        })
    }

    pub fn range(start: &str, end: &str) -> Result<Self> {
        let start = parse_time(start)?;
        let end = parse_time(end)?;
        if start >= end {
            return Err(ScheduleError::InvalidTimeRange(format!(
                "Die Startzeit {} muss vor der Endzeit {} liegen",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        Ok(TimeSpec::Range { start, end })
    }

    /// Start and end of the event on `date`, `None` for all-day events.
    pub fn bounds(&self, date: NaiveDate) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match *self {
            TimeSpec::AllDay => None,
            TimeSpec::Specific { time } => {
                let start = date.and_time(time);
                Some((start, start + Duration::hours(1)))
            }
            TimeSpec::Range { start, end } => Some((date.and_time(start), date.and_time(end))),
        }
    }

    /// Human readable label as shown in the preview.
    pub fn label(&self) -> String {
        match self {
            TimeSpec::AllDay => String::from("Ganztägig"),
            TimeSpec::Specific { time } => format!("{} Uhr", time.format("%H:%M")),
            TimeSpec::Range { start, end } => {
                format!("{} - {} Uhr", start.format("%H:%M"), end.format("%H:%M"))
            }
        }
    }
}

/// Parse a strict `HH:MM` wall-clock time.
pub fn parse_time(value: &str) -> Result<NaiveTime> {
    let time_regex = Regex::new(r"^(?P<hour>[01]\d|2[0-3]):(?P<minute>[0-5]\d)$").unwrap();
    time_regex
        .captures(value.trim())
        .and_then(|captures| {
            NaiveTime::from_hms_opt(
                captures["hour"].parse().ok()?,
                captures["minute"].parse().ok()?,
                0,
            )
        })
        .ok_or_else(|| ScheduleError::InvalidTimeRange(format!("\"{value}\" ist keine Uhrzeit")))
}
