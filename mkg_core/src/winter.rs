//! Biweekly winter cadence for organic waste.
//!
//! Inside a winter window only every second pickup takes place, counted from the first pickup
//! inside that window. Outside of the windows the weekly cadence applies.

use std::collections::{btree_map::Entry, BTreeMap};

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, ScheduleError},
    weekday::first_on_or_after,
};

/// The yearly winter period, e.g. October 1st to March 31st.
///
/// The end lies before the start within a calendar year, the period wraps around New Year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WinterConfig {
    pub start_month: u32,
    pub start_day: u32,
    pub end_month: u32,
    pub end_day: u32,
}

impl Default for WinterConfig {
    fn default() -> Self {
        WinterConfig {
            start_month: 10,
            start_day: 1,
            end_month: 3,
            end_day: 31,
        }
    }
}

impl WinterConfig {
    /// Reject month/day values which do not exist and periods which do not wrap around New Year.
    pub fn validate(&self) -> Result<()> {
        for (label, month, day) in [
            ("Beginn", self.start_month, self.start_day),
            ("Ende", self.end_month, self.end_day),
        ] {
            // 2000 is a leap year, so February 29th passes here and is clamped per year later.
            if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
                return Err(ScheduleError::MalformedWinterConfig(format!(
                    "{label} {day:02}.{month:02}. ist kein gültiges Datum"
                )));
            }
        }
        if (self.end_month, self.end_day) >= (self.start_month, self.start_day) {
            return Err(ScheduleError::MalformedWinterConfig(format!(
                "Ende {:02}.{:02}. muss vor Beginn {:02}.{:02}. liegen",
                self.end_day, self.end_month, self.start_day, self.start_month
            )));
        }
        Ok(())
    }
}

/// One concrete winter period together with the first pickup inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinterWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub first_occurrence: NaiveDate,
}

impl WinterWindow {
    fn new(start: NaiveDate, end: NaiveDate, weekday: Weekday) -> Result<Self> {
        let first_occurrence = first_on_or_after(start, weekday).ok_or_else(|| {
            ScheduleError::MalformedWinterConfig(format!("kein {weekday} nach dem {start}"))
        })?;
        Ok(WinterWindow {
            start,
            end,
            first_occurrence,
        })
    }

    /// The early-year window reaching from the previous year into `reference_year` and the
    /// late-year window reaching from `reference_year` into the next year.
    pub fn pair(
        config: &WinterConfig,
        weekday: Weekday,
        reference_year: i32,
    ) -> Result<[WinterWindow; 2]> {
        let early = WinterWindow::new(
            date_in(reference_year - 1, config.start_month, config.start_day)?,
            date_in(reference_year, config.end_month, config.end_day)?,
            weekday,
        )?;
        let late = WinterWindow::new(
            date_in(reference_year, config.start_month, config.start_day)?,
            date_in(reference_year + 1, config.end_month, config.end_day)?,
            weekday,
        )?;
        Ok([early, late])
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Zero-based number of whole weeks between the first pickup in this window and `date`.
    pub fn week_index(&self, date: NaiveDate) -> i64 {
        (date - self.first_occurrence).num_days().div_euclid(7)
    }
}

/// Whether the pickup on `nominal` is dropped by the winter cadence.
///
/// The first pickup of a window is kept, the next one skipped, and so on.
pub fn should_skip(nominal: NaiveDate, windows: &[WinterWindow]) -> bool {
    windows
        .iter()
        .find(|window| window.contains(nominal))
        .is_some_and(|window| window.week_index(nominal).rem_euclid(2) == 1)
}

/// Applies the winter cadence over a whole resolution run, deriving the windows once per year.
#[derive(Debug, Clone)]
pub struct WinterCadence {
    config: WinterConfig,
    weekday: Weekday,
    windows: BTreeMap<i32, [WinterWindow; 2]>,
}

impl WinterCadence {
    pub fn new(config: WinterConfig, weekday: Weekday) -> Result<Self> {
        config.validate()?;
        Ok(WinterCadence {
            config,
            weekday,
            windows: BTreeMap::new(),
        })
    }

    /// Whether the pickup on `nominal` is dropped, judged by the windows of its own year.
    pub fn should_skip(&mut self, nominal: NaiveDate) -> Result<bool> {
        let year = nominal.year();
        let windows = match self.windows.entry(year) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                entry.insert(WinterWindow::pair(&self.config, self.weekday, year)?)
            }
        };
        Ok(should_skip(nominal, windows))
    }
}

/// Build a date, moving February 29th to the 28th in non-leap years.
fn date_in(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .or_else(|| match (month, day) {
            (2, 29) => NaiveDate::from_ymd_opt(year, 2, 28),
            _ => None,
        })
        .ok_or_else(|| {
            ScheduleError::MalformedWinterConfig(format!(
                "{day:02}.{month:02}.{year} existiert nicht"
            ))
        })
}
