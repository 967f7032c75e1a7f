//! The calendar request shared by the preview and the calendar download.

use chrono::{Months, NaiveDate};
use ical::generator::IcalCalendar;
use serde::Deserialize;

use crate::{
    calendar::{self, CalendarOptions},
    error::{Result, ScheduleError},
    holiday::{HolidayRecord, HolidaySet},
    preview::{self, PreviewRow},
    resolver::{Resolver, ScheduleEvent},
    time_spec::TimeSpec,
    weekday,
    winter::WinterConfig,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeType {
    #[default]
    Allday,
    Specific,
    Range,
}

/// A calendar request as sent by a client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarRequest {
    /// Two letter weekday code like `MO`.
    #[serde(default)]
    pub pickup_day: String,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub holidays: Vec<HolidayRecord>,
    /// Defaults to today.
    pub start_date: Option<NaiveDate>,
    /// Defaults to one year after the start.
    pub end_date: Option<NaiveDate>,
    /// Hours before the pickup to remind of it.
    pub reminder: Option<u32>,
    #[serde(default)]
    pub time_type: TimeType,
    #[serde(default = "default_start_time")]
    pub specific_time: String,
    #[serde(default = "default_start_time")]
    pub start_time: String,
    #[serde(default = "default_end_time")]
    pub end_time: String,
    /// Organic waste is collected every second week in winter.
    #[serde(default)]
    pub organic_waste: bool,
    #[serde(default = "default_winter_start_month")]
    pub winter_start_month: u32,
    #[serde(default = "default_winter_start_day")]
    pub winter_start_day: u32,
    #[serde(default = "default_winter_end_month")]
    pub winter_end_month: u32,
    #[serde(default = "default_winter_end_day")]
    pub winter_end_day: u32,
}

fn default_start_time() -> String {
    String::from("08:00")
}

fn default_end_time() -> String {
    String::from("09:00")
}

fn default_winter_start_month() -> u32 {
    WinterConfig::default().start_month
}

fn default_winter_start_day() -> u32 {
    WinterConfig::default().start_day
}

fn default_winter_end_month() -> u32 {
    WinterConfig::default().end_month
}

fn default_winter_end_day() -> u32 {
    WinterConfig::default().end_day
}

impl CalendarRequest {
    pub fn new(pickup_day: &str, event_name: &str, holidays: Vec<HolidayRecord>) -> Self {
        CalendarRequest {
            pickup_day: String::from(pickup_day),
            event_name: String::from(event_name),
            holidays,
            start_date: None,
            end_date: None,
            reminder: None,
            time_type: TimeType::Allday,
            specific_time: default_start_time(),
            start_time: default_start_time(),
            end_time: default_end_time(),
            organic_waste: false,
            winter_start_month: default_winter_start_month(),
            winter_start_day: default_winter_start_day(),
            winter_end_month: default_winter_end_month(),
            winter_end_day: default_winter_end_day(),
        }
    }

    pub fn winter_config(&self) -> WinterConfig {
        WinterConfig {
            start_month: self.winter_start_month,
            start_day: self.winter_start_day,
            end_month: self.winter_end_month,
            end_day: self.winter_end_day,
        }
    }

    pub fn set_winter_config(&mut self, winter: WinterConfig) {
        self.winter_start_month = winter.start_month;
        self.winter_start_day = winter.start_day;
        self.winter_end_month = winter.end_month;
        self.winter_end_day = winter.end_day;
    }

    /// Check the request, the first violated precondition is reported.
    pub fn validate(&self) -> Result<ValidatedRequest> {
        if self.event_name.trim().is_empty() {
            return Err(ScheduleError::MissingField("eventName"));
        }
        if self.pickup_day.trim().is_empty() {
            return Err(ScheduleError::MissingField("pickupDay"));
        }
        if self.holidays.is_empty() {
            return Err(ScheduleError::EmptyHolidaySet);
        }
        let weekday = weekday::from_code(&self.pickup_day)?;
        let time_of_day = match self.time_type {
            TimeType::Allday => TimeSpec::AllDay,
            TimeType::Specific => TimeSpec::specific(&self.specific_time)?,
            TimeType::Range => TimeSpec::range(&self.start_time, &self.end_time)?,
        };
        let start = self
            .start_date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let end = self
            .end_date
            .or_else(|| start.checked_add_months(Months::new(12)))
            .unwrap_or(start);
        let holidays: HolidaySet = self.holidays.iter().collect();
        let mut resolver =
            Resolver::new(weekday, start, end, holidays).with_time_of_day(time_of_day);
        if self.organic_waste {
            let winter = self.winter_config();
            winter.validate()?;
            resolver = resolver.with_winter(winter);
        }
        let options = CalendarOptions::new(self.event_name.trim()).with_reminder(self.reminder);
        Ok(ValidatedRequest { resolver, options })
    }
}

/// A request which passed validation, ready to be resolved.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub resolver: Resolver,
    pub options: CalendarOptions,
}

impl ValidatedRequest {
    pub fn events(&self) -> Result<Vec<ScheduleEvent>> {
        self.resolver.resolve()
    }

    pub fn preview(&self) -> Result<Vec<PreviewRow>> {
        Ok(preview::rows(&self.events()?))
    }

    pub fn calendar(&self) -> Result<IcalCalendar> {
        Ok(calendar::build(&self.events()?, &self.options))
    }
}
