//! Preview rows listing where each pickup ends up, built from the same events as the calendar.

use std::fmt::{Display, Formatter};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::{resolver::ScheduleEvent, weekday::WeekdayLabels};

static FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRow {
    pub original_date: String,
    pub original_weekday: String,
    pub event_date: String,
    pub event_weekday: String,
    pub time_info: String,
    pub is_modified: bool,
    pub reason: String,
}

impl From<&ScheduleEvent> for PreviewRow {
    fn from(event: &ScheduleEvent) -> Self {
        PreviewRow {
            original_date: format_date(event.nominal_date),
            original_weekday: String::from(event.nominal_date.weekday().german_name()),
            event_date: format_date(event.effective_date),
            event_weekday: String::from(event.effective_date.weekday().german_name()),
            time_info: event.time_of_day.label(),
            is_modified: event.is_shifted,
            reason: event.shift_reason.clone().unwrap_or_default(),
        }
    }
}

impl Display for PreviewRow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<10} {:<10} {}",
            self.event_weekday, self.event_date, self.time_info
        )?;
        if self.is_modified {
            write!(
                f,
                "  statt {} {}: {}",
                self.original_weekday, self.original_date, self.reason
            )?;
        }
        Ok(())
    }
}

pub fn rows(events: &[ScheduleEvent]) -> Vec<PreviewRow> {
    events.iter().map(PreviewRow::from).collect()
}

fn format_date(date: NaiveDate) -> String {
    date.format(FORMAT).to_string()
}
