//! Errors raised while validating and resolving a pickup schedule.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Ungültiger Wochentag: {0}")]
    InvalidWeekday(String),

    #[error("Ungültige Zeitangabe: {0}")]
    InvalidTimeRange(String),

    #[error("Keine Feiertage angegeben")]
    EmptyHolidaySet,

    #[error("Ungültiger Winterzeitraum: {0}")]
    MalformedWinterConfig(String),

    #[error("Pflichtfeld fehlt: {0}")]
    MissingField(&'static str),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
