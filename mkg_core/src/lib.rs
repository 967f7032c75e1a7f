//! This crate computes recurring waste collection dates and serves them as iCalendar events.
//!
//! Pickups follow a weekly recurrence on one weekday. They are moved off public holidays,
//! skip every second week inside the winter windows for organic waste, and are finally
//! materialized into an iCalendar file.

pub use ical;

pub mod calendar;
pub mod error;
pub mod holiday;
pub mod holiday_client;
pub mod preview;
pub mod request;
pub mod resolver;
pub mod time_spec;
pub mod weekday;
pub mod winter;
