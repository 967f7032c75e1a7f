//! Materialize resolved pickups as an iCalendar.

use ical::{
    generator::{IcalCalendar, IcalCalendarBuilder, IcalEvent, IcalEventBuilder, Property},
    ical_property,
    parser::ical::component::IcalAlarm,
};
use regex::Regex;

use crate::resolver::ScheduleEvent;

static PROD_ID: &str = "-//Müllkalender//Abfuhrtermine";
static CALENDAR_NAME: &str = "Müllkalender";
static TIMEZONE: &str = "Europe/Berlin";
static DATE_FORMAT: &str = "%Y%m%d";
static DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Everything about the calendar file which is not a pickup date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarOptions {
    pub name: String,
    pub event_name: String,
    /// Hours before the start of an event to show a reminder, `0` for none.
    pub reminder_hours: u32,
    pub timezone: String,
}

impl CalendarOptions {
    pub fn new(event_name: &str) -> Self {
        CalendarOptions {
            name: String::from(CALENDAR_NAME),
            event_name: String::from(event_name),
            reminder_hours: 0,
            timezone: String::from(TIMEZONE),
        }
    }

    pub fn with_reminder(mut self, reminder_hours: Option<u32>) -> Self {
        self.reminder_hours = reminder_hours.unwrap_or(0);
        self
    }
}

/// Build the calendar holding one event per resolved pickup.
pub fn build(events: &[ScheduleEvent], options: &CalendarOptions) -> IcalCalendar {
    let changed = chrono::Local::now().format(DATE_TIME_FORMAT).to_string();
    let mut calendar = IcalCalendarBuilder::version("2.0")
        .gregorian()
        .prodid(PROD_ID)
        .build();
    calendar
        .properties
        .push(ical_property!("X-WR-CALNAME", escape_text(&options.name)));
    for event in events {
        calendar.events.push(get_event(event, options, &changed));
    }
    calendar
}

/// Build the event of a single pickup.
fn get_event(event: &ScheduleEvent, options: &CalendarOptions, changed: &str) -> IcalEvent {
    let mut description = format!("Müllabfuhr-Termin für {}", options.event_name);
    if let Some(reason) = &event.shift_reason {
        description.push_str(&format!(" ({reason})"));
    }
    let properties = [
        ical_property!("SUMMARY", escape_text(&options.event_name)),
        ical_property!("DESCRIPTION", escape_text(&description)),
        ical_property!("TRANSP", "TRANSPARENT"),
    ];
    let builder = IcalEventBuilder::tzid(options.timezone.as_str())
        .uid(uid(&options.event_name, event))
        .changed(changed);
    let mut ical_event = match event.time_of_day.bounds(event.effective_date) {
        None => properties
            .into_iter()
            .fold(
                builder.one_day(event.effective_date.format(DATE_FORMAT).to_string()),
                |builder, property| builder.set(property),
            )
            .build(),
        Some((start, end)) => properties
            .into_iter()
            .fold(
                builder
                    .start(start.format(DATE_TIME_FORMAT).to_string())
                    .end(end.format(DATE_TIME_FORMAT).to_string()),
                |builder, property| builder.set(property),
            )
            .build(),
    };
    if options.reminder_hours > 0 {
        ical_event.alarms.push(get_alarm(options));
    }
    ical_event
}

/// A display alarm `reminder_hours` before the start of the event.
///
/// All-day events start at midnight, so the reminder fires on the evening before.
fn get_alarm(options: &CalendarOptions) -> IcalAlarm {
    let mut alarm = IcalAlarm::new();
    alarm.properties.extend([
        ical_property!("ACTION", "DISPLAY"),
        ical_property!("TRIGGER", format!("-PT{}H", options.reminder_hours)),
        ical_property!(
            "DESCRIPTION",
            escape_text(&format!("Erinnerung: {}", options.event_name))
        ),
    ]);
    alarm
}

/// Get a unique id for the pickup of a waste type on its effective date.
///
/// Calendar clients match updated events by this id, keep it stable.
fn uid(event_name: &str, event: &ScheduleEvent) -> String {
    let whitespace_regex = Regex::new(r"\s+").unwrap();
    let event_name = whitespace_regex.replace_all(event_name.trim(), "-");
    format!(
        "muellkalender-{}_{event_name}@muellkalender",
        event.effective_date.format(DATE_FORMAT)
    )
}

/// Escape a TEXT value as required by RFC 5545.
fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}
