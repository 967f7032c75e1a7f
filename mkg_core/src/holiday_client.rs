//! This client fetches public holidays or reads them from an iCalendar file.

use std::io::{BufReader, Cursor};

use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDate};
use ical::{generator::IcalEvent, IcalParser};
use log::{info, warn};
use serde::Deserialize;

use crate::holiday::HolidayRecord;

static URL: &str = "https://date.nager.at/api/v3/PublicHolidays";

/// A holiday as returned by the Nager.Date API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublicHoliday {
    date: NaiveDate,
    local_name: String,
    country_code: String,
    #[serde(default)]
    global: bool,
    #[serde(default)]
    counties: Option<Vec<String>>,
}

/// How a holiday of the built-in tables is placed in a year.
#[derive(Debug, Clone, Copy)]
enum HolidayRule {
    Fixed { month: u32, day: u32 },
    /// Days relative to Easter Sunday.
    EasterOffset(i64),
}

static HOLIDAYS_AT: [(HolidayRule, &str); 13] = [
    (HolidayRule::Fixed { month: 1, day: 1 }, "Neujahr"),
    (HolidayRule::Fixed { month: 1, day: 6 }, "Heilige Drei Könige"),
    (HolidayRule::EasterOffset(1), "Ostermontag"),
    (HolidayRule::Fixed { month: 5, day: 1 }, "Staatsfeiertag"),
    (HolidayRule::EasterOffset(39), "Christi Himmelfahrt"),
    (HolidayRule::EasterOffset(50), "Pfingstmontag"),
    (HolidayRule::EasterOffset(60), "Fronleichnam"),
    (HolidayRule::Fixed { month: 8, day: 15 }, "Mariä Himmelfahrt"),
    (HolidayRule::Fixed { month: 10, day: 26 }, "Nationalfeiertag"),
    (HolidayRule::Fixed { month: 11, day: 1 }, "Allerheiligen"),
    (HolidayRule::Fixed { month: 12, day: 8 }, "Mariä Empfängnis"),
    (HolidayRule::Fixed { month: 12, day: 25 }, "Christtag"),
    (HolidayRule::Fixed { month: 12, day: 26 }, "Stefanitag"),
];

static HOLIDAYS_DE: [(HolidayRule, &str); 9] = [
    (HolidayRule::Fixed { month: 1, day: 1 }, "Neujahr"),
    (HolidayRule::EasterOffset(-2), "Karfreitag"),
    (HolidayRule::EasterOffset(1), "Ostermontag"),
    (HolidayRule::Fixed { month: 5, day: 1 }, "Tag der Arbeit"),
    (HolidayRule::EasterOffset(39), "Christi Himmelfahrt"),
    (HolidayRule::EasterOffset(50), "Pfingstmontag"),
    (HolidayRule::Fixed { month: 10, day: 3 }, "Tag der Deutschen Einheit"),
    (HolidayRule::Fixed { month: 12, day: 25 }, "Erster Weihnachtstag"),
    (HolidayRule::Fixed { month: 12, day: 26 }, "Zweiter Weihnachtsfeiertag"),
];

/// Get the public holidays of a country, or one of its regions, in a year.
///
/// `region` is an ISO 3166-2 code like `AT-9` or `DE-BW`. Without a region only nationwide
/// holidays are returned, except for Austria which defaults to Vienna.
/// If the holiday API cannot be reached the built-in holidays of Austria and Germany are used.
pub async fn get(country: &str, region: Option<&str>, year: i32) -> Result<Vec<HolidayRecord>> {
    let country = country.trim().to_ascii_uppercase();
    let region = region
        .map(|region| region.trim().to_ascii_uppercase())
        .filter(|region| !region.is_empty() && *region != country)
        .or_else(|| default_region(&country));
    match get_response(&country, year).await {
        Ok(public_holidays) => {
            let holidays = filter_region(public_holidays, region.as_deref());
            info!(
                "fetched {} holidays for {country} {} in {year}",
                holidays.len(),
                region.as_deref().unwrap_or("")
            );
            Ok(holidays)
        }
        Err(err) => {
            warn!("fetching holidays for {country} in {year} failed: {err}");
            fallback(&country, year).ok_or(err)
        }
    }
}

/// Get the holidays from the Nager.Date API.
async fn get_response(country: &str, year: i32) -> Result<Vec<PublicHoliday>> {
    let client = reqwest::Client::new();
    let public_holidays = client
        .get(format!("{URL}/{year}/{country}"))
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<PublicHoliday>>()
        .await?;
    Ok(public_holidays)
}

fn default_region(country: &str) -> Option<String> {
    match country {
        "AT" => Some(String::from("AT-9")),
        _ => None,
    }
}

/// Keep the nationwide holidays and those of `region`.
fn filter_region(public_holidays: Vec<PublicHoliday>, region: Option<&str>) -> Vec<HolidayRecord> {
    public_holidays
        .into_iter()
        .filter(|public_holiday| {
            public_holiday.global
                || match (region, &public_holiday.counties) {
                    (Some(region), Some(counties)) => {
                        counties.iter().any(|county| county == region)
                    }
                    _ => false,
                }
        })
        .map(|public_holiday| HolidayRecord {
            date: public_holiday.date,
            name: public_holiday.local_name,
            country_code: public_holiday.country_code,
        })
        .collect()
}

/// The nationwide holidays of the built-in tables.
fn fallback(country: &str, year: i32) -> Option<Vec<HolidayRecord>> {
    let table: &[(HolidayRule, &str)] = match country {
        "AT" => &HOLIDAYS_AT,
        "DE" => &HOLIDAYS_DE,
        _ => return None,
    };
    let easter = computus::gregorian(year).ok()?;
    let easter = NaiveDate::from_ymd_opt(easter.year, easter.month, easter.day)?;
    let mut holidays = table
        .iter()
        .filter_map(|(rule, name)| {
            let date = match *rule {
                HolidayRule::Fixed { month, day } => NaiveDate::from_ymd_opt(year, month, day)?,
                HolidayRule::EasterOffset(days) => easter.checked_add_signed(Duration::days(days))?,
            };
            Some(HolidayRecord::new(date, name, country))
        })
        .collect::<Vec<HolidayRecord>>();
    holidays.sort_by_key(|holiday| holiday.date);
    info!("using {} built-in holidays for {country} in {year}", holidays.len());
    Some(holidays)
}

trait GetIcalProperty {
    fn get_ical_property_value(&self, name: &str) -> Option<&String>;
}

impl GetIcalProperty for IcalEvent {
    fn get_ical_property_value(&self, name: &str) -> Option<&String> {
        self.properties
            .iter()
            .find(|property| property.name == name)
            .and_then(|property| property.value.as_ref())
    }
}

/// Parse an iCalendar file to extract holidays.
///
/// Every event with a `SUMMARY` and a `DTSTART` counts as a holiday on the start date.
pub fn parse_ics(ics: &str) -> Result<Vec<HolidayRecord>> {
    let parser = IcalParser::new(BufReader::new(Cursor::new(ics)));
    let mut holidays: Vec<HolidayRecord> = vec![];
    for ical_calendar_result in parser {
        let ical_calendar = ical_calendar_result?;
        for ical_event in ical_calendar.events {
            let summary_option = ical_event.get_ical_property_value("SUMMARY");
            let date_option = ical_event
                .get_ical_property_value("DTSTART")
                .and_then(|dt_start| {
                    NaiveDate::from_ymd_opt(
                        dt_start.get(0..4)?.parse().ok()?,
                        dt_start.get(4..6)?.parse().ok()?,
                        dt_start.get(6..8)?.parse().ok()?,
                    )
                });
            let (Some(summary), Some(date)) = (summary_option, date_option) else {
                continue;
            };
            holidays.push(HolidayRecord::new(date, summary.trim(), ""));
        }
    }
    if holidays.is_empty() {
        return Err(anyhow!("Die Kalenderdatei enthält keine Termine"));
    }
    Ok(holidays)
}
