//! The schedule resolver turns a weekly pickup day into the dates pickups actually take place.
//!
//! Resolution runs in three steps over the same date iteration:
//! 1. enumerate every occurrence of the pickup weekday in the date range,
//! 2. drop every second occurrence inside a winter window (organic waste only),
//! 3. move the remaining occurrences off holidays.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use log::debug;
use serde::Serialize;

use crate::{
    error::Result,
    holiday::HolidaySet,
    time_spec::TimeSpec,
    weekday::{self, is_workday},
    winter::{WinterCadence, WinterConfig},
};

/// Every occurrence of one weekday between two dates, both inclusive.
///
/// Cloning the iterator before use gives another pass over the same dates.
#[derive(Debug, Clone)]
pub struct WeeklyOccurrences {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl WeeklyOccurrences {
    pub fn new(start: NaiveDate, end: NaiveDate, weekday: Weekday) -> Self {
        WeeklyOccurrences {
            next: weekday::first_on_or_after(start, weekday),
            end,
        }
    }
}

impl Iterator for WeeklyOccurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|date| *date <= self.end)?;
        self.next = current.checked_add_signed(Duration::weeks(1));
        Some(current)
    }
}

/// Enumerate the occurrences of the weekday with the Sunday-based index `weekday_index`.
pub fn enumerate(
    start: NaiveDate,
    end: NaiveDate,
    weekday_index: u8,
) -> Result<WeeklyOccurrences> {
    Ok(WeeklyOccurrences::new(
        start,
        end,
        weekday::from_index(weekday_index)?,
    ))
}

/// Where a single pickup ends up after looking at the holidays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shift {
    pub effective_date: NaiveDate,
    /// Set if and only if the pickup was moved.
    pub reason: Option<String>,
}

impl Shift {
    fn unshifted(date: NaiveDate) -> Self {
        Shift {
            effective_date: date,
            reason: None,
        }
    }

    fn shifted(date: NaiveDate, reason: String) -> Self {
        Shift {
            effective_date: date,
            reason: Some(reason),
        }
    }

    pub fn is_shifted(&self) -> bool {
        self.reason.is_some()
    }
}

/// Move the pickup planned for `nominal` off holidays.
///
/// The rules in order of precedence:
/// 1. December 25th, 26th and 27th always move one day later.
/// 2. A holiday on a workday moves the pickup one day later.
/// 3. A holiday on an earlier workday of the same week (Monday based) moves it one day later,
///    December 25th excluded.
///
/// After a move by rule 2 or 3 the new date is checked once more: if it is a holiday as well the
/// pickup moves another day, and if that lands on a Sunday it moves on to Monday. Longer runs
/// of holidays are not followed any further.
pub fn resolve_shift(nominal: NaiveDate, holidays: &HolidaySet) -> Shift {
    if let Some(shift) = christmas_shift(nominal, holidays) {
        return shift;
    }
    if let Some(name) = holidays.name(nominal) {
        if !is_workday(nominal.weekday()) {
            return Shift::unshifted(nominal);
        }
        return cascade(nominal, format!("Verschoben wegen Feiertag: {name}"), holidays);
    }
    let names = earlier_in_week(nominal)
        .filter(|date| is_workday(date.weekday()) && !is_christmas_day(*date))
        .filter_map(|date| holidays.name(date))
        .collect::<Vec<String>>();
    if names.is_empty() {
        return Shift::unshifted(nominal);
    }
    cascade(
        nominal,
        format!(
            "Verschoben wegen Feiertag in dieser Woche: {}",
            names.join(", ")
        ),
        holidays,
    )
}

/// The fixed December exceptions around Christmas.
fn christmas_shift(nominal: NaiveDate, holidays: &HolidaySet) -> Option<Shift> {
    if nominal.month() != 12 {
        return None;
    }
    let reason = match (nominal.day(), holidays.name(nominal)) {
        (25, Some(name)) => format!("Keine Abholung am 25. Dezember ({name})"),
        (25, None) => String::from("Keine Abholung am 25. Dezember"),
        (26 | 27, Some(name)) => format!("Verschoben wegen Weihnachtszeit ({name})"),
        (26 | 27, None) => String::from("Verschoben wegen Weihnachtszeit"),
        _ => return None,
    };
    Some(Shift::shifted(next_day(nominal), reason))
}

fn cascade(nominal: NaiveDate, mut reason: String, holidays: &HolidaySet) -> Shift {
    let mut effective_date = next_day(nominal);
    if let Some(name) = holidays.name(effective_date) {
        reason.push_str(&format!(" und {name}"));
        effective_date = next_day(effective_date);
        if effective_date.weekday() == Weekday::Sun {
            effective_date = next_day(effective_date);
            reason.push_str(" (Sonntag übersprungen)");
        }
    }
    Shift::shifted(effective_date, reason)
}

/// The days from Monday of the week of `date` up to the day before `date`.
fn earlier_in_week(date: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let days_from_monday = date.weekday().num_days_from_monday() as i64;
    (1..=days_from_monday)
        .rev()
        .filter_map(move |days| date.checked_sub_signed(Duration::days(days)))
}

fn is_christmas_day(date: NaiveDate) -> bool {
    date.month() == 12 && date.day() == 25
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

/// One resolved pickup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEvent {
    pub nominal_date: NaiveDate,
    pub effective_date: NaiveDate,
    pub is_shifted: bool,
    pub shift_reason: Option<String>,
    pub time_of_day: TimeSpec,
}

/// All inputs of one resolution run.
#[derive(Debug, Clone)]
pub struct Resolver {
    pub weekday: Weekday,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub holidays: HolidaySet,
    /// The winter cadence, only set for organic waste.
    pub winter: Option<WinterConfig>,
    pub time_of_day: TimeSpec,
}

impl Resolver {
    pub fn new(weekday: Weekday, start: NaiveDate, end: NaiveDate, holidays: HolidaySet) -> Self {
        Resolver {
            weekday,
            start,
            end,
            holidays,
            winter: None,
            time_of_day: TimeSpec::AllDay,
        }
    }

    pub fn with_winter(mut self, winter: WinterConfig) -> Self {
        self.winter = Some(winter);
        self
    }

    pub fn with_time_of_day(mut self, time_of_day: TimeSpec) -> Self {
        self.time_of_day = time_of_day;
        self
    }

    pub fn occurrences(&self) -> WeeklyOccurrences {
        WeeklyOccurrences::new(self.start, self.end, self.weekday)
    }

    /// Resolve all pickups in the date range, in chronological order of their nominal dates.
    pub fn resolve(&self) -> Result<Vec<ScheduleEvent>> {
        let mut winter_cadence = self
            .winter
            .map(|config| WinterCadence::new(config, self.weekday))
            .transpose()?;
        let mut events = vec![];
        for nominal_date in self.occurrences() {
            if let Some(winter_cadence) = winter_cadence.as_mut() {
                if winter_cadence.should_skip(nominal_date)? {
                    debug!("skipping {nominal_date}, winter cadence");
                    continue;
                }
            }
            let shift = resolve_shift(nominal_date, &self.holidays);
            if let Some(reason) = &shift.reason {
                debug!("moving {nominal_date} to {}: {reason}", shift.effective_date);
            }
            events.push(ScheduleEvent {
                nominal_date,
                effective_date: shift.effective_date,
                is_shifted: shift.is_shifted(),
                shift_reason: shift.reason,
                time_of_day: self.time_of_day,
            });
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{Datelike, Duration, NaiveDate, Weekday};
    use proptest::prelude::*;

    use crate::{
        error::ScheduleError,
        holiday::{HolidayRecord, HolidaySet},
        resolver::{enumerate, resolve_shift, Resolver, WeeklyOccurrences},
        weekday::is_workday,
        winter::WinterConfig,
    };

    fn date(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    fn holidays(entries: &[(&str, &str)]) -> HolidaySet {
        entries
            .iter()
            .map(|(day, name)| HolidayRecord::new(date(day), name, "DE"))
            .collect()
    }

    fn resolver(weekday: Weekday, start: &str, end: &str, holiday_set: HolidaySet) -> Resolver {
        Resolver::new(weekday, date(start), date(end), holiday_set)
    }

    fn effective(nominal: &str, holiday_set: &HolidaySet) -> NaiveDate {
        resolve_shift(date(nominal), holiday_set).effective_date
    }

    #[test]
    fn test_enumerate() {
        let dates: Vec<NaiveDate> = enumerate(date("2024-01-03"), date("2024-01-31"), 1)
            .unwrap()
            .collect();
        assert_eq!(
            dates,
            vec![
                date("2024-01-08"),
                date("2024-01-15"),
                date("2024-01-22"),
                date("2024-01-29")
            ]
        );
        // the end is inclusive
        let dates: Vec<NaiveDate> = enumerate(date("2024-01-01"), date("2024-01-08"), 1)
            .unwrap()
            .collect();
        assert_eq!(dates, vec![date("2024-01-01"), date("2024-01-08")]);
        // no occurrence in range
        let dates: Vec<NaiveDate> = enumerate(date("2024-01-02"), date("2024-01-06"), 0)
            .unwrap()
            .collect();
        assert!(dates.is_empty());
        assert!(matches!(
            enumerate(date("2024-01-01"), date("2024-01-31"), 7),
            Err(ScheduleError::InvalidWeekday(_))
        ));
    }

    #[test]
    fn test_enumerate_restartable() {
        let occurrences =
            WeeklyOccurrences::new(date("2024-03-01"), date("2024-04-30"), Weekday::Fri);
        let first: Vec<NaiveDate> = occurrences.clone().collect();
        let second: Vec<NaiveDate> = occurrences.collect();
        assert_eq!(first.len(), 9);
        assert_eq!(first, second);
    }

    #[test]
    fn test_new_year_example() {
        let holiday_set = holidays(&[("2024-01-01", "Neujahr")]);
        let events = resolver(Weekday::Mon, "2024-01-01", "2024-01-31", holiday_set)
            .resolve()
            .unwrap();
        assert_eq!(events.len(), 5);
        assert_eq!(events[0].nominal_date, date("2024-01-01"));
        assert_eq!(events[0].effective_date, date("2024-01-02"));
        assert!(events[0].is_shifted);
        assert!(events[0].shift_reason.as_ref().unwrap().contains("Neujahr"));
        for (event, day) in events[1..].iter().zip(["08", "15", "22", "29"]) {
            assert_eq!(event.nominal_date, date(&format!("2024-01-{day}")));
            assert_eq!(event.effective_date, event.nominal_date);
            assert!(!event.is_shifted);
            assert_eq!(event.shift_reason, None);
        }
    }

    #[test]
    fn test_christmas_exceptions() {
        let none = HolidaySet::new();
        let christmas = holidays(&[
            ("2024-12-24", "Heiliger Abend"),
            ("2024-12-25", "Weihnachten"),
            ("2024-12-26", "Zweiter Weihnachtsfeiertag"),
        ]);
        for holiday_set in [&none, &christmas] {
            assert_eq!(effective("2024-12-25", holiday_set), date("2024-12-26"));
            assert_eq!(effective("2024-12-26", holiday_set), date("2024-12-27"));
            assert_eq!(effective("2024-12-27", holiday_set), date("2024-12-28"));
            assert!(resolve_shift(date("2024-12-25"), holiday_set).is_shifted());
        }
        // 2021-12-26 is a Sunday, still only one day later
        assert_eq!(effective("2021-12-26", &christmas), date("2021-12-27"));
        assert_eq!(effective("2024-12-28", &none), date("2024-12-28"));
    }

    #[test]
    fn test_christmas_wins_over_earlier_holiday() {
        let holiday_set = holidays(&[("2024-12-24", "Heiliger Abend")]);
        let shift = resolve_shift(date("2024-12-26"), &holiday_set);
        assert_eq!(shift.effective_date, date("2024-12-27"));
        assert!(shift.is_shifted());
    }

    #[test]
    fn test_christmas_day_does_not_move_later_pickups() {
        // 2024-12-25 is a Wednesday, 2024-12-28 the Saturday of the same week
        let holiday_set = holidays(&[("2024-12-25", "Weihnachten")]);
        let shift = resolve_shift(date("2024-12-28"), &holiday_set);
        assert_eq!(shift.effective_date, date("2024-12-28"));
        assert!(!shift.is_shifted());
    }

    #[test]
    fn test_direct_holiday() {
        let holiday_set = holidays(&[("2024-05-01", "Tag der Arbeit")]);
        let shift = resolve_shift(date("2024-05-01"), &holiday_set);
        assert_eq!(shift.effective_date, date("2024-05-02"));
        assert_eq!(
            shift.reason,
            Some(String::from("Verschoben wegen Feiertag: Tag der Arbeit"))
        );
        // the day before the holiday is unaffected
        assert_eq!(effective("2024-04-30", &holiday_set), date("2024-04-30"));
    }

    #[test]
    fn test_weekend_holiday_does_not_move() {
        let holiday_set = holidays(&[("2024-08-17", "Stadtfest"), ("2024-08-18", "Stadtfest")]);
        assert!(!resolve_shift(date("2024-08-17"), &holiday_set).is_shifted());
        assert!(!resolve_shift(date("2024-08-18"), &holiday_set).is_shifted());
    }

    #[test]
    fn test_direct_holiday_cascade() {
        let holiday_set = holidays(&[
            ("2024-05-09", "Christi Himmelfahrt"),
            ("2024-05-10", "Brückentag"),
        ]);
        let shift = resolve_shift(date("2024-05-09"), &holiday_set);
        assert_eq!(shift.effective_date, date("2024-05-11"));
        let reason = shift.reason.unwrap();
        assert!(reason.contains("Christi Himmelfahrt"));
        assert!(reason.contains("Brückentag"));
    }

    #[test]
    fn test_cascade_skips_sunday() {
        let holiday_set = holidays(&[
            ("2024-11-01", "Allerheiligen"),
            ("2024-11-02", "Allerseelen"),
        ]);
        let shift = resolve_shift(date("2024-11-01"), &holiday_set);
        assert_eq!(shift.effective_date, date("2024-11-04"));
        assert!(shift.reason.unwrap().contains("Sonntag"));
    }

    #[test]
    fn test_earlier_in_week_cascade_skips_sunday() {
        let holiday_set = holidays(&[
            ("2024-11-04", "Stadtfest"),
            ("2024-11-09", "Martinimarkt"),
        ]);
        let shift = resolve_shift(date("2024-11-08"), &holiday_set);
        assert_eq!(shift.effective_date, date("2024-11-11"));
        let reason = shift.reason.unwrap();
        assert!(reason.starts_with("Verschoben wegen Feiertag in dieser Woche: Stadtfest"));
        assert!(reason.contains("Sonntag"));
    }

    #[test]
    fn test_cascade_is_bounded() {
        let holiday_set = holidays(&[
            ("2024-05-08", "Eins"),
            ("2024-05-09", "Zwei"),
            ("2024-05-10", "Drei"),
        ]);
        assert_eq!(effective("2024-05-08", &holiday_set), date("2024-05-10"));
    }

    #[test]
    fn test_holiday_earlier_in_week() {
        let holiday_set = holidays(&[("2024-05-01", "Tag der Arbeit")]);
        let shift = resolve_shift(date("2024-05-03"), &holiday_set);
        assert_eq!(shift.effective_date, date("2024-05-04"));
        assert!(shift.reason.unwrap().contains("Tag der Arbeit"));
        assert_eq!(effective("2024-05-02", &holiday_set), date("2024-05-03"));
        // the following week starts fresh
        assert_eq!(effective("2024-05-06", &holiday_set), date("2024-05-06"));
    }

    #[test]
    fn test_holiday_earlier_in_week_cascade() {
        let holiday_set = holidays(&[
            ("2024-05-01", "Tag der Arbeit"),
            ("2024-05-03", "Brückentag"),
        ]);
        assert_eq!(effective("2024-05-02", &holiday_set), date("2024-05-04"));
    }

    #[test]
    fn test_holiday_earlier_in_week_ignores_weekend() {
        let holiday_set = holidays(&[("2024-08-17", "Stadtfest")]);
        assert!(!resolve_shift(date("2024-08-18"), &holiday_set).is_shifted());
    }

    #[test]
    fn test_holiday_in_previous_week() {
        // 2024-03-29 is Good Friday, 2024-04-01 Easter Monday
        let holiday_set = holidays(&[("2024-03-29", "Karfreitag")]);
        assert!(!resolve_shift(date("2024-04-01"), &holiday_set).is_shifted());
        assert!(!resolve_shift(date("2024-04-02"), &holiday_set).is_shifted());
    }

    #[test]
    fn test_empty_holiday_set_never_shifts() {
        let events = resolver(Weekday::Tue, "2024-01-01", "2024-11-30", HolidaySet::new())
            .resolve()
            .unwrap();
        assert_eq!(events.len(), 48);
        assert!(events.iter().all(|event| !event.is_shifted));
    }

    #[test]
    fn test_winter_cadence() {
        let events = resolver(Weekday::Wed, "2024-09-25", "2024-10-31", HolidaySet::new())
            .with_winter(WinterConfig::default())
            .resolve()
            .unwrap();
        let nominal_dates: Vec<NaiveDate> = events.iter().map(|event| event.nominal_date).collect();
        assert_eq!(
            nominal_dates,
            vec![
                date("2024-09-25"),
                date("2024-10-02"),
                date("2024-10-16"),
                date("2024-10-30")
            ]
        );
    }

    #[test]
    fn test_winter_cadence_then_shift() {
        // 2024-10-02 is kept by the cadence and moved by the holiday
        let holiday_set = holidays(&[("2024-10-02", "Feiertag")]);
        let events = resolver(Weekday::Wed, "2024-10-01", "2024-10-10", holiday_set)
            .with_winter(WinterConfig::default())
            .resolve()
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].effective_date, date("2024-10-03"));
    }

    #[test]
    fn test_malformed_winter_config_fails_without_output() {
        let config = WinterConfig {
            start_month: 4,
            start_day: 1,
            end_month: 9,
            end_day: 30,
        };
        let result = resolver(Weekday::Wed, "2024-01-01", "2024-12-31", HolidaySet::new())
            .with_winter(config)
            .resolve();
        assert!(matches!(result, Err(ScheduleError::MalformedWinterConfig(_))));
    }

    /// Whether some rule asks for the pickup on `nominal` to move.
    fn has_qualifying_holiday(nominal: NaiveDate, holiday_set: &HolidaySet) -> bool {
        if nominal.month() == 12 && (25..=27).contains(&nominal.day()) {
            return true;
        }
        if holiday_set.is_holiday(nominal) {
            return is_workday(nominal.weekday());
        }
        (1..=nominal.weekday().num_days_from_monday() as i64)
            .map(|days| nominal - Duration::days(days))
            .any(|date| {
                is_workday(date.weekday())
                    && !(date.month() == 12 && date.day() == 25)
                    && holiday_set.is_holiday(date)
            })
    }

    prop_compose! {
        fn arb_resolver()(
            start_offset in 0i64..2000,
            length in 0i64..400,
            weekday_index in 0u8..7,
            holiday_offsets in proptest::collection::vec(0i64..2400, 0..40),
            organic in any::<bool>(),
        ) -> Resolver {
            let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
            let start = base + Duration::days(start_offset);
            let holiday_set = holiday_offsets
                .iter()
                .map(|offset| HolidayRecord::new(base + Duration::days(*offset), "Feiertag", "DE"))
                .collect();
            let weekday = crate::weekday::from_index(weekday_index).unwrap();
            let end = start + Duration::days(length);
            let resolver = Resolver::new(weekday, start, end, holiday_set);
            if organic {
                resolver.with_winter(WinterConfig::default())
            } else {
                resolver
            }
        }
    }

    proptest! {
        #[test]
        fn prop_weekly_spacing_and_containment(resolver in arb_resolver()) {
            let dates: Vec<NaiveDate> = resolver.occurrences().collect();
            for pair in dates.windows(2) {
                prop_assert_eq!(pair[1] - pair[0], Duration::days(7));
            }
            for date in &dates {
                prop_assert!(resolver.start <= *date && *date <= resolver.end);
                prop_assert_eq!(date.weekday(), resolver.weekday);
            }
            if let Some(first) = dates.first() {
                prop_assert!(*first - resolver.start < Duration::days(7));
            }
            if let Some(last) = dates.last() {
                prop_assert!(*last + Duration::days(7) > resolver.end);
            }
        }

        #[test]
        fn prop_idempotent(resolver in arb_resolver()) {
            prop_assert_eq!(resolver.resolve().unwrap(), resolver.resolve().unwrap());
        }

        #[test]
        fn prop_shift_or_not(resolver in arb_resolver()) {
            for event in resolver.resolve().unwrap() {
                if event.is_shifted {
                    let reason = event.shift_reason.clone().unwrap_or_default();
                    prop_assert!(!reason.is_empty());
                    prop_assert!(event.effective_date > event.nominal_date);
                    prop_assert!(event.effective_date - event.nominal_date <= Duration::days(3));
                    prop_assert!(has_qualifying_holiday(event.nominal_date, &resolver.holidays));
                } else {
                    prop_assert_eq!(event.shift_reason, None);
                    prop_assert_eq!(event.effective_date, event.nominal_date);
                    prop_assert!(!has_qualifying_holiday(event.nominal_date, &resolver.holidays));
                }
            }
        }
    }
}
