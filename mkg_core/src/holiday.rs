//! Holidays as supplied by a holiday source and the date-keyed set the resolver looks them up in.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single public holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayRecord {
    pub date: NaiveDate,
    pub name: String,
    #[serde(default)]
    pub country_code: String,
}

impl HolidayRecord {
    pub fn new(date: NaiveDate, name: &str, country_code: &str) -> Self {
        HolidayRecord {
            date,
            name: String::from(name),
            country_code: String::from(country_code),
        }
    }
}

/// Holidays keyed by date.
///
/// Several holidays on the same date count as one holiday whose name lists all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidaySet {
    names: BTreeMap<NaiveDate, Vec<String>>,
}

impl HolidaySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: NaiveDate, name: &str) {
        let names = self.names.entry(date).or_default();
        if !names.iter().any(|existing| existing == name) {
            names.push(String::from(name));
        }
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.names.contains_key(&date)
    }

    /// The display name of the holiday on `date`.
    pub fn name(&self, date: NaiveDate) -> Option<String> {
        self.names.get(&date).map(|names| names.join(", "))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over the holiday dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.names.keys().copied()
    }
}

impl<'a> FromIterator<&'a HolidayRecord> for HolidaySet {
    fn from_iter<I: IntoIterator<Item = &'a HolidayRecord>>(records: I) -> Self {
        let mut holiday_set = HolidaySet::new();
        for record in records {
            holiday_set.insert(record.date, &record.name);
        }
        holiday_set
    }
}

impl FromIterator<HolidayRecord> for HolidaySet {
    fn from_iter<I: IntoIterator<Item = HolidayRecord>>(records: I) -> Self {
        let mut holiday_set = HolidaySet::new();
        for record in records {
            holiday_set.insert(record.date, &record.name);
        }
        holiday_set
    }
}
