use std::{
    env::current_dir,
    fs::{read_to_string, write},
    path::PathBuf,
};

use anyhow::{anyhow, Result};
use chrono::{Datelike, Local, Months, NaiveDate};
use clap::Parser;
use log::info;
use mkg_core::{
    holiday::HolidayRecord,
    holiday_client,
    ical::generator::Emitter,
    request::{CalendarRequest, TimeType},
    winter::WinterConfig,
};

#[derive(Debug, Parser)]
#[command(about = "Create an iCalendar file with weekly waste collection dates")]
pub struct Arguments {
    /// the pickup weekday, one of SU, MO, TU, WE, TH, FR, SA
    pub pickup_day: String,
    /// the event name, e.g. Restmüll
    #[arg(long, default_value = "Müllabfuhr")]
    pub name: String,
    /// the country to fetch the holidays for
    #[arg(long, default_value = "at")]
    pub country: String,
    /// the region to fetch the holidays for, e.g. AT-9 or DE-BW
    #[arg(long)]
    pub region: Option<String>,
    /// read the holidays from an iCalendar file instead of fetching them
    #[arg(long)]
    pub holidays: Option<PathBuf>,
    /// the first day, defaults to today
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// the last day, defaults to one year after the first day
    #[arg(long)]
    pub end: Option<NaiveDate>,
    /// the pickup time as HH:MM, the event lasts one hour
    #[arg(long, conflicts_with_all = ["from", "until"])]
    pub time: Option<String>,
    /// the start of the pickup time range as HH:MM
    #[arg(long, requires = "until")]
    pub from: Option<String>,
    /// the end of the pickup time range as HH:MM
    #[arg(long, requires = "from")]
    pub until: Option<String>,
    /// remind this many hours before the pickup
    #[arg(long)]
    pub reminder: Option<u32>,
    /// collect organic waste only every second week in winter
    #[arg(long)]
    pub organic: bool,
    /// the first day of winter as MM-DD
    #[arg(long, default_value = "10-01")]
    pub winter_start: String,
    /// the last day of winter as MM-DD
    #[arg(long, default_value = "03-31")]
    pub winter_end: String,
    /// print the dates instead of writing a file
    #[arg(long)]
    pub preview: bool,
    /// the file to write
    #[arg(long, short, default_value = "muellkalender.ics")]
    pub output: PathBuf,
}

impl Arguments {
    fn date_range(&self) -> (NaiveDate, NaiveDate) {
        let start = self.start.unwrap_or_else(|| Local::now().date_naive());
        let end = self
            .end
            .or_else(|| start.checked_add_months(Months::new(12)))
            .unwrap_or(start);
        (start, end)
    }

    fn calendar_request(&self, holidays: Vec<HolidayRecord>) -> Result<CalendarRequest> {
        let (start, end) = self.date_range();
        let mut request = CalendarRequest::new(&self.pickup_day, &self.name, holidays);
        request.start_date = Some(start);
        request.end_date = Some(end);
        request.reminder = self.reminder;
        if let Some(time) = &self.time {
            request.time_type = TimeType::Specific;
            request.specific_time = time.clone();
        }
        if let (Some(from), Some(until)) = (&self.from, &self.until) {
            request.time_type = TimeType::Range;
            request.start_time = from.clone();
            request.end_time = until.clone();
        }
        if self.organic {
            let (start_month, start_day) = parse_month_day(&self.winter_start)?;
            let (end_month, end_day) = parse_month_day(&self.winter_end)?;
            request.organic_waste = true;
            request.set_winter_config(WinterConfig {
                start_month,
                start_day,
                end_month,
                end_day,
            });
        }
        Ok(request)
    }
}

/// Parse a `MM-DD` month and day.
fn parse_month_day(value: &str) -> Result<(u32, u32)> {
    let (month, day) = value
        .split_once('-')
        .ok_or_else(|| anyhow!("\"{value}\" is not of the form MM-DD"))?;
    Ok((month.trim().parse()?, day.trim().parse()?))
}

/// Read the holidays from the given file or fetch them for every year in the date range.
async fn get_holidays(args: &Arguments) -> Result<Vec<HolidayRecord>> {
    if let Some(path) = &args.holidays {
        return holiday_client::parse_ics(&read_to_string(path)?);
    }
    let (start, end) = args.date_range();
    let mut holidays = vec![];
    for year in start.year()..=end.year() {
        holidays.extend(holiday_client::get(&args.country, args.region.as_deref(), year).await?);
    }
    Ok(holidays)
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    let args = Arguments::parse();
    let holidays = get_holidays(&args).await?;
    let validated = args.calendar_request(holidays)?.validate()?;
    if args.preview {
        for row in validated.preview()? {
            println!("{row}");
        }
        return Ok(());
    }
    let calendar = validated.calendar()?;
    let mut path = current_dir()?;
    path.push(&args.output);
    write(&path, calendar.generate())?;
    info!("wrote {} events to {}", calendar.events.len(), path.display());
    Ok(())
}
