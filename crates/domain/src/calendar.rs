use chrono::{Datelike, Duration, Local, NaiveDate};

/// Canonical date form used throughout storage and aggregation.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const MONTH_FORMAT_LEN: usize = 7;
const DATE_FORMAT_LEN: usize = 10;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DateError {
    #[error("Date must have the form YYYY-MM-DD ({0:?})")]
    InvalidDate(String),
    #[error("Month must have the form YYYY-MM ({0:?})")]
    InvalidMonth(String),
    #[error("Date outside of supported range")]
    OutOfRange,
}

#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Convert a date into its canonical `YYYY-MM-DD` form.
///
/// The conversion uses local calendar components only and never passes
/// through a UTC-normalized representation.
#[must_use]
pub fn date_string(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date_string(value: &str) -> Result<NaiveDate, DateError> {
    if value.len() != DATE_FORMAT_LEN {
        return Err(DateError::InvalidDate(value.to_string()));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| DateError::InvalidDate(value.to_string()))
}

/// Add `days` to a canonical date string, correctly crossing month, year and
/// leap-year boundaries. Negative values subtract.
pub fn add_days(date: &str, days: i64) -> Result<String, DateError> {
    parse_date_string(date)?
        .checked_add_signed(Duration::days(days))
        .map(date_string)
        .ok_or(DateError::OutOfRange)
}

/// Resolve an optional date parameter, falling back to today for missing or
/// malformed input.
#[must_use]
pub fn parse_date_param(param: Option<&str>) -> NaiveDate {
    match param {
        Some(value) => parse_date_string(value).unwrap_or_else(|_| today()),
        None => today(),
    }
}

#[must_use]
pub fn is_today(date: &str) -> bool {
    date == date_string(today())
}

#[must_use]
pub fn is_same_date(a: &str, b: &str) -> bool {
    a == b
}

/// Locale-style human form of a canonical date, e.g. "Wed, Jan 28, 2026".
/// For presentation only.
#[must_use]
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%a, %b %-d, %Y").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn dates(self) -> impl Iterator<Item = NaiveDate> {
        self.start
            .iter_days()
            .take_while(move |date| *date <= self.end)
    }
}

/// Full-month-inclusive range spanning `buffer_months` before and after the
/// given `YYYY-MM` month.
pub fn calendar_date_range(month: &str, buffer_months: u32) -> Result<DateRange, DateError> {
    if month.len() != MONTH_FORMAT_LEN {
        return Err(DateError::InvalidMonth(month.to_string()));
    }
    let first_of_month = NaiveDate::parse_from_str(&format!("{month}-01"), DATE_FORMAT)
        .map_err(|_| DateError::InvalidMonth(month.to_string()))?;
    let buffer = i32::try_from(buffer_months).map_err(|_| DateError::OutOfRange)?;
    let start = shift_month(first_of_month, -buffer).ok_or(DateError::OutOfRange)?;
    let end = shift_month(first_of_month, buffer + 1)
        .and_then(|date| date.pred_opt())
        .ok_or(DateError::OutOfRange)?;
    Ok(DateRange { start, end })
}

fn shift_month(first_of_month: NaiveDate, months: i32) -> Option<NaiveDate> {
    let total = first_of_month.year() * 12 + i32::try_from(first_of_month.month0()).ok()? + months;
    NaiveDate::from_ymd_opt(
        total.div_euclid(12),
        u32::try_from(total.rem_euclid(12)).ok()? + 1,
        1,
    )
}
