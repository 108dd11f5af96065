use crate::service::ReportError;
use chrono::{DateTime, Datelike, Month, Months, NaiveDate, NaiveTime, TimeDelta, Utc};

pub const MIN_YEAR: i32 = 1900;
/// How far past the current year a report may be requested.
pub const MAX_YEARS_AHEAD: i32 = 10;

/// A calendar month in UTC as a closed interval: `end` is one second before
/// the first instant of the following month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

pub fn compute_month_range(year: i32, month: i32) -> Result<MonthRange, ReportError> {
    compute_month_range_at(year, month, Utc::now().year())
}

/// Same as `compute_month_range` with the current year supplied by the caller.
pub fn compute_month_range_at(
    year: i32,
    month: i32,
    current_year: i32,
) -> Result<MonthRange, ReportError> {
    let max = current_year + MAX_YEARS_AHEAD;
    if year < MIN_YEAR || year > max {
        return Err(ReportError::InvalidYear { year, max });
    }
    if !(1..=12).contains(&month) {
        return Err(ReportError::InvalidMonth(month));
    }

    let first_day =
        NaiveDate::from_ymd_opt(year, month as u32, 1).ok_or(ReportError::InvalidMonth(month))?;
    let next_first_day = first_day
        .checked_add_months(Months::new(1))
        .ok_or(ReportError::InvalidYear { year, max })?;

    let start = first_day.and_time(NaiveTime::MIN).and_utc();
    let end = next_first_day.and_time(NaiveTime::MIN).and_utc() - TimeDelta::seconds(1);

    Ok(MonthRange { start, end })
}

/// English month name for 1..=12.
pub fn month_label(month: u32) -> Option<&'static str> {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
}
