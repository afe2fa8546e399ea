//! Day-first date parsing and day-gap arithmetic (pure, no I/O).

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use crate::sheet::Cell;

const DAY_SECS: i64 = 86_400;

/// Day-first formats tried in order; a time suffix is optional on each.
const DAY_FIRST_DATES: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d/%m/%y"];
const TIME_SUFFIXES: &[&str] = &["%H:%M:%S", "%H:%M"];
const ISO_DATETIMES: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Interpret a cell as a date. Anything that is not a native date or a
/// recognisable day-first / ISO string yields `None`.
pub fn parse_cell(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Text(s) => parse_day_first(s),
        Cell::Empty | Cell::Number(_) | Cell::Bool(_) => None,
    }
}

/// Parse a text date with the day-first convention.
pub fn parse_day_first(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    // `%Y` happily reads "25" as year 25; such hits fall through to `%y`.
    for date_fmt in DAY_FIRST_DATES {
        if let Ok(d) = NaiveDate::parse_from_str(value, date_fmt) {
            if d.year() >= 100 {
                return Some(d.and_time(NaiveTime::MIN));
            }
        }
        for time_fmt in TIME_SUFFIXES {
            let fmt = format!("{} {}", date_fmt, time_fmt);
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, &fmt) {
                if dt.year() >= 100 {
                    return Some(dt);
                }
            }
        }
    }

    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(d.and_time(NaiveTime::MIN));
    }
    ISO_DATETIMES
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Whole days from `from` to `to`, floored (a 36-hour span is 1, minus 36
/// hours is -2). `None` if either side is missing.
pub fn days_between(from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Option<i64> {
    let (from, to) = (from?, to?);
    Some((to - from).num_seconds().div_euclid(DAY_SECS))
}

/// The later of two optional dates; whichever is present if only one is.
pub fn later_of(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Latest non-null date of a set; `None` if all are missing.
pub fn latest<I>(dates: I) -> Option<NaiveDateTime>
where
    I: IntoIterator<Item = Option<NaiveDateTime>>,
{
    dates.into_iter().flatten().max()
}

/// Render as `dd/mm/yyyy` for tables and documents.
pub fn format_br(date: Option<NaiveDateTime>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .expect("valid date")
        .and_time(NaiveTime::MIN)
}
