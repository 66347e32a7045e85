use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// One side of a reporting date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    /// No constraint on this side.
    Unbounded,
    /// Exclusive bound: a timestamp equal to it is outside the window.
    At(DateTime<Utc>),
    /// The raw value could not be read as a date; nothing satisfies it.
    Unsatisfiable,
}

impl DateBound {
    /// Reads a bound from a query parameter. A missing value, an empty
    /// string and the literal `"undefined"` all mean "no bound".
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some("undefined") => DateBound::Unbounded,
            Some(value) => match parse_timestamp(value) {
                Some(ts) => DateBound::At(ts),
                None => DateBound::Unsatisfiable,
            },
        }
    }
}

/// Zone-less date-time layouts, read as UTC. Seconds are optional.
const NAIVE_DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Accepts RFC 3339, a zone-less date-time (`T` or space separated, read as
/// UTC), or a calendar date truncated to `YYYY-MM-DD`, `YYYY-MM` or `YYYY`
/// (UTC midnight at the start of that day, month or year).
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return Some(naive.and_utc());
    }
    parse_calendar_date(value)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let is_year = |s: &str| s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit());
    match value.len() {
        10 => NaiveDate::parse_from_str(value, "%Y-%m-%d").ok(),
        7 if value.get(..4).is_some_and(is_year) => {
            NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").ok()
        }
        4 if is_year(value) => NaiveDate::parse_from_str(&format!("{value}-01-01"), "%Y-%m-%d").ok(),
        _ => None,
    }
}

/// Open interval `(start, end)` over an order's `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateBound,
    pub end: DateBound,
}

impl DateWindow {
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Self {
        Self {
            start: DateBound::parse(start),
            end: DateBound::parse(end),
        }
    }

    pub const fn unbounded() -> Self {
        Self {
            start: DateBound::Unbounded,
            end: DateBound::Unbounded,
        }
    }

    /// The `(after, before)` limits a query has to apply, or `None` when no
    /// timestamp can fall inside the window.
    pub fn limits(&self) -> Option<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
        let side = |bound: DateBound| match bound {
            DateBound::Unbounded => Some(None),
            DateBound::At(ts) => Some(Some(ts)),
            DateBound::Unsatisfiable => None,
        };
        Some((side(self.start)?, side(self.end)?))
    }

    pub fn is_satisfiable(&self) -> bool {
        self.limits().is_some()
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        match self.limits() {
            Some((after, before)) => {
                after.map_or(true, |a| ts > a) && before.map_or(true, |b| ts < b)
            }
            None => false,
        }
    }
}

impl Default for DateWindow {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Sales over a date window: the number of line items sold and their value.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesReport {
    pub total_items: i64,
    pub total: BigDecimal,
}
