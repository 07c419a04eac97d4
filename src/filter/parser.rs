use super::error::DateRangeError;
use crate::format::{DateFormat, DisplayFormat};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

/// Separator written between the two dates of a range state
pub const RANGE_SEPARATOR: &str = "-";

/// Upper bound on how far a day boundary is moved to escape a DST gap
const MAX_GAP_STEPS: i32 = 4 * 24;

/// A submitted range state split into its start and end tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSelection<'a> {
    pub start: &'a str,
    pub end: &'a str,
}

impl<'a> RangeSelection<'a> {
    /// Split a raw `"<start> - <end>"` state on single spaces.
    ///
    /// Anything other than exactly three tokens is not a selection. The middle
    /// token is not inspected.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let tokens: Vec<&str> = raw.split(' ').collect();
        match tokens[..] {
            [start, _, end] => Some(Self { start, end }),
            _ => {
                debug!(state = raw, tokens = tokens.len(), "range state is not a selection");
                None
            }
        }
    }

    /// Parse both tokens with `format` and widen them to whole days in `tz`
    pub fn resolve(&self, format: &DateFormat, tz: Tz) -> Result<DateBounds, DateRangeError> {
        let start = format.parse_date(self.start)?;
        let end = format.parse_date(self.end)?;
        DateBounds::for_dates(start, end, tz)
    }
}

/// Build the state string for a pair of already formatted dates
pub fn format_selection(start: &str, end: &str) -> String {
    format!("{start} {RANGE_SEPARATOR} {end}")
}

/// The two instants a range predicate is built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateBounds {
    /// First instant of the start day
    pub from: DateTime<Tz>,
    /// Last instant of the end day
    pub to: DateTime<Tz>,
}

impl DateBounds {
    pub fn for_dates(start: NaiveDate, end: NaiveDate, tz: Tz) -> Result<Self, DateRangeError> {
        Ok(Self {
            from: start_of_day(start, tz)?,
            to: end_of_day(end, tz)?,
        })
    }

    /// A start date later than the end date; the predicate matches nothing
    pub fn is_inverted(&self) -> bool {
        self.from > self.to
    }

    /// Write the bounds back as range state
    pub fn to_state(&self, format: &DateFormat) -> String {
        format_selection(
            &format.format_datetime(&self.from),
            &format.format_datetime(&self.to),
        )
    }

    /// Human readable form using the widget's display pattern
    pub fn display(&self, format: &DisplayFormat) -> String {
        format_selection(
            &format.format_datetime(&self.from),
            &format.format_datetime(&self.to),
        )
    }
}

/// First existing instant of `date` in `tz`
pub fn start_of_day(date: NaiveDate, tz: Tz) -> Result<DateTime<Tz>, DateRangeError> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=MAX_GAP_STEPS)
        .map(|step| midnight + TimeDelta::minutes(15) * step)
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .ok_or_else(|| nonexistent(midnight, tz))
}

/// Last existing instant of `date` in `tz`, with microsecond precision
pub fn end_of_day(date: NaiveDate, tz: Tz) -> Result<DateTime<Tz>, DateRangeError> {
    let last = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)
        .map(|time| date.and_time(time))
        .ok_or_else(|| nonexistent(date.and_time(NaiveTime::MIN), tz))?;
    (0..=MAX_GAP_STEPS)
        .map(|step| last - TimeDelta::minutes(15) * step)
        .find_map(|local| tz.from_local_datetime(&local).latest())
        .ok_or_else(|| nonexistent(last, tz))
}

pub fn parse_timezone(name: &str) -> Result<Tz, DateRangeError> {
    name.parse::<Tz>()
        .map_err(|_| DateRangeError::UnknownTimezone(name.to_string()))
}

fn nonexistent(local: NaiveDateTime, tz: Tz) -> DateRangeError {
    DateRangeError::NonexistentLocalTime {
        datetime: local.to_string(),
        timezone: tz.name().to_string(),
    }
}
