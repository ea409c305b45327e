//! Date-range filters for ledger reads.
//!
//! Bounds are inclusive and expressed in UTC. Inputs accept either a calendar
//! date (`2024-12-01`) or an RFC 3339 date-time (`2024-12-01T10:00:00Z`). A
//! date used as a start bound means the first instant of that UTC day; as an
//! end bound it means the last instant of that UTC day.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> ResultEngine<Self> {
        if start > end {
            return Err(EngineError::Validation(
                "invalid range: start must be <= end".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    /// The UTC calendar day containing `now`.
    pub fn day_of(now: DateTime<Utc>) -> Self {
        let day = now.date_naive();
        Self {
            start: start_of_day(day),
            end: end_of_day(day),
        }
    }

    pub fn today() -> Self {
        Self::day_of(Utc::now())
    }

    /// Parses both bounds; both are required.
    pub fn parse(start: &str, end: &str) -> ResultEngine<Self> {
        Self::new(parse_bound(start, Bound::Start)?, parse_bound(end, Bound::End)?)
    }

    /// Parses both bounds, falling back to the current UTC day when either is
    /// missing.
    pub fn parse_or_today(start: Option<&str>, end: Option<&str>) -> ResultEngine<Self> {
        match (start, end) {
            (Some(start), Some(end)) => Self::parse(start, end),
            _ => Ok(Self::today()),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// Parses one bound of a range.
pub fn parse_bound(input: &str, bound: Bound) -> ResultEngine<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| EngineError::Validation(format!("invalid date: {input}")))?;
    Ok(match bound {
        Bound::Start => start_of_day(day),
        Bound::End => end_of_day(day),
    })
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(day: NaiveDate) -> DateTime<Utc> {
    match day.checked_add_days(Days::new(1)) {
        Some(next) => start_of_day(next) - TimeDelta::nanoseconds(1),
        None => DateTime::<Utc>::MAX_UTC,
    }
}
