//! Conditional access by date
//!
//! Evaluates `*:conditional` restrictions such as `no @ (Nov 01 - Mar 31)` against a
//! single reference day configured with `date_range_parser_day` (`YYYY-MM-DD`, today
//! when unset). The first condition that parses decides: inside the range its value
//! applies, outside the range the opposite one.

use chrono::{Datelike, Month, NaiveDate, Utc};
use tracing::{debug, trace};

use super::TagParser;
use crate::config::PMap;
use crate::error::{EvError, Result};
use crate::ev::values::{Mode, TemporalAccess};
use crate::ev::{Direction, EncodedValueLookup, EnumEncodedValue};
use crate::reader::{ReaderWay, RelationFlags};

/// A recurring or absolute span of days, bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    /// `2024 Jun 01 - 2024 Aug 31`
    Dates(NaiveDate, NaiveDate),
    /// `Nov 15 - Mar 15`, repeats every year and may wrap over new year
    MonthDays((u32, u32), (u32, u32)),
    /// `Dec - Feb`
    Months(u32, u32),
}

impl DateRange {
    pub fn parse(text: &str) -> Option<Self> {
        let (from, to) = text.split_once('-')?;
        let from: Vec<&str> = from.split_whitespace().collect();
        let to: Vec<&str> = to.split_whitespace().collect();

        match (from.as_slice(), to.as_slice()) {
            ([y1, m1, d1], [y2, m2, d2]) => {
                let start = date(y1, m1, d1)?;
                let end = date(y2, m2, d2)?;
                (start <= end).then_some(DateRange::Dates(start, end))
            }
            ([m1, d1], [m2, d2]) => Some(DateRange::MonthDays(
                month_day(m1, d1)?,
                month_day(m2, d2)?,
            )),
            ([m1], [m2]) => Some(DateRange::Months(month(m1)?, month(m2)?)),
            _ => None,
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        match *self {
            DateRange::Dates(start, end) => start <= day && day <= end,
            DateRange::MonthDays(start, end) => {
                within((day.month(), day.day()), start, end)
            }
            DateRange::Months(start, end) => within(day.month(), start, end),
        }
    }
}

/// Inclusive membership in a yearly cycle
fn within<T: PartialOrd>(value: T, start: T, end: T) -> bool {
    if start <= end {
        start <= value && value <= end
    } else {
        value >= start || value <= end
    }
}

fn month(text: &str) -> Option<u32> {
    text.parse::<Month>().ok().map(|m| m.number_from_month())
}

fn month_day(m: &str, d: &str) -> Option<(u32, u32)> {
    let m = month(m)?;
    let d: u32 = d.parse().ok()?;
    // validate against a leap year so Feb 29 is accepted
    NaiveDate::from_ymd_opt(2000, m, d).map(|_| (m, d))
}

fn date(y: &str, m: &str, d: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y.parse().ok()?, month(m)?, d.parse().ok()?)
}

/// Keys carrying conditional restrictions, most specific first
fn conditional_keys(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::Car => &[
            "motorcar:conditional",
            "motor_vehicle:conditional",
            "vehicle:conditional",
            "access:conditional",
        ],
        Mode::Bike | Mode::Mtb => &[
            "bicycle:conditional",
            "vehicle:conditional",
            "access:conditional",
        ],
        Mode::Foot => &["foot:conditional", "access:conditional"],
        Mode::Bus | Mode::Hov => &[
            "psv:conditional",
            "motor_vehicle:conditional",
            "vehicle:conditional",
            "access:conditional",
        ],
    }
}

fn verdict(value: &str) -> Option<bool> {
    match value.trim() {
        "yes" | "designated" | "permissive" => Some(true),
        "no" | "private" | "delivery" | "destination" => Some(false),
        _ => None,
    }
}

/// Evaluate one `value @ (range); value @ (range)` expression
pub fn evaluate(expression: &str, day: NaiveDate) -> Option<TemporalAccess> {
    for part in expression.split(';') {
        let Some((value, condition)) = part.split_once('@') else {
            continue;
        };
        let Some(allowed) = verdict(value) else {
            continue;
        };
        let condition = condition.trim().trim_start_matches('(').trim_end_matches(')');
        let Some(range) = DateRange::parse(condition) else {
            continue;
        };

        let allowed = if range.contains(day) { allowed } else { !allowed };
        return Some(if allowed {
            TemporalAccess::Yes
        } else {
            TemporalAccess::No
        });
    }
    None
}

pub struct TemporalAccessParser {
    access: EnumEncodedValue,
    keys: &'static [&'static str],
    day: NaiveDate,
}

impl TemporalAccessParser {
    pub fn day(&self) -> NaiveDate {
        self.day
    }
}

impl TagParser for TemporalAccessParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let access = self
            .keys
            .iter()
            .filter_map(|k| way.tag(k))
            .find_map(|expr| {
                let result = evaluate(expr, self.day);
                if result.is_none() {
                    trace!(way_id = way.id, expression = expr, "Unparsed conditional");
                }
                result
            })
            .unwrap_or(TemporalAccess::Missing);
        self.access.set_enum(Direction::Forward, record, access);
    }
}

/// Reference day from `date_range_parser_day`, today when empty
pub fn reference_day(props: &PMap) -> Result<NaiveDate> {
    match props.get("date_range_parser_day").map(str::trim) {
        None | Some("") => Ok(Utc::now().date_naive()),
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| {
            EvError::InvalidConfig(format!("date_range_parser_day '{text}': {e}"))
        }),
    }
}

fn temporal_access(
    mode: Mode,
    name: &str,
    lookup: &EncodedValueLookup,
    props: &PMap,
) -> Result<Box<dyn TagParser>> {
    let day = reference_day(props)?;
    debug!(name, %day, "Evaluating conditional access");
    Ok(Box::new(TemporalAccessParser {
        access: lookup.enum_value::<TemporalAccess>(name)?,
        keys: conditional_keys(mode),
        day,
    }))
}

pub fn car_temporal_access(
    name: &str,
    lookup: &EncodedValueLookup,
    props: &PMap,
) -> Result<Box<dyn TagParser>> {
    temporal_access(Mode::Car, name, lookup, props)
}

pub fn bike_temporal_access(
    name: &str,
    lookup: &EncodedValueLookup,
    props: &PMap,
) -> Result<Box<dyn TagParser>> {
    temporal_access(Mode::Bike, name, lookup, props)
}

pub fn foot_temporal_access(
    name: &str,
    lookup: &EncodedValueLookup,
    props: &PMap,
) -> Result<Box<dyn TagParser>> {
    temporal_access(Mode::Foot, name, lookup, props)
}
