//! Due-date expressions
//!
//! An expression is resolved in three layers:
//! 1. An absolute date before an optional `::` (`2025-01-21`), else today.
//! 2. A natural-language key anywhere in the input (`tomorrow`,
//!    `next friday`, `this month`, ...) that replaces the base date.
//! 3. A relative shift `(+|-)Ny(+|-)Nm(+|-)Nw(+|-)Nd`, each part optional,
//!    at the end of the input after an optional `::`, applied on top.
//!
//! ```text
//! 2025-01-21::+2w      -> 2025-02-04
//! next monday::-1d     -> the Sunday before next Monday
//! tomorrow+1d          -> the day after tomorrow
//! +1m-2d               -> a month from today, minus two days
//! ```
//!
//! Whatever precedes the shift must be empty or recognized by one of the
//! first two layers.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Separates the absolute part from the relative shift
pub const SHIFT_SEPARATOR: &str = "::";

/// Locale-independent absolute date formats, tried in order
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

static RELATIVE_SHIFT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:([+-]\d+)y)?(?:([+-]\d+)m)?(?:([+-]\d+)w)?(?:([+-]\d+)d)?$")
        .expect("valid regex")
});

static SHIFT_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[+-]\d+y)?(?:[+-]\d+m)?(?:[+-]\d+w)?(?:[+-]\d+d)?$").expect("valid regex")
});

const WEEKDAYS: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DueDateError {
    #[error("Unrecognized due-date expression: '{0}'")]
    UnrecognizedDueDateExpression(String),

    #[error("Due-date expression '{0}' is out of the supported date range")]
    OutOfRange(String),
}

/// A signed year/month/week/day offset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelativeShift {
    pub years: i64,
    pub months: i64,
    pub weeks: i64,
    pub days: i64,
}

impl RelativeShift {
    /// Parses `+1y-2m+3w+4d` style shifts; `None` if the text is not one
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let caps = RELATIVE_SHIFT.captures(text)?;
        let part = |i: usize| -> Option<i64> {
            caps.get(i).map(|m| m.as_str().parse::<i64>()).transpose().ok().flatten()
        };
        // Every present group must fit in an i64
        for i in 1..=4 {
            if caps.get(i).is_some() && part(i).is_none() {
                return None;
            }
        }

        Some(Self {
            years: part(1).unwrap_or(0),
            months: part(2).unwrap_or(0),
            weeks: part(3).unwrap_or(0),
            days: part(4).unwrap_or(0),
        })
    }

    /// Applies years, months, weeks, then days
    pub fn apply(&self, date: NaiveDate) -> Option<NaiveDate> {
        let date = add_months(date, self.years.checked_mul(12)?)?;
        let date = add_months(date, self.months)?;
        let date = add_days(date, self.weeks.checked_mul(7)?)?;
        add_days(date, self.days)
    }
}

fn add_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let amount = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(amount)
    } else {
        date.checked_sub_months(amount)
    }
}

fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    let amount = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(amount)
    } else {
        date.checked_sub_days(amount)
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_months(Months::new(1))?.pred_opt()
}

fn monday_of_week(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

/// Parses an absolute calendar date in one of the accepted formats
pub fn parse_absolute(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

/// The natural-language dictionary, relative to `today`
pub fn natural_language_keys(today: NaiveDate) -> Vec<(String, Option<NaiveDate>)> {
    let monday = monday_of_week(today);
    let next_month = today.checked_add_months(Months::new(1));

    let mut keys = vec![
        ("today".to_string(), Some(today)),
        ("tomorrow".to_string(), today.succ_opt()),
        ("this week".to_string(), monday.checked_add_days(Days::new(6))),
        ("next week".to_string(), monday.checked_add_days(Days::new(13))),
        (
            "this month".to_string(),
            last_day_of_month(today.year(), today.month()),
        ),
        (
            "next month".to_string(),
            next_month.and_then(|d| last_day_of_month(d.year(), d.month())),
        ),
        (
            "this year".to_string(),
            NaiveDate::from_ymd_opt(today.year(), 12, 31),
        ),
        (
            "next year".to_string(),
            NaiveDate::from_ymd_opt(today.year() + 1, 12, 31),
        ),
    ];

    for (name, weekday) in WEEKDAYS {
        let this = monday.checked_add_days(Days::new(u64::from(weekday.num_days_from_monday())));
        keys.push((format!("this {name}"), this));
        keys.push((format!("next {name}"), this.and_then(|d| d.checked_add_days(Days::new(7)))));
    }

    keys
}

/// Finds the dictionary date named in `input`, if exactly one key occurs
fn natural_language(input: &str, today: NaiveDate) -> Result<Option<NaiveDate>, DueDateError> {
    let lowered = input.to_lowercase();
    let found: Vec<(String, Option<NaiveDate>)> = natural_language_keys(today)
        .into_iter()
        .filter(|(key, _)| lowered.contains(key.as_str()))
        .collect();

    match found.as_slice() {
        [] => Ok(None),
        [(_, Some(date))] => Ok(Some(*date)),
        [(_, None)] => Err(DueDateError::OutOfRange(input.to_string())),
        _ => Err(DueDateError::UnrecognizedDueDateExpression(input.to_string())),
    }
}

/// Splits `input` into the text before the shift and the shift itself
fn split_shift(input: &str) -> Result<(&str, Option<RelativeShift>), DueDateError> {
    let unrecognized = || DueDateError::UnrecognizedDueDateExpression(input.to_string());

    if let Some((head, tail)) = input.split_once(SHIFT_SEPARATOR) {
        let shift = RelativeShift::parse(tail).ok_or_else(unrecognized)?;
        return Ok((head, Some(shift)));
    }

    match SHIFT_SUFFIX.find(input.trim_end()) {
        Some(found) if !found.is_empty() => {
            let shift = RelativeShift::parse(found.as_str()).ok_or_else(unrecognized)?;
            Ok((&input[..found.start()], Some(shift)))
        }
        _ => Ok((input, None)),
    }
}

/// Resolves a due-date expression relative to `today`
pub fn resolve_due_date(input: &str, today: NaiveDate) -> Result<NaiveDate, DueDateError> {
    let unrecognized = || DueDateError::UnrecognizedDueDateExpression(input.to_string());

    let (head, shift) = split_shift(input)?;
    let head = head.trim();

    let absolute = parse_absolute(head);
    let natural = natural_language(head, today)?;

    if head.is_empty() {
        if shift.is_none() {
            return Err(unrecognized());
        }
    } else if absolute.is_none() && natural.is_none() {
        return Err(unrecognized());
    }

    let base = natural.or(absolute).unwrap_or(today);
    match shift {
        Some(shift) => shift
            .apply(base)
            .ok_or_else(|| DueDateError::OutOfRange(input.to_string())),
        None => Ok(base),
    }
}
