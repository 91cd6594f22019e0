use crate::weekday::Days;
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

static YEAR_MONTH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<year>\d{4})-(?P<month>\d{2})$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid month {0:?}, expected YYYY-MM")]
pub struct YearMonthError(pub String);

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<YearMonth> {
        (1..=12)
            .contains(&month)
            .then_some(YearMonth { year, month })
    }

    pub fn of(date: NaiveDate) -> YearMonth {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn current() -> YearMonth {
        YearMonth::of(chrono::Local::now().naive_local().date())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn days_in_month(&self) -> u32 {
        match self.month {
            4 | 6 | 9 | 11 => 30,
            2 if is_leap_year(self.year) => 29,
            2 => 28,
            _ => 31,
        }
    }

    /// Every day of the month, in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let YearMonth { year, month } = *self;
        (1..=self.days_in_month()).filter_map(move |day| NaiveDate::from_ymd_opt(year, month, day))
    }

    /// The days of the month falling on one of `days`.
    pub fn dates_on(&self, days: Days) -> Vec<NaiveDate> {
        self.dates()
            .filter(|date| days.contains_weekday(date.weekday()))
            .collect()
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

impl FromStr for YearMonth {
    type Err = YearMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || YearMonthError(s.to_string());
        let cap = YEAR_MONTH_REGEX.captures(s.trim()).ok_or_else(err)?;
        let year = cap["year"].parse::<i32>().map_err(|_| err())?;
        let month = cap["month"].parse::<u32>().map_err(|_| err())?;

        YearMonth::new(year, month).ok_or_else(err)
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// The two-digit day used as a column header.
pub fn day_label(date: NaiveDate) -> String {
    format!("{:02}", date.day())
}
