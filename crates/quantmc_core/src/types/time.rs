//! Dates and day-count conventions.
//!
//! This module provides:
//! - `Date`: Type-safe date wrapper around chrono::NaiveDate with a
//!   serial-day view and day/month/year offset arithmetic
//! - `DayCount`: market day-count conventions producing year fractions
//!
//! # Examples
//!
//! ```
//! use quantmc_core::types::{Date, DayCount};
//!
//! let start = Date::from_ymd(2003, 11, 1).unwrap();
//! let end = Date::from_ymd(2004, 5, 1).unwrap();
//!
//! let yf = DayCount::Actual365Fixed.year_fraction(start, end);
//! assert!((yf - 182.0 / 365.0).abs() < 1e-12);
//! ```

use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use super::calendar::Calendar;
use super::error::DateError;

/// Type-safe calendar date.
///
/// A thin wrapper around `chrono::NaiveDate`. Ordering is consistent with
/// calendar time and subtraction yields the signed number of days, so the
/// type behaves like an integral day count since a fixed epoch while chrono
/// supplies the calendar arithmetic.
///
/// # Examples
///
/// ```
/// use quantmc_core::types::Date;
///
/// let date = Date::from_ymd(2016, 9, 17).unwrap();
/// assert_eq!(date.add_months(24).year(), 2018);
///
/// let later = date.add_days(10);
/// assert_eq!(later - date, 10);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a Date from year, month and day components.
    ///
    /// # Errors
    ///
    /// Returns `DateError::InvalidDate` for impossible dates such as
    /// February 30th.
    ///
    /// # Examples
    ///
    /// ```
    /// use quantmc_core::types::Date;
    ///
    /// assert!(Date::from_ymd(2024, 2, 29).is_ok());
    /// assert!(Date::from_ymd(2023, 2, 29).is_err());
    /// ```
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or(DateError::InvalidDate { year, month, day })
    }

    /// Parses a date from ISO 8601 format (YYYY-MM-DD).
    pub fn parse(s: &str) -> Result<Self, DateError> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Date)
            .map_err(|e| DateError::ParseError(e.to_string()))
    }

    /// Returns the underlying `NaiveDate`.
    pub fn into_inner(self) -> NaiveDate {
        self.0
    }

    /// Returns the serial day number (days since the Common Era epoch).
    ///
    /// Two dates compare the same way their serial numbers do, and
    /// `d2.serial() - d1.serial() == d2 - d1`.
    pub fn serial(&self) -> i64 {
        i64::from(self.0.num_days_from_ce())
    }

    /// Returns the year component.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Returns the date offset by a signed number of days.
    pub fn add_days(self, days: i64) -> Self {
        Date(self.0 + chrono::Duration::days(days))
    }

    /// Returns the date offset by a signed number of months.
    ///
    /// The day of month is clamped to the target month's length, so
    /// 2024-01-31 plus one month is 2024-02-29.
    pub fn add_months(self, months: i32) -> Self {
        let total = self.year() * 12 + self.month() as i32 - 1 + months;
        let year = total.div_euclid(12);
        let month = (total.rem_euclid(12) + 1) as u32;
        let day = self.day().min(days_in_month(year, month));
        // Clamped day is always valid for (year, month).
        Date(NaiveDate::from_ymd_opt(year, month, day).unwrap())
    }

    /// Returns the date offset by a signed number of years.
    ///
    /// February 29th maps to February 28th in non-leap target years.
    pub fn add_years(self, years: i32) -> Self {
        self.add_months(12 * years)
    }
}

/// Number of days in the given month.
fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => unreachable!("month out of range"),
    }
}

/// Gregorian leap-year rule.
fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in the given calendar year (365 or 366).
fn days_in_year(year: i32) -> f64 {
    if is_leap_year(year) {
        366.0
    } else {
        365.0
    }
}

impl Sub for Date {
    type Output = i64;

    /// Returns the signed number of days between two dates.
    fn sub(self, other: Self) -> i64 {
        (self.0 - other.0).num_days()
    }
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, DateError> {
        Date::parse(s)
    }
}

impl fmt::Display for Date {
    /// Formats the date as ISO 8601 (YYYY-MM-DD).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Day-count convention (year fraction convention).
///
/// All conventions return signed year fractions: `year_fraction(d1, d2)` is
/// negative when `d1 > d2`, which backward schedule generation relies on.
/// Equal dates always give zero.
///
/// # Variants
/// - `Actual365Fixed`: actual days / 365
/// - `Actual360`: actual days / 360
/// - `ActActIsda`: interval split at calendar-year boundaries, each
///   portion divided by that year's actual length (365 or 366)
/// - `Thirty360Euro`: 30E/360, day 31 counted as day 30 on both ends
/// - `Business252(calendar)`: business days between the dates / 252
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DayCount {
    /// Actual/365 Fixed.
    Actual365Fixed,

    /// Actual/360.
    Actual360,

    /// Actual/Actual ISDA.
    ActActIsda,

    /// 30/360 European (Eurobond basis).
    Thirty360Euro,

    /// Business/252 against the supplied holiday calendar.
    Business252(Calendar),
}

impl DayCount {
    /// Returns the standard convention name.
    pub fn name(&self) -> &'static str {
        match self {
            DayCount::Actual365Fixed => "ACT/365F",
            DayCount::Actual360 => "ACT/360",
            DayCount::ActActIsda => "ACT/ACT ISDA",
            DayCount::Thirty360Euro => "30E/360",
            DayCount::Business252(_) => "BUS/252",
        }
    }

    /// Year fraction between two dates under this convention.
    ///
    /// # Examples
    ///
    /// ```
    /// use quantmc_core::types::{Date, DayCount};
    ///
    /// let d1 = Date::from_ymd(2008, 2, 28).unwrap();
    /// let d2 = Date::from_ymd(2008, 3, 31).unwrap();
    /// let yf = DayCount::Thirty360Euro.year_fraction(d1, d2);
    /// assert!((yf - 32.0 / 360.0).abs() < 1e-12);
    /// ```
    pub fn year_fraction(&self, date1: Date, date2: Date) -> f64 {
        match self {
            DayCount::Actual365Fixed => (date2 - date1) as f64 / 365.0,
            DayCount::Actual360 => (date2 - date1) as f64 / 360.0,
            DayCount::ActActIsda => act_act_isda(date1, date2),
            DayCount::Thirty360Euro => thirty_360_euro(date1, date2),
            DayCount::Business252(calendar) => {
                calendar.business_days_between(date1, date2) as f64 / 252.0
            }
        }
    }
}

impl fmt::Display for DayCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Actual/Actual ISDA: split the interval at each calendar-year boundary,
/// divide each piece by the actual length of its year, and sum.
fn act_act_isda(date1: Date, date2: Date) -> f64 {
    if date1 == date2 {
        return 0.0;
    }
    if date1 > date2 {
        return -act_act_isda(date2, date1);
    }

    let y1 = date1.year();
    let y2 = date2.year();
    if y1 == y2 {
        return (date2 - date1) as f64 / days_in_year(y1);
    }

    // Jan 1 dates are always constructible.
    let start_of_y1_next = Date::from_ymd(y1 + 1, 1, 1).unwrap();
    let start_of_y2 = Date::from_ymd(y2, 1, 1).unwrap();

    let head = (start_of_y1_next - date1) as f64 / days_in_year(y1);
    let whole_years = (y2 - y1 - 1) as f64;
    let tail = (date2 - start_of_y2) as f64 / days_in_year(y2);
    head + whole_years + tail
}

/// 30E/360: day-of-month 31 is counted as 30 on both dates.
fn thirty_360_euro(date1: Date, date2: Date) -> f64 {
    let d1 = date1.day().min(30) as i64;
    let d2 = date2.day().min(30) as i64;
    let days = 360 * (date2.year() as i64 - date1.year() as i64)
        + 30 * (date2.month() as i64 - date1.month() as i64)
        + (d2 - d1);
    days as f64 / 360.0
}
