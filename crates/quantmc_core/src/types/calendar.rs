//! Holiday calendars for business-day logic.
//!
//! A [`Calendar`] is a name plus a set of holiday dates. Saturdays and
//! Sundays are never business days; the holiday set removes further dates.
//! Calendars are immutable once constructed and safe to share across
//! threads.

use chrono::{Datelike, Weekday};
use std::collections::BTreeSet;

use super::time::Date;

/// A named holiday calendar.
///
/// # Examples
///
/// ```
/// use quantmc_core::types::{Calendar, Date};
///
/// let holiday = Date::from_ymd(2008, 3, 21).unwrap();
/// let calendar = Calendar::new("ZAR", vec![holiday]);
///
/// assert!(!calendar.is_business_day(holiday));
/// // 2008-03-22 is a Saturday.
/// assert!(!calendar.is_business_day(holiday.add_days(1)));
/// // 2008-03-24 is a Monday.
/// assert!(calendar.is_business_day(holiday.add_days(3)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Calendar {
    name: String,
    holidays: BTreeSet<Date>,
}

impl Calendar {
    /// Creates a calendar from a name and a list of holiday dates.
    ///
    /// An empty holiday list still excludes weekends.
    pub fn new(name: impl Into<String>, holidays: Vec<Date>) -> Self {
        Self {
            name: name.into(),
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Returns the calendar name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of holidays in the calendar.
    pub fn holiday_count(&self) -> usize {
        self.holidays.len()
    }

    /// Returns whether the date is a holiday (weekends excluded from the
    /// check; use [`Calendar::is_business_day`] for the combined test).
    pub fn is_holiday(&self, date: Date) -> bool {
        self.holidays.contains(&date)
    }

    /// Returns whether the date is a business day: not a Saturday, not a
    /// Sunday and not in the holiday set.
    pub fn is_business_day(&self, date: Date) -> bool {
        let weekday = date.into_inner().weekday();
        if weekday == Weekday::Sat || weekday == Weekday::Sun {
            return false;
        }
        !self.holidays.contains(&date)
    }

    /// Counts business days `d` with `date1 <= d < date2`.
    ///
    /// Returns the negated count when `date1 > date2`, so the result is
    /// antisymmetric like a signed day count.
    pub fn business_days_between(&self, date1: Date, date2: Date) -> i64 {
        if date1 > date2 {
            return -self.business_days_between(date2, date1);
        }
        let mut count = 0;
        let mut current = date1;
        while current < date2 {
            if self.is_business_day(current) {
                count += 1;
            }
            current = current.add_days(1);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_weekends_are_not_business_days() {
        let calendar = Calendar::new("Test", vec![]);
        // 2008-03-22 is a Saturday, 2008-03-23 a Sunday.
        assert!(!calendar.is_business_day(d(2008, 3, 22)));
        assert!(!calendar.is_business_day(d(2008, 3, 23)));
        assert!(calendar.is_business_day(d(2008, 3, 24)));
    }

    #[test]
    fn test_holidays_are_not_business_days() {
        let calendar = Calendar::new("Test", vec![d(2008, 3, 21)]);
        assert!(calendar.is_holiday(d(2008, 3, 21)));
        assert!(!calendar.is_business_day(d(2008, 3, 21)));
        assert!(calendar.is_business_day(d(2008, 3, 20)));
    }

    #[test]
    fn test_business_days_between_reference() {
        let weekends_only = Calendar::new("Test", vec![]);
        assert_eq!(
            weekends_only.business_days_between(d(2008, 2, 28), d(2008, 3, 31)),
            22
        );

        let with_holiday = Calendar::new("Test", vec![d(2008, 3, 21)]);
        assert_eq!(
            with_holiday.business_days_between(d(2008, 2, 28), d(2008, 3, 31)),
            21
        );
    }

    #[test]
    fn test_business_days_between_antisymmetric() {
        let calendar = Calendar::new("Test", vec![]);
        let d1 = d(2008, 2, 28);
        let d2 = d(2008, 3, 31);
        assert_eq!(
            calendar.business_days_between(d2, d1),
            -calendar.business_days_between(d1, d2)
        );
        assert_eq!(calendar.business_days_between(d1, d1), 0);
    }

    #[test]
    fn test_full_week() {
        let calendar = Calendar::new("Test", vec![]);
        // Monday 2024-06-10 to next Monday: 5 business days.
        assert_eq!(
            calendar.business_days_between(d(2024, 6, 10), d(2024, 6, 17)),
            5
        );
    }
}
