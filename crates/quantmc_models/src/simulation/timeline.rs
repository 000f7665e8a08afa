//! Shared simulation timeline built at prepare time.

use std::collections::{BTreeSet, HashMap};

use quantmc_core::types::Date;

use super::error::SimulationError;

const DAYS_PER_YEAR: f64 = 365.0;

/// The sorted set of dates a simulator steps through, with Act/365 times
/// from the value date and a date-to-index lookup.
///
/// The value date is always the first entry.
#[derive(Clone, Debug, Default)]
pub(crate) struct Timeline {
    dates: Vec<Date>,
    times: Vec<f64>,
    index: HashMap<Date, usize>,
}

impl Timeline {
    /// Builds the timeline from every registered date.
    ///
    /// # Errors
    ///
    /// - `NothingRegistered` when no dates are supplied
    /// - `DateBeforeValueDate` when any date precedes the value date
    pub(crate) fn build(
        value_date: Date,
        registered: impl IntoIterator<Item = Date>,
    ) -> Result<Self, SimulationError> {
        let mut all: BTreeSet<Date> = registered.into_iter().collect();
        if all.is_empty() {
            return Err(SimulationError::NothingRegistered);
        }
        if let Some(&first) = all.iter().next() {
            if first < value_date {
                return Err(SimulationError::DateBeforeValueDate {
                    date: first,
                    value_date,
                });
            }
        }
        all.insert(value_date);

        let dates: Vec<Date> = all.into_iter().collect();
        let times = dates
            .iter()
            .map(|&d| (d - value_date) as f64 / DAYS_PER_YEAR)
            .collect();
        let index = dates.iter().enumerate().map(|(i, &d)| (d, i)).collect();
        Ok(Self {
            dates,
            times,
            index,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.dates.len()
    }

    pub(crate) fn date(&self, i: usize) -> Date {
        self.dates[i]
    }

    pub(crate) fn time(&self, i: usize) -> f64 {
        self.times[i]
    }

    pub(crate) fn index_of(&self, date: Date) -> Option<usize> {
        self.index.get(&date).copied()
    }

    pub(crate) fn clear(&mut self) {
        self.dates.clear();
        self.times.clear();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_build_sorts_and_dedupes() {
        let value_date = d(2020, 1, 1);
        let timeline = Timeline::build(
            value_date,
            [d(2021, 1, 1), d(2020, 7, 1), d(2021, 1, 1)],
        )
        .unwrap();
        assert_eq!(timeline.len(), 3);
        assert_eq!(timeline.date(0), value_date);
        assert_eq!(timeline.date(1), d(2020, 7, 1));
        assert_eq!(timeline.time(0), 0.0);
        assert_eq!(timeline.index_of(d(2021, 1, 1)), Some(2));
        assert_eq!(timeline.index_of(d(2020, 2, 1)), None);
    }

    #[test]
    fn test_build_rejects_empty_and_past() {
        let value_date = d(2020, 1, 1);
        assert!(matches!(
            Timeline::build(value_date, []),
            Err(SimulationError::NothingRegistered)
        ));
        assert!(matches!(
            Timeline::build(value_date, [d(2019, 12, 31)]),
            Err(SimulationError::DateBeforeValueDate { .. })
        ));
    }
}
