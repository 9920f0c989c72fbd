//! Date range handling shared by the list query and output naming.

use crate::StravaError;
use chrono::{Days, NaiveDate, NaiveTime};

/// Inclusive range of calendar days, interpreted in UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, StravaError> {
        if start > end {
            return Err(StravaError::InvalidInput(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// `(after, before)` epoch seconds: midnight of the first day and midnight
    /// following the last day, so activities on the end date are included.
    pub fn epoch_bounds(&self) -> (i64, i64) {
        let after = midnight_epoch(self.start);
        let before = self
            .end
            .checked_add_days(Days::new(1))
            .map(midnight_epoch)
            .unwrap_or_else(|| midnight_epoch(self.end));
        (after, before)
    }

    /// `2024-01-01` for a single day, `2024-01-01_to_2024-01-07` otherwise.
    pub fn label(&self) -> String {
        if self.start == self.end {
            self.start.format("%Y-%m-%d").to_string()
        } else {
            format!(
                "{}_to_{}",
                self.start.format("%Y-%m-%d"),
                self.end.format("%Y-%m-%d")
            )
        }
    }
}

fn midnight_epoch(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
    }

    #[test]
    fn epoch_bounds_cover_the_whole_end_day() {
        let range = DateRange::new(day("2024-01-01"), day("2024-01-01")).expect("range");
        assert_eq!(range.epoch_bounds(), (1_704_067_200, 1_704_153_600));
    }

    #[test]
    fn label_single_day() {
        let range = DateRange::new(day("2024-01-01"), day("2024-01-01")).expect("range");
        assert_eq!(range.label(), "2024-01-01");
    }

    #[test]
    fn label_span() {
        let range = DateRange::new(day("2024-01-01"), day("2024-01-07")).expect("range");
        assert_eq!(range.label(), "2024-01-01_to_2024-01-07");
    }

    #[test]
    fn new_rejects_reversed_range() {
        let res = DateRange::new(day("2024-02-01"), day("2024-01-01"));
        assert!(matches!(res, Err(StravaError::InvalidInput(_))));
    }
}
