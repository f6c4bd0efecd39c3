use chrono::{NaiveDate, TimeDelta};
use epi_utils::dates::{saturday_on_or_before, DAYS_PER_WEEK};
use std::mem::replace;

/// A week iterator that yields every date from the start date through the
/// end date (inclusive), one week apart.
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct WeekRange(pub NaiveDate, pub NaiveDate);

impl WeekRange {
    /// The Saturday-anchored weekly grid covering `earliest..=latest`: both
    /// ends snap back to the Saturday closing their week.
    pub fn saturdays(earliest: NaiveDate, latest: NaiveDate) -> WeekRange {
        WeekRange(
            saturday_on_or_before(&earliest),
            saturday_on_or_before(&latest),
        )
    }
}

impl Iterator for WeekRange {
    type Item = NaiveDate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 <= self.1 {
            let next = self.0 + TimeDelta::days(DAYS_PER_WEEK);
            Some(replace(&mut self.0, next))
        } else {
            None
        }
    }
}
