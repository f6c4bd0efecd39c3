use chrono::NaiveDate;
use epi_core::season::Season;
use serde::{Deserialize, Serialize};

/// An inclusive date window a view is restricted to, typically the bounds
/// of the selected season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> DateWindow {
        DateWindow { start, end }
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.start <= *date && *date <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

impl From<&Season> for DateWindow {
    fn from(season: &Season) -> Self {
        DateWindow::new(season.start_date, season.end_date)
    }
}
