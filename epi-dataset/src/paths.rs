//! Locations of the source files, relative to the data root.

use chrono::NaiveDate;
use epi_core::week_range::WeekRange;
use epi_utils::dates::{add_weeks, format_date};

pub const LOCATIONS: &str = "locations.csv";
pub const GROUND_TRUTH: &str = "ground-truth/target-hospital-admissions.csv";
pub const THRESHOLDS: &str = "thresholds.csv";
pub const WIS_RATIO: &str = "evaluations-score/WIS_ratio.csv";
pub const MAPE: &str = "evaluations-score/MAPE.csv";

pub fn predictions(model_name: &str) -> String {
    format!("processed/{}/predictions.csv", model_name)
}

/// Earlier rounds of a model's predictions, split off into their own file.
pub fn older_predictions(model_name: &str) -> String {
    format!("processed/{}/predictions_older.csv", model_name)
}

pub fn nowcast_trends(model_name: &str) -> String {
    format!("processed/{}/nowcast_trends.csv", model_name)
}

pub fn historical_snapshot(associated_date: &NaiveDate) -> String {
    format!(
        "ground-truth/historical-data/target-hospital-admissions_{}.csv",
        format_date(associated_date)
    )
}

/// Weeks that may have a historical snapshot: weekly from `start` through
/// one week before `as_of`.
pub fn snapshot_weeks(start: NaiveDate, as_of: NaiveDate) -> WeekRange {
    match add_weeks(&as_of, -1) {
        Some(end) => WeekRange(start, end),
        None => WeekRange(NaiveDate::MAX, NaiveDate::MIN),
    }
}
