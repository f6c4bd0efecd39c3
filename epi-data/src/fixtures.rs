use chrono::NaiveDate;
use epi_core::ground_truth::{Admissions, GroundTruthPoint};
use epi_core::prediction::{PredictionPoint, Quantiles};
use epi_utils::dates::parse_date;

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    parse_date(s).unwrap()
}

pub fn gt(day: &str, location_id: &str, admissions: f64) -> GroundTruthPoint {
    GroundTruthPoint {
        date: date(day),
        location_id: location_id.to_string(),
        location_name: format!("Location {}", location_id),
        admissions: Admissions::from_raw(admissions),
        weekly_rate: admissions / 10.0,
    }
}

/// A prediction whose quantiles spread evenly around `median`.
pub fn prediction(reference: &str, target: &str, location_id: &str, median: f64) -> PredictionPoint {
    PredictionPoint {
        reference_date: date(reference),
        target_end_date: date(target),
        location_id: location_id.to_string(),
        quantiles: Quantiles {
            q025: median - 30.0,
            q05: median - 20.0,
            q25: median - 10.0,
            q50: median,
            q75: median + 10.0,
            q95: median + 20.0,
            q975: median + 30.0,
        },
    }
}
