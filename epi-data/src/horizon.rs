use crate::window::DateWindow;
use chrono::{NaiveDate, NaiveTime};
use epi_core::ground_truth::GroundTruthPoint;
use epi_core::prediction::{ModelPredictionSet, PredictionPoint};
use epi_utils::dates::add_weeks;
use serde::Serialize;
use std::collections::BTreeMap;

/// How far a target end date may sit from the exact weekly offset and still
/// count as that horizon.
const TARGET_TOLERANCE_MINUTES: i64 = 2 * 60;

/// The forecast a model issued on `date` for a fixed number of weeks ahead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HorizonPoint {
    /// Reference date the forecast was issued on
    pub date: NaiveDate,
    pub median: f64,
    pub quantile05: f64,
    pub quantile25: f64,
    pub quantile75: f64,
    pub quantile95: f64,
}

impl HorizonPoint {
    fn from_prediction(point: &PredictionPoint) -> HorizonPoint {
        let q = &point.quantiles;
        HorizonPoint {
            date: point.reference_date,
            median: q.median(),
            quantile05: q.q05,
            quantile25: q.q25,
            quantile75: q.q75,
            quantile95: q.q95,
        }
    }
}

/// Whether `point` targets exactly `horizon` weeks after its reference date.
///
/// Both checks must hold: the target is within two hours of reference plus
/// `horizon` weeks, and the rounded week difference equals `horizon`.
pub fn matches_horizon(point: &PredictionPoint, horizon: u32) -> bool {
    let Some(expected) = add_weeks(&point.reference_date, i64::from(horizon)) else {
        return false;
    };
    let expected = expected.and_time(NaiveTime::MIN);
    let target = point.target_end_date.and_time(NaiveTime::MIN);
    let close_enough = (target - expected).num_minutes().abs() <= TARGET_TOLERANCE_MINUTES;
    close_enough && point.horizon_weeks() == i64::from(horizon)
}

/// For every reference date in the window, pick the model's forecast for
/// `location_id` that targets `horizon` weeks ahead.
///
/// Reference dates without such a forecast are left out. When several
/// forecasts of one reference date match, the first in source order wins.
/// The result is ascending by reference date.
pub fn align_horizon(
    predictions: &[ModelPredictionSet],
    model_name: &str,
    location_id: &str,
    horizon: u32,
    window: &DateWindow,
) -> Vec<HorizonPoint> {
    let Some(set) = predictions.iter().find(|set| set.model_name == model_name) else {
        log::debug!("horizon alignment: no predictions loaded for {}", model_name);
        return Vec::new();
    };

    let mut by_reference: BTreeMap<NaiveDate, Vec<&PredictionPoint>> = BTreeMap::new();
    for point in set
        .prediction_data
        .iter()
        .filter(|p| p.location_id == location_id && window.contains(&p.reference_date))
    {
        by_reference.entry(point.reference_date).or_default().push(point);
    }

    by_reference
        .values()
        .filter_map(|points| points.iter().find(|p| matches_horizon(p, horizon)))
        .map(|p| HorizonPoint::from_prediction(p))
        .collect()
}

/// The part of the window where both ground truth and the model's forecasts
/// exist for the location.
///
/// Runs from the later of the first observation and the first forecast
/// reference date to the earlier of the last of each. Placeholder weeks are
/// not data. Returns `None` when either source has no data in the window or
/// the two do not overlap.
pub fn actual_data_range(
    ground_truth: &[GroundTruthPoint],
    predictions: &[ModelPredictionSet],
    model_name: &str,
    location_id: &str,
    window: &DateWindow,
) -> Option<DateWindow> {
    let observed = ground_truth
        .iter()
        .filter(|p| p.location_id == location_id && window.contains(&p.date))
        .filter(|p| p.admissions.reported().is_some())
        .map(|p| p.date);
    let forecast = predictions
        .iter()
        .filter(|set| set.model_name == model_name)
        .flat_map(|set| &set.prediction_data)
        .filter(|p| p.location_id == location_id && window.contains(&p.reference_date))
        .map(|p| p.reference_date);

    let (gt_first, gt_last) = date_extent(observed).unwrap_or((window.end, window.start));
    let (pred_first, pred_last) = date_extent(forecast).unwrap_or((window.end, window.start));
    let range = DateWindow::new(gt_first.max(pred_first), gt_last.min(pred_last));
    if range.is_empty() {
        None
    } else {
        Some(range)
    }
}

fn date_extent(dates: impl Iterator<Item = NaiveDate>) -> Option<(NaiveDate, NaiveDate)> {
    dates.fold(None, |extent, d| match extent {
        None => Some((d, d)),
        Some((first, last)) => Some((first.min(d), last.max(d))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{date, gt, prediction, ymd};

    fn season() -> DateWindow {
        DateWindow::new(ymd(2023, 8, 1), ymd(2024, 7, 31))
    }

    fn model(points: Vec<PredictionPoint>) -> Vec<ModelPredictionSet> {
        vec![ModelPredictionSet {
            model_name: "MIGHTE-Nsemble".to_string(),
            prediction_data: points,
        }]
    }

    #[test]
    fn test_horizon_match_requires_exact_weeks() {
        let hit = prediction("2024-01-06", "2024-01-20", "06", 1.0);
        assert!(matches_horizon(&hit, 2));
        assert!(!matches_horizon(&prediction("2024-01-06", "2024-01-13", "06", 1.0), 2));
        assert!(!matches_horizon(&prediction("2024-01-06", "2024-01-27", "06", 1.0), 2));
        // one day off rounds to the same week but is outside the tolerance
        assert!(!matches_horizon(&prediction("2024-01-06", "2024-01-21", "06", 1.0), 2));
        assert!(matches_horizon(&prediction("2024-01-06", "2024-01-06", "06", 1.0), 0));
    }

    #[test]
    fn test_horizon_past_the_calendar_never_matches() {
        let point = prediction("2024-01-06", "2024-01-20", "06", 1.0);
        assert!(!matches_horizon(&point, u32::MAX));
        let late = PredictionPoint {
            reference_date: NaiveDate::MAX,
            target_end_date: NaiveDate::MAX,
            ..point
        };
        assert!(!matches_horizon(&late, 1));
    }

    #[test]
    fn test_align_picks_one_point_per_reference_date() {
        let predictions = model(vec![
            prediction("2024-01-13", "2024-01-27", "06", 20.0),
            prediction("2024-01-06", "2024-01-13", "06", 9.0),
            prediction("2024-01-06", "2024-01-20", "06", 10.0),
            prediction("2024-01-06", "2024-01-20", "06", 11.0),
            prediction("2024-01-20", "2024-01-27", "06", 30.0),
            prediction("2024-01-06", "2024-01-20", "36", 99.0),
            prediction("2023-07-29", "2023-08-12", "06", 5.0),
        ]);
        let points = align_horizon(&predictions, "MIGHTE-Nsemble", "06", 2, &season());
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, date("2024-01-06"));
        assert_eq!(points[0].median, 10.0);
        assert_eq!(points[0].quantile05, -10.0);
        assert_eq!(points[0].quantile95, 30.0);
        assert_eq!(points[1].date, date("2024-01-13"));
        assert_eq!(points[1].median, 20.0);

        // stable across repeated calls
        let again = align_horizon(&predictions, "MIGHTE-Nsemble", "06", 2, &season());
        assert_eq!(points, again);
    }

    #[test]
    fn test_align_unknown_model_is_empty() {
        let predictions = model(vec![prediction("2024-01-06", "2024-01-20", "06", 10.0)]);
        assert!(align_horizon(&predictions, "nobody", "06", 2, &season()).is_empty());
        assert!(align_horizon(&predictions, "MIGHTE-Nsemble", "06", 3, &season()).is_empty());
    }

    #[test]
    fn test_actual_range_is_the_overlap() {
        let ground_truth = vec![
            gt("2023-10-07", "06", 10.0),
            gt("2024-05-18", "06", 10.0),
            gt("2024-05-25", "06", -1.0),
            gt("2023-09-02", "36", 10.0),
        ];
        let predictions = model(vec![
            prediction("2023-11-04", "2023-11-11", "06", 1.0),
            prediction("2024-06-01", "2024-06-08", "06", 1.0),
        ]);
        let range =
            actual_data_range(&ground_truth, &predictions, "MIGHTE-Nsemble", "06", &season())
                .unwrap();
        assert_eq!(range, DateWindow::new(date("2023-11-04"), date("2024-05-18")));
    }

    #[test]
    fn test_actual_range_without_overlap_is_none() {
        let ground_truth = vec![gt("2023-10-07", "06", 10.0), gt("2024-05-18", "06", 10.0)];
        let range = actual_data_range(&ground_truth, &[], "MIGHTE-Nsemble", "06", &season());
        assert_eq!(range, None);

        let predictions = model(vec![prediction("2024-01-06", "2024-01-13", "06", 1.0)]);
        let disjoint = vec![gt("2023-10-07", "06", 10.0)];
        let range = actual_data_range(&disjoint, &predictions, "MIGHTE-Nsemble", "06", &season());
        assert_eq!(range, None);
    }
}
