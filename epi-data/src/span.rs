use chrono::NaiveDate;
use epi_core::ground_truth::GroundTruthPoint;
use epi_core::prediction::ModelPredictionSet;
use serde::Serialize;

/// The overall extent of the loaded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateSpan {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

impl DateSpan {
    fn include(span: Option<DateSpan>, earliest: NaiveDate, latest: NaiveDate) -> Option<DateSpan> {
        Some(match span {
            None => DateSpan { earliest, latest },
            Some(span) => DateSpan {
                earliest: span.earliest.min(earliest),
                latest: span.latest.max(latest),
            },
        })
    }
}

/// Earliest date across ground truth dates and prediction reference dates;
/// latest across ground truth dates and prediction target end dates.
///
/// Returns `None` when there is nothing dated at all.
pub fn combined_span(
    ground_truth: &[GroundTruthPoint],
    predictions: &[ModelPredictionSet],
) -> Option<DateSpan> {
    let mut span = None;
    for point in ground_truth {
        span = DateSpan::include(span, point.date, point.date);
    }
    for point in predictions.iter().flat_map(|set| &set.prediction_data) {
        span = DateSpan::include(span, point.reference_date, point.target_end_date);
    }
    span
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{gt, prediction, ymd};

    #[test]
    fn test_span_over_both_sources() {
        let ground_truth = vec![gt("2023-11-04", "06", 10.0), gt("2024-05-11", "06", 4.0)];
        let predictions = vec![ModelPredictionSet {
            model_name: "A".to_string(),
            prediction_data: vec![
                prediction("2023-10-07", "2023-10-14", "06", 5.0),
                prediction("2024-04-27", "2024-05-18", "06", 5.0),
            ],
        }];
        let span = combined_span(&ground_truth, &predictions).unwrap();
        assert_eq!(span.earliest, ymd(2023, 10, 7));
        assert_eq!(span.latest, ymd(2024, 5, 18));
    }

    #[test]
    fn test_span_of_parsed_sources() {
        let ground_truth = GroundTruthPoint::parse_ground_truth_csv(
            "date,location,location_name,value,weekly_rate\n\
             2023-10-07,06,California,120,0.31\n\
             2024-01-06,06,California,-1,0\n\
             2024-05-11,06,California,40,0.1\n",
        )
        .unwrap();
        let predictions = vec![ModelPredictionSet {
            model_name: "A".to_string(),
            prediction_data: ModelPredictionSet::parse_predictions_csv(
                "reference_date,target_end_date,location,0.025,0.05,0.25,0.5,0.75,0.95,0.975\n\
                 2024-04-27,2024-05-04,06,1,2,3,4,5,6,7\n\
                 2024-04-27,2024-05-18,06,1,2,3,4,5,6,7\n",
            )
            .unwrap(),
        }];
        let span = combined_span(&ground_truth, &predictions).unwrap();
        assert_eq!(span.earliest, ymd(2023, 10, 7));
        assert_eq!(span.latest, ymd(2024, 5, 18));
    }

    #[test]
    fn test_empty_inputs_have_no_span() {
        assert_eq!(combined_span(&[], &[]), None);
        let predictions = vec![ModelPredictionSet::empty("A")];
        assert_eq!(combined_span(&[], &predictions), None);
    }
}
