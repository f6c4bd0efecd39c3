use crate::domain::{finite_extent, ValueDomain};
use crate::window::DateWindow;
use chrono::NaiveDate;
use epi_core::score::{EvaluationScorePoint, ScoreMetric};
use serde::Serialize;
use std::collections::HashMap;

/// One score of a model's series; model and metric live on the series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreDataPoint {
    pub reference_date: NaiveDate,
    pub location_id: String,
    pub horizon: Option<i32>,
    pub score: f64,
}

/// Every score of one model for one metric, ascending by reference date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelScoreSeries {
    pub model_name: String,
    pub score_metric: ScoreMetric,
    pub score_data: Vec<ScoreDataPoint>,
}

/// Group raw scores into one series per (metric, model).
///
/// Ratio groups come before percent groups. Within each source, groups
/// appear in the order their model first shows up. The sort by reference
/// date is stable, so same-day scores keep their source order.
pub fn aggregate_scores(
    ratio_scores: Vec<EvaluationScorePoint>,
    percent_scores: Vec<EvaluationScorePoint>,
) -> Vec<ModelScoreSeries> {
    let mut series: Vec<ModelScoreSeries> = Vec::new();
    let mut index: HashMap<(ScoreMetric, String), usize> = HashMap::new();

    for point in ratio_scores.into_iter().chain(percent_scores) {
        let key = (point.score_metric, point.model_name);
        let position = match index.get(&key) {
            Some(position) => *position,
            None => {
                series.push(ModelScoreSeries {
                    model_name: key.1.clone(),
                    score_metric: key.0,
                    score_data: Vec::new(),
                });
                index.insert(key, series.len() - 1);
                series.len() - 1
            }
        };
        series[position].score_data.push(ScoreDataPoint {
            reference_date: point.reference_date,
            location_id: point.location_id,
            horizon: point.horizon,
            score: point.score,
        });
    }

    for group in series.iter_mut() {
        group.score_data.sort_by_key(|p| p.reference_date);
    }
    log::info!("scores: aggregated {} model series", series.len());
    series
}

/// Selection of one line of the evaluation chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreFilter {
    pub model_name: String,
    pub score_metric: ScoreMetric,
    pub location_id: String,
    pub horizon: i32,
    pub window: DateWindow,
}

/// The scores one chart line draws, ascending by reference date.
pub fn filter_scores(series: &[ModelScoreSeries], filter: &ScoreFilter) -> Vec<ScoreDataPoint> {
    series
        .iter()
        .filter(|s| s.model_name == filter.model_name && s.score_metric == filter.score_metric)
        .flat_map(|s| &s.score_data)
        .filter(|p| {
            p.location_id == filter.location_id
                && p.horizon == Some(filter.horizon)
                && filter.window.contains(&p.reference_date)
        })
        .cloned()
        .collect()
}

/// Date axis of the evaluation chart: the dates holding a finite score,
/// clamped to the window. The whole window when there are none.
pub fn score_date_range(points: &[ScoreDataPoint], window: &DateWindow) -> DateWindow {
    let dates = points
        .iter()
        .filter(|p| p.score.is_finite())
        .map(|p| p.reference_date);
    let first = dates.clone().min();
    let last = dates.max();
    match (first, last) {
        (Some(first), Some(last)) => {
            DateWindow::new(first.max(window.start), last.min(window.end))
        }
        _ => *window,
    }
}

/// Y axis of a ratio chart, kept symmetric around 1.0 so "better" and
/// "worse" than baseline get equal room.
pub fn centered_score_domain(points: &[ScoreDataPoint]) -> Option<ValueDomain> {
    let (lo, hi) = finite_extent(points.iter().map(|p| p.score))?;
    Some(ValueDomain::new(lo.min(1.0 - (hi - 1.0)), hi.max(1.0 + (1.0 - lo))))
}
