use chrono::NaiveDate;
use epi_core::nowcast::{NowcastTrendPoint, NowcastTrendSet};
use serde::Serialize;

/// The trend probabilities to display, or the fact that there are none.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrendSelection {
    Found(NowcastTrendPoint),
    NoData,
}

impl TrendSelection {
    pub fn point(&self) -> Option<&NowcastTrendPoint> {
        match self {
            TrendSelection::Found(point) => Some(point),
            TrendSelection::NoData => None,
        }
    }
}

/// Find the trend `model_name` nowcast for `location_id` on exactly
/// `reference_week`. There is no nearest-date fallback.
pub fn select_trend(
    trends: &[NowcastTrendSet],
    model_name: &str,
    location_id: &str,
    reference_week: NaiveDate,
) -> TrendSelection {
    trends
        .iter()
        .filter(|set| set.model_name == model_name)
        .flat_map(|set| &set.data)
        .find(|p| p.location_id == location_id && p.reference_date == reference_week)
        .map_or(TrendSelection::NoData, |p| TrendSelection::Found(p.clone()))
}
