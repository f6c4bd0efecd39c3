//! The per-filter views the dashboard renders. Each is a pure function of
//! the immutable [`Dataset`] and a filter snapshot.

use crate::dataset::Dataset;
use chrono::NaiveDate;
use epi_core::ground_truth::GroundTruthPoint;
use epi_core::location::Location;
use epi_core::score::ScoreMetric;
use epi_core::threshold::Threshold;
use epi_data::domain::{finite_extent, ValueDomain};
use epi_data::forecast::{forecast_view, ForecastFilter, ForecastView};
use epi_data::horizon::{actual_data_range, align_horizon, HorizonPoint};
use epi_data::nowcast::{select_trend, TrendSelection};
use epi_data::scores::{
    centered_score_domain, filter_scores, score_date_range, ScoreDataPoint, ScoreFilter,
};
use epi_data::window::DateWindow;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct HorizonQuery {
    pub model_name: String,
    pub location_id: String,
    pub horizon: u32,
    pub window: DateWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HorizonView {
    pub points: Vec<HorizonPoint>,
    /// Where both ground truth and the model have data; `None` without overlap
    pub actual_range: Option<DateWindow>,
    /// Observations in the range the points are drawn over
    pub ground_truth: Vec<GroundTruthPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreView {
    pub points: Vec<ScoreDataPoint>,
    pub date_range: DateWindow,
    pub domain: Option<ValueDomain>,
}

impl Dataset {
    pub fn location(&self, location_id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.location_id == location_id)
    }

    pub fn threshold(&self, location_id: &str) -> Option<&Threshold> {
        self.thresholds.iter().find(|t| t.location_id == location_id)
    }

    pub fn forecast(&self, filter: &ForecastFilter) -> ForecastView {
        forecast_view(&self.ground_truth, &self.predictions, filter)
    }

    /// A model's fixed-horizon forecasts over the window, narrowed to the
    /// range where it and the ground truth overlap when they do.
    pub fn horizon(&self, query: &HorizonQuery) -> HorizonView {
        let actual_range = actual_data_range(
            &self.ground_truth,
            &self.predictions,
            &query.model_name,
            &query.location_id,
            &query.window,
        );
        let range = actual_range.unwrap_or(query.window);
        let points = align_horizon(
            &self.predictions,
            &query.model_name,
            &query.location_id,
            query.horizon,
            &range,
        );
        let ground_truth = self
            .ground_truth
            .iter()
            .filter(|p| p.location_id == query.location_id && range.contains(&p.date))
            .cloned()
            .collect();
        HorizonView {
            points,
            actual_range,
            ground_truth,
        }
    }

    pub fn nowcast(&self, model_name: &str, location_id: &str, reference_week: NaiveDate) -> TrendSelection {
        select_trend(&self.nowcast_trends, model_name, location_id, reference_week)
    }

    /// One model's scores for a location and horizon, with the axes to draw
    /// them on. Ratio scores get a domain centred on 1.0; percent scores one
    /// starting at zero.
    pub fn scores(&self, filter: &ScoreFilter) -> ScoreView {
        let points = filter_scores(&self.scores, filter);
        let date_range = score_date_range(&points, &filter.window);
        let domain = match filter.score_metric {
            ScoreMetric::WisRatio => centered_score_domain(&points),
            ScoreMetric::Mape => finite_extent(points.iter().map(|p| p.score))
                .map(|(_, upper)| ValueDomain::new(0.0, upper)),
        };
        ScoreView {
            points,
            date_range,
            domain,
        }
    }

    /// The ground truth of a location as it was published on
    /// `associated_date`, if a snapshot of that week exists.
    pub fn historical_snapshot(&self, associated_date: NaiveDate, location_id: &str) -> Option<Vec<GroundTruthPoint>> {
        self.historical
            .iter()
            .find(|s| s.associated_date == associated_date)
            .map(|s| {
                s.data
                    .iter()
                    .filter(|p| p.location_id == location_id)
                    .cloned()
                    .collect()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_options;
    use epi_data::forecast::{ConfidenceInterval, DisplayMode, ProjectionStatus};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn sample() -> Dataset {
        Dataset::load(&sample_options()).await
    }

    fn season(dataset: &Dataset) -> DateWindow {
        DateWindow::from(dataset.seasons.last().unwrap())
    }

    #[tokio::test]
    async fn test_forecast_view() {
        let dataset = sample().await;
        let filter = ForecastFilter {
            location_id: "06".to_string(),
            models: vec!["MOBS-GLEAM_FLUH".to_string(), "CEPH-Rtrend_fluH".to_string()],
            reference_week: ymd(2023, 10, 14),
            weeks_ahead: 3,
            intervals: vec![ConfidenceInterval::Fifty, ConfidenceInterval::NinetyFive],
            display_mode: DisplayMode::ByDate,
            window: season(&dataset),
        };
        let view = dataset.forecast(&filter);
        assert_eq!(view.projection.status, ProjectionStatus::Projected);
        assert_eq!(view.projection.series.len(), 2);
        assert_eq!(view.projection.series["MOBS-GLEAM_FLUH"][0].data.len(), 3);
        assert_eq!(view.projection.series["CEPH-Rtrend_fluH"][0].data.len(), 2);
        // the gap week stays in the series
        assert_eq!(view.ground_truth.len(), 6);
        assert!(view.ground_truth.iter().any(|p| p.is_placeholder()));
    }

    #[tokio::test]
    async fn test_horizon_view_is_narrowed() {
        let dataset = sample().await;
        let query = HorizonQuery {
            model_name: "MOBS-GLEAM_FLUH".to_string(),
            location_id: "06".to_string(),
            horizon: 1,
            window: season(&dataset),
        };
        let view = dataset.horizon(&query);
        assert_eq!(
            view.actual_range,
            Some(DateWindow::new(ymd(2023, 10, 7), ymd(2023, 10, 14)))
        );
        let dates: Vec<NaiveDate> = view.points.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![ymd(2023, 10, 7), ymd(2023, 10, 14)]);
        assert_eq!(view.ground_truth.len(), 2);
    }

    #[tokio::test]
    async fn test_nowcast_view() {
        let dataset = sample().await;
        let found = dataset.nowcast("MOBS-GLEAM_FLUH", "06", ymd(2023, 10, 14));
        assert_eq!(found.point().unwrap().increase, 0.6);
        let missing = dataset.nowcast("CEPH-Rtrend_fluH", "06", ymd(2023, 10, 14));
        assert_eq!(missing, TrendSelection::NoData);
    }

    #[tokio::test]
    async fn test_score_view() {
        let dataset = sample().await;
        let filter = ScoreFilter {
            model_name: "MOBS-GLEAM_FLUH".to_string(),
            score_metric: ScoreMetric::WisRatio,
            location_id: "06".to_string(),
            horizon: 1,
            window: season(&dataset),
        };
        let view = dataset.scores(&filter);
        assert_eq!(view.points.len(), 2);
        assert_eq!(view.date_range, DateWindow::new(ymd(2023, 10, 7), ymd(2023, 10, 14)));
        assert_eq!(view.domain, Some(ValueDomain::new(0.5, 1.5)));

        let percent = ScoreFilter {
            score_metric: ScoreMetric::Mape,
            ..filter
        };
        let view = dataset.scores(&percent);
        assert_eq!(view.points.len(), 1);
        assert_eq!(view.domain.unwrap().lower, 0.0);
    }

    #[tokio::test]
    async fn test_lookups() {
        let dataset = sample().await;
        assert_eq!(dataset.location("06").unwrap().location_name, "California");
        assert_eq!(dataset.threshold("06").unwrap().very_high, 6.0);
        assert!(dataset.threshold("US").is_none());

        let snapshot = dataset.historical_snapshot(ymd(2023, 10, 7), "06").unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(dataset.historical_snapshot(ymd(2023, 9, 30), "06").is_none());
    }
}
