//! Forecast filter-and-project: turns the loaded predictions into the
//! per-model confidence band series a forecast chart draws.

use crate::domain::{finite_extent, ValueDomain};
use crate::window::DateWindow;
use chrono::NaiveDate;
use epi_core::ground_truth::GroundTruthPoint;
use epi_core::prediction::{ModelPredictionSet, PredictionPoint, QuantileLevel};
use epi_utils::dates::add_weeks;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A symmetric confidence band around the median.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfidenceInterval {
    Fifty,
    Ninety,
    NinetyFive,
}

impl ConfidenceInterval {
    pub const ALL: [ConfidenceInterval; 3] = [
        ConfidenceInterval::Fifty,
        ConfidenceInterval::Ninety,
        ConfidenceInterval::NinetyFive,
    ];

    /// Width of the band in percent.
    pub fn level(&self) -> u8 {
        match self {
            ConfidenceInterval::Fifty => 50,
            ConfidenceInterval::Ninety => 90,
            ConfidenceInterval::NinetyFive => 95,
        }
    }

    /// Quantiles bounding the band.
    pub fn quantile_pair(&self) -> (QuantileLevel, QuantileLevel) {
        match self {
            ConfidenceInterval::Fifty => (QuantileLevel::Q25, QuantileLevel::Q75),
            ConfidenceInterval::Ninety => (QuantileLevel::Q05, QuantileLevel::Q95),
            ConfidenceInterval::NinetyFive => (QuantileLevel::Q025, QuantileLevel::Q975),
        }
    }
}

impl fmt::Display for ConfidenceInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.level())
    }
}

impl FromStr for ConfidenceInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_end_matches('%') {
            "50" => Ok(ConfidenceInterval::Fifty),
            "90" => Ok(ConfidenceInterval::Ninety),
            "95" => Ok(ConfidenceInterval::NinetyFive),
            other => Err(format!(
                "unknown confidence interval '{}', expected 50, 90 or 95",
                other
            )),
        }
    }
}

impl Serialize for ConfidenceInterval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.level())
    }
}

/// How forecasts are laid out on the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DisplayMode {
    /// Every forecast of one reference week, plotted by target end date
    #[default]
    ByDate,
    /// Not implemented; projects to an empty result
    ByHorizon,
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "bydate" | "date" => Ok(DisplayMode::ByDate),
            "byhorizon" | "horizon" => Ok(DisplayMode::ByHorizon),
            other => Err(format!("unknown display mode '{}'", other)),
        }
    }
}

/// A snapshot of the forecast view's controls.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastFilter {
    pub location_id: String,
    pub models: Vec<String>,
    /// Forecasts issued on this date are shown
    pub reference_week: NaiveDate,
    /// Targets later than `reference_week + weeks_ahead` weeks are cut
    pub weeks_ahead: u32,
    pub intervals: Vec<ConfidenceInterval>,
    pub display_mode: DisplayMode,
    /// Ground truth is restricted to this window
    pub window: DateWindow,
}

/// One target week of a confidence band series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntervalPoint {
    pub date: NaiveDate,
    pub median: f64,
    pub low: f64,
    pub high: f64,
}

/// The points of one model drawn with one confidence band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalSeries {
    pub interval: ConfidenceInterval,
    pub data: Vec<IntervalPoint>,
}

/// Series per model name. Only models with at least one matching forecast
/// are present.
pub type ProjectedForecasts = BTreeMap<String, Vec<IntervalSeries>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionStatus {
    Projected,
    NoMatchingData,
    ModeNotSpecified,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastProjection {
    pub status: ProjectionStatus,
    pub series: ProjectedForecasts,
}

impl ForecastProjection {
    fn empty(status: ProjectionStatus) -> ForecastProjection {
        ForecastProjection {
            status,
            series: BTreeMap::new(),
        }
    }
}

/// Everything the forecast chart draws for one filter snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastView {
    pub ground_truth: Vec<GroundTruthPoint>,
    pub projection: ForecastProjection,
}

/// Ground truth of one location inside the window. Placeholder weeks are
/// kept so the gaps stay visible.
pub fn filter_ground_truth(
    ground_truth: &[GroundTruthPoint],
    location_id: &str,
    window: &DateWindow,
) -> Vec<GroundTruthPoint> {
    ground_truth
        .iter()
        .filter(|p| p.location_id == location_id && window.contains(&p.date))
        .cloned()
        .collect()
}

/// Project the selected models' forecasts into confidence band series.
///
/// A forecast is kept when it is for the filter's location, was issued on
/// the reference week and targets a date between the reference week and
/// `weeks_ahead` weeks later (inclusive). Each selected model then gets one
/// series per requested interval, ascending by target date. Intervals are
/// emitted in ascending width no matter the request order.
pub fn project_forecasts(
    predictions: &[ModelPredictionSet],
    filter: &ForecastFilter,
) -> ForecastProjection {
    if filter.display_mode == DisplayMode::ByHorizon {
        log::debug!("forecast projection: by-horizon display has no projection");
        return ForecastProjection::empty(ProjectionStatus::ModeNotSpecified);
    }

    let mut intervals = filter.intervals.clone();
    intervals.sort();
    intervals.dedup();

    let cutoff = add_weeks(&filter.reference_week, i64::from(filter.weeks_ahead))
        .unwrap_or(NaiveDate::MAX);
    let mut series = BTreeMap::new();
    for set in predictions {
        if !filter.models.contains(&set.model_name) || series.contains_key(&set.model_name) {
            continue;
        }
        let mut points: Vec<&PredictionPoint> = set
            .prediction_data
            .iter()
            .filter(|p| {
                p.location_id == filter.location_id
                    && p.reference_date == filter.reference_week
                    && p.target_end_date >= p.reference_date
                    && p.target_end_date <= cutoff
            })
            .collect();
        if points.is_empty() {
            continue;
        }
        points.sort_by_key(|p| p.target_end_date);

        let model_series = intervals
            .iter()
            .map(|interval| {
                let (low, high) = interval.quantile_pair();
                IntervalSeries {
                    interval: *interval,
                    data: points
                        .iter()
                        .map(|p| IntervalPoint {
                            date: p.target_end_date,
                            median: p.quantiles.median(),
                            low: p.quantiles.get(low),
                            high: p.quantiles.get(high),
                        })
                        .collect(),
                }
            })
            .collect::<Vec<_>>();
        series.insert(set.model_name.clone(), model_series);
    }

    let status = if series.is_empty() {
        ProjectionStatus::NoMatchingData
    } else {
        ProjectionStatus::Projected
    };
    log::debug!(
        "forecast projection: {} models for location {} issued {}",
        series.len(),
        filter.location_id,
        filter.reference_week
    );
    ForecastProjection { status, series }
}

/// Filter the ground truth and project the forecasts for one snapshot.
pub fn forecast_view(
    ground_truth: &[GroundTruthPoint],
    predictions: &[ModelPredictionSet],
    filter: &ForecastFilter,
) -> ForecastView {
    ForecastView {
        ground_truth: filter_ground_truth(ground_truth, &filter.location_id, &filter.window),
        projection: project_forecasts(predictions, filter),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisScale {
    #[default]
    Linear,
    Log,
}

impl FromStr for AxisScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Ok(AxisScale::Linear),
            "log" => Ok(AxisScale::Log),
            other => Err(format!("unknown axis scale '{}'", other)),
        }
    }
}

/// Y axis domain of the forecast chart.
///
/// The upper bound is the largest observation or band upper bound. A linear
/// axis starts at zero; a log axis starts at the smallest positive
/// observation, falling back to the smallest positive band upper bound.
/// Placeholder and unparsed weeks never count.
pub fn value_domain(view: &ForecastView, scale: AxisScale) -> Option<ValueDomain> {
    let observed = view
        .ground_truth
        .iter()
        .filter_map(|p| p.admissions.reported());
    let highs = view
        .projection
        .series
        .values()
        .flatten()
        .flat_map(|s| s.data.iter().map(|p| p.high));
    let (_, upper) = finite_extent(observed.clone().chain(highs.clone()))?;

    match scale {
        AxisScale::Linear => Some(ValueDomain::new(0.0, upper)),
        AxisScale::Log => {
            let lower = finite_extent(observed.filter(|v| *v > 0.0))
                .or_else(|| finite_extent(highs.filter(|v| *v > 0.0)))
                .map(|(lo, _)| lo)?;
            Some(ValueDomain::new(lower, upper.max(lower)))
        }
    }
}
