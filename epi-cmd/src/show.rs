use crate::Command;
use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use epi_core::ground_truth::GroundTruthPoint;
use epi_core::location::Location;
use epi_core::season::{default_season, find_season, Season};
use epi_core::threshold::Threshold;
use epi_data::domain::ValueDomain;
use epi_data::forecast::{value_domain, AxisScale, ForecastFilter, ForecastView};
use epi_data::nowcast::TrendSelection;
use epi_data::scores::ScoreFilter;
use epi_data::span::DateSpan;
use epi_data::window::DateWindow;
use epi_dataset::dashboard::Dashboard;
use epi_dataset::dataset::{Dataset, LoadOptions};
use epi_dataset::report::LoadReport;
use epi_dataset::views::{HorizonQuery, HorizonView, ScoreView};
use log::info;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ModelSummary<'a> {
    pub model_name: &'a str,
    pub predictions: usize,
    pub nowcast_trends: usize,
}

#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub span: Option<DateSpan>,
    pub locations: usize,
    pub ground_truth_rows: usize,
    pub seasons: usize,
    pub models: Vec<ModelSummary<'a>>,
    pub historical_snapshots: usize,
    pub score_series: usize,
    pub report: &'a LoadReport,
}

#[derive(Debug, Serialize)]
pub struct ForecastOutput<'a> {
    pub location: Option<&'a Location>,
    pub season: &'a Season,
    pub reference_week: NaiveDate,
    pub scale: AxisScale,
    pub domain: Option<ValueDomain>,
    /// Ground truth as published in the reference week, when a snapshot exists
    pub historical: Option<Vec<GroundTruthPoint>>,
    #[serde(flatten)]
    pub view: ForecastView,
}

#[derive(Debug, Serialize)]
pub struct HorizonOutput<'a> {
    pub model_name: &'a str,
    pub horizon: u32,
    pub season: &'a Season,
    #[serde(flatten)]
    pub view: HorizonView,
}

#[derive(Debug, Serialize)]
pub struct NowcastOutput<'a> {
    pub model_name: &'a str,
    pub location: Option<&'a Location>,
    pub reference_week: NaiveDate,
    pub trend: TrendSelection,
    pub threshold: Option<&'a Threshold>,
}

#[derive(Debug, Serialize)]
pub struct ScoresOutput<'a> {
    pub season: &'a Season,
    #[serde(flatten)]
    pub view: ScoreView,
}

pub async fn run_command(options: &LoadOptions, command: Command) -> anyhow::Result<()> {
    info!(
        "Loading {} models from {}",
        options.models.len(),
        options.root.locate("")
    );
    let dashboard = Dashboard::new(Dataset::load(options).await);
    let dataset = dashboard.dataset();
    let json = match command {
        Command::Summary => to_json(&summary(&dataset))?,
        Command::Seasons => to_json(&dataset.seasons)?,
        Command::Forecast {
            location,
            models,
            reference_week,
            weeks_ahead,
            intervals,
            display_mode,
            scale,
            season,
        } => {
            let season = select_season(&dataset, season.as_deref())?;
            let models = if models.is_empty() {
                dataset.model_names().iter().map(|m| m.to_string()).collect()
            } else {
                models
            };
            let reference_week = reference_week
                .or_else(|| latest_reference_week(&dataset, &models, &location))
                .unwrap_or(season.end_date);
            let filter = ForecastFilter {
                location_id: location.clone(),
                models,
                reference_week,
                weeks_ahead,
                intervals,
                display_mode,
                window: DateWindow::from(season),
            };
            let view = accept(&dashboard, |d| d.forecast(&filter))?;
            to_json(&ForecastOutput {
                location: dataset.location(&location),
                season,
                reference_week,
                scale,
                domain: value_domain(&view, scale),
                historical: dataset.historical_snapshot(reference_week, &location),
                view,
            })?
        }
        Command::Horizon {
            model,
            location,
            horizon,
            season,
        } => {
            let season = select_season(&dataset, season.as_deref())?;
            let query = HorizonQuery {
                model_name: model.clone(),
                location_id: location,
                horizon,
                window: DateWindow::from(season),
            };
            let view = accept(&dashboard, |d| d.horizon(&query))?;
            to_json(&HorizonOutput {
                model_name: &model,
                horizon,
                season,
                view,
            })?
        }
        Command::Nowcast {
            model,
            location,
            reference_week,
        } => {
            let trend = accept(&dashboard, |d| d.nowcast(&model, &location, reference_week))?;
            to_json(&NowcastOutput {
                model_name: &model,
                location: dataset.location(&location),
                reference_week,
                trend,
                threshold: dataset.threshold(&location),
            })?
        }
        Command::Scores {
            model,
            metric,
            location,
            horizon,
            season,
        } => {
            let season = select_season(&dataset, season.as_deref())?;
            let filter = ScoreFilter {
                model_name: model,
                score_metric: metric,
                location_id: location,
                horizon,
                window: DateWindow::from(season),
            };
            let view = accept(&dashboard, |d| d.scores(&filter))?;
            to_json(&ScoresOutput { season, view })?
        }
    };
    println!("{}", json);
    Ok(())
}

pub fn summary(dataset: &Dataset) -> Summary<'_> {
    Summary {
        span: dataset.span,
        locations: dataset.locations.len(),
        ground_truth_rows: dataset.ground_truth.len(),
        seasons: dataset.seasons.len(),
        models: dataset
            .predictions
            .iter()
            .map(|set| ModelSummary {
                model_name: &set.model_name,
                predictions: set.prediction_data.len(),
                nowcast_trends: dataset
                    .nowcast_trends
                    .iter()
                    .find(|trends| trends.model_name == set.model_name)
                    .map_or(0, |trends| trends.data.len()),
            })
            .collect(),
        historical_snapshots: dataset.historical.len(),
        score_series: dataset.scores.len(),
        report: &dataset.report,
    }
}

/// The season a `--season` value names, or the newest one.
pub fn select_season<'a>(dataset: &'a Dataset, time_value: Option<&str>) -> anyhow::Result<&'a Season> {
    match time_value {
        Some(time_value) => find_season(&dataset.seasons, time_value).ok_or_else(|| {
            let known = dataset
                .seasons
                .iter()
                .map(|s| s.time_value.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            anyhow!("unknown season '{}', expected one of: {}", time_value, known)
        }),
        None => default_season(&dataset.seasons)
            .ok_or_else(|| anyhow!("no seasons: the data source has no dated ground truth or predictions")),
    }
}

/// The newest week any of `models` issued a forecast for `location_id`;
/// the forecast view opens on it.
pub fn latest_reference_week(dataset: &Dataset, models: &[String], location_id: &str) -> Option<NaiveDate> {
    dataset
        .predictions
        .iter()
        .filter(|set| models.contains(&set.model_name))
        .flat_map(|set| &set.prediction_data)
        .filter(|p| p.location_id == location_id)
        .map(|p| p.reference_date)
        .max()
}

fn accept<T>(dashboard: &Dashboard, view: impl FnOnce(&Dataset) -> T) -> anyhow::Result<T> {
    let result = dashboard.compute(view);
    let generation = result.generation;
    dashboard
        .accept(result)
        .with_context(|| format!("result {} was superseded", generation))
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
