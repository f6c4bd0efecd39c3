use crate::paths;
use crate::report::{LoadReport, SourceOutcome};
use crate::source::SourceRoot;
use anyhow::Context;
use chrono::NaiveDate;
use epi_core::ground_truth::{GroundTruthPoint, HistoricalSnapshot};
use epi_core::location::Location;
use epi_core::nowcast::NowcastTrendSet;
use epi_core::prediction::ModelPredictionSet;
use epi_core::score::EvaluationScorePoint;
use epi_core::season::{generate_seasons, Season};
use epi_core::threshold::Threshold;
use epi_data::gap_fill::fill_missing_weeks;
use epi_data::scores::{aggregate_scores, ModelScoreSeries};
use epi_data::span::DateSpan;
use futures::future::join_all;
use log::{debug, info};

/// Models shown when no other selection is configured.
pub const DEFAULT_MODELS: [&str; 5] = [
    "MOBS-GLEAM_FLUH",
    "CEPH-Rtrend_fluH",
    "MIGHTE-Nsemble",
    "NU_UCSD-GLEAM_AI_FLUH",
    "FluSight-ensemble",
];

/// First week with a published historical ground truth snapshot.
pub fn default_historical_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 9, 23).unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub root: SourceRoot,
    pub models: Vec<String>,
    pub historical_start: NaiveDate,
    /// Snapshots are looked up through one week before this date
    pub as_of: NaiveDate,
}

impl LoadOptions {
    pub fn new(root: SourceRoot, as_of: NaiveDate) -> LoadOptions {
        LoadOptions {
            root,
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            historical_start: default_historical_start(),
            as_of,
        }
    }
}

/// Everything the dashboard shows, loaded once and never mutated.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub locations: Vec<Location>,
    /// Gap filled: one entry per location per week of `span`
    pub ground_truth: Vec<GroundTruthPoint>,
    pub span: Option<DateSpan>,
    /// Oldest first
    pub seasons: Vec<Season>,
    pub predictions: Vec<ModelPredictionSet>,
    pub nowcast_trends: Vec<NowcastTrendSet>,
    pub thresholds: Vec<Threshold>,
    /// Ascending by associated date
    pub historical: Vec<HistoricalSnapshot>,
    pub scores: Vec<ModelScoreSeries>,
    pub report: LoadReport,
}

impl Dataset {
    /// Load every source under `options.root`.
    ///
    /// Locations load first. Ground truth and predictions then load
    /// together, after which the ground truth is gap filled and the seasons
    /// are derived from the combined span. Nowcast trends, thresholds,
    /// historical snapshots and scores load together last. The load as a
    /// whole never fails: each source that cannot be read is recorded as
    /// degraded in [`Dataset::report`] and contributes an empty list.
    pub async fn load(options: &LoadOptions) -> Dataset {
        let root = &options.root;
        let mut report = LoadReport::default();

        let (locations, outcome) =
            load_table(root, paths::LOCATIONS, Location::parse_locations_csv).await;
        report.record("locations", outcome);

        let ((ground_truth, gt_outcome), predictions) = tokio::join!(
            load_table(root, paths::GROUND_TRUTH, GroundTruthPoint::parse_ground_truth_csv),
            join_all(
                options
                    .models
                    .iter()
                    .map(|model| load_model_predictions(root, model))
            ),
        );
        report.record("ground truth", gt_outcome);
        let predictions = predictions
            .into_iter()
            .map(|(set, outcome)| {
                report.record(format!("predictions/{}", set.model_name), outcome);
                set
            })
            .collect::<Vec<_>>();

        let filled = fill_missing_weeks(ground_truth, &predictions, &locations);
        let seasons = filled
            .span
            .map(|span| generate_seasons(span.earliest, span.latest))
            .unwrap_or_default();
        info!("Generated {} seasons", seasons.len());

        let (nowcast_trends, (thresholds, threshold_outcome), (historical, historical_outcome), (wis, wis_outcome), (mape, mape_outcome)) = tokio::join!(
            join_all(
                options
                    .models
                    .iter()
                    .map(|model| load_model_nowcasts(root, model))
            ),
            load_table(root, paths::THRESHOLDS, Threshold::parse_thresholds_csv),
            load_historical(root, options.historical_start, options.as_of),
            load_table(root, paths::WIS_RATIO, EvaluationScorePoint::parse_wis_ratio_csv),
            load_table(root, paths::MAPE, EvaluationScorePoint::parse_mape_csv),
        );
        let nowcast_trends = nowcast_trends
            .into_iter()
            .map(|(set, outcome)| {
                report.record(format!("nowcast trends/{}", set.model_name), outcome);
                set
            })
            .collect::<Vec<_>>();
        report.record("thresholds", threshold_outcome);
        report.record("historical ground truth", historical_outcome);
        report.record("scores/WIS_ratio", wis_outcome);
        report.record("scores/MAPE", mape_outcome);

        Dataset {
            locations,
            ground_truth: filled.data,
            span: filled.span,
            seasons,
            predictions,
            nowcast_trends,
            thresholds,
            historical,
            scores: aggregate_scores(wis, mape),
            report,
        }
    }

    pub fn model_names(&self) -> Vec<&str> {
        self.predictions
            .iter()
            .map(|set| set.model_name.as_str())
            .collect()
    }
}

async fn read_table<T>(
    root: &SourceRoot,
    relative_path: &str,
    parse: fn(&str) -> anyhow::Result<Vec<T>>,
) -> anyhow::Result<Option<Vec<T>>> {
    let Some(text) = root.fetch(relative_path).await? else {
        return Ok(None);
    };
    let rows = parse(&text).with_context(|| format!("failed to parse {}", root.locate(relative_path)))?;
    Ok(Some(rows))
}

async fn load_table<T>(
    root: &SourceRoot,
    relative_path: &str,
    parse: fn(&str) -> anyhow::Result<Vec<T>>,
) -> (Vec<T>, SourceOutcome) {
    match read_table(root, relative_path, parse).await {
        Ok(Some(rows)) => {
            let outcome = SourceOutcome::from_rows(rows.len());
            (rows, outcome)
        }
        Ok(None) => (
            Vec::new(),
            SourceOutcome::Degraded {
                reason: format!("{} not found", root.locate(relative_path)),
            },
        ),
        Err(e) => (
            Vec::new(),
            SourceOutcome::Degraded {
                reason: format!("{:#}", e),
            },
        ),
    }
}

/// A model's predictions are split over a current and an older file. Either
/// may be missing; with neither the model gets an empty set.
async fn load_model_predictions(root: &SourceRoot, model_name: &str) -> (ModelPredictionSet, SourceOutcome) {
    let current_path = paths::predictions(model_name);
    let older_path = paths::older_predictions(model_name);
    let (current, older) = tokio::join!(
        read_table(root, &current_path, ModelPredictionSet::parse_predictions_csv),
        read_table(root, &older_path, ModelPredictionSet::parse_predictions_csv),
    );

    let mut set = ModelPredictionSet::empty(model_name);
    let mut files_found = 0;
    let mut problems = Vec::new();
    for result in [current, older] {
        match result {
            Ok(Some(rows)) => {
                files_found += 1;
                set.prediction_data.extend(rows);
            }
            Ok(None) => {}
            Err(e) => problems.push(format!("{:#}", e)),
        }
    }

    let outcome = if !problems.is_empty() {
        SourceOutcome::Degraded {
            reason: problems.join("; "),
        }
    } else if files_found == 0 {
        SourceOutcome::Degraded {
            reason: format!("no predictions file for {}", model_name),
        }
    } else {
        SourceOutcome::from_rows(set.prediction_data.len())
    };
    (set, outcome)
}

async fn load_model_nowcasts(root: &SourceRoot, model_name: &str) -> (NowcastTrendSet, SourceOutcome) {
    let (data, outcome) = load_table(
        root,
        &paths::nowcast_trends(model_name),
        NowcastTrendSet::parse_nowcast_trends_csv,
    )
    .await;
    let mut set = NowcastTrendSet::empty(model_name);
    set.data = data;
    (set, outcome)
}

/// Weeks without a snapshot file are skipped; they are expected.
async fn load_historical(
    root: &SourceRoot,
    start: NaiveDate,
    as_of: NaiveDate,
) -> (Vec<HistoricalSnapshot>, SourceOutcome) {
    let weeks = paths::snapshot_weeks(start, as_of).collect::<Vec<_>>();
    let results = join_all(weeks.iter().map(|week| async move {
        let path = paths::historical_snapshot(week);
        let result = read_table(root, &path, GroundTruthPoint::parse_ground_truth_csv).await;
        (*week, result)
    }))
    .await;

    let mut snapshots = Vec::new();
    let mut problems = Vec::new();
    for (associated_date, result) in results {
        match result {
            Ok(Some(data)) => snapshots.push(HistoricalSnapshot {
                associated_date,
                data,
            }),
            Ok(None) => debug!("No historical snapshot for {}", associated_date),
            Err(e) => problems.push(format!("{:#}", e)),
        }
    }
    info!(
        "Found {} historical snapshots in {} weeks",
        snapshots.len(),
        weeks.len()
    );

    let outcome = if problems.is_empty() {
        SourceOutcome::from_rows(snapshots.len())
    } else {
        SourceOutcome::Degraded {
            reason: problems.join("; "),
        }
    };
    (snapshots, outcome)
}
