use crate::record::{parse_number, Column, SourceTable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The evaluation metrics published for each model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScoreMetric {
    /// Weighted interval score relative to the baseline model; 1.0 means
    /// "as good as baseline".
    #[serde(rename = "WIS_Ratio")]
    WisRatio,
    /// Mean absolute percentage error, stored as a percentage.
    #[serde(rename = "MAPE")]
    Mape,
}

impl ScoreMetric {
    pub fn label(&self) -> &'static str {
        match self {
            ScoreMetric::WisRatio => "WIS_Ratio",
            ScoreMetric::Mape => "MAPE",
        }
    }

    /// Whether source values are fractions that get scaled to percent.
    pub fn is_percent(&self) -> bool {
        matches!(self, ScoreMetric::Mape)
    }
}

impl fmt::Display for ScoreMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ScoreMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "wis_ratio" | "wis" => Ok(ScoreMetric::WisRatio),
            "mape" => Ok(ScoreMetric::Mape),
            other => Err(format!("unknown score metric '{}'", other)),
        }
    }
}

/// One evaluation score of a model, for one location, reference date and
/// horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationScorePoint {
    pub model_name: String,
    pub score_metric: ScoreMetric,
    pub reference_date: NaiveDate,
    pub location_id: String,
    /// `None` when the horizon column does not hold a whole number
    pub horizon: Option<i32>,
    pub score: f64,
}

impl EvaluationScorePoint {
    /// Parse `WIS_ratio.csv`.
    ///
    /// Expected CSV columns: Model, reference_date, location, wis_ratio, horizon
    pub fn parse_wis_ratio_csv(csv_data: &str) -> anyhow::Result<Vec<EvaluationScorePoint>> {
        let table = SourceTable::parse(csv_data)?;
        let columns = ScoreColumns {
            model: table.required_column("Model")?,
            reference_date: table.required_column("reference_date")?,
            location: table.required_column("location")?,
            score: table.column("wis_ratio"),
            horizon: table.column("horizon"),
        };
        Ok(columns.collect(&table, ScoreMetric::WisRatio))
    }

    /// Parse `MAPE.csv`. Note the capital `L` in its location column.
    /// Scores arrive as fractions and are scaled to percent here.
    ///
    /// Expected CSV columns: Model, reference_date, Location, MAPE, horizon
    pub fn parse_mape_csv(csv_data: &str) -> anyhow::Result<Vec<EvaluationScorePoint>> {
        let table = SourceTable::parse(csv_data)?;
        let columns = ScoreColumns {
            model: table.required_column("Model")?,
            reference_date: table.required_column("reference_date")?,
            location: table.required_column("Location")?,
            score: table.column("MAPE"),
            horizon: table.column("horizon"),
        };
        Ok(columns.collect(&table, ScoreMetric::Mape))
    }
}

struct ScoreColumns {
    model: Column,
    reference_date: Column,
    location: Column,
    score: Column,
    horizon: Column,
}

impl ScoreColumns {
    fn collect(&self, table: &SourceTable, metric: ScoreMetric) -> Vec<EvaluationScorePoint> {
        let scale = if metric.is_percent() { 100.0 } else { 1.0 };
        let mut points = Vec::with_capacity(table.rows().len());
        let mut skipped = 0u32;
        for row in table.rows() {
            let model_name = self.model.text(row);
            let Some(reference_date) = self.reference_date.date(row) else {
                skipped += 1;
                continue;
            };
            if model_name.is_empty() {
                skipped += 1;
                continue;
            }
            points.push(EvaluationScorePoint {
                model_name: model_name.to_string(),
                score_metric: metric,
                reference_date,
                location_id: self.location.text(row).to_string(),
                horizon: parse_horizon(self.horizon.text(row)),
                score: self.score.number(row) * scale,
            });
        }
        log::info!(
            "{} scores: loaded {} rows, skipped {}",
            metric,
            points.len(),
            skipped
        );
        points
    }
}

fn parse_horizon(s: &str) -> Option<i32> {
    let value = parse_number(s);
    if value.is_finite() && value.fract() == 0.0 {
        Some(value as i32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIS: &str = "\
Model,reference_date,location,wis_ratio,horizon
MOBS-GLEAM_FLUH,2024-01-06,06,0.85,0
MOBS-GLEAM_FLUH,2024-01-13,06,1.2,1.0
,2024-01-13,06,1.2,1
";

    const MAPE: &str = "\
Model,reference_date,Location,MAPE,horizon
MOBS-GLEAM_FLUH,2024-01-06,06,0.0523,2
MOBS-GLEAM_FLUH,2024-01-06,06,oops,x
";

    #[test]
    fn test_ratio_scores_pass_through() {
        let points = EvaluationScorePoint::parse_wis_ratio_csv(WIS).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].score, 0.85);
        assert_eq!(points[0].score_metric, ScoreMetric::WisRatio);
        assert_eq!(points[0].horizon, Some(0));
        assert_eq!(points[1].horizon, Some(1));
    }

    #[test]
    fn test_percent_scores_are_scaled() {
        let points = EvaluationScorePoint::parse_mape_csv(MAPE).unwrap();
        assert_eq!(points.len(), 2);
        assert!((points[0].score - 5.23).abs() < 1e-9);
        assert_eq!(points[0].location_id, "06");
        assert_eq!(points[0].score_metric, ScoreMetric::Mape);
        assert!(points[1].score.is_nan());
        assert_eq!(points[1].horizon, None);
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!("MAPE".parse::<ScoreMetric>().unwrap(), ScoreMetric::Mape);
        assert_eq!("wis-ratio".parse::<ScoreMetric>().unwrap(), ScoreMetric::WisRatio);
        assert_eq!("WIS_Ratio".parse::<ScoreMetric>().unwrap(), ScoreMetric::WisRatio);
        assert!("crps".parse::<ScoreMetric>().is_err());
    }
}
