use crate::record::SourceTable;
use chrono::NaiveDate;
use epi_utils::dates::weeks_between;
use serde::{Deserialize, Serialize};

/// Quantile levels published for every forecast point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuantileLevel {
    Q025,
    Q05,
    Q25,
    Q50,
    Q75,
    Q95,
    Q975,
}

impl QuantileLevel {
    pub const ALL: [QuantileLevel; 7] = [
        QuantileLevel::Q025,
        QuantileLevel::Q05,
        QuantileLevel::Q25,
        QuantileLevel::Q50,
        QuantileLevel::Q75,
        QuantileLevel::Q95,
        QuantileLevel::Q975,
    ];

    pub fn probability(&self) -> f64 {
        match self {
            QuantileLevel::Q025 => 0.025,
            QuantileLevel::Q05 => 0.05,
            QuantileLevel::Q25 => 0.25,
            QuantileLevel::Q50 => 0.5,
            QuantileLevel::Q75 => 0.75,
            QuantileLevel::Q95 => 0.95,
            QuantileLevel::Q975 => 0.975,
        }
    }

    /// Header of the column carrying this level in predictions files.
    pub fn column_name(&self) -> &'static str {
        match self {
            QuantileLevel::Q025 => "0.025",
            QuantileLevel::Q05 => "0.05",
            QuantileLevel::Q25 => "0.25",
            QuantileLevel::Q50 => "0.5",
            QuantileLevel::Q75 => "0.75",
            QuantileLevel::Q95 => "0.95",
            QuantileLevel::Q975 => "0.975",
        }
    }
}

/// Forecast values keyed by quantile level. Missing levels are `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quantiles {
    pub q025: f64,
    pub q05: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub q95: f64,
    pub q975: f64,
}

impl Quantiles {
    pub fn get(&self, level: QuantileLevel) -> f64 {
        match level {
            QuantileLevel::Q025 => self.q025,
            QuantileLevel::Q05 => self.q05,
            QuantileLevel::Q25 => self.q25,
            QuantileLevel::Q50 => self.q50,
            QuantileLevel::Q75 => self.q75,
            QuantileLevel::Q95 => self.q95,
            QuantileLevel::Q975 => self.q975,
        }
    }

    pub fn median(&self) -> f64 {
        self.q50
    }

    /// Build from a lookup of each level's value.
    pub fn from_fn(mut value: impl FnMut(QuantileLevel) -> f64) -> Quantiles {
        Quantiles {
            q025: value(QuantileLevel::Q025),
            q05: value(QuantileLevel::Q05),
            q25: value(QuantileLevel::Q25),
            q50: value(QuantileLevel::Q50),
            q75: value(QuantileLevel::Q75),
            q95: value(QuantileLevel::Q95),
            q975: value(QuantileLevel::Q975),
        }
    }
}

/// One forecast: what a model issued on `reference_date` for the week
/// ending `target_end_date` at one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionPoint {
    pub reference_date: NaiveDate,
    pub target_end_date: NaiveDate,
    pub location_id: String,
    pub quantiles: Quantiles,
}

impl PredictionPoint {
    /// Weeks between issue and target, rounded.
    pub fn horizon_weeks(&self) -> i64 {
        weeks_between(&self.reference_date, &self.target_end_date)
    }
}

/// All predictions of one forecasting model, unsorted. Several reference
/// dates and horizons coexist in the same list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelPredictionSet {
    pub model_name: String,
    pub prediction_data: Vec<PredictionPoint>,
}

impl ModelPredictionSet {
    pub fn empty(model_name: &str) -> Self {
        ModelPredictionSet {
            model_name: model_name.to_string(),
            prediction_data: Vec::new(),
        }
    }

    /// Parse a CSV string of one model's predictions.
    ///
    /// Expected CSV columns: reference_date, target_end_date, location,
    /// 0.025, 0.05, 0.25, 0.5, 0.75, 0.95, 0.975
    ///
    /// Rows without usable dates or location are skipped, as are rows whose
    /// target end date precedes the reference date.
    pub fn parse_predictions_csv(csv_data: &str) -> anyhow::Result<Vec<PredictionPoint>> {
        let table = SourceTable::parse(csv_data)?;
        let reference_date = table.required_column("reference_date")?;
        let target_end_date = table.required_column("target_end_date")?;
        let location = table.required_column("location")?;
        let levels = QuantileLevel::ALL.map(|level| table.column(level.column_name()));

        let mut points = Vec::with_capacity(table.rows().len());
        let mut skipped = 0u32;
        let mut inverted = 0u32;
        for row in table.rows() {
            let location_id = location.text(row);
            let (Some(reference), Some(target)) = (reference_date.date(row), target_end_date.date(row))
            else {
                skipped += 1;
                continue;
            };
            if location_id.is_empty() {
                skipped += 1;
                continue;
            }
            if target < reference {
                inverted += 1;
                continue;
            }
            let quantiles = Quantiles::from_fn(|level| levels[level as usize].number(row));
            points.push(PredictionPoint {
                reference_date: reference,
                target_end_date: target,
                location_id: location_id.to_string(),
                quantiles,
            });
        }
        if inverted > 0 {
            log::warn!(
                "predictions: dropped {} rows with target_end_date before reference_date",
                inverted
            );
        }
        log::info!(
            "predictions: loaded {} rows, skipped {}",
            points.len(),
            skipped
        );
        Ok(points)
    }
}
