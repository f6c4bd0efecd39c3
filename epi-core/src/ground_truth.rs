use crate::record::SourceTable;
use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// Admissions value that marks a week with no observation.
pub const PLACEHOLDER_ADMISSIONS: f64 = -1.0;

/// Weekly hospital admissions for one location.
/// - `Reported(f64)`: an observed count (zero is a real observation)
/// - `Placeholder`: a week with no data, inserted by gap filling or written as -1 upstream
/// - `Unparsed`: the source value was not a number
///
/// Serializes as a bare number: the count, `-1` for placeholders, `null`
/// for unparsed values.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Admissions {
    Reported(f64),
    Placeholder,
    Unparsed,
}

impl Admissions {
    pub fn from_raw(value: f64) -> Admissions {
        if !value.is_finite() {
            Admissions::Unparsed
        } else if value == PLACEHOLDER_ADMISSIONS {
            Admissions::Placeholder
        } else {
            Admissions::Reported(value)
        }
    }

    /// The observed count, if there is one. Placeholders and unparsed
    /// values never take part in extents or scales.
    pub fn reported(&self) -> Option<f64> {
        match self {
            Admissions::Reported(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Admissions::Reported(v) => *v,
            Admissions::Placeholder => PLACEHOLDER_ADMISSIONS,
            Admissions::Unparsed => f64::NAN,
        }
    }
}

impl Serialize for Admissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

/// One week of observed hospital admissions for a location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundTruthPoint {
    /// Saturday closing the reporting week
    pub date: NaiveDate,
    pub location_id: String,
    pub location_name: String,
    pub admissions: Admissions,
    /// Admissions per 100k population
    pub weekly_rate: f64,
}

impl GroundTruthPoint {
    /// A stand-in entry for a week with no observation.
    pub fn placeholder(date: NaiveDate, location_id: &str, location_name: &str) -> Self {
        GroundTruthPoint {
            date,
            location_id: location_id.to_string(),
            location_name: location_name.to_string(),
            admissions: Admissions::Placeholder,
            weekly_rate: 0.0,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.admissions == Admissions::Placeholder
    }

    /// Parse a CSV string of ground truth observations. The current
    /// target file and each weekly historical snapshot share this format.
    ///
    /// Expected CSV columns: date, location, location_name, value, weekly_rate
    ///
    /// Rows without a usable date or location are skipped.
    pub fn parse_ground_truth_csv(csv_data: &str) -> anyhow::Result<Vec<GroundTruthPoint>> {
        let table = SourceTable::parse(csv_data)?;
        let date = table.required_column("date")?;
        let location = table.required_column("location")?;
        let location_name = table.column("location_name");
        let value = table.column("value");
        let weekly_rate = table.column("weekly_rate");

        let mut points = Vec::with_capacity(table.rows().len());
        let mut skipped = 0u32;
        for row in table.rows() {
            let location_id = location.text(row);
            let Some(date) = date.date(row) else {
                skipped += 1;
                continue;
            };
            if location_id.is_empty() {
                skipped += 1;
                continue;
            }
            points.push(GroundTruthPoint {
                date,
                location_id: location_id.to_string(),
                location_name: location_name.text(row).to_string(),
                admissions: Admissions::from_raw(value.number(row)),
                weekly_rate: weekly_rate.number(row),
            });
        }
        if skipped > 0 {
            log::warn!("ground truth: skipped {} rows without a date or location", skipped);
        }
        log::info!("ground truth: loaded {} rows", points.len());
        Ok(points)
    }
}

/// The ground truth as it was published in a given week, before later
/// revisions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalSnapshot {
    pub associated_date: NaiveDate,
    pub data: Vec<GroundTruthPoint>,
}
