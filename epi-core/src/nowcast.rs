use crate::record::SourceTable;
use chrono::NaiveDate;
use serde::Serialize;

/// Probability that admissions at a location will decrease, stay stable or
/// increase, as nowcast on `reference_date`.
///
/// The three values come straight from the source and are not guaranteed to
/// sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NowcastTrendPoint {
    pub location_id: String,
    pub reference_date: NaiveDate,
    pub decrease: f64,
    pub stable: f64,
    pub increase: f64,
}

/// Every nowcast trend published by one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NowcastTrendSet {
    pub model_name: String,
    pub data: Vec<NowcastTrendPoint>,
}

impl NowcastTrendSet {
    pub fn empty(model_name: &str) -> Self {
        NowcastTrendSet {
            model_name: model_name.to_string(),
            data: Vec::new(),
        }
    }

    /// Parse a CSV string of one model's nowcast trends.
    ///
    /// Expected CSV columns: location, reference_date, decrease, increase, stable
    pub fn parse_nowcast_trends_csv(csv_data: &str) -> anyhow::Result<Vec<NowcastTrendPoint>> {
        let table = SourceTable::parse(csv_data)?;
        let location = table.required_column("location")?;
        let reference_date = table.required_column("reference_date")?;
        let decrease = table.column("decrease");
        let increase = table.column("increase");
        let stable = table.column("stable");

        let mut trends = Vec::with_capacity(table.rows().len());
        let mut skipped = 0u32;
        for row in table.rows() {
            let location_id = location.text(row);
            match reference_date.date(row) {
                Some(date) if !location_id.is_empty() => trends.push(NowcastTrendPoint {
                    location_id: location_id.to_string(),
                    reference_date: date,
                    decrease: decrease.number(row),
                    stable: stable.number(row),
                    increase: increase.number(row),
                }),
                _ => skipped += 1,
            }
        }
        log::info!(
            "nowcast trends: loaded {} rows, skipped {}",
            trends.len(),
            skipped
        );
        Ok(trends)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nowcast_trends() {
        let csv = "\
location,reference_date,decrease,increase,stable
06,2024-01-06,0.2,0.5,0.3
36,2024-01-06,0.333,0.333,0.333
US,bad,0.1,0.1,0.8
";
        let trends = NowcastTrendSet::parse_nowcast_trends_csv(csv).unwrap();
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].decrease, 0.2);
        assert_eq!(trends[0].stable, 0.3);
        assert_eq!(trends[0].increase, 0.5);
        // no renormalization
        let sum = trends[1].decrease + trends[1].stable + trends[1].increase;
        assert!((sum - 0.999).abs() < 1e-9);
    }
}
