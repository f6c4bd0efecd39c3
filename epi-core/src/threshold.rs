use crate::record::SourceTable;
use serde::Serialize;

/// Admission levels at which a location moves into the medium, high and
/// very high activity bands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Threshold {
    pub location_id: String,
    pub medium: f64,
    pub high: f64,
    pub very_high: f64,
}

impl Threshold {
    /// Parse `thresholds.csv`.
    ///
    /// Expected CSV columns: Location, Medium, High, Very High
    pub fn parse_thresholds_csv(csv_data: &str) -> anyhow::Result<Vec<Threshold>> {
        let table = SourceTable::parse(csv_data)?;
        let location = table.required_column("Location")?;
        let medium = table.column("Medium");
        let high = table.column("High");
        let very_high = table.column("Very High");

        let thresholds = table
            .rows()
            .iter()
            .filter(|row| !location.text(row).is_empty())
            .map(|row| Threshold {
                location_id: location.text(row).to_string(),
                medium: medium.number(row),
                high: high.number(row),
                very_high: very_high.number(row),
            })
            .collect::<Vec<_>>();
        log::info!("thresholds: loaded {} rows", thresholds.len());
        Ok(thresholds)
    }
}

#[cfg(test)]
mod tests {
    use super::Threshold;

    #[test]
    fn test_parse_thresholds() {
        let csv = "Location,Medium,High,Very High\n06,1.5,3.2,5\n36,2,,6\n";
        let thresholds = Threshold::parse_thresholds_csv(csv).unwrap();
        assert_eq!(thresholds.len(), 2);
        assert_eq!(thresholds[0].very_high, 5.0);
        assert!(thresholds[1].high.is_nan());
    }
}
