use crate::record::SourceTable;
use serde::{Deserialize, Serialize};

/// A reporting jurisdiction (a state, territory or the national total)
/// from `locations.csv`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Location {
    /// FIPS-style location code, e.g. "06" for California or "US"
    pub location_id: String,
    pub abbreviation: String,
    pub location_name: String,
    /// `NaN` when the population column does not parse
    pub population: f64,
}

impl Location {
    /// Parse a CSV string of location metadata.
    ///
    /// Expected CSV columns: location, abbreviation, location_name, population
    pub fn parse_locations_csv(csv_data: &str) -> anyhow::Result<Vec<Location>> {
        let table = SourceTable::parse(csv_data)?;
        let location = table.required_column("location")?;
        let abbreviation = table.column("abbreviation");
        let location_name = table.column("location_name");
        let population = table.column("population");

        let mut locations = Vec::with_capacity(table.rows().len());
        let mut skipped = 0u32;
        for row in table.rows() {
            let location_id = location.text(row);
            if location_id.is_empty() {
                skipped += 1;
                continue;
            }
            locations.push(Location {
                location_id: location_id.to_string(),
                abbreviation: abbreviation.text(row).to_string(),
                location_name: location_name.text(row).to_string(),
                population: population.number(row),
            });
        }
        log::info!(
            "locations: loaded {} rows, skipped {}",
            locations.len(),
            skipped
        );
        Ok(locations)
    }
}
