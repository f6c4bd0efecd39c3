use anyhow::bail;
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use epi_utils::dates::parse_date;

/// A parsed CSV source: the header row plus every data row as raw strings.
///
/// Columns are looked up by name, so sources may reorder columns or add
/// extra ones freely.
#[derive(Debug, Clone)]
pub struct SourceTable {
    header: Vec<String>,
    rows: Vec<StringRecord>,
}

/// A resolved column position. A column missing from the header reads as
/// an empty string on every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column(Option<usize>);

impl SourceTable {
    /// Parse CSV text with a header row. Blank input yields an empty table.
    pub fn parse(csv_data: &str) -> anyhow::Result<SourceTable> {
        if csv_data.trim().is_empty() {
            return Ok(SourceTable {
                header: Vec::new(),
                rows: Vec::new(),
            });
        }
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(csv_data.as_bytes());
        let header = rdr
            .headers()?
            .iter()
            .map(|name| name.trim_start_matches('\u{feff}').to_string())
            .collect();
        let rows = rdr.records().collect::<Result<Vec<_>, _>>()?;
        Ok(SourceTable { header, rows })
    }

    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve a column by exact name, falling back to a case-insensitive
    /// match (`location` vs `Location`).
    pub fn column(&self, name: &str) -> Column {
        let exact = self.header.iter().position(|h| h == name);
        Column(exact.or_else(|| {
            self.header
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
        }))
    }

    /// Like [`column`](Self::column), but a table with rows and no such
    /// column is an error: the source cannot be keyed without it.
    pub fn required_column(&self, name: &str) -> anyhow::Result<Column> {
        let column = self.column(name);
        if column.0.is_none() && !self.rows.is_empty() {
            bail!("missing required column '{}'", name);
        }
        Ok(column)
    }
}

impl Column {
    pub fn text<'r>(&self, row: &'r StringRecord) -> &'r str {
        self.0.and_then(|i| row.get(i)).unwrap_or("")
    }

    /// Numeric value of the field; anything unparseable is `NaN`.
    pub fn number(&self, row: &StringRecord) -> f64 {
        parse_number(self.text(row))
    }

    pub fn date(&self, row: &StringRecord) -> Option<NaiveDate> {
        parse_date(self.text(row)).ok()
    }
}

/// Lossless float parse that maps failures to `NaN`.
pub fn parse_number(s: &str) -> f64 {
    s.trim().parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
Model,reference_date,Location,MAPE
A,2024-01-06,06,0.05
B,2024-01-13,36,n/a
";

    #[test]
    fn test_columns_resolve_by_name_and_case() {
        let table = SourceTable::parse(TABLE).unwrap();
        assert_eq!(table.rows().len(), 2);
        let location = table.column("location");
        let model = table.column("Model");
        assert_eq!(location.text(&table.rows()[0]), "06");
        assert_eq!(model.text(&table.rows()[1]), "B");
    }

    #[test]
    fn test_unparseable_numbers_become_nan() {
        let table = SourceTable::parse(TABLE).unwrap();
        let mape = table.column("MAPE");
        assert_eq!(mape.number(&table.rows()[0]), 0.05);
        assert!(mape.number(&table.rows()[1]).is_nan());
        let absent = table.column("horizon");
        assert!(absent.number(&table.rows()[0]).is_nan());
        assert_eq!(absent.text(&table.rows()[0]), "");
    }

    #[test]
    fn test_required_column() {
        let table = SourceTable::parse(TABLE).unwrap();
        assert!(table.required_column("reference_date").is_ok());
        assert!(table.required_column("target_end_date").is_err());
        let blank = SourceTable::parse("   \n").unwrap();
        assert!(blank.is_empty());
        assert!(blank.required_column("target_end_date").is_ok());
    }
}
