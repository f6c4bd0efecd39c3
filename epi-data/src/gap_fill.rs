use crate::span::{combined_span, DateSpan};
use chrono::NaiveDate;
use epi_core::ground_truth::GroundTruthPoint;
use epi_core::location::Location;
use epi_core::prediction::ModelPredictionSet;
use epi_core::week_range::WeekRange;
use serde::Serialize;
use std::collections::HashSet;

/// Ground truth after gap filling, with the span the grid was built on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilledGroundTruth {
    pub data: Vec<GroundTruthPoint>,
    pub span: Option<DateSpan>,
}

/// Make sure every location has an entry for every Saturday of the loaded
/// data span.
///
/// The grid runs from the Saturday on or before the earliest date to the
/// Saturday on or before the latest date, where both ends come from
/// [`combined_span`]. Missing `(week, location)` pairs get a placeholder
/// entry. Existing entries are never altered; when a pair occurs twice the
/// first occurrence is kept. The locations covered are those in
/// `locations` plus any extra ones that only appear in the ground truth.
///
/// The result is sorted by date, then location id.
pub fn fill_missing_weeks(
    ground_truth: Vec<GroundTruthPoint>,
    predictions: &[ModelPredictionSet],
    locations: &[Location],
) -> FilledGroundTruth {
    let span = combined_span(&ground_truth, predictions);

    let mut seen: HashSet<(NaiveDate, String)> = HashSet::with_capacity(ground_truth.len());
    let mut data = Vec::with_capacity(ground_truth.len());
    let mut duplicates = 0u32;
    for point in ground_truth {
        if seen.insert((point.date, point.location_id.clone())) {
            data.push(point);
        } else {
            duplicates += 1;
        }
    }
    if duplicates > 0 {
        log::warn!(
            "gap fill: dropped {} duplicate (date, location) ground truth rows",
            duplicates
        );
    }

    if let Some(span) = span {
        let names = location_names(&data, locations);
        let mut filled = 0usize;
        for week in WeekRange::saturdays(span.earliest, span.latest) {
            for (location_id, location_name) in &names {
                if !seen.contains(&(week, location_id.clone())) {
                    data.push(GroundTruthPoint::placeholder(week, location_id, location_name));
                    filled += 1;
                }
            }
        }
        log::info!(
            "gap fill: inserted {} placeholder weeks for {} locations",
            filled,
            names.len()
        );
    }

    data.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.location_id.cmp(&b.location_id))
    });
    FilledGroundTruth { data, span }
}

/// Locations to fill in order, each with the display name placeholders
/// carry. Names from the location table win over names in the data.
fn location_names(ground_truth: &[GroundTruthPoint], locations: &[Location]) -> Vec<(String, String)> {
    let mut names = Vec::with_capacity(locations.len());
    let mut listed: HashSet<&str> = HashSet::with_capacity(locations.len());
    let table = locations
        .iter()
        .map(|l| (l.location_id.as_str(), l.location_name.as_str()));
    let observed = ground_truth
        .iter()
        .map(|p| (p.location_id.as_str(), p.location_name.as_str()));
    for (location_id, location_name) in table.chain(observed) {
        if listed.insert(location_id) {
            names.push((location_id.to_string(), location_name.to_string()));
        }
    }
    names
}
