use chrono::{Datelike, NaiveDate};
use epi_utils::dates::{format_date, season_bounds};
use serde::Serialize;

/// An epidemiological season runs from August 1 to July 31 and is the
/// window the dashboard offers for bucketing a full cycle of data.
///
/// `time_value` is the `"<start>/<end>"` key a season selection control
/// hands back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Season {
    pub index: usize,
    pub display_string: String,
    pub time_value: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Season {
    fn new(display_string: String, start_date: NaiveDate, end_date: NaiveDate) -> Season {
        Season {
            index: 0,
            time_value: format!("{}/{}", format_date(&start_date), format_date(&end_date)),
            display_string,
            start_date,
            end_date,
        }
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.start_date <= *date && *date <= self.end_date
    }
}

/// Derive the selectable seasons from the overall data span, oldest first.
///
/// Seasons are clipped to `earliest..=latest`. A season whose clipped end is
/// the latest date but short of July 31 is labelled "(Ongoing)"; one whose
/// clipped start is later than August 1 is labelled "Partial". When the
/// latest date is already past July 31 of its year, the next season is
/// emitted as an extra "(Ongoing)" entry.
pub fn generate_seasons(earliest: NaiveDate, latest: NaiveDate) -> Vec<Season> {
    let mut seasons = Vec::new();
    if earliest > latest {
        return seasons;
    }

    let mut year = latest.year();
    let Some((_, mut season_end)) = season_bounds(year) else {
        return seasons;
    };

    if latest > season_end {
        if let Some((next_start, _)) = season_bounds(year + 1) {
            seasons.push(Season::new(
                format!("{}-{} (Ongoing)", year, year + 1),
                next_start.max(earliest),
                latest,
            ));
        }
    }

    while season_end >= earliest {
        let Some((season_start, _)) = season_bounds(year) else {
            break;
        };
        let adjusted_start = season_start.max(earliest);
        let adjusted_end = season_end.min(latest);

        let mut display_string = format!("{}-{}", year - 1, year);
        if adjusted_end == latest && latest < season_end {
            display_string.push_str(" (Ongoing)");
        } else if adjusted_start == earliest && earliest > season_start {
            display_string = format!("Partial {}", display_string);
        }
        seasons.push(Season::new(display_string, adjusted_start, adjusted_end));

        year -= 1;
        season_end = match season_bounds(year) {
            Some((_, end)) => end,
            None => break,
        };
    }

    seasons.reverse();
    for (index, season) in seasons.iter_mut().enumerate() {
        season.index = index;
    }
    seasons
}

/// Look up the season a selection control refers to by its `time_value`.
pub fn find_season<'a>(seasons: &'a [Season], time_value: &str) -> Option<&'a Season> {
    seasons.iter().find(|season| season.time_value == time_value)
}

/// The season a fresh view starts on: the most recent one.
pub fn default_season(seasons: &[Season]) -> Option<&Season> {
    seasons.last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn assert_contiguous(seasons: &[Season]) {
        for pair in seasons.windows(2) {
            assert_eq!(pair[0].end_date + TimeDelta::days(1), pair[1].start_date);
        }
        for (i, season) in seasons.iter().enumerate() {
            assert_eq!(season.index, i);
            assert!(season.start_date <= season.end_date);
        }
    }

    #[test]
    fn test_exactly_one_season_year() {
        let seasons = generate_seasons(ymd(2023, 8, 1), ymd(2024, 7, 31));
        assert_eq!(seasons.len(), 1);
        assert_eq!(seasons[0].display_string, "2023-2024");
        assert_eq!(seasons[0].time_value, "2023-08-01/2024-07-31");
    }

    #[test]
    fn test_ongoing_season_within_one_year() {
        let seasons = generate_seasons(ymd(2023, 10, 7), ymd(2024, 5, 18));
        assert_eq!(seasons.len(), 1);
        assert_eq!(seasons[0].display_string, "2023-2024 (Ongoing)");
        assert_eq!(seasons[0].start_date, ymd(2023, 10, 7));
        assert_eq!(seasons[0].end_date, ymd(2024, 5, 18));
    }

    #[test]
    fn test_multiple_seasons_with_leading_ongoing() {
        let seasons = generate_seasons(ymd(2022, 10, 1), ymd(2024, 9, 14));
        let labels: Vec<&str> = seasons.iter().map(|s| s.display_string.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Partial 2022-2023", "2023-2024", "2024-2025 (Ongoing)"]
        );
        assert_eq!(seasons[0].start_date, ymd(2022, 10, 1));
        assert_eq!(seasons[0].end_date, ymd(2023, 7, 31));
        assert_eq!(seasons[2].start_date, ymd(2024, 8, 1));
        assert_eq!(seasons[2].end_date, ymd(2024, 9, 14));
        assert_contiguous(&seasons);
    }

    #[test]
    fn test_seasons_cover_span() {
        let earliest = ymd(2019, 12, 28);
        let latest = ymd(2024, 3, 2);
        let seasons = generate_seasons(earliest, latest);
        assert_eq!(seasons.len(), 5);
        assert_eq!(seasons.first().unwrap().start_date, earliest);
        assert_eq!(seasons.last().unwrap().end_date, latest);
        assert_contiguous(&seasons);
    }

    #[test]
    fn test_single_day_span() {
        let day = ymd(2024, 1, 6);
        let seasons = generate_seasons(day, day);
        assert_eq!(seasons.len(), 1);
        assert_eq!(seasons[0].start_date, day);
        assert_eq!(seasons[0].end_date, day);

        let august = ymd(2024, 8, 10);
        let seasons = generate_seasons(august, august);
        assert_eq!(seasons.len(), 1);
        assert_eq!(seasons[0].display_string, "2024-2025 (Ongoing)");
        assert_eq!(seasons[0].start_date, august);
    }

    #[test]
    fn test_inverted_span_is_empty() {
        assert!(generate_seasons(ymd(2024, 1, 13), ymd(2024, 1, 6)).is_empty());
    }

    #[test]
    fn test_find_and_default_season() {
        let seasons = generate_seasons(ymd(2022, 10, 1), ymd(2024, 9, 14));
        let found = find_season(&seasons, "2023-08-01/2024-07-31").unwrap();
        assert_eq!(found.display_string, "2023-2024");
        assert!(found.contains(&ymd(2024, 1, 6)));
        assert!(!found.contains(&ymd(2024, 8, 1)));
        assert!(find_season(&seasons, "nope").is_none());
        assert_eq!(default_season(&seasons).unwrap().index, 2);
    }
}
