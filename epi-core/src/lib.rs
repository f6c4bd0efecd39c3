//! Core types for epidemic forecast dashboard data.
//!
//! Each source file (locations, ground truth, predictions, nowcast trends,
//! thresholds, evaluation scores) has a typed record and a parser that turns
//! CSV text into a list of those records. Parsers are pure: a field that does
//! not parse becomes `NaN` (or a dropped row when the field is a key), never
//! an error for the whole file.

pub mod ground_truth;
pub mod location;
pub mod nowcast;
pub mod prediction;
pub mod record;
pub mod score;
pub mod season;
pub mod threshold;
pub mod week_range;
