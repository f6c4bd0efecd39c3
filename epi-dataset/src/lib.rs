//! Loading of the dashboard's source files and the derived views built on
//! top of them.
//!
//! [`dataset::Dataset::load`] fetches every source (from a local directory
//! or over HTTP), parses it with the `epi-core` parsers and runs gap
//! filling and season generation once. A source that cannot be loaded
//! degrades to an empty list and is recorded in the [`report::LoadReport`];
//! it never aborts the load of its siblings.
//!
//! [`dashboard::Dashboard`] serves the per-filter views from the immutable
//! dataset and tags each with a request generation so stale results can be
//! dropped.

pub mod dashboard;
pub mod dataset;
pub mod paths;
pub mod report;
pub mod source;
pub mod views;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::dataset::LoadOptions;
    use crate::source::SourceRoot;
    use chrono::NaiveDate;

    /// Options reading the fixture tree in `fixtures/sample`.
    pub fn sample_options() -> LoadOptions {
        let root = SourceRoot::directory(concat!(env!("CARGO_MANIFEST_DIR"), "/../fixtures/sample"));
        let as_of = NaiveDate::from_ymd_opt(2023, 10, 17).unwrap();
        let mut options = LoadOptions::new(root, as_of);
        options.models = vec![
            "MOBS-GLEAM_FLUH".to_string(),
            "CEPH-Rtrend_fluH".to_string(),
            "NU_UCSD-GLEAM_AI_FLUH".to_string(),
        ];
        options
    }
}
