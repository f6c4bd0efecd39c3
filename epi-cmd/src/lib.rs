//! Command implementations for the epi dashboard CLI.
//!
//! Every command loads the dataset once, computes one view and prints it
//! as a JSON document on stdout.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use epi_core::score::ScoreMetric;
use epi_data::forecast::{AxisScale, ConfidenceInterval, DisplayMode};
use epi_utils::dates::parse_date;
use std::path::PathBuf;

pub mod config;
pub mod show;

use config::{DashboardConfig, DataLocation};

/// Where the data comes from and how to read it.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Directory holding the data tree
    #[arg(long, conflicts_with = "base_url", required_unless_present = "base_url")]
    pub data_dir: Option<PathBuf>,

    /// Base URL the data tree is served from
    #[arg(long)]
    pub base_url: Option<String>,

    /// JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Date to treat as today (defaults to the local date)
    #[arg(long, value_parser = parse_date_arg)]
    pub as_of: Option<NaiveDate>,
}

impl SourceArgs {
    fn data_location(&self) -> anyhow::Result<DataLocation> {
        match (&self.data_dir, &self.base_url) {
            (Some(dir), None) => Ok(DataLocation::Directory(dir.clone())),
            (None, Some(url)) => Ok(DataLocation::Url(url.clone())),
            _ => anyhow::bail!("exactly one of --data-dir or --base-url is required"),
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Overview of what was loaded and how every source resolved
    Summary,

    /// Seasons available for selection
    Seasons,

    /// Ground truth and confidence bands for one reference week
    Forecast {
        #[arg(short = 'l', long, default_value = "US")]
        location: String,

        /// Models to show (defaults to every loaded model)
        #[arg(short = 'm', long = "model", value_delimiter = ',')]
        models: Vec<String>,

        /// Forecast issue week (defaults to the latest one available)
        #[arg(short = 'r', long, value_parser = parse_date_arg)]
        reference_week: Option<NaiveDate>,

        #[arg(short = 'w', long, default_value_t = 3)]
        weeks_ahead: u32,

        /// Confidence intervals: 50, 90, 95
        #[arg(short = 'i', long = "interval", value_delimiter = ',', default_values_t = ConfidenceInterval::ALL)]
        intervals: Vec<ConfidenceInterval>,

        #[arg(long, default_value = "by-date")]
        display_mode: DisplayMode,

        #[arg(long, default_value = "linear")]
        scale: AxisScale,

        /// Season time value "<start>/<end>" (defaults to the newest season)
        #[arg(short = 's', long)]
        season: Option<String>,
    },

    /// One model's forecasts for a fixed number of weeks ahead
    Horizon {
        #[arg(short = 'm', long)]
        model: String,

        #[arg(short = 'l', long, default_value = "US")]
        location: String,

        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=3))]
        horizon: u32,

        #[arg(short = 's', long)]
        season: Option<String>,
    },

    /// A model's nowcast trend probabilities for one week
    Nowcast {
        #[arg(short = 'm', long)]
        model: String,

        #[arg(short = 'l', long, default_value = "US")]
        location: String,

        #[arg(short = 'r', long, value_parser = parse_date_arg)]
        reference_week: NaiveDate,
    },

    /// One model's evaluation scores
    Scores {
        #[arg(short = 'm', long)]
        model: String,

        /// wis_ratio or mape
        #[arg(long, default_value = "wis_ratio")]
        metric: ScoreMetric,

        #[arg(short = 'l', long, default_value = "US")]
        location: String,

        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(i32).range(0..=3))]
        horizon: i32,

        #[arg(short = 's', long)]
        season: Option<String>,
    },
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

pub async fn run(source: SourceArgs, command: Command) -> anyhow::Result<()> {
    let config = DashboardConfig::load(source.config.as_deref())?;
    let as_of = source
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let options = config.load_options(&source.data_location()?, as_of)?;
    show::run_command(&options, command).await
}
