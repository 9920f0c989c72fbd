//! Command line arguments and log filter selection.

use std::path::PathBuf;

use chrono::{Days, NaiveDate};
use clap::Parser;
use strava_client::StravaError;
use strava_client::utils::DateRange;

use crate::settings::DEFAULT_SETTINGS_FILE;

pub const LOG_LEVEL_ENV: &str = "STRAVA_EXPORT_LOG_LEVEL";

/// Days covered when no start date is given.
pub const DEFAULT_LOOKBACK_DAYS: u64 = 7;

/// Export running activities and their laps from Strava to CSV.
#[derive(Debug, Parser)]
#[command(name = "strava-export", version, about)]
pub struct Cli {
    /// Folder the CSV files are written to
    #[arg(short = 'o', long, alias = "output_folder", default_value_os_t = std::env::temp_dir())]
    pub output_folder: PathBuf,

    /// First day to export (YYYY-MM-DD), defaults to a week ago
    #[arg(short = 's', long, alias = "start_date")]
    pub start_date: Option<NaiveDate>,

    /// Last day to export (YYYY-MM-DD), defaults to today
    #[arg(short = 'e', long, alias = "end_date")]
    pub end_date: Option<NaiveDate>,

    /// JSON file holding client credentials and tokens
    #[arg(long, env = "STRAVA_SETTINGS_FILE", default_value = DEFAULT_SETTINGS_FILE)]
    pub settings: PathBuf,
}

impl Cli {
    /// Resolves the requested days, filling gaps relative to `today`.
    pub fn date_range(&self, today: NaiveDate) -> Result<DateRange, StravaError> {
        let end = self.end_date.unwrap_or(today);
        let start = self.start_date.unwrap_or_else(|| {
            today
                .checked_sub_days(Days::new(DEFAULT_LOOKBACK_DAYS))
                .unwrap_or(today)
        });
        DateRange::new(start, end)
    }
}

/// `STRAVA_EXPORT_LOG_LEVEL`, else `RUST_LOG`, else `info`.
pub fn log_filter<F>(get: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    get(LOG_LEVEL_ENV)
        .or_else(|| get("RUST_LOG"))
        .unwrap_or_else(|| "info".to_string())
}
