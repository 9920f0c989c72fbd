//! Summary and lap CSV output.

use std::fs;
use std::path::{Path, PathBuf};

use strava_client::utils::DateRange;
use tracing::info;

use crate::error::ExportResult;
use crate::normalize::{ActivityDetail, LAP_DISPLAY_NAMES};

pub const SUMMARY_PREFIX: &str = "activity_summary";
pub const LAPS_PREFIX: &str = "activity_laps";

/// Paths of the two files written by [`write_csv`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportFiles {
    pub summary: PathBuf,
    pub laps: PathBuf,
}

pub fn output_file_name(prefix: &str, range: &DateRange) -> String {
    format!("{}_{}.csv", prefix, range.label())
}

/// Writes the summary and lap files into `output_folder`.
///
/// Nothing is created when `details` is empty.
pub fn write_csv(
    details: &[ActivityDetail],
    output_folder: &Path,
    range: &DateRange,
) -> ExportResult<Option<ExportFiles>> {
    let Some(first) = details.first() else {
        info!("no activity details to write");
        return Ok(None);
    };
    fs::create_dir_all(output_folder)?;

    let files = ExportFiles {
        summary: output_folder.join(output_file_name(SUMMARY_PREFIX, range)),
        laps: output_folder.join(output_file_name(LAPS_PREFIX, range)),
    };

    info!(count = details.len(), path = %files.summary.display(), "writing activities");
    let mut writer = csv::Writer::from_path(&files.summary)?;
    writer.write_record(first.metadata_keys())?;
    for detail in details {
        writer.write_record(detail.metadata_values())?;
    }
    writer.flush()?;

    info!(count = details.len(), path = %files.laps.display(), "writing activity laps");
    let mut writer = csv::Writer::from_path(&files.laps)?;
    writer.write_record(first.metadata_keys().chain(LAP_DISPLAY_NAMES))?;
    for detail in details {
        for lap in &detail.lap_records {
            writer.write_record(
                detail
                    .metadata_values()
                    .chain(lap.values().iter().map(String::as_str)),
            )?;
        }
    }
    writer.flush()?;

    Ok(Some(files))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn range(start: &str, end: &str) -> DateRange {
        let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date");
        DateRange::new(parse(start), parse(end)).expect("range")
    }

    fn detail(id: u64, name: &str, laps: usize) -> ActivityDetail {
        let laps: Vec<_> = (0..laps)
            .map(|i| json!({"name": format!("Lap {}", i + 1), "elapsed_time": 120, "distance": 400.0}))
            .collect();
        let mut data = json!({"id": id, "name": name, "distance": 400.0 * laps.len() as f64});
        if laps.len() > 1 {
            data["laps"] = json!(laps);
        }
        ActivityDetail::from_json(&data).expect("detail")
    }

    #[test]
    fn file_names_embed_the_range() {
        assert_eq!(
            output_file_name(SUMMARY_PREFIX, &range("2024-01-01", "2024-01-01")),
            "activity_summary_2024-01-01.csv"
        );
        assert_eq!(
            output_file_name(LAPS_PREFIX, &range("2024-01-01", "2024-01-31")),
            "activity_laps_2024-01-01_to_2024-01-31.csv"
        );
    }

    #[test]
    fn empty_input_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("out");
        let files = write_csv(&[], &out, &range("2024-01-01", "2024-01-01")).expect("write");
        assert!(files.is_none());
        assert!(!out.exists());
    }

    #[test]
    fn writes_one_summary_row_per_activity_and_one_lap_row_per_lap() {
        let dir = tempfile::tempdir().expect("tempdir");
        let details = [detail(1, "Intervals", 3), detail(2, "Easy; chatty", 0)];
        let files = write_csv(&details, dir.path(), &range("2024-01-01", "2024-01-02"))
            .expect("write")
            .expect("files");

        let summary = fs::read_to_string(&files.summary).expect("summary");
        let lines: Vec<_> = summary.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("activity_average_cadence,activity_average_temp,"));
        assert!(lines[0].ends_with("activity_shoes,activity_total_elevation_gain_metres"));

        let laps = fs::read_to_string(&files.laps).expect("laps");
        let lines: Vec<_> = laps.lines().collect();
        // header + 3 recorded laps + 1 synthetic lap for the manual entry
        assert_eq!(lines.len(), 5);
        assert!(lines[0].ends_with(
            "lap_name,start_date,elapsed_time_secs,moving_time_secs,distance_metres,\
             total_elevation_gain_metres,average_speed_kms_per_hr,average_heartrate"
        ));
        assert_eq!(lines[0].split(',').count(), 11 + LAP_DISPLAY_NAMES.len());
        assert!(lines[1].contains("Intervals"));
        assert!(lines[1].contains("Lap 1"));
        assert!(lines[4].contains("Easy; chatty"));
    }
}
