//! Flattening of a detailed activity into one metadata row plus lap rows.
//!
//! Laps come from exactly one source, picked in order:
//! - no `laps` array at all (manual entry): one lap built from the activity itself;
//! - more than one recorded lap: the user's laps;
//! - otherwise: Strava's per-kilometre `splits_metric`, renamed and given a
//!   share of the total elevation gain proportional to their distance.
//!
//! Laps and splits of [`MIN_LAP_DURATION_SECS`] or less are dropped in both
//! of the latter cases.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Laps at or below this elapsed time are discarded.
pub const MIN_LAP_DURATION_SECS: f64 = 10.0;

const MILES_TO_KM: f64 = 1.6;

/// Source keys of a lap, in output column order.
pub const LAP_PROPERTIES: [&str; 8] = [
    "name",
    "start_date",
    "elapsed_time",
    "moving_time",
    "distance",
    "total_elevation_gain",
    "average_speed",
    "average_heartrate",
];

/// CSV column names matching [`LAP_PROPERTIES`].
pub const LAP_DISPLAY_NAMES: [&str; 8] = [
    "lap_name",
    "start_date",
    "elapsed_time_secs",
    "moving_time_secs",
    "distance_metres",
    "total_elevation_gain_metres",
    "average_speed_kms_per_hr",
    "average_heartrate",
];

static COMBINE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern compiles"));

// emoticons, pictographs, transport/map symbols, flags, dingbats, enclosed and
// supplementary-plane characters, plus the joiners/selectors that glue them
static EMOJI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        "[",
        r"\x{1F600}-\x{1F64F}",
        r"\x{1F300}-\x{1F5FF}",
        r"\x{1F680}-\x{1F6FF}",
        r"\x{1F1E0}-\x{1F1FF}",
        r"\x{2500}-\x{2BEF}",
        r"\x{2702}-\x{27B0}",
        r"\x{24C2}-\x{1F251}",
        r"\x{1F926}-\x{1F937}",
        r"\x{10000}-\x{10FFFF}",
        r"\x{2640}-\x{2642}",
        r"\x{2600}-\x{2B55}",
        r"\x{200D}",
        r"\x{23CF}",
        r"\x{23E9}",
        r"\x{231A}",
        r"\x{FE0F}",
        r"\x{3030}",
        "]+"
    ))
    .expect("emoji pattern compiles")
});

/// Which of the three lap sources produced an activity's laps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LapSource {
    Manual,
    UserRecorded,
    AutoSplit,
}

/// One lap row; values are aligned with [`LAP_PROPERTIES`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LapRecord {
    values: Vec<String>,
}

impl LapRecord {
    fn collect(mut value_of: impl FnMut(&str) -> String) -> Self {
        Self {
            values: LAP_PROPERTIES.iter().map(|key| value_of(*key)).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        LAP_PROPERTIES
            .iter()
            .position(|k| *k == key)
            .map(|i| self.values[i].as_str())
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActivityDetail {
    /// Keyed by column name; iteration order is the sorted CSV header order.
    pub activity_metadata: BTreeMap<String, String>,
    pub lap_records: Vec<LapRecord>,
    pub source: LapSource,
}

impl ActivityDetail {
    /// Returns `None` when the payload is not a JSON object.
    pub fn from_json(data: &Value) -> Option<Self> {
        let record = data.as_object()?;

        let (source, lap_records) = match record.get("laps").and_then(Value::as_array) {
            None => (
                LapSource::Manual,
                vec![LapRecord::collect(|key| get_simple_value(key, record))],
            ),
            Some(laps) if laps.len() > 1 => (
                LapSource::UserRecorded,
                long_enough(laps)
                    .map(|lap| LapRecord::collect(|key| get_simple_value(key, lap)))
                    .collect(),
            ),
            Some(_) => (LapSource::AutoSplit, auto_laps(record)),
        };

        Some(Self {
            activity_metadata: activity_metadata(record),
            lap_records,
            source,
        })
    }

    pub fn metadata_keys(&self) -> impl Iterator<Item = &str> {
        self.activity_metadata.keys().map(String::as_str)
    }

    pub fn metadata_values(&self) -> impl Iterator<Item = &str> {
        self.activity_metadata.values().map(String::as_str)
    }
}

fn activity_metadata(record: &Map<String, Value>) -> BTreeMap<String, String> {
    let shoes = record
        .get("gear")
        .and_then(Value::as_object)
        .map(|gear| get_simple_value("name", gear))
        .unwrap_or_default();

    [
        ("activity_id", get_simple_value("id", record)),
        ("activity_name", get_simple_value("name", record)),
        ("activity_description", get_simple_value("description", record)),
        ("activity_shoes", shoes),
        ("activity_calories", get_simple_value("calories", record)),
        (
            "activity_average_cadence",
            get_simple_value("average_cadence", record),
        ),
        ("activity_average_temp", get_simple_value("average_temp", record)),
        (
            "activity_moving_time_secs",
            get_simple_value("moving_time", record),
        ),
        (
            "activity_elapsed_time_secs",
            get_simple_value("elapsed_time", record),
        ),
        ("activity_distance_metres", get_simple_value("distance", record)),
        (
            "activity_total_elevation_gain_metres",
            get_simple_value("total_elevation_gain", record),
        ),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn auto_laps(record: &Map<String, Value>) -> Vec<LapRecord> {
    let start_date = get_simple_value("start_date", record);
    let total_elevation = number(record, "total_elevation_gain");
    let total_distance = number(record, "distance");

    let splits = record
        .get("splits_metric")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    long_enough(splits)
        .enumerate()
        .map(|(index, split)| {
            let lap_elevation =
                pro_rata_elevation(total_elevation, number(split, "distance"), total_distance);
            LapRecord::collect(|key| {
                get_auto_lap_value(key, split, index, &start_date, lap_elevation)
            })
        })
        .collect()
}

/// Objects from `laps` whose elapsed time exceeds the minimum; order is kept.
fn long_enough(laps: &[Value]) -> impl Iterator<Item = &Map<String, Value>> {
    laps.iter()
        .filter_map(Value::as_object)
        .filter(|lap| number(lap, "elapsed_time") > MIN_LAP_DURATION_SECS)
}

fn number(record: &Map<String, Value>, key: &str) -> f64 {
    record.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

/// Share of the activity's elevation gain attributed to one split.
pub fn pro_rata_elevation(total_elevation: f64, lap_distance: f64, total_distance: f64) -> f64 {
    if total_distance == 0.0 {
        return 0.0;
    }
    total_elevation * lap_distance / total_distance
}

/// String value of `key` in `record`, cleaned for a CSV cell.
///
/// Absent keys give an empty string. `average_speed` is converted from
/// miles/hr to km/hr.
pub fn get_simple_value(key: &str, record: &Map<String, Value>) -> String {
    let Some(value) = record.get(key) else {
        return String::new();
    };
    if key == "average_speed" {
        return value
            .as_f64()
            .map(|speed| format_number(speed * MILES_TO_KM))
            .unwrap_or_default();
    }
    sanitize(&stringify(value))
}

/// Value of `key` for the split at `index` (0-based) of an auto-lapped activity.
pub fn get_auto_lap_value(
    key: &str,
    split: &Map<String, Value>,
    index: usize,
    start_date: &str,
    lap_elevation: f64,
) -> String {
    match key {
        "name" => format!("Auto km lap {}", index + 1),
        // splits carry no start date of their own
        "start_date" => start_date.to_string(),
        "total_elevation_gain" => format_number(lap_elevation),
        _ => get_simple_value(key, split),
    }
}

/// Commas to semicolons, emoji stripped, whitespace runs collapsed, trimmed.
pub fn sanitize(text: &str) -> String {
    let text = text.replace(',', ";");
    let text = EMOJI.replace_all(&text, "");
    let text = COMBINE_WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Shortest round-trip form that keeps a fractional part, e.g. `16.0`.
fn format_number(value: f64) -> String {
    serde_json::Number::from_f64(value)
        .map(|n| n.to_string())
        .unwrap_or_default()
}
