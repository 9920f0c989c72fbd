use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};
use strava_export::normalize::{ActivityDetail, sanitize};

fn marathon_with_splits() -> Value {
    let splits: Vec<Value> = (0..42)
        .map(|i| {
            json!({
                "distance": 1000.0,
                "elapsed_time": 300 + i,
                "moving_time": 295 + i,
                "average_speed": 3.3,
                "average_heartrate": 150.5
            })
        })
        .collect();
    json!({
        "id": 1,
        "name": "City Marathon 🏅, finally",
        "description": "Went out too fast,\n\n   paid for it 😅",
        "distance": 42195.0,
        "elapsed_time": 13000,
        "moving_time": 12900,
        "total_elevation_gain": 210.0,
        "start_date": "2024-04-14T08:00:00Z",
        "gear": {"name": "Race flats"},
        "laps": [{"name": "Lap 1", "elapsed_time": 13000}],
        "splits_metric": splits
    })
}

fn bench_normalize(c: &mut Criterion) {
    let activity = marathon_with_splits();
    c.bench_function("normalize_auto_split_activity", |b| {
        b.iter(|| ActivityDetail::from_json(black_box(&activity)).expect("detail"))
    });

    let text = "Tempo 🔥🔥, hills,\t\tand   a cool-down 🧊 ".repeat(20);
    c.bench_function("sanitize_free_text", |b| b.iter(|| sanitize(black_box(&text))));
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
