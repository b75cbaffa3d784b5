use std::collections::HashMap;

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use season_stats::aggregator::aggregate;
use season_stats::category_lookup::build_category_lookup;
use season_stats::classifier::SeasonWindow;
use season_stats::fake_records::FakeRecords;
use season_stats::player_fetch::parse_player_response;
use season_stats::record::PlayerRecord;

fn sample_record(matches_per_season: usize) -> PlayerRecord {
    FakeRecords::new(SeasonWindow::new("2025", "2024"), "Lions")
        .with_matches_per_season(matches_per_season)
        .player_record("bench")
}

fn bench_aggregate(c: &mut Criterion) {
    let seasons = SeasonWindow::new("2025", "2024");
    let record = sample_record(40);
    let lookup = build_category_lookup(&record.teams, "2025");
    c.bench_function("aggregate_40_per_season", |b| {
        b.iter(|| {
            let stats = aggregate(black_box(&record.matches), &seasons, "Lions", &lookup);
            black_box(stats.goals_this_year);
        })
    });

    let big = sample_record(2_000);
    c.bench_function("aggregate_2000_per_season", |b| {
        b.iter(|| {
            let stats = aggregate(black_box(&big.matches), &seasons, "Lions", &HashMap::new());
            black_box(stats.games_played_this_year);
        })
    });
}

fn bench_response_parse(c: &mut Criterion) {
    let record = sample_record(40);
    let body = serde_json::json!({ "error": 0, "data": record }).to_string();
    c.bench_function("player_response_parse", |b| {
        b.iter(|| {
            let parsed = parse_player_response(black_box(&body)).unwrap();
            black_box(parsed.matches.len());
        })
    });
}

criterion_group!(benches, bench_aggregate, bench_response_parse);
criterion_main!(benches);
