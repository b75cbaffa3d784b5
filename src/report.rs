use log::{info, warn};
use rayon::prelude::*;
use serde_json::{Value, json};

use crate::aggregator::{SeasonStatistics, aggregate};
use crate::category_lookup::build_category_lookup;
use crate::config::StatsConfig;
use crate::error::FetchError;
use crate::fake_records::FakeRecords;
use crate::player_fetch::PlayerClient;
use crate::record::PlayerRecord;

/// Where raw player records come from: the live API or the offline generator.
pub trait RecordSource: Sync {
    fn fetch_player_record(&self, player_id: &str) -> Result<PlayerRecord, FetchError>;
}

impl RecordSource for PlayerClient {
    fn fetch_player_record(&self, player_id: &str) -> Result<PlayerRecord, FetchError> {
        PlayerClient::fetch_player_record(self, player_id)
    }
}

impl RecordSource for FakeRecords {
    fn fetch_player_record(&self, player_id: &str) -> Result<PlayerRecord, FetchError> {
        Ok(self.player_record(player_id))
    }
}

#[derive(Debug)]
pub struct PlayerReport {
    pub player_id: String,
    pub stats: Result<SeasonStatistics, FetchError>,
}

pub fn season_report(record: &PlayerRecord, cfg: &StatsConfig, context_team: &str) -> SeasonStatistics {
    let lookup = build_category_lookup(&record.teams, &cfg.season_year);
    aggregate(&record.matches, &cfg.seasons, context_team, &lookup)
}

/// One fetch plus one aggregation per player, run in parallel. A failed fetch
/// only affects that player's report.
pub fn collect_reports(
    source: &dyn RecordSource,
    player_ids: &[String],
    cfg: &StatsConfig,
    context_team: &str,
) -> Vec<PlayerReport> {
    let pool = build_fetch_pool(cfg.fetch_parallelism);
    let run = || {
        player_ids
            .par_iter()
            .map(|id| {
                let stats = source
                    .fetch_player_record(id)
                    .map(|record| season_report(&record, cfg, context_team));
                match &stats {
                    Ok(s) => info!(
                        "player {id}: {} games, {} goals this season",
                        s.games_played_this_year, s.goals_this_year
                    ),
                    Err(err) => warn!("player {id}: {err}"),
                }
                PlayerReport {
                    player_id: id.clone(),
                    stats,
                }
            })
            .collect::<Vec<_>>()
    };
    match pool {
        Some(pool) => pool.install(run),
        None => run(),
    }
}

/// Output document for one player: `{"player": id, "stats": {...}}`.
pub fn report_json(player_id: &str, stats: &SeasonStatistics) -> Value {
    json!({ "player": player_id, "stats": stats })
}

fn build_fetch_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
        .ok()
}
