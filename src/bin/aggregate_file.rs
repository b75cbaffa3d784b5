use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use env_logger::Env;
use serde_json::Value;

use season_stats::aggregator::aggregate_value;
use season_stats::category_lookup::build_category_lookup;
use season_stats::config::StatsConfig;
use season_stats::record::TeamMembership;

// Aggregates a saved player response without touching the network:
// `aggregate_file <path.json> <context team>`.
fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/player_record.json"));
    let team = args.next().unwrap_or_else(|| "Lions".to_string());

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let root: Value = serde_json::from_str(&raw).context("invalid player json")?;
    let data = root.get("data").unwrap_or(&root);

    let cfg = StatsConfig::from_env();
    let teams = match data.get("teams") {
        Some(v) => serde_json::from_value::<Vec<TeamMembership>>(v.clone())
            .context("invalid team history")?,
        None => Vec::new(),
    };
    let lookup = build_category_lookup(&teams, &cfg.season_year);

    let matches = data.get("matches").unwrap_or(&Value::Null);
    let stats = aggregate_value(matches, &cfg.seasons, &team, &lookup);
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
