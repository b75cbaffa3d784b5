use anyhow::{Context, Result, bail};
use env_logger::Env;
use log::info;

use season_stats::config::StatsConfig;
use season_stats::fake_records::FakeRecords;
use season_stats::player_fetch::PlayerClient;
use season_stats::rate_limit::RateLimitMode;
use season_stats::report::{RecordSource, collect_reports, report_json};

struct Args {
    player_ids: Vec<String>,
    team: String,
    offline: bool,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = parse_args(std::env::args().skip(1).collect())?;
    let mut cfg = StatsConfig::from_env();
    if args.offline {
        cfg.offline = true;
        cfg.rate_limit.mode = RateLimitMode::Bypass;
    }

    let source: Box<dyn RecordSource> = if cfg.offline {
        info!("offline mode: using synthetic player records");
        Box::new(FakeRecords::new(cfg.seasons.clone(), args.team.clone()))
    } else {
        Box::new(PlayerClient::from_config(&cfg))
    };

    let reports = collect_reports(source.as_ref(), &args.player_ids, &cfg, &args.team);
    let mut failures = 0usize;
    for report in reports {
        match report.stats {
            Ok(stats) => {
                let json = serde_json::to_string_pretty(&report_json(&report.player_id, &stats))
                    .with_context(|| format!("serialize stats for player {}", report.player_id))?;
                println!("{json}");
            }
            Err(err) => {
                failures += 1;
                eprintln!("player {}: {err}", report.player_id);
            }
        }
    }
    if failures > 0 && failures == args.player_ids.len() {
        bail!("all {failures} player fetches failed");
    }
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<Args> {
    let mut player_ids = Vec::new();
    let mut team = None;
    let mut offline = false;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if let Some(id) = arg.strip_prefix("--player=") {
            player_ids.push(id.trim().to_string());
        } else if arg == "--player" {
            let id = iter.next().context("--player needs a value")?;
            player_ids.push(id.trim().to_string());
        } else if let Some(name) = arg.strip_prefix("--team=") {
            team = Some(name.trim().to_string());
        } else if arg == "--team" {
            team = Some(iter.next().context("--team needs a value")?.trim().to_string());
        } else if arg == "--offline" {
            offline = true;
        } else {
            bail!("unknown argument: {arg}");
        }
    }

    player_ids.retain(|id| !id.is_empty());
    if player_ids.is_empty() {
        bail!("usage: season_stats --player <id> [--player <id>...] --team <name> [--offline]");
    }
    let team = team
        .filter(|t| !t.is_empty())
        .context("--team is required")?;
    Ok(Args {
        player_ids,
        team,
        offline,
    })
}
