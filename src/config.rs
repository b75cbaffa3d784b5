use std::collections::HashMap;
use std::env;
use std::time::Duration;

use crate::classifier::SeasonWindow;
use crate::rate_limit::{RateLimitConfig, RateLimitMode};

const DEFAULT_CURRENT_SEASON: &str = "2025";
const DEFAULT_PREVIOUS_SEASON: &str = "2024";
const DEFAULT_API_BASE: &str = "http://localhost:8080/api";

#[derive(Debug, Clone)]
pub struct StatsConfig {
    pub seasons: SeasonWindow,
    /// Year used to scope team memberships when building the category lookup.
    pub season_year: String,
    pub api_base: String,
    pub api_key: Option<String>,
    pub rate_limit: RateLimitConfig,
    pub offline: bool,
    pub fetch_parallelism: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            seasons: SeasonWindow::new(DEFAULT_CURRENT_SEASON, DEFAULT_PREVIOUS_SEASON),
            season_year: DEFAULT_CURRENT_SEASON.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            rate_limit: RateLimitConfig::default(),
            offline: false,
            fetch_parallelism: 6,
        }
    }
}

impl StatsConfig {
    /// Reads `STATS_*` variables over the defaults. Call `dotenvy` first if
    /// `.env` files should apply. Unparseable values keep the default.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        let current = env_string("STATS_CURRENT_SEASON");
        if let Some(current) = current.clone() {
            cfg.seasons.current = current;
        }
        if let Some(previous) = env_string("STATS_PREVIOUS_SEASON") {
            cfg.seasons.previous = previous;
        }
        cfg.season_year = env_string("STATS_SEASON_YEAR")
            .or(current)
            .unwrap_or(cfg.season_year);
        if let Some(base) = env_string("STATS_API_BASE") {
            cfg.api_base = base.trim_end_matches('/').to_string();
        }
        cfg.api_key = env_string("STATS_API_KEY");

        if let Some(limit) = env_parse::<usize>("STATS_RATE_LIMIT_PER_MIN") {
            cfg.rate_limit.global_per_window = limit.clamp(1, 10_000);
        }
        if let Some(raw) = env_string("STATS_ENDPOINT_LIMITS") {
            cfg.rate_limit
                .endpoint_per_window
                .extend(parse_endpoint_limits(&raw));
        }
        cfg.rate_limit.min_delay = env_parse::<u64>("STATS_MIN_DELAY_MS")
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        cfg.offline = env_flag("STATS_OFFLINE");
        if cfg.offline {
            cfg.rate_limit.mode = RateLimitMode::Bypass;
        }
        cfg.fetch_parallelism = env_parse::<usize>("FETCH_PARALLELISM")
            .unwrap_or(cfg.fetch_parallelism)
            .clamp(1, 32);
        cfg
    }
}

/// `player=30,teams=10` into an endpoint table. Malformed pairs are skipped.
pub fn parse_endpoint_limits(raw: &str) -> HashMap<String, usize> {
    raw.split(',')
        .filter_map(|pair| {
            let (name, limit) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let limit = limit.trim().parse::<usize>().ok()?;
            Some((name.to_string(), limit.max(1)))
        })
        .collect()
}

pub fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse::<T>().ok())
}

fn env_flag(key: &str) -> bool {
    env_string(key).map(|v| parse_flag(&v)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_limits_skip_malformed_pairs() {
        let limits = parse_endpoint_limits("player=30, teams = 10,bad,=4,x=y,zero=0");
        assert_eq!(limits.get("player"), Some(&30));
        assert_eq!(limits.get("teams"), Some(&10));
        assert_eq!(limits.get("zero"), Some(&1));
        assert_eq!(limits.len(), 3);
    }

    #[test]
    fn flags_accept_common_truthy_values() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" YES "));
        assert!(parse_flag("true"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("off"));
    }

    #[test]
    fn defaults_enforce_rate_limits() {
        let cfg = StatsConfig::default();
        assert_eq!(cfg.rate_limit.mode, RateLimitMode::Enforced);
        assert_eq!(cfg.seasons.current, "2025");
        assert_eq!(cfg.seasons.previous, "2024");
        assert!(!cfg.offline);
    }
}
