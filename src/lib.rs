pub mod aggregator;
pub mod category_lookup;
pub mod classifier;
pub mod coerce;
pub mod config;
pub mod error;
pub mod fake_records;
pub mod http_client;
pub mod player_fetch;
pub mod rate_limit;
pub mod record;
pub mod report;

pub use aggregator::{SeasonStatistics, aggregate, aggregate_value};
pub use classifier::{MatchDetail, MatchResult, SeasonWindow};
pub use record::{MatchRecord, PlayerRecord, TeamMembership};
