use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::coerce::{non_empty, parse_count, parse_score, text_or};
use crate::record::{MatchRecord, MatchStatus};

pub const UNRESOLVED_NAME: &str = "N/A";
pub const UNKNOWN_LEAGUE: &str = "unknown league";
const NO_WINNER: &[&str] = &["-", "0"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchResult {
    Win,
    Loss,
    Draw,
    Fixture,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetail {
    pub date: String,
    pub team_name: String,
    pub opponent: String,
    pub team_score: String,
    pub opponent_score: String,
    pub result: MatchResult,
    pub status: String,
}

/// The two season identifiers a match is bucketed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonWindow {
    pub current: String,
    pub previous: String,
}

impl SeasonWindow {
    pub fn new(current: impl Into<String>, previous: impl Into<String>) -> Self {
        Self {
            current: current.into(),
            previous: previous.into(),
        }
    }
}

/// Which side of the match the player's team was on, seen from that team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideResolution {
    pub resolved: bool,
    pub opponent_id: Option<String>,
    pub opponent_name: String,
    pub team_score: String,
    pub opponent_score: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentMatch {
    pub display_key: String,
    pub detail: MatchDetail,
    pub player_goals: u32,
    pub player_warnings: u32,
    pub player_suspensions: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    Current(CurrentMatch),
    Previous { player_goals: u32 },
    Ignored,
}

pub fn classify(
    record: &MatchRecord,
    player_team_id: Option<&str>,
    seasons: &SeasonWindow,
    category_lookup: &HashMap<String, String>,
) -> Classified {
    let season = record.season.as_deref();
    if season == Some(seasons.previous.as_str()) && season != Some(seasons.current.as_str()) {
        return Classified::Previous {
            player_goals: parse_count(record.player_goals.as_deref()),
        };
    }
    if season != Some(seasons.current.as_str()) {
        return Classified::Ignored;
    }

    let side = resolve_side(record, player_team_id);
    if !side.resolved {
        warn!(
            "team {:?} matches neither side of match on {:?} ({:?} vs {:?})",
            player_team_id, record.date, record.team_a_id, record.team_b_id
        );
    }
    let result = resolve_outcome(
        record.status(),
        record.winner_id.as_deref(),
        player_team_id,
        &side,
    );
    // Kept verbatim: context-team matching is exact equality on this name.
    let team_name = match record.team_name.as_deref() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => UNRESOLVED_NAME.to_string(),
    };
    let league = league_name(record, player_team_id, category_lookup);

    Classified::Current(CurrentMatch {
        display_key: display_key(&team_name, &league),
        detail: MatchDetail {
            date: record.date.clone().unwrap_or_default(),
            team_name,
            opponent: side.opponent_name,
            team_score: side.team_score,
            opponent_score: side.opponent_score,
            result,
            status: record.status.clone().unwrap_or_default(),
        },
        player_goals: parse_count(record.player_goals.as_deref()),
        player_warnings: parse_count(record.player_warnings.as_deref()),
        player_suspensions: parse_count(record.player_suspensions.as_deref()),
    })
}

pub fn resolve_side(record: &MatchRecord, player_team_id: Option<&str>) -> SideResolution {
    let team = non_empty(player_team_id);
    let team_a = non_empty(record.team_a_id.as_deref());
    let team_b = non_empty(record.team_b_id.as_deref());
    let score = |raw: &Option<String>| raw.as_deref().map(str::trim).unwrap_or_default().to_string();

    match team {
        Some(id) if team_a == Some(id) => SideResolution {
            resolved: true,
            opponent_id: team_b.map(str::to_string),
            opponent_name: text_or(record.team_b_name.as_deref(), UNRESOLVED_NAME),
            team_score: score(&record.team_a_score),
            opponent_score: score(&record.team_b_score),
        },
        Some(id) if team_b == Some(id) => SideResolution {
            resolved: true,
            opponent_id: team_a.map(str::to_string),
            opponent_name: text_or(record.team_a_name.as_deref(), UNRESOLVED_NAME),
            team_score: score(&record.team_b_score),
            opponent_score: score(&record.team_a_score),
        },
        _ => SideResolution {
            resolved: false,
            opponent_id: None,
            opponent_name: UNRESOLVED_NAME.to_string(),
            team_score: String::new(),
            opponent_score: String::new(),
        },
    }
}

/// Outcome from the player's team's perspective. Rules are tried in order and
/// the first one that applies wins: scheduled status, recorded winner id,
/// then a numeric score comparison.
pub fn resolve_outcome(
    status: MatchStatus,
    winner_id: Option<&str>,
    player_team_id: Option<&str>,
    side: &SideResolution,
) -> MatchResult {
    if status == MatchStatus::Scheduled {
        return MatchResult::Fixture;
    }
    if let Some(winner) = non_empty(winner_id).filter(|w| !NO_WINNER.contains(w)) {
        return outcome_from_winner(winner, player_team_id, side.opponent_id.as_deref());
    }
    outcome_from_scores(&side.team_score, &side.opponent_score)
}

fn outcome_from_winner(
    winner: &str,
    player_team_id: Option<&str>,
    opponent_id: Option<&str>,
) -> MatchResult {
    if non_empty(player_team_id) == Some(winner) {
        MatchResult::Win
    } else if non_empty(opponent_id) == Some(winner) {
        MatchResult::Loss
    } else {
        MatchResult::Draw
    }
}

fn outcome_from_scores(team_score: &str, opponent_score: &str) -> MatchResult {
    let (Some(ours), Some(theirs)) = (parse_score(Some(team_score)), parse_score(Some(opponent_score)))
    else {
        return MatchResult::Draw;
    };
    match ours.cmp(&theirs) {
        std::cmp::Ordering::Greater => MatchResult::Win,
        std::cmp::Ordering::Less => MatchResult::Loss,
        std::cmp::Ordering::Equal => MatchResult::Draw,
    }
}

pub fn league_name(
    record: &MatchRecord,
    player_team_id: Option<&str>,
    category_lookup: &HashMap<String, String>,
) -> String {
    non_empty(player_team_id)
        .and_then(|id| category_lookup.get(id))
        .and_then(|name| non_empty(Some(name.as_str())))
        .or_else(|| non_empty(record.competition_name.as_deref()))
        .or_else(|| non_empty(record.category_name.as_deref()))
        .unwrap_or(UNKNOWN_LEAGUE)
        .to_string()
}

pub fn display_key(team_name: &str, league: &str) -> String {
    format!("{team_name} ({league})")
}
