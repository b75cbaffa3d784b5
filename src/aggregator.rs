use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classifier::{Classified, CurrentMatch, MatchDetail, SeasonWindow, classify};
use crate::coerce::lenient_items;
use crate::record::MatchRecord;

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y"];

/// Season statistics for one player, seen from one context team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonStatistics {
    pub games_played_this_year: u32,
    pub goals_this_year: u32,
    pub warnings_this_year: u32,
    pub suspensions_this_year: u32,
    pub games_played_last_season: u32,
    pub goals_scored_last_season: u32,
    pub goals_for_this_specific_team_in_season: u32,
    pub games_by_team_this_year: BTreeMap<String, u32>,
    pub goals_by_team_this_year: BTreeMap<String, u32>,
    pub past_matches_details: Vec<MatchDetail>,
    pub other_teams_detailed_matches: BTreeMap<String, Vec<MatchDetail>>,
    pub current_context_team_display_key: Option<String>,
}

impl SeasonStatistics {
    fn add_current(&mut self, current: CurrentMatch, context_team_name: &str) {
        let CurrentMatch {
            display_key,
            detail,
            player_goals,
            player_warnings,
            player_suspensions,
        } = current;

        bump(&mut self.games_played_this_year, 1);
        bump(
            self.games_by_team_this_year
                .entry(display_key.clone())
                .or_insert(0),
            1,
        );
        bump(&mut self.goals_this_year, player_goals);
        if player_goals > 0 {
            bump(
                self.goals_by_team_this_year
                    .entry(display_key.clone())
                    .or_insert(0),
                player_goals,
            );
        }
        bump(&mut self.warnings_this_year, player_warnings);
        bump(&mut self.suspensions_this_year, player_suspensions);

        if detail.team_name == context_team_name {
            bump(&mut self.goals_for_this_specific_team_in_season, player_goals);
            self.past_matches_details.push(detail);
            if self.current_context_team_display_key.is_none() {
                self.current_context_team_display_key = Some(display_key);
            }
        } else {
            self.other_teams_detailed_matches
                .entry(display_key)
                .or_default()
                .push(detail);
        }
    }

    fn add_previous(&mut self, player_goals: u32) {
        bump(&mut self.games_played_last_season, 1);
        bump(&mut self.goals_scored_last_season, player_goals);
    }
}

// Counters saturate instead of overflowing; aggregation must never panic.
fn bump(counter: &mut u32, by: u32) {
    *counter = counter.saturating_add(by);
}

/// Folds a player's match history into season statistics. Total over any input:
/// malformed fields count as zero and unknown seasons are skipped.
pub fn aggregate(
    matches: &[MatchRecord],
    seasons: &SeasonWindow,
    context_team_name: &str,
    category_lookup: &HashMap<String, String>,
) -> SeasonStatistics {
    let mut stats = SeasonStatistics::default();

    for record in matches {
        match classify(record, record.team_id.as_deref(), seasons, category_lookup) {
            Classified::Current(current) => stats.add_current(current, context_team_name),
            Classified::Previous { player_goals } => stats.add_previous(player_goals),
            Classified::Ignored => {
                debug!("skipping match in season {:?}", record.season);
            }
        }
    }

    sort_by_date_desc(&mut stats.past_matches_details);
    for details in stats.other_teams_detailed_matches.values_mut() {
        sort_by_date_desc(details);
    }
    stats
}

/// Same as [`aggregate`] but over raw upstream JSON. Anything other than an
/// array yields the baseline; array items that are not match objects are skipped.
pub fn aggregate_value(
    matches: &Value,
    seasons: &SeasonWindow,
    context_team_name: &str,
    category_lookup: &HashMap<String, String>,
) -> SeasonStatistics {
    let Some(items) = matches.as_array() else {
        warn!("match history is not a list; returning empty statistics");
        return SeasonStatistics::default();
    };
    let records = lenient_items::<MatchRecord>(matches);
    debug!("{} of {} match rows usable", records.len(), items.len());
    aggregate(&records, seasons, context_team_name, category_lookup)
}

/// Newest first. Stable, so equal dates keep their input order; dates that do
/// not parse are treated as the oldest and end up last, in input order.
pub fn sort_by_date_desc(details: &mut [MatchDetail]) {
    details.sort_by_cached_key(|d| Reverse(parse_match_date(&d.date)));
}

pub fn parse_match_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::MatchResult;

    fn detail(date: &str, opponent: &str) -> MatchDetail {
        MatchDetail {
            date: date.to_string(),
            team_name: "Lions".to_string(),
            opponent: opponent.to_string(),
            team_score: String::new(),
            opponent_score: String::new(),
            result: MatchResult::Draw,
            status: "played".to_string(),
        }
    }

    #[test]
    fn parse_match_date_accepts_common_shapes() {
        assert!(parse_match_date("2025-03-01").is_some());
        assert!(parse_match_date("2025-03-01 18:30").is_some());
        assert!(parse_match_date("2025-03-01T18:30:00").is_some());
        assert!(parse_match_date("2025-03-01T18:30:00+01:00").is_some());
        assert!(parse_match_date("01.03.2025").is_some());
        assert!(parse_match_date("").is_none());
        assert!(parse_match_date("soon").is_none());
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let mut rows = vec![
            detail("2025-01-10", "a"),
            detail("2025-03-01", "b"),
            detail("2025-01-10", "c"),
            detail("2025-02-01 12:00", "d"),
        ];
        sort_by_date_desc(&mut rows);
        let order = rows.iter().map(|d| d.opponent.as_str()).collect::<Vec<_>>();
        assert_eq!(order, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn unparseable_dates_sink_to_the_end() {
        let mut rows = vec![
            detail("", "blank"),
            detail("2024-12-01", "old"),
            detail("tbd", "tbd"),
            detail("2025-04-01", "new"),
        ];
        sort_by_date_desc(&mut rows);
        let order = rows.iter().map(|d| d.opponent.as_str()).collect::<Vec<_>>();
        assert_eq!(order, vec!["new", "old", "blank", "tbd"]);
    }

    #[test]
    fn huge_counters_saturate_instead_of_overflowing() {
        let seasons = SeasonWindow::new("2025", "2024");
        let row = |season: &str, goals: &str| MatchRecord {
            season: Some(season.to_string()),
            team_id: Some("1".to_string()),
            team_name: Some("Lions".to_string()),
            player_goals: Some(goals.to_string()),
            player_warnings: Some(goals.to_string()),
            ..MatchRecord::default()
        };
        let matches = vec![
            row("2025", "4294967295"),
            row("2025", "1"),
            row("2024", "4294967295"),
            row("2024", "7"),
        ];
        let stats = aggregate(&matches, &seasons, "Lions", &HashMap::new());
        assert_eq!(stats.games_played_this_year, 2);
        assert_eq!(stats.goals_this_year, u32::MAX);
        assert_eq!(stats.warnings_this_year, u32::MAX);
        assert_eq!(stats.goals_for_this_specific_team_in_season, u32::MAX);
        assert_eq!(stats.goals_by_team_this_year["Lions (unknown league)"], u32::MAX);
        assert_eq!(stats.goals_scored_last_season, u32::MAX);
    }

    #[test]
    fn non_array_input_is_baseline() {
        let seasons = SeasonWindow::new("2025", "2024");
        let lookup = HashMap::new();
        for raw in [Value::Null, serde_json::json!({"matches": []}), serde_json::json!("x")] {
            assert_eq!(
                aggregate_value(&raw, &seasons, "Lions", &lookup),
                SeasonStatistics::default()
            );
        }
    }

    #[test]
    fn array_items_that_are_not_objects_are_skipped() {
        let seasons = SeasonWindow::new("2025", "2024");
        let raw = serde_json::json!([
            42,
            {"season": "2025", "team_id": "1", "team_name": "Lions", "player_goals": "2"},
            "junk"
        ]);
        let stats = aggregate_value(&raw, &seasons, "Lions", &HashMap::new());
        assert_eq!(stats.games_played_this_year, 1);
        assert_eq!(stats.goals_this_year, 2);
    }
}
