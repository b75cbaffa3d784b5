use serde::{Deserialize, Serialize};

use crate::coerce::{lenient_list, loose_string};

const NOT_PLAYED_TAGS: &[&str] = &["fixture", "scheduled", "upcoming", "not_played"];

/// One row of a player's match history as returned by the sports data API.
/// Every field is optional because the upstream fills them inconsistently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(default, deserialize_with = "loose_string")]
    pub season: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub team_id: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub team_a_id: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub team_a_name: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub team_b_id: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub team_b_name: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub team_a_score: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub team_b_score: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub winner_id: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub player_goals: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub player_warnings: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub player_suspensions: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub competition_name: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub category_name: Option<String>,
}

impl MatchRecord {
    pub fn status(&self) -> MatchStatus {
        MatchStatus::from_tag(self.status.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Scheduled,
    Completed,
}

impl MatchStatus {
    pub fn from_tag(tag: Option<&str>) -> Self {
        let Some(tag) = tag else {
            return MatchStatus::Completed;
        };
        let t = tag.trim().to_ascii_lowercase();
        if NOT_PLAYED_TAGS.contains(&t.as_str()) {
            MatchStatus::Scheduled
        } else {
            MatchStatus::Completed
        }
    }
}

/// A team the player has been registered with, from the player's team history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamMembership {
    #[serde(default, deserialize_with = "loose_string")]
    pub team_id: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub competition_id: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub competition_name: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub category_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(default, deserialize_with = "lenient_list")]
    pub matches: Vec<MatchRecord>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub teams: Vec<TeamMembership>,
}
