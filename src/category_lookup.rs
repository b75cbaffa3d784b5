use std::collections::HashMap;

use crate::coerce::non_empty;
use crate::record::TeamMembership;

/// Maps team id to the league name used in display keys, restricted to the
/// memberships of the given season year. First membership per team id wins.
pub fn build_category_lookup(teams: &[TeamMembership], season_year: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    let Some(year) = non_empty(Some(season_year)) else {
        return out;
    };

    for team in teams {
        let in_season = [team.competition_id.as_deref(), team.competition_name.as_deref()]
            .into_iter()
            .flatten()
            .any(|s| s.contains(year));
        if !in_season {
            continue;
        }
        let Some(team_id) = non_empty(team.team_id.as_deref()) else {
            continue;
        };
        let Some(league) = non_empty(team.category_name.as_deref())
            .or_else(|| non_empty(team.competition_name.as_deref()))
        else {
            continue;
        };
        out.entry(team_id.to_string())
            .or_insert_with(|| league.to_string());
    }
    out
}
