use chrono::{Duration as ChronoDuration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::classifier::SeasonWindow;
use crate::record::{MatchRecord, PlayerRecord, TeamMembership};

const OPPONENTS: &[&str] = &[
    "Harbour City",
    "North Vale",
    "Riverside",
    "Eastgate",
    "Old Town",
    "Westfield",
];

/// Synthetic player histories for offline runs and benchmarks. The same player
/// id always produces the same record.
#[derive(Debug, Clone)]
pub struct FakeRecords {
    seasons: SeasonWindow,
    context_team: String,
    matches_per_season: usize,
}

impl FakeRecords {
    pub fn new(seasons: SeasonWindow, context_team: impl Into<String>) -> Self {
        Self {
            seasons,
            context_team: context_team.into(),
            matches_per_season: 18,
        }
    }

    pub fn with_matches_per_season(mut self, n: usize) -> Self {
        self.matches_per_season = n;
        self
    }

    pub fn player_record(&self, player_id: &str) -> PlayerRecord {
        let mut rng = StdRng::seed_from_u64(seed_for(player_id));
        let teams = vec![
            ("100", self.context_team.as_str(), "Senior League"),
            ("200", "Academy", "U21 League"),
        ];

        let mut matches = Vec::with_capacity(self.matches_per_season * 2 + 2);
        let start = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap_or_default();
        for (season, offset_weeks) in [(&self.seasons.current, 0i64), (&self.seasons.previous, 52)] {
            for i in 0..self.matches_per_season {
                let (team_id, team_name, league) = teams[usize::from(rng.gen_bool(0.25))];
                let opponent = OPPONENTS[rng.gen_range(0..OPPONENTS.len())];
                let date = start - ChronoDuration::weeks(offset_weeks) + ChronoDuration::days(i as i64 * 7);
                let played = i + 2 < self.matches_per_season;
                let home = rng.gen_bool(0.5);
                let ours = rng.gen_range(15..35u32);
                let theirs = rng.gen_range(15..35u32);
                let (a_id, a_name, b_id, b_name, a_score, b_score) = if home {
                    (team_id, team_name, "900", opponent, ours, theirs)
                } else {
                    ("900", opponent, team_id, team_name, theirs, ours)
                };
                let winner = match ours.cmp(&theirs) {
                    _ if rng.gen_bool(0.3) => "-".to_string(),
                    std::cmp::Ordering::Greater => team_id.to_string(),
                    std::cmp::Ordering::Less => "900".to_string(),
                    std::cmp::Ordering::Equal => "0".to_string(),
                };
                matches.push(MatchRecord {
                    season: Some(season.clone()),
                    team_id: Some(team_id.to_string()),
                    team_name: Some(team_name.to_string()),
                    team_a_id: Some(a_id.to_string()),
                    team_a_name: Some(a_name.to_string()),
                    team_b_id: Some(b_id.to_string()),
                    team_b_name: Some(b_name.to_string()),
                    team_a_score: played.then(|| a_score.to_string()),
                    team_b_score: played.then(|| b_score.to_string()),
                    winner_id: played.then_some(winner),
                    status: Some(if played { "played" } else { "fixture" }.to_string()),
                    date: Some(date.format("%Y-%m-%d").to_string()),
                    player_goals: played.then(|| rng.gen_range(0..8u32).to_string()),
                    player_warnings: (played && rng.gen_bool(0.2)).then(|| "1".to_string()),
                    player_suspensions: (played && rng.gen_bool(0.1)).then(|| "1".to_string()),
                    competition_name: Some(league.to_string()),
                    category_name: None,
                });
            }
        }
        // Out-of-window season noise.
        matches.push(MatchRecord {
            season: Some("2019".to_string()),
            team_id: Some("100".to_string()),
            team_name: Some(self.context_team.clone()),
            player_goals: Some("9".to_string()),
            ..MatchRecord::default()
        });

        let memberships = teams
            .iter()
            .map(|(id, name, league)| TeamMembership {
                team_id: Some(id.to_string()),
                team_name: Some(name.to_string()),
                competition_id: Some(format!("{}-{id}", self.seasons.current)),
                competition_name: Some(league.to_string()),
                category_name: Some(league.to_string()),
            })
            .collect();

        PlayerRecord {
            matches,
            teams: memberships,
        }
    }
}

fn seed_for(player_id: &str) -> u64 {
    player_id
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325u64, |h, b| (h ^ u64::from(b)).wrapping_mul(0x100_0000_01b3))
}
