use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::match_log::{Match, PlayedMatch};
use crate::targets::{Outcome, ResultLetter, classify_outcome};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandingsRow {
    pub rank: usize,
    pub team: String,
    pub points: u32,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
}

impl StandingsRow {
    /// Team name with its table position in front, e.g. `"1   Palmeiras"`.
    pub fn label(&self) -> String {
        format!("{}   {}", self.rank, self.team)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandingsTable {
    pub rows: Vec<StandingsRow>,
}

impl StandingsTable {
    pub fn row(&self, team: &str) -> Option<&StandingsRow> {
        self.rows.iter().find(|r| r.team == team)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    points: u32,
    played: u32,
    wins: u32,
    draws: u32,
    losses: u32,
    goals_for: u32,
    goals_against: u32,
}

impl Tally {
    fn record(&mut self, scored: u32, conceded: u32, result: ResultLetter) {
        self.played += 1;
        self.goals_for = self.goals_for.saturating_add(scored);
        self.goals_against = self.goals_against.saturating_add(conceded);
        self.points += u32::from(result.points());
        match result {
            ResultLetter::Win => self.wins += 1,
            ResultLetter::Draw => self.draws += 1,
            ResultLetter::Loss => self.losses += 1,
        }
    }

    fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }
}

/// Running league table keyed by team name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Standings {
    tallies: BTreeMap<String, Tally>,
}

impl Standings {
    /// Zeroed rows for every team that appears in `played`.
    pub fn bootstrap(played: &[PlayedMatch]) -> Self {
        let mut tallies = BTreeMap::new();
        for m in played {
            tallies.entry(m.home_team.clone()).or_insert_with(Tally::default);
            tallies.entry(m.away_team.clone()).or_insert_with(Tally::default);
        }
        Self { tallies }
    }

    pub fn contains(&self, team: &str) -> bool {
        self.tallies.contains_key(team)
    }

    pub fn team_count(&self) -> usize {
        self.tallies.len()
    }

    /// Applies a real result. Returns false when either team has no row.
    pub fn apply_result(&mut self, m: &PlayedMatch) -> bool {
        if !self.contains(&m.home_team) || !self.contains(&m.away_team) {
            return false;
        }
        let (home, away) = classify_outcome(m.home_goals, m.away_goals).results();
        if let Some(t) = self.tallies.get_mut(&m.home_team) {
            t.record(m.home_goals, m.away_goals, home);
        }
        if let Some(t) = self.tallies.get_mut(&m.away_team) {
            t.record(m.away_goals, m.home_goals, away);
        }
        true
    }

    /// Applies a result known only by its outcome; goal tallies stay untouched.
    pub fn apply_outcome(&mut self, home_team: &str, away_team: &str, outcome: Outcome) -> bool {
        if !self.contains(home_team) || !self.contains(away_team) {
            return false;
        }
        let (home, away) = outcome.results();
        if let Some(t) = self.tallies.get_mut(home_team) {
            t.record(0, 0, home);
        }
        if let Some(t) = self.tallies.get_mut(away_team) {
            t.record(0, 0, away);
        }
        true
    }

    /// Sorted by points, then wins, then goal difference, all descending. The
    /// sort is stable over alphabetical team order; no further tie-break applies.
    pub fn rank(&self) -> StandingsTable {
        let mut rows: Vec<StandingsRow> = self
            .tallies
            .iter()
            .map(|(team, t)| StandingsRow {
                rank: 0,
                team: team.clone(),
                points: t.points,
                played: t.played,
                wins: t.wins,
                draws: t.draws,
                losses: t.losses,
                goals_for: t.goals_for,
                goals_against: t.goals_against,
                goal_difference: t.goal_difference(),
            })
            .collect();
        rows.sort_by(compare_rows);
        for (idx, row) in rows.iter_mut().enumerate() {
            row.rank = idx + 1;
        }
        StandingsTable { rows }
    }
}

pub fn compare_rows(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.wins.cmp(&a.wins))
        .then_with(|| b.goal_difference.cmp(&a.goal_difference))
}

/// Table position of every team after each round, ranked on points alone.
/// Only played matches with a round number count.
pub fn position_history(log: &[Match]) -> BTreeMap<String, Vec<(i64, usize)>> {
    let played: Vec<PlayedMatch> = log
        .iter()
        .filter(|m| m.round.is_some())
        .filter_map(Match::as_played)
        .collect();
    let Some(max_round) = played.iter().filter_map(|m| m.round).max() else {
        return BTreeMap::new();
    };

    let mut points: BTreeMap<String, u32> = BTreeMap::new();
    for m in &played {
        points.entry(m.home_team.clone()).or_insert(0);
        points.entry(m.away_team.clone()).or_insert(0);
    }
    let mut history: BTreeMap<String, Vec<(i64, usize)>> = points
        .keys()
        .map(|team| (team.clone(), Vec::new()))
        .collect();

    for round in 1..=max_round {
        for m in played.iter().filter(|m| m.round == Some(round)) {
            let (home, away) = classify_outcome(m.home_goals, m.away_goals).points();
            *points.entry(m.home_team.clone()).or_insert(0) += home;
            *points.entry(m.away_team.clone()).or_insert(0) += away;
        }
        let mut ranking: Vec<(&String, u32)> = points.iter().map(|(t, p)| (t, *p)).collect();
        ranking.sort_by(|a, b| b.1.cmp(&a.1));
        for (idx, (team, _)) in ranking.into_iter().enumerate() {
            if let Some(series) = history.get_mut(team) {
                series.push((round, idx + 1));
            }
        }
    }
    history
}
