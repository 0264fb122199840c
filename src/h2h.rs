use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::match_log::Match;
use crate::targets::{Outcome, classify_outcome};

/// Pre-aggregated record between two teams, stored with `team1 < team2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineRecord {
    #[serde(rename = "Time1")]
    pub team1: String,
    #[serde(rename = "Time2")]
    pub team2: String,
    #[serde(rename = "Vitorias_Time1")]
    pub wins_team1: u32,
    #[serde(rename = "Vitorias_Time2")]
    pub wins_team2: u32,
    #[serde(rename = "Empates")]
    pub draws: u32,
}

impl BaselineRecord {
    /// Reorders the pair alphabetically, swapping the win columns with it.
    pub fn canonical(self) -> Self {
        if self.team1 <= self.team2 {
            return self;
        }
        Self {
            team1: self.team2,
            team2: self.team1,
            wins_team1: self.wins_team2,
            wins_team2: self.wins_team1,
            draws: self.draws,
        }
    }

    /// Wins credited to `team`, if it is one of the pair.
    pub fn wins_for(&self, team: &str) -> u32 {
        if team == self.team1 {
            self.wins_team1
        } else if team == self.team2 {
            self.wins_team2
        } else {
            0
        }
    }
}

pub fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

pub trait BaselineSource {
    /// Record for the unordered pair, if any.
    fn lookup(&self, team_a: &str, team_b: &str) -> Option<BaselineRecord>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct H2hBaseline {
    records: HashMap<(String, String), BaselineRecord>,
}

impl H2hBaseline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<I: IntoIterator<Item = BaselineRecord>>(records: I) -> Self {
        let mut out = Self::new();
        for r in records {
            out.insert(r);
        }
        out
    }

    pub fn insert(&mut self, record: BaselineRecord) {
        let record = record.canonical();
        self.records
            .insert((record.team1.clone(), record.team2.clone()), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &BaselineRecord> {
        self.records.values()
    }
}

impl BaselineSource for H2hBaseline {
    fn lookup(&self, team_a: &str, team_b: &str) -> Option<BaselineRecord> {
        self.records.get(&pair_key(team_a, team_b)).cloned()
    }
}

pub fn parse_baseline_json(raw: &str) -> Result<H2hBaseline> {
    let rows: Vec<BaselineRecord> =
        serde_json::from_str(raw.trim()).context("invalid h2h baseline json")?;
    Ok(H2hBaseline::from_records(rows))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct H2hSummary {
    pub team_a: String,
    pub team_b: String,
    pub wins_a: u32,
    pub wins_b: u32,
    pub draws: u32,
    /// Goals in the live log only; the baseline carries no goal counts.
    pub goals_a: u32,
    pub goals_b: u32,
}

impl H2hSummary {
    pub fn total_matches(&self) -> u32 {
        self.wins_a + self.wins_b + self.draws
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct H2hMatchRow {
    pub date: NaiveDateTime,
    pub home_team: String,
    pub home_goals: u32,
    pub away_goals: u32,
    pub away_team: String,
}

/// Baseline record plus every played meeting of the two teams in `log`.
/// Display rows are newest first.
pub fn head_to_head<B: BaselineSource + ?Sized>(
    log: &[Match],
    team_a: &str,
    team_b: &str,
    baseline: &B,
) -> (H2hSummary, Vec<H2hMatchRow>) {
    let mut summary = H2hSummary {
        team_a: team_a.to_string(),
        team_b: team_b.to_string(),
        ..Default::default()
    };
    if team_a == team_b {
        return (summary, Vec::new());
    }

    if let Some(record) = baseline.lookup(team_a, team_b) {
        summary.wins_a += record.wins_for(team_a);
        summary.wins_b += record.wins_for(team_b);
        summary.draws += record.draws;
    }

    let mut rows = Vec::new();
    for m in log {
        let a_home = m.home_team == team_a && m.away_team == team_b;
        let b_home = m.home_team == team_b && m.away_team == team_a;
        if !a_home && !b_home {
            continue;
        }
        let Some(played) = m.as_played() else {
            continue;
        };

        let (goals_a, goals_b) = if a_home {
            (played.home_goals, played.away_goals)
        } else {
            (played.away_goals, played.home_goals)
        };
        summary.goals_a = summary.goals_a.saturating_add(goals_a);
        summary.goals_b = summary.goals_b.saturating_add(goals_b);
        match classify_outcome(goals_a, goals_b) {
            Outcome::Home => summary.wins_a += 1,
            Outcome::Away => summary.wins_b += 1,
            Outcome::Draw => summary.draws += 1,
        }

        rows.push(H2hMatchRow {
            date: played.date,
            home_team: played.home_team,
            home_goals: played.home_goals,
            away_goals: played.away_goals,
            away_team: played.away_team,
        });
    }
    rows.sort_by(|a, b| b.date.cmp(&a.date));

    (summary, rows)
}
