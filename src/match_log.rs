use std::collections::BTreeSet;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::targets::{Outcome, classify_outcome};

/// One row of the league schedule. Missing goals mean the fixture is still to be played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub round: Option<i64>,
    pub date: NaiveDateTime,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: Option<u32>,
    pub away_goals: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayedMatch {
    pub round: Option<i64>,
    pub date: NaiveDateTime,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: u32,
    pub away_goals: u32,
}

impl Match {
    pub fn is_played(&self) -> bool {
        self.home_goals.is_some() && self.away_goals.is_some()
    }

    pub fn as_played(&self) -> Option<PlayedMatch> {
        let (Some(home_goals), Some(away_goals)) = (self.home_goals, self.away_goals) else {
            return None;
        };
        Some(PlayedMatch {
            round: self.round,
            date: self.date,
            home_team: self.home_team.clone(),
            away_team: self.away_team.clone(),
            home_goals,
            away_goals,
        })
    }

    pub fn involves(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }
}

impl PlayedMatch {
    pub fn outcome(&self) -> Outcome {
        classify_outcome(self.home_goals, self.away_goals)
    }
}

/// Boundary row shape of the normalised match log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchLogRow {
    #[serde(rename = "Rodada", default)]
    pub round: Value,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "HomeTeam")]
    pub home_team: String,
    #[serde(rename = "AwayTeam")]
    pub away_team: String,
    #[serde(rename = "FTHG", default)]
    pub home_goals: Value,
    #[serde(rename = "FTAG", default)]
    pub away_goals: Value,
}

impl MatchLogRow {
    pub fn to_match(&self) -> Option<Match> {
        let date = parse_match_date(&self.date)?;
        let home_team = self.home_team.trim().to_string();
        let away_team = self.away_team.trim().to_string();
        if home_team.is_empty() || away_team.is_empty() {
            return None;
        }
        let mut home_goals = as_goals(&self.home_goals);
        let mut away_goals = as_goals(&self.away_goals);
        // A filled cell that is not a plausible goal count rejects the row.
        if (home_goals.is_none() && !is_blank(&self.home_goals))
            || (away_goals.is_none() && !is_blank(&self.away_goals))
        {
            return None;
        }
        // A half-filled score is not a result.
        if home_goals.is_none() || away_goals.is_none() {
            home_goals = None;
            away_goals = None;
        }
        Some(Match {
            round: as_i64_any(&self.round),
            date,
            home_team,
            away_team,
            home_goals,
            away_goals,
        })
    }
}

/// Parses a JSON array of match-log records. Rows with an unreadable date, a
/// blank team name or an implausible goal count are skipped.
pub fn parse_match_log_json(raw: &str) -> Result<Vec<Match>> {
    let rows: Vec<MatchLogRow> =
        serde_json::from_str(raw.trim()).context("invalid match log json")?;
    let mut out = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        match row.to_match() {
            Some(m) => out.push(m),
            None => warn!(
                "skipping match log row {idx}: {} vs {} on {:?}",
                row.home_team, row.away_team, row.date
            ),
        }
    }
    Ok(out)
}

pub fn parse_match_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn played_matches(log: &[Match]) -> Vec<PlayedMatch> {
    log.iter().filter_map(Match::as_played).collect()
}

pub fn future_fixtures(log: &[Match]) -> Vec<Match> {
    log.iter().filter(|m| !m.is_played()).cloned().collect()
}

/// Every team name in the log, alphabetically.
pub fn team_names(log: &[Match]) -> Vec<String> {
    let mut names = BTreeSet::new();
    for m in log {
        names.insert(m.home_team.clone());
        names.insert(m.away_team.clone());
    }
    names.into_iter().collect()
}

fn as_i64_any(v: &Value) -> Option<i64> {
    if let Some(n) = v.as_i64() {
        return Some(n);
    }
    if let Some(f) = v.as_f64() {
        return (f.is_finite() && f.fract() == 0.0).then_some(f as i64);
    }
    let s = v.as_str()?.trim();
    s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

fn as_goals(v: &Value) -> Option<u32> {
    let n = as_i64_any(v)?;
    u8::try_from(n).ok().map(u32::from)
}

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
