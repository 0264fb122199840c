use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_FORM_WINDOW, DEFAULT_GOALS_LINE, DEFAULT_WARMUP_ROWS};
use crate::match_log::PlayedMatch;
use crate::targets::{MatchTargets, ResultLetter, derive_targets};

/// Prior strength for a team with no history: one point per match.
pub const DEFAULT_STRENGTH: f64 = 1.0;

pub const NUMERIC_FEATURE_NAMES: [&str; 8] = [
    "strength_home",
    "strength_away",
    "form_points_home",
    "form_points_away",
    "goals_for_avg_home",
    "goals_for_avg_away",
    "goals_against_avg_home",
    "goals_against_avg_away",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormConfig {
    pub window: usize,
    pub warmup_rows: usize,
    pub goals_line: f64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_FORM_WINDOW,
            warmup_rows: DEFAULT_WARMUP_ROWS,
            goals_line: DEFAULT_GOALS_LINE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamForm {
    pub points: Vec<u8>,
    pub goals_for: Vec<u32>,
    pub goals_against: Vec<u32>,
    pub results: Vec<ResultLetter>,
}

impl TeamForm {
    pub fn matches_played(&self) -> usize {
        self.points.len()
    }

    pub fn record(&mut self, scored: u32, conceded: u32) {
        let letter = ResultLetter::from_goals(scored, conceded);
        self.points.push(letter.points());
        self.goals_for.push(scored);
        self.goals_against.push(conceded);
        self.results.push(letter);
    }

    pub fn features(&self, window: usize) -> FormFeatures {
        let strength = if self.points.is_empty() {
            DEFAULT_STRENGTH
        } else {
            self.points.iter().map(|&p| f64::from(p)).sum::<f64>() / self.points.len() as f64
        };
        FormFeatures {
            strength,
            form_points: last_n(&self.points, window)
                .iter()
                .map(|&p| f64::from(p))
                .sum(),
            goals_for_avg: mean_u32(last_n(&self.goals_for, window)),
            goals_against_avg: mean_u32(last_n(&self.goals_against, window)),
        }
    }

    /// Most recent `n` results, oldest first, e.g. `"WDLWW"`.
    pub fn form_string(&self, n: usize) -> String {
        last_n(&self.results, n).iter().map(|r| r.as_char()).collect()
    }
}

/// Rolling state for every team seen so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStateMap {
    teams: HashMap<String, TeamForm>,
}

impl TeamStateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn get(&self, team: &str) -> Option<&TeamForm> {
        self.teams.get(team)
    }

    pub fn contains(&self, team: &str) -> bool {
        self.teams.contains_key(team)
    }

    pub fn teams(&self) -> impl Iterator<Item = (&String, &TeamForm)> {
        self.teams.iter()
    }

    /// Features for `team`, or the no-history prior when the team is unknown.
    pub fn features_for(&self, team: &str, window: usize) -> FormFeatures {
        self.teams
            .get(team)
            .map(|form| form.features(window))
            .unwrap_or_default()
    }

    pub fn match_features(&self, home: &str, away: &str, window: usize) -> MatchFeatures {
        MatchFeatures {
            home: self.features_for(home, window),
            away: self.features_for(away, window),
        }
    }

    /// Folds one result into both sides' history.
    pub fn apply(&mut self, m: &PlayedMatch) {
        self.teams
            .entry(m.home_team.clone())
            .or_default()
            .record(m.home_goals, m.away_goals);
        self.teams
            .entry(m.away_team.clone())
            .or_default()
            .record(m.away_goals, m.home_goals);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormFeatures {
    pub strength: f64,
    pub form_points: f64,
    pub goals_for_avg: f64,
    pub goals_against_avg: f64,
}

impl Default for FormFeatures {
    fn default() -> Self {
        Self {
            strength: DEFAULT_STRENGTH,
            form_points: 0.0,
            goals_for_avg: 0.0,
            goals_against_avg: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MatchFeatures {
    pub home: FormFeatures,
    pub away: FormFeatures,
}

impl MatchFeatures {
    /// Values in `NUMERIC_FEATURE_NAMES` order.
    pub fn to_array(&self) -> [f64; 8] {
        [
            self.home.strength,
            self.away.strength,
            self.home.form_points,
            self.away.form_points,
            self.home.goals_for_avg,
            self.away.goals_for_avg,
            self.home.goals_against_avg,
            self.away.goals_against_avg,
        ]
    }

    pub fn named(&self) -> Vec<(String, f64)> {
        NUMERIC_FEATURE_NAMES
            .iter()
            .zip(self.to_array())
            .map(|(name, v)| (name.to_string(), v))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub fixture: PlayedMatch,
    pub features: MatchFeatures,
    pub targets: MatchTargets,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn build_features(matches: &[PlayedMatch]) -> (FeatureTable, TeamStateMap) {
    build_features_with(matches, &FormConfig::default())
}

/// Walks the log in date order. Each row only sees results strictly before it;
/// the first `warmup_rows` rows are dropped from the returned table.
pub fn build_features_with(
    matches: &[PlayedMatch],
    cfg: &FormConfig,
) -> (FeatureTable, TeamStateMap) {
    if matches.is_empty() {
        return (FeatureTable::default(), TeamStateMap::new());
    }

    let mut ordered: Vec<&PlayedMatch> = matches.iter().collect();
    ordered.sort_by_key(|m| m.date);

    let (rows, state) = ordered.into_iter().fold(
        (Vec::with_capacity(matches.len()), TeamStateMap::new()),
        |(mut rows, mut state), m| {
            let features = state.match_features(&m.home_team, &m.away_team, cfg.window);
            rows.push(FeatureRow {
                fixture: m.clone(),
                features,
                targets: derive_targets(m.home_goals, m.away_goals, cfg.goals_line),
            });
            state.apply(m);
            (rows, state)
        },
    );

    let rows: Vec<FeatureRow> = rows.into_iter().skip(cfg.warmup_rows).collect();
    debug!(
        "built {} feature rows from {} matches ({} teams)",
        rows.len(),
        matches.len(),
        state.len()
    );
    (FeatureTable { rows }, state)
}

fn last_n<T>(values: &[T], n: usize) -> &[T] {
    &values[values.len().saturating_sub(n)..]
}

fn mean_u32(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_window_uses_last_five() {
        let mut form = TeamForm::default();
        for (s, c) in [(0, 3), (0, 1), (2, 0), (1, 1), (3, 2), (4, 0)] {
            form.record(s, c);
        }
        let f = form.features(5);
        // points: 0 0 3 1 3 3
        assert!((f.strength - 10.0 / 6.0).abs() < 1e-12);
        assert!((f.form_points - 10.0).abs() < 1e-12);
        assert!((f.goals_for_avg - 2.0).abs() < 1e-12);
        assert!((f.goals_against_avg - 0.8).abs() < 1e-12);
        assert_eq!(form.form_string(5), "LWDWW");
        assert_eq!(form.form_string(10), "LLWDWW");
    }

    #[test]
    fn unknown_team_gets_prior() {
        let state = TeamStateMap::new();
        let f = state.features_for("Nobody", 5);
        assert_eq!(f.strength, 1.0);
        assert_eq!(f.form_points, 0.0);
        assert_eq!(f.goals_for_avg, 0.0);
        assert_eq!(f.goals_against_avg, 0.0);
    }
}
