use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

const HOME_PREFIX: &str = "home_team=";
const AWAY_PREFIX: &str = "away_team=";

/// One-hot encoding of the (home team, away team) pair. Categories are learned per
/// side and kept sorted; names never seen at fit time encode to all zeros.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamEncoder {
    home_categories: Vec<String>,
    away_categories: Vec<String>,
}

impl TeamEncoder {
    pub fn fit<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut home = BTreeSet::new();
        let mut away = BTreeSet::new();
        for (h, a) in pairs {
            home.insert(h.to_string());
            away.insert(a.to_string());
        }
        Self {
            home_categories: home.into_iter().collect(),
            away_categories: away.into_iter().collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.home_categories.len() + self.away_categories.len()
    }

    pub fn knows_home(&self, team: &str) -> bool {
        self.home_categories.binary_search_by(|c| c.as_str().cmp(team)).is_ok()
    }

    pub fn knows_away(&self, team: &str) -> bool {
        self.away_categories.binary_search_by(|c| c.as_str().cmp(team)).is_ok()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.home_categories
            .iter()
            .map(|c| format!("{HOME_PREFIX}{c}"))
            .chain(self.away_categories.iter().map(|c| format!("{AWAY_PREFIX}{c}")))
            .collect()
    }

    /// Fixed-width vector in `column_names` order.
    pub fn encode(&self, home: &str, away: &str) -> Vec<f64> {
        let mut out = vec![0.0; self.width()];
        if let Ok(idx) = self.home_categories.binary_search_by(|c| c.as_str().cmp(home)) {
            out[idx] = 1.0;
        }
        if let Ok(idx) = self.away_categories.binary_search_by(|c| c.as_str().cmp(away)) {
            out[self.home_categories.len() + idx] = 1.0;
        }
        out
    }

    pub fn encode_named(&self, home: &str, away: &str) -> Vec<(String, f64)> {
        self.column_names()
            .into_iter()
            .zip(self.encode(home, away))
            .collect()
    }
}
