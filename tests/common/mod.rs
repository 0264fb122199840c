#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};

use league_forecast::match_log::Match;

pub const TEAMS: [&str; 6] = ["Atletico", "Bahia", "Corinthians", "Flamengo", "Gremio", "Santos"];

pub fn kickoff(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 1)
        .unwrap()
        .and_hms_opt(16, 0, 0)
        .unwrap()
        + chrono::Duration::days(i64::from(day))
}

pub fn played(round: i64, day: u32, home: &str, away: &str, hg: u32, ag: u32) -> Match {
    Match {
        round: Some(round),
        date: kickoff(day),
        home_team: home.to_string(),
        away_team: away.to_string(),
        home_goals: Some(hg),
        away_goals: Some(ag),
    }
}

pub fn fixture(round: i64, day: u32, home: &str, away: &str) -> Match {
    Match {
        round: Some(round),
        date: kickoff(day),
        home_team: home.to_string(),
        away_team: away.to_string(),
        home_goals: None,
        away_goals: None,
    }
}

/// Circle-method pairings for one round of a single round robin.
fn round_pairs(n: usize, r: usize) -> Vec<(usize, usize)> {
    let mut rotating: Vec<usize> = (1..n).collect();
    rotating.rotate_left(r % (n - 1));
    let mut list = vec![0];
    list.extend(rotating);
    (0..n / 2).map(|k| (list[k], list[n - 1 - k])).collect()
}

/// `rounds` rounds over [`TEAMS`]; the first `played_rounds` carry a score, the
/// rest are fixtures. Scores follow a fixed pattern so every label class occurs.
pub fn season(rounds: usize, played_rounds: usize) -> Vec<Match> {
    let n = TEAMS.len();
    let mut out = Vec::new();
    let mut idx = 0u32;
    for r in 0..rounds {
        let flip = (r / (n - 1)) % 2 == 1;
        for (a, b) in round_pairs(n, r) {
            let (home, away) = if flip { (TEAMS[b], TEAMS[a]) } else { (TEAMS[a], TEAMS[b]) };
            let round = r as i64 + 1;
            let day = (r as u32) * 7;
            if r < played_rounds {
                let hg = (idx * 7 + 3) % 4;
                let ag = (idx * 5 + 1) % 3;
                out.push(played(round, day, home, away, hg, ag));
            } else {
                out.push(fixture(round, day, home, away));
            }
            idx += 1;
        }
    }
    out
}
